//! Error types for the taranis-quantile-match crate.

/// Error type for all fallible operations in the taranis-quantile-match crate.
#[derive(Debug, Clone, thiserror::Error)]
pub enum QmatchError {
    /// Returned when input data is empty.
    #[error("input data is empty")]
    EmptyData,

    /// Returned when the observed, simulated, and group slices differ in length.
    #[error(
        "length mismatch: observed has {observed_len} storms, simulated has {simulated_len}, groups has {groups_len}"
    )]
    LengthMismatch {
        /// Length of the observed LMI slice.
        observed_len: usize,
        /// Length of the simulated LMI slice.
        simulated_len: usize,
        /// Length of the group-label slice.
        groups_len: usize,
    },

    /// Returned when no valid quantile pairs remain after threshold and
    /// finiteness filtering.
    #[error("degenerate quantile mapping: {reason}")]
    DegenerateMapping {
        /// Description of why no mapping could be built.
        reason: String,
    },

    /// Returned when a configuration parameter is invalid.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the problem.
        reason: String,
    },
}
