//! Error types for taranis-profile.

/// Error type for profile assembly.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ExtractError {
    /// Returned when a required input for potential intensity could not be
    /// produced: the full N-level triplet, SST, or surface pressure.
    ///
    /// This is intentionally not downgraded to a degraded few-level profile
    /// or a NaN; the observation fails instead (accuracy over coverage).
    #[error("incomplete profile, missing: {}", missing.join(", "))]
    IncompleteProfile {
        /// Names of the inputs that could not be produced.
        missing: Vec<String>,
    },

    /// Returned when the three level arrays of a triplet disagree in shape.
    #[error("malformed level profile: {reason}")]
    ProfileShape {
        /// Description of the shape violation.
        reason: String,
    },
}
