//! Error types for taranis-pi.

/// Error type for the potential-intensity adapter.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PiError {
    /// Returned when the three profile arrays do not all have the expected
    /// number of levels. Mismatches are never silently truncated or padded.
    #[error(
        "profile length mismatch: expected {expected} levels, got temperature {temperature}, humidity {humidity}, pressure {pressure}"
    )]
    ProfileLengthMismatch {
        /// Configured number of levels.
        expected: usize,
        /// Length of the temperature array.
        temperature: usize,
        /// Length of the humidity array.
        humidity: usize,
        /// Length of the pressure array.
        pressure: usize,
    },

    /// Returned when the physics kernel fails. The inputs are echoed so the
    /// failure is traceable in aggregate extraction statistics; it is never
    /// converted to a silent NaN.
    #[error(
        "potential-intensity kernel failed (sst={sst_k} K, surface pressure={surface_pressure_pa} Pa, {n_levels} levels): {reason}"
    )]
    Kernel {
        /// Description of the kernel failure.
        reason: String,
        /// Sea-surface temperature input (K).
        sst_k: f64,
        /// Surface pressure input (Pa).
        surface_pressure_pa: f64,
        /// Number of profile levels supplied.
        n_levels: usize,
    },
}

/// Error type for a [`crate::PiKernel`] implementation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum KernelError {
    /// Returned when an input violates the kernel's contract.
    #[error("invalid kernel input: {reason}")]
    InvalidInput {
        /// Description of the violation.
        reason: String,
    },

    /// Returned when an iterative solve does not converge.
    #[error("kernel iteration did not converge after {iterations} iterations")]
    NonConvergence {
        /// Number of iterations performed before giving up.
        iterations: usize,
    },
}
