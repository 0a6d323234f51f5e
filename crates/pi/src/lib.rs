//! Potential-intensity computation for tropical-cyclone environments.
//!
//! The crate separates the physics from the plumbing:
//!
//! - [`PiKernel`] is the contract for a pure potential-intensity function;
//!   [`BisterEmanuel`] is the default CAPE-based implementation.
//! - [`compute_pi`] is the adapter the extraction pipeline calls: it
//!   validates the N-level profile, normalizes units at the boundary
//!   (Pa to hPa, K to degrees C, specific humidity to mixing ratio in
//!   g/kg), and turns kernel failures into contextful errors rather than
//!   silent NaNs.
//! - [`kaplan_demaria_decay`] is the empirical inland decay applied to
//!   synthetic tracks after landfall.

mod adapter;
mod decay;
mod error;
mod kernel;

pub use adapter::compute_pi;
pub use decay::kaplan_demaria_decay;
pub use error::{KernelError, PiError};
pub use kernel::{BisterEmanuel, KernelInput, PiKernel};
