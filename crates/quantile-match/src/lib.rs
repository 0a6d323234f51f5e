//! Quantile-matching bias correction for simulated storm intensities.
//!
//! This crate corrects simulated lifetime-maximum-intensity (LMI)
//! distributions to match observed climatology by aligning empirical
//! quantiles.
//!
//! # Pipeline
//!
//! 1. **Filter** both populations to storms at or above tropical-storm
//!    intensity (18 m/s by default)
//! 2. **Fit** paired quantiles at evenly spaced levels in (0, 1], dropping
//!    non-finite pairs
//! 3. **Apply** the monotone piecewise-linear mapping with flat endpoint
//!    clamping; outputs are always finite and non-negative
//!
//! Grouped correction (per basin or per ENSO phase) falls back to the
//! overall mapping for groups with too few storms or failed fits, and
//! records the chosen strategy per group in a provenance record.
//!
//! # Quick start
//!
//! ```
//! use taranis_quantile_match::{QmatchConfig, fit_and_apply_grouped};
//!
//! let observed = vec![30.0, 45.0, 60.0, 25.0, 50.0, 70.0, 40.0, 35.0, 55.0, 65.0];
//! let simulated = vec![28.0, 40.0, 52.0, 24.0, 44.0, 60.0, 36.0, 33.0, 48.0, 58.0];
//! let groups: Vec<String> = vec!["NA".to_string(); 10];
//!
//! let result = fit_and_apply_grouped(
//!     &observed,
//!     &simulated,
//!     &groups,
//!     "basin",
//!     &QmatchConfig::new(),
//! ).unwrap();
//! assert_eq!(result.corrected().len(), 10);
//! ```

mod apply;
mod config;
mod error;
mod fit;
mod grouped;
mod result;

pub use apply::apply;
pub use config::QmatchConfig;
pub use error::QmatchError;
pub use fit::{QuantileMapping, fit};
pub use grouped::{correct, fit_and_apply_grouped};
pub use result::{CorrectionProvenance, CorrectionResult, GroupStrategy};
