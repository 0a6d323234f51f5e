//! Environmental profile assembly at tropical-cyclone locations.
//!
//! For each TC observation this crate reduces the month's grids to a named
//! set of environmental scalars (diagnostic-level temperature, wind and
//! humidity, deep-layer shear, SST with source fallback, surface pressure,
//! upper-ocean diagnostics, translation speed, bathymetry) and the complete
//! N-level (pressure, temperature, humidity) triplet consumed by the
//! potential-intensity kernel.
//!
//! The triplet is all-or-none by construction: observations whose required
//! PI inputs cannot be produced fail with
//! [`ExtractError::IncompleteProfile`] instead of degrading.

mod assemble;
mod bathymetry;
mod config;
mod error;
mod levels;
mod ocean;
mod profile;
mod sst;

pub use assemble::extract;
pub use bathymetry::bathymetry_at;
pub use config::ExtractConfig;
pub use error::ExtractError;
pub use levels::{
    HUMIDITY_LEVELS_HPA, PI_PRESSURE_LEVELS_HPA, RELATIVE_HUMIDITY_LEVEL_HPA,
    TEMPERATURE_LEVELS_HPA, WIND_LEVELS_HPA,
};
pub use ocean::{mixed_layer_depth, thermal_stratification};
pub use profile::{EnvironmentalProfile, LevelProfile, SstSource};
