//! Monthly reanalysis grid loading and resource management.
//!
//! This crate owns every interaction with the on-disk monthly grid tree:
//! resolving expected file paths per (year, month), loading NetCDF fields
//! through a variable-alias schema, bundling them into immutable
//! [`MonthlyGridSet`]s, and bounding resident memory through an explicit
//! acquire/release discipline with a pluggable caching policy.
//!
//! # Lifecycle
//!
//! ```text
//!  acquire(year, month) ──▶ MonthlyGridSet ──▶ (process every observation
//!        │                                      of that month)
//!        └── MissingGridData: skip month        │
//!                                      release(set)
//! ```
//!
//! Grids for month M are released before grids for any other month are
//! requested, so peak resident grid memory is one month's worth under the
//! default [`CachePolicy::NoCache`].

mod axes;
mod catalog;
mod error;
mod field;
mod manager;
mod monthly;
mod schema;

pub use axes::{AxisCache, GridCategory, MonthAxes};
pub use catalog::{Catalog, CatalogEntry};
pub use error::GridError;
pub use field::{SurfaceField, VolumeField};
pub use manager::{CachePolicy, GridManager};
pub use monthly::{
    MonthlyGridSet, OceanGrids, PressureLevelGrids, SingleLevelGrids, load_static_surface,
};
pub use schema::{
    BATHYMETRY, DEPTH_AXIS, LATITUDE_AXIS, LONGITUDE_AXIS, OCEAN_TEMPERATURE, PRESSURE_AXIS,
    RELATIVE_HUMIDITY, SEA_SURFACE_TEMPERATURE, SPECIFIC_HUMIDITY, SURFACE_PRESSURE, TEMPERATURE,
    U_WIND, V_WIND, VarSpec,
};
