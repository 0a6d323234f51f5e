//! SST source resolution.
//!
//! An ordered candidate chain with named outcomes instead of nested
//! error handling: the ocean-reanalysis surface temperature is preferred
//! over the atmospheric model's boundary estimate, which is used only when
//! the former is absent or yields nothing finite.

use taranis_gridio::MonthlyGridSet;
use taranis_spatial::DiskSampler;
use tracing::debug;

use crate::profile::SstSource;

/// Disk-averaged SST in K at (`lat`, `lon`), with the source that produced
/// it. `None` when neither source yields a finite value.
pub(crate) fn resolve_sst(
    grids: &MonthlyGridSet,
    lat: f64,
    lon: f64,
    radius_deg: f64,
) -> Option<(f64, SstSource)> {
    for source in [SstSource::OceanReanalysis, SstSource::AtmosphericEstimate] {
        if let Some(value) = try_source(grids, source, lat, lon, radius_deg) {
            if value.is_finite() {
                return Some((value, source));
            }
            debug!(source = %source, "SST candidate produced non-finite value");
        }
    }
    None
}

fn try_source(
    grids: &MonthlyGridSet,
    source: SstSource,
    lat: f64,
    lon: f64,
    radius_deg: f64,
) -> Option<f64> {
    match source {
        SstSource::OceanReanalysis => {
            let temperature = grids.ocean()?.temperature();
            // Surface level of the ocean profile, in degrees C.
            let surface = temperature.nearest_level(0.0);
            let sampler = DiskSampler::build(
                temperature.lats(),
                temperature.lons(),
                lat,
                lon,
                radius_deg,
            );
            let sst_c = sampler.average(temperature.plane(surface));
            Some(sst_c + 273.15)
        }
        SstSource::AtmosphericEstimate => {
            let field = grids.single()?.sea_surface_temperature()?;
            let sampler = DiskSampler::build(field.lats(), field.lons(), lat, lon, radius_deg);
            // Already in K.
            Some(sampler.average(field.values()))
        }
    }
}
