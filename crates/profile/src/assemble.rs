//! Assembly of the environmental profile at one TC observation.

use std::collections::BTreeMap;

use taranis_gridio::{MonthlyGridSet, PressureLevelGrids, SurfaceField, VolumeField};
use taranis_spatial::DiskSampler;
use taranis_tracks::{Observation, TrackTable};
use tracing::trace;

use crate::bathymetry::bathymetry_at;
use crate::config::ExtractConfig;
use crate::error::ExtractError;
use crate::levels::{
    HUMIDITY_LEVELS_HPA, RELATIVE_HUMIDITY_LEVEL_HPA, TEMPERATURE_LEVELS_HPA, WIND_LEVELS_HPA,
};
use crate::ocean::{mixed_layer_depth, thermal_stratification};
use crate::profile::{EnvironmentalProfile, LevelProfile};
use crate::sst::resolve_sst;

/// Assembles the environmental profile for one observation from the grids
/// of its month.
///
/// Diagnostic-level scalars, shear and upper-ocean diagnostics degrade to
/// absent when their source fields are missing. The PI inputs do not: a
/// missing or non-finite N-level triplet, SST, or surface pressure fails
/// the observation with [`ExtractError::IncompleteProfile`].
///
/// # Errors
///
/// Returns [`ExtractError::IncompleteProfile`] naming every required input
/// that could not be produced.
pub fn extract(
    obs: &Observation,
    track: &TrackTable,
    grids: &MonthlyGridSet,
    bathymetry: Option<&SurfaceField>,
    config: &ExtractConfig,
) -> Result<EnvironmentalProfile, ExtractError> {
    let lat = obs.lat;
    let lon = obs.lon_0_360();
    let radius = config.radius_deg();

    let mut values: BTreeMap<String, f64> = BTreeMap::new();
    let mut triplet: Option<LevelTriplet> = None;

    if let Some(pressure) = grids.pressure() {
        assemble_pressure_levels(pressure, lat, lon, radius, config, &mut values, &mut triplet);
    }

    if let Some(sp) = grids.single().and_then(|s| s.surface_pressure()) {
        let sampler = DiskSampler::build(sp.lats(), sp.lons(), lat, lon, radius);
        values.insert("surface_pressure".to_string(), sampler.average(sp.values()));
    }

    let sst = resolve_sst(grids, lat, lon, radius);
    if let Some((sst_k, _)) = sst {
        values.insert("sst".to_string(), sst_k);
    }

    // Upper-ocean diagnostics: optional, NaN results are simply not recorded.
    if let (Some(ocean), Some((sst_k, _))) = (grids.ocean(), sst) {
        let column = ocean.temperature().nearest_column(lat, lon);
        let mld = mixed_layer_depth(
            &column,
            ocean.depths(),
            sst_k - 273.15,
            config.mld_delta_t_c(),
        );
        if mld.is_finite() {
            values.insert("mixed_layer_depth".to_string(), mld);
            let strat = thermal_stratification(
                &column,
                ocean.depths(),
                mld,
                config.stratification_layer_m(),
            );
            if strat.is_finite() {
                values.insert("thermal_stratification".to_string(), strat);
            }
        }
    }

    if let Some(speed) = track.translation_speed(&obs.storm_id, obs.time) {
        values.insert("translation_speed".to_string(), speed);
    }

    let mut is_land = None;
    if let Some(field) = bathymetry {
        let (depth, land) = bathymetry_at(field, lat, lon);
        if depth.is_finite() {
            values.insert("bathymetry".to_string(), depth);
        }
        is_land = land;
    }

    // Required-input policy: PI inputs are never silently NaN.
    let mut missing = Vec::new();
    match &triplet {
        None => {
            missing.push("temperature_profile".to_string());
            missing.push("humidity_profile".to_string());
        }
        Some(t) => {
            if !t.temperature_k.iter().all(|v| v.is_finite()) {
                missing.push("temperature_profile".to_string());
            }
            if !t.specific_humidity.iter().all(|v| v.is_finite()) {
                missing.push("humidity_profile".to_string());
            }
        }
    }
    if !values.get("sst").is_some_and(|v| v.is_finite()) {
        missing.push("sst".to_string());
    }
    if !values.get("surface_pressure").is_some_and(|v| v.is_finite()) {
        missing.push("surface_pressure".to_string());
    }
    if !missing.is_empty() {
        return Err(ExtractError::IncompleteProfile { missing });
    }

    let t = triplet.expect("triplet verified present");
    let levels = LevelProfile::new(t.pressure_hpa, t.temperature_k, t.specific_humidity)?;
    let (_, sst_source) = sst.expect("sst verified present");

    trace!(
        storm_id = %obs.storm_id,
        n_values = values.len(),
        n_levels = levels.len(),
        "profile assembled"
    );
    Ok(EnvironmentalProfile::new(
        values, levels, sst_source, is_land,
    ))
}

/// Accumulator for the PI triplet before the all-or-none check.
struct LevelTriplet {
    pressure_hpa: Vec<f64>,
    temperature_k: Vec<f64>,
    specific_humidity: Vec<f64>,
}

/// Diagnostic levels, shear, and the PI triplet from the pressure-level
/// bundle. One [`DiskSampler`] serves every level and variable: the fields
/// of a month share axes, so the cell selection and weights are computed
/// once per observation.
fn assemble_pressure_levels(
    pressure: &PressureLevelGrids,
    lat: f64,
    lon: f64,
    radius: f64,
    config: &ExtractConfig,
    values: &mut BTreeMap<String, f64>,
    triplet: &mut Option<LevelTriplet>,
) {
    let Some(any_field) = first_field(pressure) else {
        return;
    };
    let sampler = DiskSampler::build(any_field.lats(), any_field.lons(), lat, lon, radius);

    if let Some(t) = pressure.temperature() {
        for &level in &TEMPERATURE_LEVELS_HPA {
            let k = t.nearest_level(level);
            values.insert(
                format!("temperature_{}", level as i64),
                sampler.average(t.plane(k)),
            );
        }
    }

    if let (Some(u), Some(v)) = (pressure.u_wind(), pressure.v_wind()) {
        for &level in &WIND_LEVELS_HPA {
            let ku = u.nearest_level(level);
            let kv = v.nearest_level(level);
            let u_val = sampler.average(u.plane(ku));
            let v_val = sampler.average(v.plane(kv));
            let tag = level as i64;
            values.insert(format!("u_{tag}"), u_val);
            values.insert(format!("v_{tag}"), v_val);
            values.insert(format!("wind_speed_{tag}"), u_val.hypot(v_val));
        }

        // Deep-layer shear between 850 and 250 hPa, only when all four
        // components exist.
        let shear = ["u_850", "v_850", "u_250", "v_250"]
            .map(|name| values.get(name).copied().unwrap_or(f64::NAN));
        if shear.iter().all(|v| v.is_finite()) {
            let [u850, v850, u250, v250] = shear;
            values.insert("wind_shear".to_string(), (u250 - u850).hypot(v250 - v850));
        }
    }

    if let Some(q) = pressure.specific_humidity() {
        for &level in &HUMIDITY_LEVELS_HPA {
            let k = q.nearest_level(level);
            values.insert(
                format!("specific_humidity_{}", level as i64),
                sampler.average(q.plane(k)),
            );
        }
    }

    if let Some(rh) = pressure.relative_humidity() {
        let k = rh.nearest_level(RELATIVE_HUMIDITY_LEVEL_HPA);
        values.insert(
            format!("relative_humidity_{}", RELATIVE_HUMIDITY_LEVEL_HPA as i64),
            sampler.average(rh.plane(k)),
        );
    }

    // The full PI triplet: nearest available level per target, sharing the
    // sampler across all levels of both cubes.
    if let (Some(t), Some(q)) = (pressure.temperature(), pressure.specific_humidity()) {
        let mut pressure_hpa = Vec::with_capacity(config.pi_levels_hpa().len());
        let mut temperature_k = Vec::with_capacity(config.pi_levels_hpa().len());
        let mut specific_humidity = Vec::with_capacity(config.pi_levels_hpa().len());
        for &target in config.pi_levels_hpa() {
            let k = t.nearest_level(target);
            pressure_hpa.push(t.levels()[k]);
            temperature_k.push(sampler.average(t.plane(k)));
            specific_humidity.push(sampler.average(q.plane(q.nearest_level(target))));
        }
        *triplet = Some(LevelTriplet {
            pressure_hpa,
            temperature_k,
            specific_humidity,
        });
    }
}

fn first_field(pressure: &PressureLevelGrids) -> Option<&VolumeField> {
    pressure
        .temperature()
        .or_else(|| pressure.specific_humidity())
        .or_else(|| pressure.u_wind())
        .or_else(|| pressure.v_wind())
        .or_else(|| pressure.relative_humidity())
}
