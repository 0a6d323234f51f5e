//! Integration tests: profile assembly over in-memory monthly grids.

use std::sync::Arc;

use approx::assert_relative_eq;
use chrono::{NaiveDate, NaiveDateTime};
use taranis_gridio::{
    MonthlyGridSet, OceanGrids, PressureLevelGrids, SingleLevelGrids, SurfaceField, VolumeField,
};
use taranis_profile::{ExtractConfig, ExtractError, PI_PRESSURE_LEVELS_HPA, SstSource, extract};
use taranis_tracks::{Observation, TrackTable};

fn axes() -> (Arc<Vec<f64>>, Arc<Vec<f64>>) {
    let lats = Arc::new((0..21).map(|i| 5.0 + i as f64).collect::<Vec<_>>());
    let lons = Arc::new((0..21).map(|j| 300.0 + j as f64).collect::<Vec<_>>());
    (lats, lons)
}

/// Constant-per-level volume field: `value_of(level)` fills each plane.
fn volume(name: &str, levels: &[f64], value_of: impl Fn(f64) -> f64) -> VolumeField {
    let (lats, lons) = axes();
    let plane = lats.len() * lons.len();
    let mut data = Vec::with_capacity(levels.len() * plane);
    for &level in levels {
        data.extend(std::iter::repeat_n(value_of(level), plane));
    }
    VolumeField::new(name, Arc::new(levels.to_vec()), lats, lons, data).unwrap()
}

fn surface(name: &str, value: f64) -> SurfaceField {
    let (lats, lons) = axes();
    let n = lats.len() * lons.len();
    SurfaceField::new(name, lats, lons, vec![value; n]).unwrap()
}

fn pressure_grids(with_humidity: bool) -> PressureLevelGrids {
    let levels = PI_PRESSURE_LEVELS_HPA;
    PressureLevelGrids::new(
        Arc::new(levels.to_vec()),
        Some(volume("temperature", &levels, |p| {
            300.0 * (p / 1000.0_f64).powf(0.19)
        })),
        with_humidity.then(|| volume("specific_humidity", &levels, |p| {
            0.018 * (p / 1000.0_f64).powi(3)
        })),
        Some(volume("u_wind", &levels, |p| p / 100.0)),
        Some(volume("v_wind", &levels, |_| -2.0)),
        Some(volume("relative_humidity", &levels, |_| 55.0)),
    )
}

fn ocean_grids() -> OceanGrids {
    let depths = [0.5, 10.0, 20.0, 40.0, 60.0, 100.0, 150.0, 200.0];
    OceanGrids::new(volume("ocean_temperature", &depths, |d| {
        if d <= 40.0 { 28.0 } else { 28.0 - (d - 40.0) * 0.08 }
    }))
}

fn full_grid_set() -> MonthlyGridSet {
    MonthlyGridSet::new(
        2005,
        8,
        Some(pressure_grids(true)),
        Some(SingleLevelGrids::new(
            Some(surface("surface_pressure", 101_325.0)),
            Some(surface("sea_surface_temperature", 302.0)),
        )),
        Some(ocean_grids()),
    )
}

fn fix_at(hour: u32, lat: f64, lon: f64) -> Observation {
    Observation {
        storm_id: "2005236N23285".to_string(),
        basin: Some("NA".to_string()),
        time: NaiveDate::from_ymd_opt(2005, 8, 27)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap(),
        lat,
        lon,
        max_wind_ms: Some(50.0),
        enso_phase: None,
    }
}

fn single_storm_track() -> (TrackTable, NaiveDateTime) {
    let first = fix_at(6, 14.5, 310.0);
    let second = fix_at(12, 15.0, 309.5);
    let at = second.time;
    (TrackTable::new(vec![first, second]), at)
}

#[test]
fn full_extraction_produces_every_variable() {
    let (track, _) = single_storm_track();
    let obs = &track.observations()[1];
    let grids = full_grid_set();
    let bathy = surface("bathymetry", -4000.0);

    let profile = extract(obs, &track, &grids, Some(&bathy), &ExtractConfig::new()).unwrap();

    // Constant-per-level fields average back to the level constant.
    assert_relative_eq!(
        profile.get("temperature_850").unwrap(),
        300.0 * 0.85_f64.powf(0.19),
        epsilon = 1e-9
    );
    assert_relative_eq!(profile.get("u_850").unwrap(), 8.5, epsilon = 1e-9);
    assert_relative_eq!(profile.get("v_250").unwrap(), -2.0, epsilon = 1e-9);
    // Shear: u250 - u850 = -6.0, v difference 0.
    assert_relative_eq!(profile.get("wind_shear").unwrap(), 6.0, epsilon = 1e-9);
    assert_relative_eq!(
        profile.get("relative_humidity_600").unwrap(),
        55.0,
        epsilon = 1e-9
    );
    assert_relative_eq!(
        profile.get("surface_pressure").unwrap(),
        101_325.0,
        epsilon = 1e-6
    );

    // Ocean SST preferred over the atmospheric estimate (302 K).
    assert_eq!(profile.sst_source(), SstSource::OceanReanalysis);
    assert_relative_eq!(profile.get("sst").unwrap(), 301.15, epsilon = 1e-9);

    // The full triplet at all 29 levels.
    assert_eq!(profile.levels().len(), 29);
    assert!(
        profile
            .levels()
            .pressure_hpa()
            .windows(2)
            .all(|w| w[0] > w[1])
    );

    // Optional diagnostics all present for this complete environment.
    assert!(profile.get("mixed_layer_depth").unwrap() > 40.0);
    assert!(profile.get("thermal_stratification").unwrap() > 0.0);
    assert!(profile.get("translation_speed").unwrap() > 0.0);
    assert_relative_eq!(profile.get("bathymetry").unwrap(), -4000.0);
    assert_eq!(profile.is_land(), Some(false));
}

#[test]
fn missing_ocean_falls_back_to_atmospheric_sst() {
    let (track, _) = single_storm_track();
    let obs = &track.observations()[1];
    let grids = MonthlyGridSet::new(
        2005,
        8,
        Some(pressure_grids(true)),
        Some(SingleLevelGrids::new(
            Some(surface("surface_pressure", 101_325.0)),
            Some(surface("sea_surface_temperature", 302.0)),
        )),
        None,
    );

    let profile = extract(obs, &track, &grids, None, &ExtractConfig::new()).unwrap();
    assert_eq!(profile.sst_source(), SstSource::AtmosphericEstimate);
    assert_relative_eq!(profile.get("sst").unwrap(), 302.0, epsilon = 1e-9);
    assert!(profile.get("mixed_layer_depth").is_none());
}

#[test]
fn missing_humidity_fails_the_observation() {
    let (track, _) = single_storm_track();
    let obs = &track.observations()[1];
    let grids = MonthlyGridSet::new(
        2005,
        8,
        Some(pressure_grids(false)),
        Some(SingleLevelGrids::new(
            Some(surface("surface_pressure", 101_325.0)),
            Some(surface("sea_surface_temperature", 302.0)),
        )),
        Some(ocean_grids()),
    );

    let err = extract(obs, &track, &grids, None, &ExtractConfig::new()).unwrap_err();
    match err {
        ExtractError::IncompleteProfile { missing } => {
            assert!(missing.contains(&"humidity_profile".to_string()));
            assert!(!missing.contains(&"sst".to_string()));
        }
        other => panic!("expected IncompleteProfile, got {other}"),
    }
}

#[test]
fn no_atmosphere_fails_with_both_profiles_missing() {
    let (track, _) = single_storm_track();
    let obs = &track.observations()[1];
    let grids = MonthlyGridSet::new(2005, 8, None, None, Some(ocean_grids()));

    let err = extract(obs, &track, &grids, None, &ExtractConfig::new()).unwrap_err();
    match err {
        ExtractError::IncompleteProfile { missing } => {
            assert!(missing.contains(&"temperature_profile".to_string()));
            assert!(missing.contains(&"humidity_profile".to_string()));
            assert!(missing.contains(&"surface_pressure".to_string()));
        }
        other => panic!("expected IncompleteProfile, got {other}"),
    }
}

#[test]
fn query_longitude_convention_matches_for_sst() {
    // The same physical point expressed as -50 and as 310 on a [0, 360)
    // grid yields identical averaged SST.
    let (track, _) = single_storm_track();
    let grids = full_grid_set();
    let config = ExtractConfig::new();

    let obs_east = fix_at(12, 15.0, 310.0);
    let obs_west = fix_at(12, 15.0, -50.0);

    let east = extract(&obs_east, &track, &grids, None, &config).unwrap();
    let west = extract(&obs_west, &track, &grids, None, &config).unwrap();
    assert_relative_eq!(
        east.get("sst").unwrap(),
        west.get("sst").unwrap(),
        epsilon = 1e-12
    );
}

#[test]
fn first_fix_has_no_translation_speed() {
    let (track, _) = single_storm_track();
    let obs = &track.observations()[0];
    let grids = full_grid_set();

    let profile = extract(obs, &track, &grids, None, &ExtractConfig::new()).unwrap();
    assert!(profile.get("translation_speed").is_none());
}
