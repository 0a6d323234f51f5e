//! End-to-end pipeline tests driving the compiled binary against a
//! temporary data tree.

use std::path::Path;
use std::process::Command;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int64Array, RecordBatch, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use parquet::arrow::ArrowWriter;
use tempfile::tempdir;

/// The 29 pressure levels the extraction pipeline samples for PI.
const PLEVS: [f64; 29] = [
    1000.0, 975.0, 950.0, 925.0, 900.0, 875.0, 850.0, 825.0, 800.0, 775.0, 750.0, 700.0, 650.0,
    600.0, 550.0, 500.0, 450.0, 400.0, 350.0, 300.0, 250.0, 225.0, 200.0, 175.0, 150.0, 125.0,
    100.0, 70.0, 50.0,
];

fn lats() -> Vec<f64> {
    (0..13).map(|i| 8.0 + i as f64).collect()
}

fn lons() -> Vec<f64> {
    (0..13).map(|j| 300.0 + j as f64).collect()
}

/// Writes grid files for one month: a 29-level pressure file with an
/// idealized tropical sounding and a single-level file with surface
/// pressure and SST. No ocean file, so SST exercises the fallback source.
fn write_month_grids(root: &Path, year: i32, month: u8) {
    let lats = lats();
    let lons = lons();
    let plane = lats.len() * lons.len();

    let plev_dir = root.join("era5").join("pressure_levels");
    std::fs::create_dir_all(&plev_dir).unwrap();
    let plev_path = plev_dir.join(format!("era5_monthly_plev_{year}_{month:02}.nc"));
    {
        let mut file = netcdf::create(&plev_path).unwrap();
        file.add_dimension("pressure_level", PLEVS.len()).unwrap();
        file.add_dimension("latitude", lats.len()).unwrap();
        file.add_dimension("longitude", lons.len()).unwrap();

        put_axis(&mut file, "pressure_level", &PLEVS);
        put_axis(&mut file, "latitude", &lats);
        put_axis(&mut file, "longitude", &lons);

        // Idealized tropical sounding, constant per level.
        let temperature: Vec<f64> = PLEVS
            .iter()
            .flat_map(|&p| {
                std::iter::repeat_n(300.0 * (p / 1000.0_f64).powf(0.19), plane)
            })
            .collect();
        let humidity: Vec<f64> = PLEVS
            .iter()
            .flat_map(|&p| std::iter::repeat_n(0.017 * (p / 1000.0_f64).powi(3), plane))
            .collect();
        let u: Vec<f64> = PLEVS
            .iter()
            .flat_map(|&p| std::iter::repeat_n(p / 100.0, plane))
            .collect();
        let v = vec![-2.0; PLEVS.len() * plane];

        put_var3(&mut file, "t", &temperature);
        put_var3(&mut file, "q", &humidity);
        put_var3(&mut file, "u", &u);
        put_var3(&mut file, "v", &v);
    }

    let sl_dir = root.join("era5").join("single_level");
    std::fs::create_dir_all(&sl_dir).unwrap();
    let sl_path = sl_dir.join(format!("era5_monthly_sl_{year}_{month:02}.nc"));
    {
        let mut file = netcdf::create(&sl_path).unwrap();
        file.add_dimension("latitude", lats.len()).unwrap();
        file.add_dimension("longitude", lons.len()).unwrap();
        put_axis(&mut file, "latitude", &lats);
        put_axis(&mut file, "longitude", &lons);

        put_var2(&mut file, "sp", &vec![101_200.0; plane]);
        put_var2(&mut file, "sst", &vec![302.0; plane]);
    }
}

fn put_axis(file: &mut netcdf::FileMut, name: &str, values: &[f64]) {
    let mut var = file.add_variable::<f64>(name, &[name]).unwrap();
    var.put_values(values, ..).unwrap();
}

fn put_var3(file: &mut netcdf::FileMut, name: &str, values: &[f64]) {
    let mut var = file
        .add_variable::<f64>(name, &["pressure_level", "latitude", "longitude"])
        .unwrap();
    var.put_values(values, ..).unwrap();
}

fn put_var2(file: &mut netcdf::FileMut, name: &str, values: &[f64]) {
    let mut var = file
        .add_variable::<f64>(name, &["latitude", "longitude"])
        .unwrap();
    var.put_values(values, ..).unwrap();
}

/// Writes an observation table: one June 2001 fix (no grids) and two July
/// 2001 fixes of the same storm (grids present).
fn write_tracks(path: &Path) {
    let schema = Schema::new(vec![
        Field::new("storm_id", DataType::Utf8, false),
        Field::new("time", DataType::Int64, false),
        Field::new("lat", DataType::Float64, false),
        Field::new("lon", DataType::Float64, false),
        Field::new("basin", DataType::Utf8, true),
        Field::new("max_wind_ms", DataType::Float64, true),
    ]);

    let june = 991_742_400i64; // 2001-06-05 12:00:00 UTC
    let july = 994_334_400i64; // 2001-07-05 12:00:00 UTC
    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(vec!["J1", "S1", "S1"])),
        Arc::new(Int64Array::from(vec![june, july, july + 21_600])),
        Arc::new(Float64Array::from(vec![14.0, 14.0, 14.5])),
        Arc::new(Float64Array::from(vec![-54.0, -54.0, -54.5])),
        Arc::new(StringArray::from(vec!["NA", "NA", "NA"])),
        Arc::new(Float64Array::from(vec![25.0, 30.0, 35.0])),
    ];

    let batch = RecordBatch::try_new(Arc::new(schema.clone()), columns).unwrap();
    let file = std::fs::File::create(path).unwrap();
    let mut writer = ArrowWriter::try_new(file, Arc::new(schema), None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();
}

#[test]
fn missing_month_fails_its_observations_without_aborting() {
    let dir = tempdir().unwrap();
    let grid_root = dir.path().join("monthly");
    std::fs::create_dir_all(&grid_root).unwrap();

    // Grids only for July 2001; June 2001 has no files at all.
    write_month_grids(&grid_root, 2001, 7);

    let catalog = r#"{
        "era5_pressure_levels": [
            {"file": "era5_monthly_plev_2001_07.nc", "year": 2001, "month": 7, "size": 1}
        ],
        "era5_single_level": [
            {"file": "era5_monthly_sl_2001_07.nc", "year": 2001, "month": 7, "size": 1}
        ],
        "oras5": []
    }"#;
    std::fs::write(grid_root.join("monthly_data_catalog.json"), catalog).unwrap();

    let tracks_path = dir.path().join("tracks.parquet");
    write_tracks(&tracks_path);

    let output = dir.path().join("features.parquet");
    let config = format!(
        "[data]\ngrid_root = {:?}\ntracks = {:?}\noutput = {:?}\n",
        grid_root, tracks_path, output
    );
    let config_path = dir.path().join("taranis.toml");
    std::fs::write(&config_path, config).unwrap();

    let status = Command::new(env!("CARGO_BIN_EXE_taranis"))
        .args(["extract", "--config"])
        .arg(&config_path)
        .status()
        .expect("binary should run");
    assert!(status.success(), "extract must not abort on a missing month");

    // Two July observations extracted; the June one failed recoverably.
    let pi_values = taranis_tracks::read_storm_values(&output, "pi").unwrap();
    assert_eq!(pi_values.len(), 2);
    for (storm_id, pi) in &pi_values {
        assert_eq!(storm_id, "S1");
        assert!(pi.is_finite() && *pi > 0.0, "expected physical PI, got {pi}");
    }

    // SST came from the fallback source: no ocean files exist.
    let sst = taranis_tracks::read_storm_values(&output, "sst").unwrap();
    assert!((sst[0].1 - 302.0).abs() < 1e-9);

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(output.with_extension("report.json")).unwrap())
            .unwrap();
    assert_eq!(report["total"], 3);
    assert_eq!(report["successful"], 2);
    assert_eq!(report["failed"], 1);
    let sample = report["failure_sample"].as_array().unwrap();
    assert_eq!(sample.len(), 1);
    assert!(
        sample[0]["reason"]
            .as_str()
            .unwrap()
            .contains("no grid data available for 2001-06")
    );
}

#[test]
fn correct_subcommand_round_trips_identity() {
    let dir = tempdir().unwrap();

    // Observed LMI per storm comes from the track table.
    let tracks_path = dir.path().join("tracks.parquet");
    {
        let schema = Schema::new(vec![
            Field::new("storm_id", DataType::Utf8, false),
            Field::new("time", DataType::Int64, false),
            Field::new("lat", DataType::Float64, false),
            Field::new("lon", DataType::Float64, false),
            Field::new("max_wind_ms", DataType::Float64, true),
        ]);
        let n = 40;
        let ids: Vec<String> = (0..n).map(|i| format!("S{i:03}")).collect();
        let winds: Vec<f64> = (0..n).map(|i| 30.0 + i as f64 * 0.5).collect();
        let columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(
                ids.iter().map(String::as_str).collect::<Vec<_>>(),
            )),
            Arc::new(Int64Array::from(vec![994_334_400i64; n])),
            Arc::new(Float64Array::from(vec![15.0; n])),
            Arc::new(Float64Array::from(vec![-50.0; n])),
            Arc::new(Float64Array::from(winds.clone())),
        ];
        let batch = RecordBatch::try_new(Arc::new(schema.clone()), columns).unwrap();
        let file = std::fs::File::create(&tracks_path).unwrap();
        let mut writer = ArrowWriter::try_new(file, Arc::new(schema), None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();
    }

    // Simulated LMI identical to observed: correction is the identity.
    let simulated_path = dir.path().join("simulated.parquet");
    {
        let schema = Schema::new(vec![
            Field::new("storm_id", DataType::Utf8, false),
            Field::new("simulated_lmi", DataType::Float64, false),
        ]);
        let n = 40;
        let ids: Vec<String> = (0..n).map(|i| format!("S{i:03}")).collect();
        let winds: Vec<f64> = (0..n).map(|i| 30.0 + i as f64 * 0.5).collect();
        let columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(
                ids.iter().map(String::as_str).collect::<Vec<_>>(),
            )),
            Arc::new(Float64Array::from(winds)),
        ];
        let batch = RecordBatch::try_new(Arc::new(schema.clone()), columns).unwrap();
        let file = std::fs::File::create(&simulated_path).unwrap();
        let mut writer = ArrowWriter::try_new(file, Arc::new(schema), None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();
    }

    let config_path = dir.path().join("taranis.toml");
    std::fs::write(&config_path, "").unwrap();

    let output = dir.path().join("corrected.parquet");
    let status = Command::new(env!("CARGO_BIN_EXE_taranis"))
        .args(["correct", "--config"])
        .arg(&config_path)
        .arg("--tracks")
        .arg(&tracks_path)
        .arg("--simulated")
        .arg(&simulated_path)
        .arg("--output")
        .arg(&output)
        .status()
        .expect("binary should run");
    assert!(status.success());

    let corrected =
        taranis_tracks::read_storm_values(&output, "simulated_lmi_corrected").unwrap();
    let raw = taranis_tracks::read_storm_values(&output, "simulated_lmi_raw").unwrap();
    assert_eq!(corrected.len(), 40);
    for ((_, corr), (_, sim)) in corrected.iter().zip(&raw) {
        assert!((corr - sim).abs() < 0.35, "identity correction drifted: {sim} -> {corr}");
    }

    let provenance: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(output.with_extension("provenance.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(provenance["method"], "quantile_matching");
    assert_eq!(provenance["mappings"]["all"], "overall");
}
