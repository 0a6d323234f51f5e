//! Per-observation feature table output and correction-table IO.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, AsArray, BooleanArray, Float64Array, Int64Array, RecordBatch, StringArray,
};
use arrow::datatypes::{DataType, Field, Float64Type, Schema};
use chrono::NaiveDateTime;
use parquet::arrow::ArrowWriter;
use parquet::file::properties::WriterProperties;

use crate::error::TrackError;
use crate::observation::Observation;
use crate::table::read_batches;

/// Fixed, ordered set of scalar feature columns in the output table.
///
/// Optional diagnostics that could not be produced for an observation are
/// written as nulls, never fabricated values.
pub const FEATURE_COLUMNS: [&str; 25] = [
    "temperature_850",
    "temperature_600",
    "temperature_250",
    "temperature_200",
    "u_850",
    "v_850",
    "u_250",
    "v_250",
    "u_200",
    "v_200",
    "wind_speed_850",
    "wind_speed_250",
    "wind_speed_200",
    "wind_shear",
    "specific_humidity_850",
    "specific_humidity_600",
    "specific_humidity_200",
    "relative_humidity_600",
    "sst",
    "surface_pressure",
    "pi",
    "mixed_layer_depth",
    "thermal_stratification",
    "translation_speed",
    "bathymetry",
];

/// One output row: storm metadata plus named feature values.
#[derive(Debug, Clone)]
pub struct FeatureRow {
    /// Storm identifier.
    pub storm_id: String,
    /// Basin code, when known.
    pub basin: Option<String>,
    /// Observation time (UTC).
    pub time: NaiveDateTime,
    /// Latitude in degrees north.
    pub lat: f64,
    /// Longitude normalized to [0, 360).
    pub lon: f64,
    /// Observed maximum wind (m/s), when known.
    pub max_wind_ms: Option<f64>,
    /// Which source produced the SST value, when any did.
    pub sst_source: Option<String>,
    /// Land flag from bathymetry, when bathymetry was available.
    pub is_land: Option<bool>,
    /// Feature name -> value; absent names are written as null.
    pub values: BTreeMap<String, f64>,
}

impl FeatureRow {
    /// Starts a row from an observation's metadata, with no features yet.
    pub fn from_observation(obs: &Observation) -> Self {
        Self {
            storm_id: obs.storm_id.clone(),
            basin: obs.basin.clone(),
            time: obs.time,
            lat: obs.lat,
            lon: obs.lon_0_360(),
            max_wind_ms: obs.max_wind_ms,
            sst_source: None,
            is_land: None,
            values: BTreeMap::new(),
        }
    }

    /// Sets a named feature value. Non-finite values are kept as written;
    /// absence (no call) is the representation of "not produced".
    pub fn set(&mut self, name: &str, value: f64) {
        self.values.insert(name.to_string(), value);
    }

    /// The feature value by name, if produced.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }
}

/// Builds the Arrow schema of the feature table.
fn feature_schema() -> Schema {
    let mut fields = vec![
        Field::new("storm_id", DataType::Utf8, false),
        Field::new("basin", DataType::Utf8, true),
        Field::new("time", DataType::Int64, false),
        Field::new("lat", DataType::Float64, false),
        Field::new("lon", DataType::Float64, false),
        Field::new("max_wind_ms", DataType::Float64, true),
    ];
    for name in FEATURE_COLUMNS {
        fields.push(Field::new(name, DataType::Float64, true));
    }
    fields.push(Field::new("sst_source", DataType::Utf8, true));
    fields.push(Field::new("is_land", DataType::Boolean, true));
    Schema::new(fields)
}

/// Writes the per-observation feature table to a Parquet file.
///
/// # Errors
///
/// Returns [`TrackError::Parquet`] if file creation or writing fails.
pub fn write_features(path: &Path, rows: &[FeatureRow]) -> Result<(), TrackError> {
    let schema = feature_schema();

    let mut columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(
            rows.iter().map(|r| r.storm_id.as_str()).collect::<Vec<_>>(),
        )),
        Arc::new(
            rows.iter()
                .map(|r| r.basin.clone())
                .collect::<StringArray>(),
        ),
        Arc::new(Int64Array::from(
            rows.iter()
                .map(|r| r.time.and_utc().timestamp())
                .collect::<Vec<_>>(),
        )),
        Arc::new(Float64Array::from(
            rows.iter().map(|r| r.lat).collect::<Vec<_>>(),
        )),
        Arc::new(Float64Array::from(
            rows.iter().map(|r| r.lon).collect::<Vec<_>>(),
        )),
        Arc::new(Float64Array::from(
            rows.iter().map(|r| r.max_wind_ms).collect::<Vec<_>>(),
        )),
    ];
    for name in FEATURE_COLUMNS {
        columns.push(Arc::new(Float64Array::from(
            rows.iter().map(|r| r.get(name)).collect::<Vec<_>>(),
        )));
    }
    columns.push(Arc::new(
        rows.iter()
            .map(|r| r.sst_source.clone())
            .collect::<StringArray>(),
    ));
    columns.push(Arc::new(BooleanArray::from(
        rows.iter().map(|r| r.is_land).collect::<Vec<_>>(),
    )));

    let batch =
        RecordBatch::try_new(Arc::new(schema.clone()), columns).map_err(|e| TrackError::Parquet {
            reason: e.to_string(),
        })?;
    write_batch(path, &batch, &schema)
}

/// Writes the correction comparison table: one row per storm with observed,
/// raw simulated, and corrected LMI.
///
/// # Errors
///
/// Returns [`TrackError::Validation`] on length mismatch and
/// [`TrackError::Parquet`] on write failure.
pub fn write_corrected(
    path: &Path,
    storm_ids: &[String],
    observed_lmi: &[f64],
    simulated_lmi: &[f64],
    corrected_lmi: &[f64],
) -> Result<(), TrackError> {
    if storm_ids.len() != observed_lmi.len()
        || storm_ids.len() != simulated_lmi.len()
        || storm_ids.len() != corrected_lmi.len()
    {
        return Err(TrackError::Validation {
            count: 1,
            details: format!(
                "column length mismatch: {} storms, {} observed, {} simulated, {} corrected",
                storm_ids.len(),
                observed_lmi.len(),
                simulated_lmi.len(),
                corrected_lmi.len()
            ),
        });
    }

    let schema = Schema::new(vec![
        Field::new("storm_id", DataType::Utf8, false),
        Field::new("observed_lmi", DataType::Float64, false),
        Field::new("simulated_lmi_raw", DataType::Float64, false),
        Field::new("simulated_lmi_corrected", DataType::Float64, false),
    ]);

    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(
            storm_ids.iter().map(String::as_str).collect::<Vec<_>>(),
        )),
        Arc::new(Float64Array::from(observed_lmi.to_vec())),
        Arc::new(Float64Array::from(simulated_lmi.to_vec())),
        Arc::new(Float64Array::from(corrected_lmi.to_vec())),
    ];

    let batch =
        RecordBatch::try_new(Arc::new(schema.clone()), columns).map_err(|e| TrackError::Parquet {
            reason: e.to_string(),
        })?;
    write_batch(path, &batch, &schema)
}

/// Reads per-storm values from a Parquet file: `storm_id` plus the named
/// Float64 column.
///
/// # Errors
///
/// Returns [`TrackError::MissingColumn`] if either column is absent.
pub fn read_storm_values(path: &Path, column: &str) -> Result<Vec<(String, f64)>, TrackError> {
    let batches = read_batches(path)?;
    let mut out = Vec::new();

    for batch in &batches {
        let schema = batch.schema();
        let id_idx = schema
            .index_of("storm_id")
            .map_err(|_| TrackError::MissingColumn {
                name: "storm_id".to_string(),
                path: path.to_path_buf(),
            })?;
        let val_idx = schema
            .index_of(column)
            .map_err(|_| TrackError::MissingColumn {
                name: column.to_string(),
                path: path.to_path_buf(),
            })?;

        let ids = batch.column(id_idx).as_string::<i32>();
        let vals = batch.column(val_idx).as_primitive::<Float64Type>();
        for row in 0..batch.num_rows() {
            let v = if vals.is_null(row) {
                f64::NAN
            } else {
                vals.value(row)
            };
            out.push((ids.value(row).to_string(), v));
        }
    }

    Ok(out)
}

fn write_batch(path: &Path, batch: &RecordBatch, schema: &Schema) -> Result<(), TrackError> {
    let file = std::fs::File::create(path).map_err(|e| TrackError::Parquet {
        reason: e.to_string(),
    })?;
    let props = WriterProperties::builder().build();
    let mut writer = ArrowWriter::try_new(file, Arc::new(schema.clone()), Some(props))?;
    writer.write(batch)?;
    writer.close()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_row() -> FeatureRow {
        let obs = Observation {
            storm_id: "2005236N23285".to_string(),
            basin: Some("NA".to_string()),
            time: NaiveDate::from_ymd_opt(2005, 8, 27)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
            lat: 25.0,
            lon: -85.0,
            max_wind_ms: Some(60.0),
            enso_phase: None,
        };
        let mut row = FeatureRow::from_observation(&obs);
        row.set("sst", 303.1);
        row.set("pi", 78.0);
        row.sst_source = Some("ocean_reanalysis".to_string());
        row.is_land = Some(false);
        row
    }

    #[test]
    fn row_longitude_is_normalized() {
        let row = sample_row();
        assert_eq!(row.lon, 275.0);
    }

    #[test]
    fn schema_has_fixed_column_set() {
        let schema = feature_schema();
        // 6 metadata + 25 features + sst_source + is_land
        assert_eq!(schema.fields().len(), 33);
        assert_eq!(schema.field(0).name(), "storm_id");
        assert!(schema.field_with_name("pi").is_ok());
        assert!(schema.field_with_name("wind_shear").is_ok());
        assert!(schema.field_with_name("is_land").is_ok());
    }

    #[test]
    fn features_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("features.parquet");
        write_features(&path, &[sample_row()]).unwrap();

        let read = read_storm_values(&path, "pi").unwrap();
        assert_eq!(read.len(), 1);
        assert_eq!(read[0].0, "2005236N23285");
        assert!((read[0].1 - 78.0).abs() < 1e-12);

        // A feature that was never set reads back as null -> NaN.
        let shear = read_storm_values(&path, "wind_shear").unwrap();
        assert!(shear[0].1.is_nan());
    }

    #[test]
    fn corrected_table_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corrected.parquet");
        let ids = vec!["A".to_string(), "B".to_string()];
        write_corrected(&path, &ids, &[50.0, 60.0], &[40.0, 55.0], &[49.0, 61.0]).unwrap();

        let corrected = read_storm_values(&path, "simulated_lmi_corrected").unwrap();
        assert_eq!(corrected.len(), 2);
        assert_eq!(corrected[0].0, "A");
        assert!((corrected[1].1 - 61.0).abs() < 1e-12);
    }

    #[test]
    fn corrected_length_mismatch_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corrected.parquet");
        let err = write_corrected(&path, &["A".to_string()], &[1.0, 2.0], &[1.0], &[1.0])
            .unwrap_err();
        assert!(matches!(err, TrackError::Validation { .. }));
    }
}
