//! The observation table: Parquet reading, storm grouping, LMI.

use std::collections::BTreeMap;
use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray, RecordBatch};
use arrow::datatypes::{
    DataType, Float64Type, Int64Type, TimeUnit, TimestampMicrosecondType,
    TimestampMillisecondType, TimestampNanosecondType, TimestampSecondType,
};
use chrono::{DateTime, NaiveDateTime};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use tracing::debug;

use crate::error::TrackError;
use crate::motion::segment_speed;
use crate::observation::Observation;

/// Required observation-table columns.
const REQUIRED_COLUMNS: [&str; 4] = ["storm_id", "time", "lat", "lon"];

/// Per-storm lifetime summary used by the intensity corrector.
#[derive(Debug, Clone)]
pub struct StormSummary {
    /// Storm identifier.
    pub storm_id: String,
    /// Basin code from the storm's first fix, when known.
    pub basin: Option<String>,
    /// ENSO phase from the storm's first fix, when known.
    pub enso_phase: Option<String>,
    /// Lifetime maximum intensity (m/s); NaN when no wind data exists.
    pub lmi_ms: f64,
}

/// An in-memory TC observation table.
///
/// Observations are indexed by position; storms are tracked by id with their
/// fixes kept in chronological order.
#[derive(Debug, Clone)]
pub struct TrackTable {
    observations: Vec<Observation>,
    /// Storm id -> observation indices, chronological.
    by_storm: BTreeMap<String, Vec<usize>>,
    /// Storm ids in first-appearance order.
    storm_order: Vec<String>,
}

impl TrackTable {
    /// Builds a table from observations, grouping fixes by storm.
    pub fn new(observations: Vec<Observation>) -> Self {
        let mut by_storm: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        let mut storm_order = Vec::new();
        for (idx, obs) in observations.iter().enumerate() {
            let entry = by_storm.entry(obs.storm_id.clone()).or_insert_with(|| {
                storm_order.push(obs.storm_id.clone());
                Vec::new()
            });
            entry.push(idx);
        }
        for indices in by_storm.values_mut() {
            indices.sort_by_key(|&i| observations[i].time);
        }
        Self {
            observations,
            by_storm,
            storm_order,
        }
    }

    /// Reads an observation table from a Parquet file.
    ///
    /// Requires `storm_id`, `time`, `lat`, `lon` columns; `basin`,
    /// `max_wind_ms`, and `enso_phase` are optional. `time` may be stored as
    /// epoch seconds (Int64) or any Arrow timestamp unit.
    ///
    /// # Errors
    ///
    /// Returns [`TrackError::FileNotFound`], [`TrackError::MissingColumn`],
    /// or [`TrackError::Parquet`] on the corresponding failures.
    pub fn from_parquet(path: &Path) -> Result<Self, TrackError> {
        let batches = read_batches(path)?;
        let mut observations = Vec::new();

        for batch in &batches {
            let schema = batch.schema();
            for &name in &REQUIRED_COLUMNS {
                required_column(batch, name, path)?;
            }

            let storm_id_col = required_column(batch, "storm_id", path)?;
            let times = read_time_values(required_column(batch, "time", path)?)?;
            let lat_col = required_column(batch, "lat", path)?.as_primitive::<Float64Type>();
            let lon_col = required_column(batch, "lon", path)?.as_primitive::<Float64Type>();

            let basin_col = schema.index_of("basin").ok().map(|i| batch.column(i));
            let wind_col = schema
                .index_of("max_wind_ms")
                .ok()
                .map(|i| batch.column(i).as_primitive::<Float64Type>());
            let enso_col = schema.index_of("enso_phase").ok().map(|i| batch.column(i));

            for row in 0..batch.num_rows() {
                let storm_id =
                    string_value(storm_id_col, row).ok_or_else(|| TrackError::Validation {
                        count: 1,
                        details: format!("null storm_id at row {row}"),
                    })?;
                observations.push(Observation {
                    storm_id,
                    basin: basin_col.and_then(|c| string_value(c, row)),
                    time: times[row],
                    lat: lat_col.value(row),
                    lon: lon_col.value(row),
                    max_wind_ms: wind_col
                        .as_ref()
                        .and_then(|c| (!c.is_null(row)).then(|| c.value(row))),
                    enso_phase: enso_col.and_then(|c| string_value(c, row)),
                });
            }
        }

        debug!(
            path = %path.display(),
            n_observations = observations.len(),
            "observation table loaded"
        );
        Ok(Self::new(observations))
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Whether the table has no observations.
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// All observations in table order.
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Number of distinct storms.
    pub fn n_storms(&self) -> usize {
        self.storm_order.len()
    }

    /// Observation indices grouped by (year, month), months in ascending
    /// order. Iterating months in this order is what lets one grid load
    /// serve every observation of that month.
    pub fn monthly_groups(&self) -> BTreeMap<(i32, u8), Vec<usize>> {
        let mut groups: BTreeMap<(i32, u8), Vec<usize>> = BTreeMap::new();
        for (idx, obs) in self.observations.iter().enumerate() {
            groups.entry(obs.year_month()).or_default().push(idx);
        }
        groups
    }

    /// Chronological observation indices of one storm (empty if unknown).
    pub fn storm_indices(&self, storm_id: &str) -> &[usize] {
        self.by_storm.get(storm_id).map_or(&[], Vec::as_slice)
    }

    /// Translation speed (m/s) of a storm at an exact fix time.
    ///
    /// Requires at least two trajectory points and an exact timestamp match;
    /// the first fix of a storm has no translation speed.
    pub fn translation_speed(&self, storm_id: &str, at: NaiveDateTime) -> Option<f64> {
        let indices = self.storm_indices(storm_id);
        if indices.len() < 2 {
            return None;
        }
        let pos = indices
            .iter()
            .position(|&i| self.observations[i].time == at)?;
        if pos == 0 {
            return None;
        }
        segment_speed(
            &self.observations[indices[pos - 1]],
            &self.observations[indices[pos]],
        )
    }

    /// Per-storm lifetime summaries in first-appearance order.
    ///
    /// LMI is the maximum finite `max_wind_ms` over the storm's fixes, NaN
    /// when the storm has no wind data at all.
    pub fn storm_summaries(&self) -> Vec<StormSummary> {
        self.storm_order
            .iter()
            .map(|storm_id| {
                let indices = &self.by_storm[storm_id];
                let first = &self.observations[indices[0]];
                let lmi = indices
                    .iter()
                    .filter_map(|&i| self.observations[i].max_wind_ms)
                    .filter(|v| v.is_finite())
                    .fold(f64::NAN, f64::max);
                StormSummary {
                    storm_id: storm_id.clone(),
                    basin: first.basin.clone(),
                    enso_phase: first.enso_phase.clone(),
                    lmi_ms: lmi,
                }
            })
            .collect()
    }
}

/// A column that must exist, by name.
fn required_column<'b>(
    batch: &'b RecordBatch,
    name: &str,
    path: &Path,
) -> Result<&'b ArrayRef, TrackError> {
    batch
        .schema()
        .index_of(name)
        .map(|i| batch.column(i))
        .map_err(|_| TrackError::MissingColumn {
            name: name.to_string(),
            path: path.to_path_buf(),
        })
}

/// Reads all record batches from a Parquet file.
pub(crate) fn read_batches(path: &Path) -> Result<Vec<RecordBatch>, TrackError> {
    if !path.exists() {
        return Err(TrackError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let file = std::fs::File::open(path).map_err(|e| TrackError::Parquet {
        reason: e.to_string(),
    })?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let reader = builder.build()?;

    reader
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| TrackError::Parquet {
            reason: e.to_string(),
        })
}

/// Reads a string cell, accepting Utf8 or LargeUtf8 columns.
fn string_value(col: &ArrayRef, row: usize) -> Option<String> {
    match col.data_type() {
        DataType::Utf8 => {
            let a = col.as_string::<i32>();
            (!a.is_null(row)).then(|| a.value(row).to_string())
        }
        DataType::LargeUtf8 => {
            let a = col.as_string::<i64>();
            (!a.is_null(row)).then(|| a.value(row).to_string())
        }
        _ => None,
    }
}

/// Converts a time column to naive UTC datetimes, accepting epoch-second
/// Int64 or any Arrow timestamp unit.
fn read_time_values(col: &ArrayRef) -> Result<Vec<NaiveDateTime>, TrackError> {
    let from_secs = |secs: i64, nanos: u32| -> Result<NaiveDateTime, TrackError> {
        DateTime::from_timestamp(secs, nanos)
            .map(|dt| dt.naive_utc())
            .ok_or_else(|| TrackError::InvalidTime {
                reason: format!("timestamp out of range: {secs}s + {nanos}ns"),
            })
    };

    match col.data_type() {
        DataType::Int64 => col
            .as_primitive::<Int64Type>()
            .values()
            .iter()
            .map(|&v| from_secs(v, 0))
            .collect(),
        DataType::Timestamp(TimeUnit::Second, _) => col
            .as_primitive::<TimestampSecondType>()
            .values()
            .iter()
            .map(|&v| from_secs(v, 0))
            .collect(),
        DataType::Timestamp(TimeUnit::Millisecond, _) => col
            .as_primitive::<TimestampMillisecondType>()
            .values()
            .iter()
            .map(|&v| from_secs(v.div_euclid(1_000), (v.rem_euclid(1_000) * 1_000_000) as u32))
            .collect(),
        DataType::Timestamp(TimeUnit::Microsecond, _) => col
            .as_primitive::<TimestampMicrosecondType>()
            .values()
            .iter()
            .map(|&v| from_secs(v.div_euclid(1_000_000), (v.rem_euclid(1_000_000) * 1_000) as u32))
            .collect(),
        DataType::Timestamp(TimeUnit::Nanosecond, _) => col
            .as_primitive::<TimestampNanosecondType>()
            .values()
            .iter()
            .map(|&v| {
                from_secs(
                    v.div_euclid(1_000_000_000),
                    v.rem_euclid(1_000_000_000) as u32,
                )
            })
            .collect(),
        other => Err(TrackError::InvalidTime {
            reason: format!("unsupported time column type: {other}"),
        }),
    }
}
