//! A single tropical-cyclone fix.

use chrono::{Datelike, NaiveDateTime};

/// One TC observation: a storm's position and intensity at one time.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// Storm identifier (IBTrACS SID or synthetic track id).
    pub storm_id: String,
    /// Basin code (e.g. "NA", "WP"), when known.
    pub basin: Option<String>,
    /// Observation time (UTC).
    pub time: NaiveDateTime,
    /// Latitude in degrees north.
    pub lat: f64,
    /// Longitude as recorded; may use either sign convention.
    pub lon: f64,
    /// Observed maximum sustained wind (m/s), when known.
    pub max_wind_ms: Option<f64>,
    /// ENSO phase label at observation time, when known.
    pub enso_phase: Option<String>,
}

impl Observation {
    /// Longitude normalized to [0, 360), the native convention of the
    /// reanalysis grids. Applied before any grid lookup.
    pub fn lon_0_360(&self) -> f64 {
        let lon = self.lon.rem_euclid(360.0);
        if lon == 360.0 { 0.0 } else { lon }
    }

    /// (year, month) grouping key for monthly grid amortization.
    pub fn year_month(&self) -> (i32, u8) {
        (self.time.year(), self.time.month() as u8)
    }
}
