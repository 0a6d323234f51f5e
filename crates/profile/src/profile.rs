//! The assembled environmental profile for one observation.

use std::collections::BTreeMap;

use crate::error::ExtractError;

/// Which source produced the SST value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SstSource {
    /// Surface level of the ocean-reanalysis temperature profile
    /// (preferred: an ocean product, not a model boundary estimate).
    OceanReanalysis,
    /// The atmospheric model's SST estimate (fallback).
    AtmosphericEstimate,
}

impl SstSource {
    /// Stable string form used in the feature table.
    pub fn as_str(&self) -> &'static str {
        match self {
            SstSource::OceanReanalysis => "ocean_reanalysis",
            SstSource::AtmosphericEstimate => "atmospheric_estimate",
        }
    }
}

impl std::fmt::Display for SstSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The N-level (pressure, temperature, humidity) triplet fed to the PI
/// kernel. Constructed only when complete: the three arrays must have the
/// same non-zero length and be entirely finite, so a partial triplet is
/// unrepresentable.
#[derive(Debug, Clone)]
pub struct LevelProfile {
    pressure_hpa: Vec<f64>,
    temperature_k: Vec<f64>,
    specific_humidity: Vec<f64>,
}

impl LevelProfile {
    /// Builds a triplet, enforcing the all-or-none invariant.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::ProfileShape`] if the arrays are empty,
    /// differ in length, or contain non-finite values.
    pub fn new(
        pressure_hpa: Vec<f64>,
        temperature_k: Vec<f64>,
        specific_humidity: Vec<f64>,
    ) -> Result<Self, ExtractError> {
        let n = pressure_hpa.len();
        if n == 0 {
            return Err(ExtractError::ProfileShape {
                reason: "empty level profile".to_string(),
            });
        }
        if temperature_k.len() != n || specific_humidity.len() != n {
            return Err(ExtractError::ProfileShape {
                reason: format!(
                    "pressure has {n} levels, temperature has {}, humidity has {}",
                    temperature_k.len(),
                    specific_humidity.len()
                ),
            });
        }
        for j in 0..n {
            if !pressure_hpa[j].is_finite()
                || !temperature_k[j].is_finite()
                || !specific_humidity[j].is_finite()
            {
                return Err(ExtractError::ProfileShape {
                    reason: format!("non-finite value at level {j}"),
                });
            }
        }
        Ok(Self {
            pressure_hpa,
            temperature_k,
            specific_humidity,
        })
    }

    /// Number of levels.
    pub fn len(&self) -> usize {
        self.pressure_hpa.len()
    }

    /// Always false: an empty triplet cannot be constructed.
    pub fn is_empty(&self) -> bool {
        self.pressure_hpa.is_empty()
    }

    /// Pressure per level (hPa).
    pub fn pressure_hpa(&self) -> &[f64] {
        &self.pressure_hpa
    }

    /// Temperature per level (K).
    pub fn temperature_k(&self) -> &[f64] {
        &self.temperature_k
    }

    /// Specific humidity per level (kg/kg).
    pub fn specific_humidity(&self) -> &[f64] {
        &self.specific_humidity
    }
}

/// Named scalar environment variables for one observation, plus the
/// transient level triplet used only as PI-kernel input.
#[derive(Debug, Clone)]
pub struct EnvironmentalProfile {
    values: BTreeMap<String, f64>,
    levels: LevelProfile,
    sst_source: SstSource,
    is_land: Option<bool>,
}

impl EnvironmentalProfile {
    pub(crate) fn new(
        values: BTreeMap<String, f64>,
        levels: LevelProfile,
        sst_source: SstSource,
        is_land: Option<bool>,
    ) -> Self {
        Self {
            values,
            levels,
            sst_source,
            is_land,
        }
    }

    /// A named scalar value, if produced.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// All named scalar values.
    pub fn values(&self) -> &BTreeMap<String, f64> {
        &self.values
    }

    /// The complete N-level PI input triplet.
    pub fn levels(&self) -> &LevelProfile {
        &self.levels
    }

    /// Which source produced the SST.
    pub fn sst_source(&self) -> SstSource {
        self.sst_source
    }

    /// Land flag from bathymetry, when bathymetry was available.
    pub fn is_land(&self) -> Option<bool> {
        self.is_land
    }
}
