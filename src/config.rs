use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Top-level taranis configuration.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaranisConfig {
    /// Data locations.
    #[serde(default)]
    pub data: DataConfig,

    /// Extraction settings.
    #[serde(default)]
    pub extract: ExtractToml,

    /// Correction settings.
    #[serde(default)]
    pub correct: CorrectToml,
}

impl TaranisConfig {
    /// Loads and parses the TOML configuration at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("failed to parse config: {}", path.display()))
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct DataConfig {
    /// Root of the monthly grid tree (era5/, oras5/).
    pub grid_root: Option<PathBuf>,
    /// Monthly data catalogue JSON; defaults to
    /// `<grid_root>/monthly_data_catalog.json`.
    pub catalog: Option<PathBuf>,
    /// Observation-table Parquet file.
    pub tracks: Option<PathBuf>,
    /// Static bathymetry NetCDF file.
    pub bathymetry: Option<PathBuf>,
    /// Feature-table output Parquet path.
    pub output: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtractToml {
    /// Disk-averaging radius in degrees.
    #[serde(default = "default_radius_deg")]
    pub radius_deg: f64,
    /// Worker-pool size; 1 means strictly sequential.
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Month-sets retained by the grid cache; 0 disables caching.
    #[serde(default)]
    pub cache_months: usize,
    /// Drop observations below this wind speed (m/s) before extraction.
    #[serde(default)]
    pub min_wind_ms: Option<f64>,
    /// Number of failure reasons echoed in the run report.
    #[serde(default = "default_failure_sample")]
    pub failure_sample: usize,
}

impl Default for ExtractToml {
    fn default() -> Self {
        Self {
            radius_deg: default_radius_deg(),
            workers: default_workers(),
            cache_months: 0,
            min_wind_ms: None,
            failure_sample: default_failure_sample(),
        }
    }
}

fn default_radius_deg() -> f64 {
    2.5
}
fn default_workers() -> usize {
    1
}
fn default_failure_sample() -> usize {
    10
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CorrectToml {
    /// Number of quantile levels in the mapping.
    #[serde(default = "default_n_quantiles")]
    pub n_quantiles: usize,
    /// Tropical-storm intensity threshold (m/s).
    #[serde(default = "default_intensity_threshold")]
    pub intensity_threshold: f64,
    /// Minimum storms per group for a group-specific mapping.
    #[serde(default = "default_min_group_storms")]
    pub min_group_storms: usize,
}

impl Default for CorrectToml {
    fn default() -> Self {
        Self {
            n_quantiles: default_n_quantiles(),
            intensity_threshold: default_intensity_threshold(),
            min_group_storms: default_min_group_storms(),
        }
    }
}

fn default_n_quantiles() -> usize {
    100
}
fn default_intensity_threshold() -> f64 {
    18.0
}
fn default_min_group_storms() -> usize {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_parses_with_defaults() {
        let config: TaranisConfig = toml::from_str("").unwrap();
        assert!((config.extract.radius_deg - 2.5).abs() < f64::EPSILON);
        assert_eq!(config.extract.workers, 1);
        assert_eq!(config.extract.cache_months, 0);
        assert_eq!(config.correct.n_quantiles, 100);
        assert!(config.data.grid_root.is_none());
    }

    #[test]
    fn full_config_parses() {
        let text = r#"
            [data]
            grid_root = "/data/monthly"
            tracks = "/data/ibtracs.parquet"
            bathymetry = "/data/etopo1.nc"

            [extract]
            radius_deg = 2.0
            workers = 4
            cache_months = 3
            min_wind_ms = 17.0

            [correct]
            n_quantiles = 50
            min_group_storms = 20
        "#;
        let config: TaranisConfig = toml::from_str(text).unwrap();
        assert_eq!(config.extract.workers, 4);
        assert_eq!(config.extract.cache_months, 3);
        assert_eq!(config.extract.min_wind_ms, Some(17.0));
        assert_eq!(config.correct.n_quantiles, 50);
        assert_eq!(
            config.data.grid_root.as_deref(),
            Some(Path::new("/data/monthly"))
        );
    }

    #[test]
    fn unknown_fields_rejected() {
        let result: Result<TaranisConfig, _> = toml::from_str("[extract]\nbogus = 1\n");
        assert!(result.is_err());
    }
}
