use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use taranis_gridio::{
    BATHYMETRY, Catalog, GridError, GridManager, MonthlyGridSet, SurfaceField,
    load_static_surface,
};
use taranis_pi::{BisterEmanuel, compute_pi};
use taranis_profile::{ExtractConfig, extract};
use taranis_tracks::{FeatureRow, TrackTable, write_features};

use crate::cli::ExtractArgs;
use crate::config::TaranisConfig;
use crate::convert;

/// Run the extraction pipeline: observations grouped by month, one grid
/// acquisition per month, per-observation failures recorded and skipped.
pub fn run(args: ExtractArgs) -> Result<()> {
    let config = TaranisConfig::load(&args.config)?;

    // Step 1: Resolve paths
    let grid_root = config
        .data
        .grid_root
        .clone()
        .context("no grid root: set [data].grid_root in config")?;
    let tracks_path = config
        .data
        .tracks
        .clone()
        .context("no observation table: set [data].tracks in config")?;
    let catalog_path = config
        .data
        .catalog
        .clone()
        .unwrap_or_else(|| grid_root.join("monthly_data_catalog.json"));
    let output = args
        .output
        .or_else(|| config.data.output.clone())
        .unwrap_or_else(|| PathBuf::from("tc_features.parquet"));

    // Step 2: Catalogue is a hard precondition, unlike individual files.
    let catalog = Catalog::load(&catalog_path)?;
    for category in catalog.categories() {
        info!(
            category,
            n_files = catalog.n_entries(category),
            "catalogued grid files"
        );
    }
    info!(n_months = catalog.months().len(), "months with grid data");

    // Step 3: Observation table, with optional basin/intensity filters.
    let mut table = TrackTable::from_parquet(&tracks_path)
        .with_context(|| format!("failed to read tracks: {}", tracks_path.display()))?;
    if args.basin.is_some() || config.extract.min_wind_ms.is_some() {
        let observations = table
            .observations()
            .iter()
            .filter(|obs| match &args.basin {
                Some(basin) => obs.basin.as_deref() == Some(basin.as_str()),
                None => true,
            })
            .filter(|obs| match config.extract.min_wind_ms {
                Some(min) => obs.max_wind_ms.is_some_and(|w| w >= min),
                None => true,
            })
            .cloned()
            .collect();
        table = TrackTable::new(observations);
    }
    if table.is_empty() {
        bail!("no observations to process after filtering");
    }
    info!(
        n_observations = table.len(),
        n_storms = table.n_storms(),
        "observation table ready"
    );

    // Step 4: Optional static bathymetry.
    let bathymetry: Option<SurfaceField> = match &config.data.bathymetry {
        Some(path) => Some(
            load_static_surface(path, &BATHYMETRY)
                .with_context(|| format!("failed to load bathymetry: {}", path.display()))?,
        ),
        None => None,
    };

    // Step 5: Month-by-month extraction.
    let extract_config = convert::build_extract_config(&config.extract);
    let manager = GridManager::new(
        &grid_root,
        convert::build_cache_policy(config.extract.cache_months),
    );
    let kernel = BisterEmanuel::new();
    let mut stats = RunStats::new(table.len(), config.extract.failure_sample);
    let mut rows: Vec<(usize, FeatureRow)> = Vec::new();

    let pool = if config.extract.workers > 1 {
        Some(
            rayon::ThreadPoolBuilder::new()
                .num_threads(config.extract.workers)
                .build()
                .context("failed to build worker pool")?,
        )
    } else {
        None
    };

    for ((year, month), indices) in table.monthly_groups() {
        let set = match manager.acquire(year, month) {
            Ok(set) => set,
            Err(e @ GridError::MissingGridData { .. }) => {
                warn!(
                    year,
                    month,
                    n_observations = indices.len(),
                    "skipping month: no grid data"
                );
                let reason = e.to_string();
                for &idx in &indices {
                    stats.record_failure(idx, reason.clone());
                }
                continue;
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("failed to acquire grids for {year}-{month:02}"));
            }
        };

        let process = |idx: usize| {
            (
                idx,
                extract_one(
                    &table,
                    idx,
                    &set,
                    bathymetry.as_ref(),
                    &extract_config,
                    &kernel,
                ),
            )
        };
        // Parallelism is over independent observations only; the month's
        // grids are shared read-only.
        let month_results: Vec<(usize, Result<FeatureRow, String>)> = match &pool {
            Some(pool) => pool.install(|| indices.par_iter().map(|&idx| process(idx)).collect()),
            None => indices.iter().map(|&idx| process(idx)).collect(),
        };

        // Release on every path: a failed observation never aborts the
        // month, so this is the single exit point.
        manager.release(set);

        for (idx, result) in month_results {
            match result {
                Ok(row) => {
                    rows.push((idx, row));
                    stats.record_success();
                }
                Err(reason) => stats.record_failure(idx, reason),
            }
        }
        debug!(year, month, "month processed");
    }

    // Step 6: Reassemble by observation index, not completion order.
    rows.sort_by_key(|(idx, _)| *idx);
    let ordered: Vec<FeatureRow> = rows.into_iter().map(|(_, row)| row).collect();
    write_features(&output, &ordered)
        .with_context(|| format!("failed to write features: {}", output.display()))?;
    info!(path = %output.display(), n_rows = ordered.len(), "feature table written");

    // Step 7: Run report with failure sample.
    let report_path = output.with_extension("report.json");
    let json = serde_json::to_string_pretty(&stats.report())
        .context("failed to serialize run report")?;
    std::fs::write(&report_path, &json)
        .with_context(|| format!("failed to write report: {}", report_path.display()))?;
    info!(
        successful = stats.success,
        failed = stats.failed,
        path = %report_path.display(),
        "extraction complete"
    );

    Ok(())
}

/// Extract features and PI for a single observation. A failure reason is
/// a string because it is only aggregated, never matched on.
fn extract_one(
    table: &TrackTable,
    idx: usize,
    grids: &MonthlyGridSet,
    bathymetry: Option<&SurfaceField>,
    config: &ExtractConfig,
    kernel: &BisterEmanuel,
) -> Result<FeatureRow, String> {
    let obs = &table.observations()[idx];
    let profile =
        extract(obs, table, grids, bathymetry, config).map_err(|e| e.to_string())?;

    let sst_k = profile.get("sst").expect("assembler guarantees sst");
    let sp_pa = profile
        .get("surface_pressure")
        .expect("assembler guarantees surface pressure");
    let levels = profile.levels();
    let pi = compute_pi(
        kernel,
        sst_k,
        sp_pa,
        levels.temperature_k(),
        levels.specific_humidity(),
        levels.pressure_hpa(),
        config.pi_levels_hpa().len(),
    )
    .map_err(|e| e.to_string())?;

    let mut row = FeatureRow::from_observation(obs);
    for (name, value) in profile.values() {
        row.set(name, *value);
    }
    row.set("pi", pi);
    row.sst_source = Some(profile.sst_source().as_str().to_string());
    row.is_land = profile.is_land();
    Ok(row)
}

/// Success/failure accounting for one extraction run.
///
/// Owned by the run rather than process-global so concurrent runs and tests
/// stay independent.
struct RunStats {
    total: usize,
    success: usize,
    failed: usize,
    sample_cap: usize,
    failure_sample: Vec<FailureRecord>,
}

#[derive(Debug, Clone, Serialize)]
struct FailureRecord {
    observation: usize,
    reason: String,
}

#[derive(Debug, Serialize)]
struct RunReport<'a> {
    total: usize,
    successful: usize,
    failed: usize,
    failure_sample: &'a [FailureRecord],
}

impl RunStats {
    fn new(total: usize, sample_cap: usize) -> Self {
        Self {
            total,
            success: 0,
            failed: 0,
            sample_cap,
            failure_sample: Vec::new(),
        }
    }

    fn record_success(&mut self) {
        self.success += 1;
    }

    fn record_failure(&mut self, observation: usize, reason: String) {
        self.failed += 1;
        if self.failure_sample.len() < self.sample_cap {
            self.failure_sample.push(FailureRecord {
                observation,
                reason,
            });
        }
    }

    fn report(&self) -> RunReport<'_> {
        RunReport {
            total: self.total,
            successful: self.success,
            failed: self.failed,
            failure_sample: &self.failure_sample,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_keep_a_bounded_failure_sample() {
        let mut stats = RunStats::new(100, 3);
        stats.record_success();
        for i in 0..10 {
            stats.record_failure(i, format!("reason {i}"));
        }
        assert_eq!(stats.success, 1);
        assert_eq!(stats.failed, 10);
        assert_eq!(stats.failure_sample.len(), 3);

        let report = stats.report();
        assert_eq!(report.total, 100);
        assert_eq!(report.failed, 10);
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"failure_sample\""));
        assert!(json.contains("reason 0"));
    }
}
