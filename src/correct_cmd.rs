use anyhow::{Context, Result, bail};
use tracing::info;

use taranis_quantile_match::{CorrectionResult, correct, fit_and_apply_grouped};
use taranis_tracks::{TrackTable, read_storm_values, write_corrected};

use crate::cli::{CorrectArgs, GroupByArg};
use crate::config::TaranisConfig;
use crate::convert;

/// Run quantile-matching correction of simulated LMI against observed
/// climatology.
pub fn run(args: CorrectArgs) -> Result<()> {
    let config = TaranisConfig::load(&args.config)?;
    let qmatch_config = convert::build_qmatch_config(&config.correct);

    // Step 1: Observed LMI per storm from the observation table.
    let tracks_path = args
        .tracks
        .or_else(|| config.data.tracks.clone())
        .context("no observation table: set [data].tracks in config or use --tracks")?;
    let table = TrackTable::from_parquet(&tracks_path)
        .with_context(|| format!("failed to read tracks: {}", tracks_path.display()))?;
    let summaries = table.storm_summaries();
    if summaries.is_empty() {
        bail!("observation table contains no storms");
    }
    info!(n_storms = summaries.len(), "observed LMI computed");

    // Step 2: Simulated LMI, which must cover the same storms in the same
    // order — the arrays are matched positionally.
    let simulated_rows = read_storm_values(&args.simulated, "simulated_lmi")
        .with_context(|| format!("failed to read simulated LMI: {}", args.simulated.display()))?;
    if simulated_rows.len() != summaries.len() {
        bail!(
            "storm count mismatch: {} observed storms, {} simulated",
            summaries.len(),
            simulated_rows.len()
        );
    }
    for (summary, (sim_id, _)) in summaries.iter().zip(&simulated_rows) {
        if &summary.storm_id != sim_id {
            bail!(
                "storm order mismatch: observed '{}' vs simulated '{}'",
                summary.storm_id,
                sim_id
            );
        }
    }

    let storm_ids: Vec<String> = summaries.iter().map(|s| s.storm_id.clone()).collect();
    let observed: Vec<f64> = summaries.iter().map(|s| s.lmi_ms).collect();
    let simulated: Vec<f64> = simulated_rows.iter().map(|(_, v)| *v).collect();

    // Step 3: Fit and apply, grouped or overall.
    let result: CorrectionResult = match args.group_by {
        GroupByArg::None => correct(&observed, &simulated, &qmatch_config)?,
        GroupByArg::Basin => {
            let groups: Vec<String> = summaries
                .iter()
                .map(|s| s.basin.clone().unwrap_or_else(|| "unknown".to_string()))
                .collect();
            fit_and_apply_grouped(&observed, &simulated, &groups, "basin", &qmatch_config)?
        }
        GroupByArg::Enso => {
            let groups: Vec<String> = summaries
                .iter()
                .map(|s| s.enso_phase.clone().unwrap_or_else(|| "unknown".to_string()))
                .collect();
            fit_and_apply_grouped(&observed, &simulated, &groups, "enso_phase", &qmatch_config)?
        }
    };

    // Step 4: Report exactly which strategy fired per group.
    for (group, strategy) in &result.provenance().mappings {
        info!(group = %group, strategy = %strategy, "mapping applied");
    }

    // Step 5: Write the comparison table and its provenance record.
    write_corrected(
        &args.output,
        &storm_ids,
        &observed,
        &simulated,
        result.corrected(),
    )
    .with_context(|| format!("failed to write corrected LMI: {}", args.output.display()))?;

    let provenance_path = args.output.with_extension("provenance.json");
    let json = serde_json::to_string_pretty(result.provenance())
        .context("failed to serialize provenance")?;
    std::fs::write(&provenance_path, &json)
        .with_context(|| format!("failed to write provenance: {}", provenance_path.display()))?;

    info!(
        path = %args.output.display(),
        provenance = %provenance_path.display(),
        n_storms = storm_ids.len(),
        "correction complete"
    );
    Ok(())
}
