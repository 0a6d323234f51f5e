//! Grouped correction with hierarchical fallback.

use tracing::{debug, warn};

use crate::apply::apply;
use crate::config::QmatchConfig;
use crate::error::QmatchError;
use crate::fit::{QuantileMapping, fit};
use crate::result::{CorrectionProvenance, CorrectionResult, GroupStrategy};

/// Corrects simulated LMI values per group, with fallback to the overall
/// mapping.
///
/// `observed`, `simulated`, and `groups` are parallel per-storm arrays. For
/// each distinct group label (in first-appearance order):
///
/// 1. fewer than `config.min_group_storms()` storms: the mapping fitted on
///    the full ungrouped population corrects that group's members, recorded
///    as [`GroupStrategy::UsedOverallMapping`];
/// 2. a group-specific fit succeeds: it corrects the group, recorded as
///    [`GroupStrategy::GroupSpecific`];
/// 3. the group-specific fit fails (e.g. degenerate quantiles): the overall
///    mapping is used instead, recorded as [`GroupStrategy::FallbackOverall`].
///
/// # Errors
///
/// Returns [`QmatchError::LengthMismatch`] if the slices differ in length,
/// [`QmatchError::EmptyData`] if they are empty, and propagates a failure of
/// the *overall* fit, for which there is no further fallback.
pub fn fit_and_apply_grouped(
    observed: &[f64],
    simulated: &[f64],
    groups: &[String],
    group_by: &str,
    config: &QmatchConfig,
) -> Result<CorrectionResult, QmatchError> {
    config.validate()?;

    if observed.is_empty() {
        return Err(QmatchError::EmptyData);
    }
    if observed.len() != simulated.len() || observed.len() != groups.len() {
        return Err(QmatchError::LengthMismatch {
            observed_len: observed.len(),
            simulated_len: simulated.len(),
            groups_len: groups.len(),
        });
    }

    // Distinct group labels in first-appearance order.
    let mut labels: Vec<&String> = Vec::new();
    for g in groups {
        if !labels.contains(&g) {
            labels.push(g);
        }
    }

    let mut corrected = vec![0.0; simulated.len()];
    let mut provenance = CorrectionProvenance::new(group_by);
    // The overall mapping is fitted at most once, on first need.
    let mut overall: Option<QuantileMapping> = None;

    for label in labels {
        let indices: Vec<usize> = groups
            .iter()
            .enumerate()
            .filter(|(_, g)| *g == label)
            .map(|(i, _)| i)
            .collect();
        let group_sim: Vec<f64> = indices.iter().map(|&i| simulated[i]).collect();

        let strategy = if indices.len() < config.min_group_storms() {
            debug!(
                group = %label,
                n_storms = indices.len(),
                min = config.min_group_storms(),
                "group too small, using overall mapping"
            );
            GroupStrategy::UsedOverallMapping
        } else {
            let group_obs: Vec<f64> = indices.iter().map(|&i| observed[i]).collect();
            match fit(&group_obs, &group_sim, config) {
                Ok(mapping) => {
                    let values = apply(&mapping, &group_sim);
                    scatter(&mut corrected, &indices, &values);
                    provenance
                        .mappings
                        .insert(label.clone(), GroupStrategy::GroupSpecific);
                    continue;
                }
                Err(e) => {
                    warn!(group = %label, error = %e, "group fit failed, falling back to overall mapping");
                    GroupStrategy::FallbackOverall
                }
            }
        };

        if overall.is_none() {
            overall = Some(fit(observed, simulated, config)?);
        }
        let mapping = overall.as_ref().expect("overall mapping just fitted");
        let values = apply(mapping, &group_sim);
        scatter(&mut corrected, &indices, &values);
        provenance.mappings.insert(label.clone(), strategy);
    }

    Ok(CorrectionResult::new(corrected, provenance))
}

/// Corrects the whole population with a single mapping (no grouping).
///
/// Provenance records the `all` group with [`GroupStrategy::Overall`].
///
/// # Errors
///
/// Propagates [`fit`] errors; there is no fallback for the overall mapping.
pub fn correct(
    observed: &[f64],
    simulated: &[f64],
    config: &QmatchConfig,
) -> Result<CorrectionResult, QmatchError> {
    config.validate()?;
    let mapping = fit(observed, simulated, config)?;
    let corrected = apply(&mapping, simulated);

    let mut provenance = CorrectionProvenance::new("all");
    provenance
        .mappings
        .insert("all".to_string(), GroupStrategy::Overall);

    Ok(CorrectionResult::new(corrected, provenance))
}

fn scatter(target: &mut [f64], indices: &[usize], values: &[f64]) {
    for (&i, &v) in indices.iter().zip(values) {
        target[i] = v;
    }
}
