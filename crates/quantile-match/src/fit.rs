//! Empirical quantile-mapping construction.

use crate::config::QmatchConfig;
use crate::error::QmatchError;
use taranis_stats::{quantile_levels, quantiles_at};

/// A fitted simulated-to-observed quantile mapping.
///
/// Holds paired quantile values at the same probability levels for the
/// simulated (input) and observed (target) distributions. Both coordinates
/// are monotone non-decreasing by construction; inputs outside the retained
/// simulated range clamp flat to the endpoint observed values.
#[derive(Debug, Clone)]
pub struct QuantileMapping {
    sim_q: Vec<f64>,
    obs_q: Vec<f64>,
}

impl QuantileMapping {
    pub(crate) fn new(sim_q: Vec<f64>, obs_q: Vec<f64>) -> Self {
        debug_assert_eq!(sim_q.len(), obs_q.len());
        debug_assert!(sim_q.windows(2).all(|w| w[1] >= w[0]));
        debug_assert!(obs_q.windows(2).all(|w| w[1] >= w[0]));
        Self { sim_q, obs_q }
    }

    /// Simulated-side quantile values (the mapping's input coordinate).
    pub fn simulated_quantiles(&self) -> &[f64] {
        &self.sim_q
    }

    /// Observed-side quantile values (the mapping's output coordinate).
    pub fn observed_quantiles(&self) -> &[f64] {
        &self.obs_q
    }

    /// Number of retained quantile pairs.
    pub fn len(&self) -> usize {
        self.sim_q.len()
    }

    /// Always false: degenerate mappings cannot be constructed.
    pub fn is_empty(&self) -> bool {
        self.sim_q.is_empty()
    }
}

/// Fits a quantile mapping from `simulated` to `observed` intensities.
///
/// Both arrays are filtered to finite values at or above the configured
/// intensity threshold before quantiles are computed; sub-threshold storms
/// are not part of the matched distribution. Quantile pairs where either
/// side is non-finite are dropped.
///
/// # Errors
///
/// Returns [`QmatchError::EmptyData`] if either input slice is empty, and
/// [`QmatchError::DegenerateMapping`] if no valid quantile pairs remain
/// after filtering.
pub fn fit(
    observed: &[f64],
    simulated: &[f64],
    config: &QmatchConfig,
) -> Result<QuantileMapping, QmatchError> {
    if observed.is_empty() || simulated.is_empty() {
        return Err(QmatchError::EmptyData);
    }

    let threshold = config.intensity_threshold();
    let obs_valid: Vec<f64> = observed
        .iter()
        .copied()
        .filter(|v| v.is_finite() && *v >= threshold)
        .collect();
    let sim_valid: Vec<f64> = simulated
        .iter()
        .copied()
        .filter(|v| v.is_finite() && *v >= threshold)
        .collect();

    if obs_valid.is_empty() || sim_valid.is_empty() {
        return Err(QmatchError::DegenerateMapping {
            reason: format!(
                "no values at or above the {threshold} m/s threshold \
                 (observed: {}, simulated: {})",
                obs_valid.len(),
                sim_valid.len()
            ),
        });
    }

    let levels = quantile_levels(config.n_quantiles());
    let obs_q = quantiles_at(&obs_valid, &levels);
    let sim_q = quantiles_at(&sim_valid, &levels);

    // Keep only pairs where both sides are finite.
    let (sim_kept, obs_kept): (Vec<f64>, Vec<f64>) = sim_q
        .into_iter()
        .zip(obs_q)
        .filter(|(s, o)| s.is_finite() && o.is_finite())
        .unzip();

    if sim_kept.is_empty() {
        return Err(QmatchError::DegenerateMapping {
            reason: "all quantile pairs were non-finite".to_string(),
        });
    }

    Ok(QuantileMapping::new(sim_kept, obs_kept))
}
