//! Application of a fitted quantile mapping.

use crate::fit::QuantileMapping;

/// Applies a fitted mapping to simulated intensities.
///
/// Each input is transformed through the monotone piecewise-linear
/// interpolant. Inputs below the minimum retained simulated quantile map to
/// the minimum observed quantile value; inputs above the maximum map to the
/// maximum observed quantile value (flat extrapolation, never unbounded).
/// Every output is finite and non-negative: non-finite inputs or results
/// become 0, negative results clamp to 0.
pub fn apply(mapping: &QuantileMapping, simulated: &[f64]) -> Vec<f64> {
    simulated.iter().map(|&v| map_one(mapping, v)).collect()
}

fn map_one(mapping: &QuantileMapping, x: f64) -> f64 {
    if !x.is_finite() {
        return 0.0;
    }

    let sim = mapping.simulated_quantiles();
    let obs = mapping.observed_quantiles();

    let y = if x <= sim[0] {
        obs[0]
    } else if x >= sim[sim.len() - 1] {
        obs[obs.len() - 1]
    } else {
        // First knot with sim[hi] >= x; the guards above ensure 1 <= hi < len.
        let hi = sim.partition_point(|&s| s < x);
        let (x0, x1) = (sim[hi - 1], sim[hi]);
        let (y0, y1) = (obs[hi - 1], obs[hi]);
        if x1 > x0 {
            y0 + (x - x0) / (x1 - x0) * (y1 - y0)
        } else {
            y1
        }
    };

    if y.is_finite() { y.max(0.0) } else { 0.0 }
}
