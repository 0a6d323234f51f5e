//! Upper-ocean diagnostics from a temperature/depth profile.
//!
//! Both quantities are optional outputs: NaN propagates when the profile
//! does not support the calculation.

/// Mixed-layer depth (m): the depth at which ocean temperature first drops
/// `delta_t_c` below the sea-surface temperature, linearly interpolated
/// between the bracketing levels.
///
/// Returns NaN when no finite level crosses the criterion.
pub fn mixed_layer_depth(temps_c: &[f64], depths_m: &[f64], sst_c: f64, delta_t_c: f64) -> f64 {
    if temps_c.len() != depths_m.len() || temps_c.is_empty() || !sst_c.is_finite() {
        return f64::NAN;
    }
    let threshold = sst_c - delta_t_c;

    let mut prev: Option<(f64, f64)> = None;
    for (&t, &d) in temps_c.iter().zip(depths_m) {
        if !t.is_finite() || !d.is_finite() {
            continue;
        }
        if t < threshold {
            return match prev {
                Some((t_above, d_above)) if t_above > t => {
                    d_above + (d - d_above) * (t_above - threshold) / (t_above - t)
                }
                _ => d,
            };
        }
        prev = Some((t, d));
    }
    f64::NAN
}

/// Thermal stratification (degrees C per m): the mean vertical temperature
/// gradient over the `layer_m` metres below the mixed-layer depth. Positive
/// values mean cooling with depth.
///
/// Returns NaN when the profile does not span the layer.
pub fn thermal_stratification(
    temps_c: &[f64],
    depths_m: &[f64],
    mld_m: f64,
    layer_m: f64,
) -> f64 {
    if !mld_m.is_finite() || layer_m <= 0.0 {
        return f64::NAN;
    }
    let t_top = temperature_at_depth(temps_c, depths_m, mld_m);
    let t_bottom = temperature_at_depth(temps_c, depths_m, mld_m + layer_m);
    (t_top - t_bottom) / layer_m
}

/// Linear interpolation of temperature at `depth_m`; NaN outside the
/// profile's finite range.
fn temperature_at_depth(temps_c: &[f64], depths_m: &[f64], depth_m: f64) -> f64 {
    let mut prev: Option<(f64, f64)> = None;
    for (&t, &d) in temps_c.iter().zip(depths_m) {
        if !t.is_finite() || !d.is_finite() {
            continue;
        }
        if d >= depth_m {
            return match prev {
                Some((t_above, d_above)) if d > d_above => {
                    t_above + (t - t_above) * (depth_m - d_above) / (d - d_above)
                }
                _ if d == depth_m => t,
                _ => f64::NAN,
            };
        }
        prev = Some((t, d));
    }
    f64::NAN
}
