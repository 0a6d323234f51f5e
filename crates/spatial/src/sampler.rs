//! Disk cell selection, masking and weighting.

use crate::view::GridView;
use crate::wrap_lon_delta;

/// Padding added to the selection bounding box so cells whose centre lies
/// just outside `radius` in one axis are still considered by the mask.
const BBOX_MARGIN_DEG: f64 = 0.5;

/// Pre-computed cell selection and area weights for one disk query.
///
/// Building a sampler does the expensive work once — bounding-box selection,
/// longitude wrapping, planar distance mask and `cos(latitude)` weights —
/// so that many co-registered planes (e.g. every pressure level of a
/// temperature cube) can be averaged at the same location with
/// [`DiskSampler::average`].
#[derive(Debug, Clone)]
pub struct DiskSampler {
    /// Flat `[nlat, nlon]` indices of cells inside the disk.
    cells: Vec<usize>,
    /// Unnormalized `cos(latitude)` weight per selected cell.
    weights: Vec<f64>,
    /// Flat index of the nearest grid cell, for the empty-disk fallback.
    nearest: usize,
    /// Expected plane length, for input validation.
    plane_len: usize,
}

impl DiskSampler {
    /// Builds a sampler for a disk of `radius_deg` degrees around
    /// (`center_lat`, `center_lon`) on the given axes.
    ///
    /// The query longitude may use either the [-180, 180) or the [0, 360)
    /// convention independently of the grid axis: per-cell longitude
    /// differences are wrapped into (-180, 180] before any comparison, which
    /// also handles disks straddling the dateline.
    ///
    /// # Panics
    ///
    /// Panics if either axis is empty or `radius_deg` is negative or
    /// non-finite.
    pub fn build(lats: &[f64], lons: &[f64], center_lat: f64, center_lon: f64, radius_deg: f64) -> Self {
        assert!(!lats.is_empty() && !lons.is_empty(), "axes must be non-empty");
        assert!(
            radius_deg.is_finite() && radius_deg >= 0.0,
            "radius must be finite and non-negative, got {radius_deg}"
        );

        let margin = radius_deg + BBOX_MARGIN_DEG;
        let nlon = lons.len();

        // Bounding-box selection per axis avoids the O(nlat * nlon) distance
        // computation over the full grid.
        let lat_sel: Vec<usize> = lats
            .iter()
            .enumerate()
            .filter(|&(_, &lat)| (lat - center_lat).abs() <= margin)
            .map(|(i, _)| i)
            .collect();
        let lon_sel: Vec<(usize, f64)> = lons
            .iter()
            .enumerate()
            .map(|(j, &lon)| (j, wrap_lon_delta(lon - center_lon)))
            .filter(|(_, dlon)| dlon.abs() <= margin)
            .collect();

        let mut cells = Vec::new();
        let mut weights = Vec::new();
        for &i in &lat_sel {
            let dlat = lats[i] - center_lat;
            let mean_lat = 0.5 * (lats[i] + center_lat);
            let lon_scale = mean_lat.to_radians().cos();
            for &(j, dlon) in &lon_sel {
                // Planar approximation: accurate to a few percent of the
                // great-circle distance for radii under ~5 degrees.
                let d = (dlat * dlat + (dlon * lon_scale) * (dlon * lon_scale)).sqrt();
                if d <= radius_deg {
                    cells.push(i * nlon + j);
                    weights.push(lats[i].to_radians().cos());
                }
            }
        }

        let nearest = nearest_flat_index(lats, lons, center_lat, center_lon);

        Self {
            cells,
            weights,
            nearest,
            plane_len: lats.len() * nlon,
        }
    }

    /// Number of cells inside the disk (before finiteness filtering).
    pub fn n_cells(&self) -> usize {
        self.cells.len()
    }

    /// Weighted average of `values` over the disk.
    ///
    /// Cells with non-finite values are excluded from both the sum and the
    /// weight normalization. If no cell passes both the mask and the
    /// finiteness test (or the total weight is zero), the nearest grid cell's
    /// value is returned; if that too is non-finite, NaN propagates.
    ///
    /// # Panics
    ///
    /// Panics if `values` has a different length than the axes the sampler
    /// was built for.
    pub fn average(&self, values: &[f64]) -> f64 {
        assert_eq!(
            values.len(),
            self.plane_len,
            "plane length mismatch: expected {}, got {}",
            self.plane_len,
            values.len()
        );

        let mut weighted_sum = 0.0;
        let mut weight_total = 0.0;
        for (&cell, &w) in self.cells.iter().zip(&self.weights) {
            let v = values[cell];
            if v.is_finite() {
                weighted_sum += w * v;
                weight_total += w;
            }
        }

        if weight_total > 0.0 {
            weighted_sum / weight_total
        } else {
            values[self.nearest]
        }
    }
}

/// Averages a single plane over a disk; see [`DiskSampler`] for semantics.
///
/// When several planes share axes and location, build one [`DiskSampler`]
/// and reuse it instead.
pub fn disk_average(view: &GridView<'_>, center_lat: f64, center_lon: f64, radius_deg: f64) -> f64 {
    DiskSampler::build(view.lats(), view.lons(), center_lat, center_lon, radius_deg)
        .average(view.values())
}

/// Flat index of the grid cell nearest to the query point, using wrapped
/// longitude distance so the convention mismatch cannot pick a far cell.
fn nearest_flat_index(lats: &[f64], lons: &[f64], center_lat: f64, center_lon: f64) -> usize {
    let i = argmin_by(lats, |lat| (lat - center_lat).abs());
    let j = argmin_by(lons, |lon| wrap_lon_delta(lon - center_lon).abs());
    i * lons.len() + j
}

fn argmin_by(axis: &[f64], key: impl Fn(f64) -> f64) -> usize {
    let mut best = 0;
    let mut best_key = f64::INFINITY;
    for (idx, &v) in axis.iter().enumerate() {
        let k = key(v);
        if k < best_key {
            best_key = k;
            best = idx;
        }
    }
    best
}
