//! Storm motion derived from consecutive fixes.

use crate::observation::Observation;

/// Mean Earth radius in metres.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance between two points in metres.
pub fn haversine_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();

    let a = (dphi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().asin()
}

/// Translation speed (m/s) over the segment from `prev` to `cur`.
///
/// Returns `None` when the fixes are not strictly ordered in time.
pub fn segment_speed(prev: &Observation, cur: &Observation) -> Option<f64> {
    let dt = (cur.time - prev.time).num_seconds() as f64;
    if dt <= 0.0 {
        return None;
    }
    Some(haversine_m(prev.lat, prev.lon, cur.lat, cur.lon) / dt)
}
