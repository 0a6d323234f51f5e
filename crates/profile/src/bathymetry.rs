//! Bathymetry and land detection.

use taranis_gridio::SurfaceField;

/// Bathymetry (m, negative below sea level) and land flag at a point.
///
/// A point lookup, deliberately not spatially averaged: bathymetry is a
/// fixed boundary field where precision near coastlines matters more than
/// the environmental envelope.
pub fn bathymetry_at(field: &SurfaceField, lat: f64, lon: f64) -> (f64, Option<bool>) {
    let depth = field.nearest_value(lat, lon);
    let is_land = depth.is_finite().then(|| depth >= 0.0);
    (depth, is_land)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use approx::assert_relative_eq;

    fn coastline_field() -> SurfaceField {
        let lats = Arc::new(vec![20.0, 21.0]);
        let lons = Arc::new(vec![270.0, 271.0]);
        // West cells ocean (-3000 m), east cells land (+15 m).
        let data = vec![-3000.0, 15.0, -3000.0, 15.0];
        SurfaceField::new("bathymetry", lats, lons, data).unwrap()
    }

    #[test]
    fn ocean_point_is_not_land() {
        let field = coastline_field();
        let (depth, is_land) = bathymetry_at(&field, 20.1, 270.1);
        assert_relative_eq!(depth, -3000.0);
        assert_eq!(is_land, Some(false));
    }

    #[test]
    fn land_point_is_land() {
        let field = coastline_field();
        let (depth, is_land) = bathymetry_at(&field, 21.0, 271.2);
        assert_relative_eq!(depth, 15.0);
        assert_eq!(is_land, Some(true));
    }

    #[test]
    fn negative_longitude_convention_accepted() {
        let field = coastline_field();
        // -89 east == 271
        let (_, is_land) = bathymetry_at(&field, 20.0, -89.0);
        assert_eq!(is_land, Some(true));
    }

    #[test]
    fn missing_data_has_no_land_flag() {
        let lats = Arc::new(vec![20.0]);
        let lons = Arc::new(vec![270.0]);
        let field = SurfaceField::new("bathymetry", lats, lons, vec![f64::NAN]).unwrap();
        let (depth, is_land) = bathymetry_at(&field, 20.0, 270.0);
        assert!(depth.is_nan());
        assert_eq!(is_land, None);
    }
}
