//! Variable-name schema: canonical names mapped to accepted source aliases.
//!
//! Reanalysis products ship the same physical variable under either a short
//! code or a descriptive name depending on the download route. Each
//! [`VarSpec`] lists the accepted spellings in preference order, short code
//! first; resolution takes the first alias present in a file.

use std::path::Path;

use crate::error::GridError;

/// One physical variable and the source names it may be stored under.
#[derive(Debug, Clone, Copy)]
pub struct VarSpec {
    /// Canonical name used throughout the pipeline.
    pub canonical: &'static str,
    /// Accepted source names, preferred first.
    pub aliases: &'static [&'static str],
}

/// Air temperature on pressure levels (K).
pub const TEMPERATURE: VarSpec = VarSpec {
    canonical: "temperature",
    aliases: &["t", "temperature"],
};

/// Specific humidity on pressure levels (kg/kg).
pub const SPECIFIC_HUMIDITY: VarSpec = VarSpec {
    canonical: "specific_humidity",
    aliases: &["q", "specific_humidity"],
};

/// Zonal wind on pressure levels (m/s).
pub const U_WIND: VarSpec = VarSpec {
    canonical: "u_wind",
    aliases: &["u", "u_component_of_wind"],
};

/// Meridional wind on pressure levels (m/s).
pub const V_WIND: VarSpec = VarSpec {
    canonical: "v_wind",
    aliases: &["v", "v_component_of_wind"],
};

/// Relative humidity on pressure levels (%).
pub const RELATIVE_HUMIDITY: VarSpec = VarSpec {
    canonical: "relative_humidity",
    aliases: &["r", "relative_humidity"],
};

/// Surface pressure (Pa).
pub const SURFACE_PRESSURE: VarSpec = VarSpec {
    canonical: "surface_pressure",
    aliases: &["sp", "surface_pressure"],
};

/// Sea-surface temperature from the atmospheric model (K).
pub const SEA_SURFACE_TEMPERATURE: VarSpec = VarSpec {
    canonical: "sea_surface_temperature",
    aliases: &["sst", "sea_surface_temperature"],
};

/// Ocean potential temperature on depth levels (degrees C).
pub const OCEAN_TEMPERATURE: VarSpec = VarSpec {
    canonical: "ocean_temperature",
    aliases: &["votemper", "thetao", "ocean_temperature"],
};

/// Bathymetry / surface elevation (m, negative below sea level).
pub const BATHYMETRY: VarSpec = VarSpec {
    canonical: "bathymetry",
    aliases: &["z", "elevation", "bathymetry"],
};

/// Accepted latitude axis names.
pub const LATITUDE_AXIS: &[&str] = &["latitude", "lat", "nav_lat"];

/// Accepted longitude axis names.
pub const LONGITUDE_AXIS: &[&str] = &["longitude", "lon", "nav_lon"];

/// Accepted pressure-level axis names.
pub const PRESSURE_AXIS: &[&str] = &["pressure_level", "level", "plev", "isobaricInhPa"];

/// Accepted ocean depth axis names.
pub const DEPTH_AXIS: &[&str] = &["depth", "deptht"];

/// Returns the first alias of `spec` present in `file`, if any.
pub(crate) fn resolve<'f>(file: &'f netcdf::File, spec: &VarSpec) -> Option<netcdf::Variable<'f>> {
    spec.aliases.iter().find_map(|alias| file.variable(alias))
}

/// Reads a 1-D f64 axis, trying each name in order.
///
/// # Errors
///
/// Returns [`GridError::MissingVariable`] (named after the first alias) if
/// none of the names is present.
pub(crate) fn read_axis(
    file: &netcdf::File,
    names: &[&str],
    path: &Path,
) -> Result<Vec<f64>, GridError> {
    for &name in names {
        if let Some(var) = file.variable(name) {
            return Ok(var.get_values::<f64, _>(..)?);
        }
    }
    Err(GridError::MissingVariable {
        name: names.first().copied().unwrap_or("unknown").to_string(),
        path: path.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_codes_come_first() {
        assert_eq!(TEMPERATURE.aliases[0], "t");
        assert_eq!(SPECIFIC_HUMIDITY.aliases[0], "q");
        assert_eq!(SURFACE_PRESSURE.aliases[0], "sp");
        assert_eq!(SEA_SURFACE_TEMPERATURE.aliases[0], "sst");
        assert_eq!(OCEAN_TEMPERATURE.aliases[0], "votemper");
    }

    #[test]
    fn every_spec_has_at_least_two_aliases() {
        for spec in [
            TEMPERATURE,
            SPECIFIC_HUMIDITY,
            U_WIND,
            V_WIND,
            RELATIVE_HUMIDITY,
            SURFACE_PRESSURE,
            SEA_SURFACE_TEMPERATURE,
            OCEAN_TEMPERATURE,
        ] {
            assert!(!spec.canonical.is_empty());
            assert!(spec.aliases.len() >= 2, "{} needs both spellings", spec.canonical);
        }
    }
}
