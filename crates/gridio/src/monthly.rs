//! Monthly grid bundles and NetCDF loading.
//!
//! One (year, month) has up to three files: atmospheric pressure-level
//! fields, atmospheric single-level fields, and an ocean temperature
//! profile. Any subset may be absent; dependent variables are then skipped
//! downstream, never fabricated.

use std::path::Path;
use std::sync::Arc;

use crate::axes::{AxisCache, GridCategory, MonthAxes};
use crate::error::GridError;
use crate::field::{SurfaceField, VolumeField};
use crate::schema::{
    self, DEPTH_AXIS, LATITUDE_AXIS, LONGITUDE_AXIS, OCEAN_TEMPERATURE, PRESSURE_AXIS,
    RELATIVE_HUMIDITY, SEA_SURFACE_TEMPERATURE, SPECIFIC_HUMIDITY, SURFACE_PRESSURE, TEMPERATURE,
    U_WIND, V_WIND, VarSpec,
};

/// Atmospheric fields on pressure levels for one month.
#[derive(Debug, Clone)]
pub struct PressureLevelGrids {
    levels_hpa: Arc<Vec<f64>>,
    temperature: Option<VolumeField>,
    specific_humidity: Option<VolumeField>,
    u_wind: Option<VolumeField>,
    v_wind: Option<VolumeField>,
    relative_humidity: Option<VolumeField>,
}

impl PressureLevelGrids {
    /// Assembles a pressure-level bundle from already-loaded fields.
    pub fn new(
        levels_hpa: Arc<Vec<f64>>,
        temperature: Option<VolumeField>,
        specific_humidity: Option<VolumeField>,
        u_wind: Option<VolumeField>,
        v_wind: Option<VolumeField>,
        relative_humidity: Option<VolumeField>,
    ) -> Self {
        Self {
            levels_hpa,
            temperature,
            specific_humidity,
            u_wind,
            v_wind,
            relative_humidity,
        }
    }

    /// Pressure-level axis in hPa.
    pub fn levels_hpa(&self) -> &[f64] {
        &self.levels_hpa
    }

    /// Air temperature (K), if present.
    pub fn temperature(&self) -> Option<&VolumeField> {
        self.temperature.as_ref()
    }

    /// Specific humidity (kg/kg), if present.
    pub fn specific_humidity(&self) -> Option<&VolumeField> {
        self.specific_humidity.as_ref()
    }

    /// Zonal wind (m/s), if present.
    pub fn u_wind(&self) -> Option<&VolumeField> {
        self.u_wind.as_ref()
    }

    /// Meridional wind (m/s), if present.
    pub fn v_wind(&self) -> Option<&VolumeField> {
        self.v_wind.as_ref()
    }

    /// Relative humidity (%), if present.
    pub fn relative_humidity(&self) -> Option<&VolumeField> {
        self.relative_humidity.as_ref()
    }
}

/// Atmospheric single-level fields for one month.
#[derive(Debug, Clone)]
pub struct SingleLevelGrids {
    surface_pressure: Option<SurfaceField>,
    sea_surface_temperature: Option<SurfaceField>,
}

impl SingleLevelGrids {
    /// Assembles a single-level bundle from already-loaded fields.
    pub fn new(
        surface_pressure: Option<SurfaceField>,
        sea_surface_temperature: Option<SurfaceField>,
    ) -> Self {
        Self {
            surface_pressure,
            sea_surface_temperature,
        }
    }

    /// Surface pressure (Pa), if present.
    pub fn surface_pressure(&self) -> Option<&SurfaceField> {
        self.surface_pressure.as_ref()
    }

    /// Atmospheric-model SST estimate (K), if present.
    pub fn sea_surface_temperature(&self) -> Option<&SurfaceField> {
        self.sea_surface_temperature.as_ref()
    }
}

/// Ocean reanalysis temperature profile for one month.
#[derive(Debug, Clone)]
pub struct OceanGrids {
    temperature: VolumeField,
}

impl OceanGrids {
    /// Wraps an ocean temperature field (degrees C on depth levels).
    pub fn new(temperature: VolumeField) -> Self {
        Self { temperature }
    }

    /// Ocean potential temperature (degrees C) on depth levels.
    pub fn temperature(&self) -> &VolumeField {
        &self.temperature
    }

    /// Depth axis in metres.
    pub fn depths(&self) -> &[f64] {
        self.temperature.levels()
    }
}

/// The grids available for one (year, month).
///
/// Immutable once built; owned by the grid manager for the duration of one
/// month's processing and released afterwards.
#[derive(Debug, Clone)]
pub struct MonthlyGridSet {
    year: i32,
    month: u8,
    pressure: Option<PressureLevelGrids>,
    single: Option<SingleLevelGrids>,
    ocean: Option<OceanGrids>,
}

impl MonthlyGridSet {
    /// Builds a set from whichever categories were loaded.
    pub fn new(
        year: i32,
        month: u8,
        pressure: Option<PressureLevelGrids>,
        single: Option<SingleLevelGrids>,
        ocean: Option<OceanGrids>,
    ) -> Self {
        Self {
            year,
            month,
            pressure,
            single,
            ocean,
        }
    }

    /// Year this set covers.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Month this set covers (1-12).
    pub fn month(&self) -> u8 {
        self.month
    }

    /// Pressure-level fields, if the category was available.
    pub fn pressure(&self) -> Option<&PressureLevelGrids> {
        self.pressure.as_ref()
    }

    /// Single-level fields, if the category was available.
    pub fn single(&self) -> Option<&SingleLevelGrids> {
        self.single.as_ref()
    }

    /// Ocean fields, if the category was available.
    pub fn ocean(&self) -> Option<&OceanGrids> {
        self.ocean.as_ref()
    }

    /// True when no category loaded at all.
    pub fn is_empty(&self) -> bool {
        self.pressure.is_none() && self.single.is_none() && self.ocean.is_none()
    }
}

/// Opens a NetCDF file, returning [`GridError::FileNotFound`] if the path
/// does not exist on disk.
pub(crate) fn open_file(path: &Path) -> Result<netcdf::File, GridError> {
    if !path.exists() {
        return Err(GridError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    Ok(netcdf::open(path)?)
}

/// Loads the pressure-level file for (`year`, `month`).
pub(crate) fn load_pressure_levels(
    path: &Path,
    year: i32,
    month: u8,
    axis_cache: &AxisCache,
) -> Result<PressureLevelGrids, GridError> {
    let file = open_file(path)?;
    let axes = axis_cache.get_or_populate(year, month, GridCategory::PressureLevels, || {
        read_month_axes(&file, path, Some(PRESSURE_AXIS))
    })?;

    let levels = axes
        .levels
        .clone()
        .expect("pressure-level axes carry a level axis");

    Ok(PressureLevelGrids::new(
        Arc::clone(&levels),
        read_volume(&file, &TEMPERATURE, &axes)?,
        read_volume(&file, &SPECIFIC_HUMIDITY, &axes)?,
        read_volume(&file, &U_WIND, &axes)?,
        read_volume(&file, &V_WIND, &axes)?,
        read_volume(&file, &RELATIVE_HUMIDITY, &axes)?,
    ))
}

/// Loads the single-level file for (`year`, `month`).
pub(crate) fn load_single_level(
    path: &Path,
    year: i32,
    month: u8,
    axis_cache: &AxisCache,
) -> Result<SingleLevelGrids, GridError> {
    let file = open_file(path)?;
    let axes = axis_cache.get_or_populate(year, month, GridCategory::SingleLevel, || {
        read_month_axes(&file, path, None)
    })?;

    Ok(SingleLevelGrids::new(
        read_surface(&file, &SURFACE_PRESSURE, &axes)?,
        read_surface(&file, &SEA_SURFACE_TEMPERATURE, &axes)?,
    ))
}

/// Loads the ocean temperature file for (`year`, `month`).
///
/// Unlike the atmospheric categories, the temperature variable is the point
/// of the file: its absence is an error rather than an empty bundle.
pub(crate) fn load_ocean(
    path: &Path,
    year: i32,
    month: u8,
    axis_cache: &AxisCache,
) -> Result<OceanGrids, GridError> {
    let file = open_file(path)?;
    let axes = axis_cache.get_or_populate(year, month, GridCategory::Ocean, || {
        read_month_axes(&file, path, Some(DEPTH_AXIS))
    })?;

    let temperature =
        read_volume(&file, &OCEAN_TEMPERATURE, &axes)?.ok_or_else(|| GridError::MissingVariable {
            name: OCEAN_TEMPERATURE.canonical.to_string(),
            path: path.to_path_buf(),
        })?;

    Ok(OceanGrids::new(temperature))
}

/// Loads a single static 2-D field (e.g. bathymetry) that is not part of
/// the monthly tree and is held for the whole run rather than per month.
///
/// # Errors
///
/// Returns [`GridError::FileNotFound`] or [`GridError::MissingVariable`] on
/// the corresponding failures.
pub fn load_static_surface(path: &Path, spec: &VarSpec) -> Result<SurfaceField, GridError> {
    let file = open_file(path)?;
    let axes = read_month_axes(&file, path, None)?;

    let var = schema::resolve(&file, spec).ok_or_else(|| GridError::MissingVariable {
        name: spec.canonical.to_string(),
        path: path.to_path_buf(),
    })?;
    let mut data = var.get_values::<f64, _>(..)?;
    apply_fill_value(&var, &mut data);

    SurfaceField::new(spec.canonical, axes.lats, axes.lons, data)
}

/// Reads the lat/lon (and optionally vertical) axes from an open file.
fn read_month_axes(
    file: &netcdf::File,
    path: &Path,
    vertical: Option<&[&str]>,
) -> Result<MonthAxes, GridError> {
    let lats = Arc::new(schema::read_axis(file, LATITUDE_AXIS, path)?);
    let lons = Arc::new(schema::read_axis(file, LONGITUDE_AXIS, path)?);
    let levels = match vertical {
        Some(names) => Some(Arc::new(schema::read_axis(file, names, path)?)),
        None => None,
    };
    Ok(MonthAxes { lats, lons, levels })
}

/// Reads a 3-D variable through its alias list. Returns `Ok(None)` when no
/// alias is present; a present variable with the wrong shape is an error.
///
/// A leading time dimension of length 1 (monthly means) is tolerated since
/// it does not change the flat length.
fn read_volume(
    file: &netcdf::File,
    spec: &VarSpec,
    axes: &MonthAxes,
) -> Result<Option<VolumeField>, GridError> {
    let Some(var) = schema::resolve(file, spec) else {
        return Ok(None);
    };
    let levels = axes
        .levels
        .clone()
        .expect("volume variables require a vertical axis");

    let mut data = var.get_values::<f64, _>(..)?;
    apply_fill_value(&var, &mut data);

    VolumeField::new(
        spec.canonical,
        levels,
        Arc::clone(&axes.lats),
        Arc::clone(&axes.lons),
        data,
    )
    .map(Some)
}

/// Reads a 2-D variable through its alias list; `Ok(None)` when absent.
fn read_surface(
    file: &netcdf::File,
    spec: &VarSpec,
    axes: &MonthAxes,
) -> Result<Option<SurfaceField>, GridError> {
    let Some(var) = schema::resolve(file, spec) else {
        return Ok(None);
    };

    let mut data = var.get_values::<f64, _>(..)?;
    apply_fill_value(&var, &mut data);

    SurfaceField::new(
        spec.canonical,
        Arc::clone(&axes.lats),
        Arc::clone(&axes.lons),
        data,
    )
    .map(Some)
}

/// Replaces `_FillValue` occurrences with NaN so the averaging engine's
/// finiteness filtering covers masked cells.
fn apply_fill_value(var: &netcdf::Variable, data: &mut [f64]) {
    let Some(fill) = fill_value(var) else {
        return;
    };
    for v in data.iter_mut() {
        if *v == fill {
            *v = f64::NAN;
        }
    }
}

fn fill_value(var: &netcdf::Variable) -> Option<f64> {
    let value = var.attribute_value("_FillValue")?.ok()?;
    match value {
        netcdf::AttributeValue::Double(v) => Some(v),
        netcdf::AttributeValue::Float(v) => Some(f64::from(v)),
        _ => None,
    }
}
