//! Pressure-level sets used during assembly.

/// The 29 ERA5 pressure levels (hPa, 1000 down to 50) fed to the
/// potential-intensity kernel. The kernel requires the full set; a partial
/// profile is never produced.
pub const PI_PRESSURE_LEVELS_HPA: [f64; 29] = [
    1000.0, 975.0, 950.0, 925.0, 900.0, 875.0, 850.0, 825.0, 800.0, 775.0, 750.0, 700.0, 650.0,
    600.0, 550.0, 500.0, 450.0, 400.0, 350.0, 300.0, 250.0, 225.0, 200.0, 175.0, 150.0, 125.0,
    100.0, 70.0, 50.0,
];

/// Diagnostic temperature levels (hPa).
pub const TEMPERATURE_LEVELS_HPA: [f64; 4] = [850.0, 600.0, 250.0, 200.0];

/// Diagnostic wind levels (hPa); 850 and 250 also feed the shear.
pub const WIND_LEVELS_HPA: [f64; 3] = [850.0, 250.0, 200.0];

/// Diagnostic specific-humidity levels (hPa).
pub const HUMIDITY_LEVELS_HPA: [f64; 3] = [850.0, 600.0, 200.0];

/// Level of the mid-tropospheric relative-humidity diagnostic (hPa).
pub const RELATIVE_HUMIDITY_LEVEL_HPA: f64 = 600.0;
