//! Configuration for profile assembly.

use crate::levels::PI_PRESSURE_LEVELS_HPA;

/// Configuration for the profile assembler.
///
/// # Example
///
/// ```
/// use taranis_profile::ExtractConfig;
///
/// let config = ExtractConfig::new().with_radius_deg(2.0);
/// assert_eq!(config.pi_levels_hpa().len(), 29);
/// ```
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    radius_deg: f64,
    pi_levels_hpa: Vec<f64>,
    mld_delta_t_c: f64,
    stratification_layer_m: f64,
}

impl ExtractConfig {
    /// Creates a configuration with defaults: averaging radius 2.5 degrees,
    /// the 29 ERA5 PI levels, a 0.5 degree C mixed-layer criterion, and a
    /// 100 m stratification layer.
    pub fn new() -> Self {
        Self {
            radius_deg: 2.5,
            pi_levels_hpa: PI_PRESSURE_LEVELS_HPA.to_vec(),
            mld_delta_t_c: 0.5,
            stratification_layer_m: 100.0,
        }
    }

    // --- Builder methods ---

    /// Sets the disk-averaging radius in degrees.
    pub fn with_radius_deg(mut self, radius: f64) -> Self {
        self.radius_deg = radius;
        self
    }

    /// Sets the pressure levels (hPa, descending) of the PI triplet.
    pub fn with_pi_levels_hpa(mut self, levels: Vec<f64>) -> Self {
        self.pi_levels_hpa = levels;
        self
    }

    /// Sets the mixed-layer temperature-difference criterion (degrees C).
    pub fn with_mld_delta_t_c(mut self, delta: f64) -> Self {
        self.mld_delta_t_c = delta;
        self
    }

    /// Sets the depth window below the mixed layer used for stratification.
    pub fn with_stratification_layer_m(mut self, layer: f64) -> Self {
        self.stratification_layer_m = layer;
        self
    }

    // --- Accessors ---

    /// Disk-averaging radius in degrees.
    pub fn radius_deg(&self) -> f64 {
        self.radius_deg
    }

    /// Pressure levels of the PI triplet (hPa, descending).
    pub fn pi_levels_hpa(&self) -> &[f64] {
        &self.pi_levels_hpa
    }

    /// Mixed-layer temperature-difference criterion (degrees C).
    pub fn mld_delta_t_c(&self) -> f64 {
        self.mld_delta_t_c
    }

    /// Stratification layer thickness (m).
    pub fn stratification_layer_m(&self) -> f64 {
        self.stratification_layer_m
    }
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = ExtractConfig::new();
        assert!((cfg.radius_deg() - 2.5).abs() < f64::EPSILON);
        assert_eq!(cfg.pi_levels_hpa().len(), 29);
        assert!((cfg.mld_delta_t_c() - 0.5).abs() < f64::EPSILON);
        assert!((cfg.stratification_layer_m() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn builder_chaining() {
        let cfg = ExtractConfig::new()
            .with_radius_deg(1.5)
            .with_pi_levels_hpa(vec![1000.0, 500.0, 200.0])
            .with_mld_delta_t_c(0.2);
        assert!((cfg.radius_deg() - 1.5).abs() < f64::EPSILON);
        assert_eq!(cfg.pi_levels_hpa(), &[1000.0, 500.0, 200.0]);
        assert!((cfg.mld_delta_t_c() - 0.2).abs() < f64::EPSILON);
    }
}
