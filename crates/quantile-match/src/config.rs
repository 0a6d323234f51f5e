//! Configuration for quantile-matching correction.

use crate::error::QmatchError;

/// Configuration for quantile-matching estimation and application.
///
/// Use the builder methods to customise parameters.
///
/// # Example
///
/// ```
/// use taranis_quantile_match::QmatchConfig;
///
/// let config = QmatchConfig::new()
///     .with_n_quantiles(50)
///     .with_min_group_storms(20);
/// ```
#[derive(Clone, Debug)]
pub struct QmatchConfig {
    n_quantiles: usize,
    intensity_threshold: f64,
    min_group_storms: usize,
}

impl QmatchConfig {
    /// Creates a new configuration with defaults.
    ///
    /// Defaults: `n_quantiles = 100`, `intensity_threshold = 18.0` m/s (the
    /// tropical-storm threshold), `min_group_storms = 10`.
    pub fn new() -> Self {
        Self {
            n_quantiles: 100,
            intensity_threshold: 18.0,
            min_group_storms: 10,
        }
    }

    // --- Builder methods ---

    /// Sets the number of quantile levels used for the mapping.
    pub fn with_n_quantiles(mut self, n: usize) -> Self {
        self.n_quantiles = n;
        self
    }

    /// Sets the minimum intensity (m/s) a storm must reach to participate in
    /// the matched distribution.
    pub fn with_intensity_threshold(mut self, v: f64) -> Self {
        self.intensity_threshold = v;
        self
    }

    /// Sets the minimum number of storms a group needs for its own mapping.
    pub fn with_min_group_storms(mut self, n: usize) -> Self {
        self.min_group_storms = n;
        self
    }

    // --- Accessors ---

    /// Returns the number of quantile levels.
    pub fn n_quantiles(&self) -> usize {
        self.n_quantiles
    }

    /// Returns the intensity threshold in m/s.
    pub fn intensity_threshold(&self) -> f64 {
        self.intensity_threshold
    }

    /// Returns the minimum group size for a group-specific mapping.
    pub fn min_group_storms(&self) -> usize {
        self.min_group_storms
    }

    /// Validates this configuration.
    ///
    /// Checks that `n_quantiles` is at least 2, `intensity_threshold` is
    /// finite and non-negative, and `min_group_storms` is at least 1.
    pub fn validate(&self) -> Result<(), QmatchError> {
        if self.n_quantiles < 2 {
            return Err(QmatchError::InvalidConfig {
                reason: format!("n_quantiles must be >= 2, got {}", self.n_quantiles),
            });
        }

        if !self.intensity_threshold.is_finite() || self.intensity_threshold < 0.0 {
            return Err(QmatchError::InvalidConfig {
                reason: format!(
                    "intensity_threshold must be finite and >= 0, got {}",
                    self.intensity_threshold
                ),
            });
        }

        if self.min_group_storms < 1 {
            return Err(QmatchError::InvalidConfig {
                reason: format!(
                    "min_group_storms must be >= 1, got {}",
                    self.min_group_storms
                ),
            });
        }

        Ok(())
    }
}

impl Default for QmatchConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = QmatchConfig::new();
        assert_eq!(cfg.n_quantiles(), 100);
        assert!((cfg.intensity_threshold() - 18.0).abs() < f64::EPSILON);
        assert_eq!(cfg.min_group_storms(), 10);
    }

    #[test]
    fn builder_chaining() {
        let cfg = QmatchConfig::new()
            .with_n_quantiles(25)
            .with_intensity_threshold(17.0)
            .with_min_group_storms(5);
        assert_eq!(cfg.n_quantiles(), 25);
        assert!((cfg.intensity_threshold() - 17.0).abs() < f64::EPSILON);
        assert_eq!(cfg.min_group_storms(), 5);
    }

    #[test]
    fn validate_ok() {
        assert!(QmatchConfig::new().validate().is_ok());
    }

    #[test]
    fn validate_too_few_quantiles() {
        assert!(QmatchConfig::new().with_n_quantiles(1).validate().is_err());
    }

    #[test]
    fn validate_bad_threshold() {
        assert!(
            QmatchConfig::new()
                .with_intensity_threshold(-1.0)
                .validate()
                .is_err()
        );
        assert!(
            QmatchConfig::new()
                .with_intensity_threshold(f64::NAN)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn validate_zero_min_group() {
        assert!(
            QmatchConfig::new()
                .with_min_group_storms(0)
                .validate()
                .is_err()
        );
    }
}
