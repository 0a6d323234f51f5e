//! Bridges from the TOML configuration to per-crate config types.

use taranis_gridio::CachePolicy;
use taranis_profile::ExtractConfig;
use taranis_quantile_match::QmatchConfig;

use crate::config::{CorrectToml, ExtractToml};

/// Builds the profile-assembly config from the `[extract]` table.
pub fn build_extract_config(toml: &ExtractToml) -> ExtractConfig {
    ExtractConfig::new().with_radius_deg(toml.radius_deg)
}

/// Builds the grid caching policy: 0 retained months means no caching, the
/// deliberate default after the cached design's unbounded memory growth.
pub fn build_cache_policy(cache_months: usize) -> CachePolicy {
    if cache_months == 0 {
        CachePolicy::NoCache
    } else {
        CachePolicy::Lru {
            capacity: cache_months,
        }
    }
}

/// Builds the corrector config from the `[correct]` table.
pub fn build_qmatch_config(toml: &CorrectToml) -> QmatchConfig {
    QmatchConfig::new()
        .with_n_quantiles(toml.n_quantiles)
        .with_intensity_threshold(toml.intensity_threshold)
        .with_min_group_storms(toml.min_group_storms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_months_disables_caching() {
        assert_eq!(build_cache_policy(0), CachePolicy::NoCache);
        assert_eq!(
            build_cache_policy(3),
            CachePolicy::Lru { capacity: 3 }
        );
    }

    #[test]
    fn correct_toml_maps_onto_qmatch_config() {
        let toml = CorrectToml {
            n_quantiles: 40,
            intensity_threshold: 17.0,
            min_group_storms: 12,
        };
        let config = build_qmatch_config(&toml);
        assert_eq!(config.n_quantiles(), 40);
        assert!((config.intensity_threshold() - 17.0).abs() < f64::EPSILON);
        assert_eq!(config.min_group_storms(), 12);
    }
}
