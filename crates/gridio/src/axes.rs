//! Per-month coordinate axis cache.
//!
//! Coordinate arrays are identical for every field of a (month, category)
//! and for every reload of that month under the no-cache policy. The cache
//! is populated at most once per key behind a mutex and only read
//! afterwards; it is owned by one [`crate::GridManager`] (and therefore one
//! extraction run), not shared process-wide.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::GridError;

/// Which of the three grid categories a file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GridCategory {
    /// Atmospheric multi-level fields.
    PressureLevels,
    /// Atmospheric single-level fields.
    SingleLevel,
    /// Ocean temperature profile fields.
    Ocean,
}

impl GridCategory {
    /// Stable name used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            GridCategory::PressureLevels => "pressure_levels",
            GridCategory::SingleLevel => "single_level",
            GridCategory::Ocean => "ocean",
        }
    }
}

/// Shared coordinate axes for one (month, category).
#[derive(Debug, Clone)]
pub struct MonthAxes {
    /// Latitude axis in degrees north.
    pub lats: Arc<Vec<f64>>,
    /// Longitude axis in the grid's native convention.
    pub lons: Arc<Vec<f64>>,
    /// Vertical axis: pressure (hPa) or depth (m); absent for single-level.
    pub levels: Option<Arc<Vec<f64>>>,
}

/// Mutex-guarded populate-once cache of [`MonthAxes`].
#[derive(Debug, Default)]
pub struct AxisCache {
    inner: Mutex<HashMap<(i32, u8, GridCategory), Arc<MonthAxes>>>,
}

impl AxisCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached axes for the key, loading them with `load` under
    /// the lock if absent. The axes for a key are loaded at most once per
    /// cache lifetime.
    pub fn get_or_populate(
        &self,
        year: i32,
        month: u8,
        category: GridCategory,
        load: impl FnOnce() -> Result<MonthAxes, GridError>,
    ) -> Result<Arc<MonthAxes>, GridError> {
        let mut guard = self.inner.lock().expect("axis cache lock poisoned");
        if let Some(axes) = guard.get(&(year, month, category)) {
            return Ok(Arc::clone(axes));
        }
        let axes = Arc::new(load()?);
        guard.insert((year, month, category), Arc::clone(&axes));
        Ok(axes)
    }

    /// Number of cached (month, category) keys.
    pub fn len(&self) -> usize {
        self.inner.lock().expect("axis cache lock poisoned").len()
    }

    /// Whether the cache holds no axes yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_axes() -> MonthAxes {
        MonthAxes {
            lats: Arc::new(vec![0.0, 1.0]),
            lons: Arc::new(vec![10.0, 11.0]),
            levels: None,
        }
    }

    #[test]
    fn populates_once_per_key() {
        let cache = AxisCache::new();
        let mut calls = 0;

        for _ in 0..3 {
            cache
                .get_or_populate(2001, 6, GridCategory::SingleLevel, || {
                    calls += 1;
                    Ok(sample_axes())
                })
                .unwrap();
        }
        assert_eq!(calls, 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn distinct_keys_populate_separately() {
        let cache = AxisCache::new();
        for category in [
            GridCategory::PressureLevels,
            GridCategory::SingleLevel,
            GridCategory::Ocean,
        ] {
            cache
                .get_or_populate(2001, 6, category, || Ok(sample_axes()))
                .unwrap();
        }
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn load_failure_is_not_cached() {
        let cache = AxisCache::new();
        let err = cache.get_or_populate(2001, 6, GridCategory::Ocean, || {
            Err(GridError::MissingGridData {
                year: 2001,
                month: 6,
            })
        });
        assert!(err.is_err());
        assert!(cache.is_empty());

        // A later successful populate still works.
        cache
            .get_or_populate(2001, 6, GridCategory::Ocean, || Ok(sample_axes()))
            .unwrap();
        assert_eq!(cache.len(), 1);
    }
}
