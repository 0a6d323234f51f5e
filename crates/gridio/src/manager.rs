//! The monthly grid resource manager.
//!
//! Grids are acquired per (year, month), used for every observation in that
//! month, and released before the next month is requested, bounding peak
//! resident grid memory. The caching policy is explicit and pluggable:
//! the default is no caching at all — an earlier cached design accumulated
//! months without bound — with an optional bounded LRU for workloads that
//! revisit months.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use crate::axes::AxisCache;
use crate::error::GridError;
use crate::monthly::{
    MonthlyGridSet, load_ocean, load_pressure_levels, load_single_level,
};

/// How acquired month-sets are retained across `release` calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Load fresh on every acquire; release frees the set immediately.
    NoCache,
    /// Retain at most `capacity` released month-sets, evicting the least
    /// recently used on overflow.
    Lru {
        /// Maximum number of month-sets kept resident.
        capacity: usize,
    },
}

/// Resolves, loads, and releases [`MonthlyGridSet`]s.
pub struct GridManager {
    root: PathBuf,
    policy: CachePolicy,
    axes: AxisCache,
    /// Released sets retained under [`CachePolicy::Lru`]; most recent at the
    /// back.
    cache: Mutex<VecDeque<((i32, u8), Arc<MonthlyGridSet>)>>,
}

impl GridManager {
    /// Creates a manager over the monthly data tree rooted at `root`.
    pub fn new(root: impl Into<PathBuf>, policy: CachePolicy) -> Self {
        Self {
            root: root.into(),
            policy,
            axes: AxisCache::new(),
            cache: Mutex::new(VecDeque::new()),
        }
    }

    /// The data tree root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The active caching policy.
    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    /// Expected pressure-level file path for a month.
    pub fn pressure_level_path(&self, year: i32, month: u8) -> PathBuf {
        self.root
            .join("era5")
            .join("pressure_levels")
            .join(format!("era5_monthly_plev_{year}_{month:02}.nc"))
    }

    /// Expected single-level file path for a month.
    pub fn single_level_path(&self, year: i32, month: u8) -> PathBuf {
        self.root
            .join("era5")
            .join("single_level")
            .join(format!("era5_monthly_sl_{year}_{month:02}.nc"))
    }

    /// Expected ocean file path for a month.
    pub fn ocean_path(&self, year: i32, month: u8) -> PathBuf {
        self.root
            .join("oras5")
            .join(format!("oras5_monthly_{year}_{month:02}.nc"))
    }

    /// Acquires the grids for (`year`, `month`).
    ///
    /// Loads whichever of the three category files exist. A file that exists
    /// but fails to load is logged and treated as absent. Grids are never
    /// fabricated: if no category can be produced the month is reported as
    /// [`GridError::MissingGridData`], a recoverable condition.
    pub fn acquire(&self, year: i32, month: u8) -> Result<Arc<MonthlyGridSet>, GridError> {
        if let Some(cached) = self.take_cached(year, month) {
            debug!(year, month, "grid cache hit");
            return Ok(cached);
        }

        let plev_path = self.pressure_level_path(year, month);
        let sl_path = self.single_level_path(year, month);
        let ocean_path = self.ocean_path(year, month);

        if !plev_path.exists() && !sl_path.exists() && !ocean_path.exists() {
            return Err(GridError::MissingGridData { year, month });
        }

        let pressure = if plev_path.exists() {
            match load_pressure_levels(&plev_path, year, month, &self.axes) {
                Ok(grids) => Some(grids),
                Err(e) => {
                    warn!(year, month, error = %e, "failed to load pressure-level grids");
                    None
                }
            }
        } else {
            None
        };

        let single = if sl_path.exists() {
            match load_single_level(&sl_path, year, month, &self.axes) {
                Ok(grids) => Some(grids),
                Err(e) => {
                    warn!(year, month, error = %e, "failed to load single-level grids");
                    None
                }
            }
        } else {
            None
        };

        let ocean = if ocean_path.exists() {
            match load_ocean(&ocean_path, year, month, &self.axes) {
                Ok(grids) => Some(grids),
                Err(e) => {
                    warn!(year, month, error = %e, "failed to load ocean grids");
                    None
                }
            }
        } else {
            None
        };

        let set = MonthlyGridSet::new(year, month, pressure, single, ocean);
        if set.is_empty() {
            return Err(GridError::MissingGridData { year, month });
        }

        debug!(
            year,
            month,
            pressure = set.pressure().is_some(),
            single = set.single().is_some(),
            ocean = set.ocean().is_some(),
            "monthly grids loaded"
        );
        Ok(Arc::new(set))
    }

    /// Releases a set acquired from this manager.
    ///
    /// Under [`CachePolicy::NoCache`] the set is dropped here; its memory is
    /// freed as soon as the caller holds no other reference (the underlying
    /// file handles are already closed at load time). Under
    /// [`CachePolicy::Lru`] the set moves into the bounded cache, evicting
    /// the least recently used month on overflow.
    pub fn release(&self, set: Arc<MonthlyGridSet>) {
        match self.policy {
            CachePolicy::NoCache => {
                debug!(year = set.year(), month = set.month(), "releasing grids");
                drop(set);
            }
            CachePolicy::Lru { capacity } => {
                let key = (set.year(), set.month());
                let mut cache = self.cache.lock().expect("grid cache lock poisoned");
                cache.retain(|(k, _)| *k != key);
                cache.push_back((key, set));
                while cache.len() > capacity {
                    if let Some(((year, month), _)) = cache.pop_front() {
                        debug!(year, month, "evicting least recently used month");
                    }
                }
            }
        }
    }

    /// Number of month-sets currently retained by the cache.
    pub fn n_cached(&self) -> usize {
        self.cache.lock().expect("grid cache lock poisoned").len()
    }

    fn take_cached(&self, year: i32, month: u8) -> Option<Arc<MonthlyGridSet>> {
        let mut cache = self.cache.lock().expect("grid cache lock poisoned");
        let pos = cache.iter().position(|(k, _)| *k == (year, month))?;
        let (_, set) = cache.remove(pos)?;
        Some(set)
    }
}
