//! Correction output and provenance structures.

use std::collections::BTreeMap;

use serde::Serialize;

/// Which mapping a group of storms was corrected with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupStrategy {
    /// The group had enough storms and its own fit succeeded.
    GroupSpecific,
    /// The group had too few storms; the overall mapping was used.
    UsedOverallMapping,
    /// The group-specific fit failed; the overall mapping was used.
    FallbackOverall,
    /// Ungrouped correction: one mapping over the whole population.
    Overall,
}

impl GroupStrategy {
    /// Stable string form used in provenance records and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupStrategy::GroupSpecific => "group_specific",
            GroupStrategy::UsedOverallMapping => "used_overall_mapping",
            GroupStrategy::FallbackOverall => "fallback_overall",
            GroupStrategy::Overall => "overall",
        }
    }
}

impl std::fmt::Display for GroupStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record of which mapping strategy corrected each group.
///
/// Traceability is a required property of grouped correction, not optional
/// logging: every group's chosen strategy appears in `mappings`.
#[derive(Debug, Clone, Serialize)]
pub struct CorrectionProvenance {
    /// Correction method identifier.
    pub method: String,
    /// The grouping dimension ("all", "basin", "enso_phase").
    pub group_by: String,
    /// Strategy chosen per group key.
    pub mappings: BTreeMap<String, GroupStrategy>,
}

impl CorrectionProvenance {
    pub(crate) fn new(group_by: &str) -> Self {
        Self {
            method: "quantile_matching".to_string(),
            group_by: group_by.to_string(),
            mappings: BTreeMap::new(),
        }
    }
}

/// Corrected intensities together with their provenance.
#[derive(Debug, Clone)]
pub struct CorrectionResult {
    corrected: Vec<f64>,
    provenance: CorrectionProvenance,
}

impl CorrectionResult {
    pub(crate) fn new(corrected: Vec<f64>, provenance: CorrectionProvenance) -> Self {
        Self {
            corrected,
            provenance,
        }
    }

    /// Corrected LMI values, in the input storm order.
    pub fn corrected(&self) -> &[f64] {
        &self.corrected
    }

    /// The per-group strategy record.
    pub fn provenance(&self) -> &CorrectionProvenance {
        &self.provenance
    }

    /// Consumes the result, returning its parts.
    pub fn into_parts(self) -> (Vec<f64>, CorrectionProvenance) {
        (self.corrected, self.provenance)
    }
}
