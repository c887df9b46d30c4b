//! AI system inventory summary
//!
//! Counts registered systems by risk classification and compliance status.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::types::{AiSystemRecord, RiskTier, COMPLIANT, UNCLASSIFIED};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventorySummary {
    pub total: usize,
    /// Known tiers are always present (possibly zero); unknown ones appear when seen
    pub by_classification: BTreeMap<String, usize>,
    /// Absent statuses are counted as `not-started`
    pub by_status: BTreeMap<String, usize>,
    pub high_risk: usize,
    pub compliant: usize,
    pub unclassified: usize,
    pub compliant_percent: u32,
}

impl InventorySummary {
    pub fn from_systems(systems: &[AiSystemRecord]) -> Self {
        let mut by_classification: BTreeMap<String, usize> = RiskTier::ALL
            .iter()
            .map(|tier| (tier.as_str().to_string(), 0))
            .collect();
        let mut by_status: BTreeMap<String, usize> = BTreeMap::new();

        for system in systems {
            *by_classification
                .entry(system.risk_classification.clone())
                .or_default() += 1;
            *by_status
                .entry(system.effective_status().to_string())
                .or_default() += 1;
        }

        let total = systems.len();
        let compliant = by_status.get(COMPLIANT).copied().unwrap_or(0);
        let compliant_percent = if total == 0 {
            0
        } else {
            (compliant as f64 / total as f64 * 100.0).round() as u32
        };

        Self {
            total,
            high_risk: by_classification
                .get(RiskTier::HighRisk.as_str())
                .copied()
                .unwrap_or(0),
            unclassified: by_classification.get(UNCLASSIFIED).copied().unwrap_or(0),
            by_classification,
            by_status,
            compliant,
            compliant_percent,
        }
    }

    /// Systems that still need a risk assessment before they get a roadmap
    pub fn needs_assessment(&self) -> usize {
        self.unclassified
    }
}
