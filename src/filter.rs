//! Inventory and task filters
//!
//! A constraint of `None` or `"all"` matches everything.

use serde::{Deserialize, Serialize};

use crate::engine::RoadmapTask;
use crate::types::AiSystemRecord;

const MATCH_ALL: &str = "all";

fn constrained(value: Option<&str>) -> Option<&str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && *v != MATCH_ALL)
}

/// Filter over registered systems: free-text search plus classification and status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemFilter {
    pub search: Option<String>,
    pub classification: Option<String>,
    pub status: Option<String>,
}

impl SystemFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_classification(mut self, classification: impl Into<String>) -> Self {
        self.classification = Some(classification.into());
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn is_active(&self) -> bool {
        constrained(self.search.as_deref()).is_some()
            || constrained(self.classification.as_deref()).is_some()
            || constrained(self.status.as_deref()).is_some()
    }

    pub fn matches(&self, system: &AiSystemRecord) -> bool {
        let matches_search = match constrained(self.search.as_deref()) {
            None => true,
            Some(term) => {
                let term = term.to_lowercase();
                [
                    Some(system.name.as_str()),
                    system.purpose.as_deref(),
                    system.description.as_deref(),
                ]
                .into_iter()
                .flatten()
                .any(|field| field.to_lowercase().contains(&term))
            }
        };
        let matches_class = constrained(self.classification.as_deref())
            .is_none_or(|class| system.risk_classification == class);
        let matches_status = constrained(self.status.as_deref())
            .is_none_or(|status| system.compliance_status.as_deref() == Some(status));

        matches_search && matches_class && matches_status
    }

    /// Matching systems, in input order
    pub fn apply<'a>(&self, systems: &'a [AiSystemRecord]) -> Vec<&'a AiSystemRecord> {
        systems.iter().filter(|s| self.matches(s)).collect()
    }
}

/// Filter over roadmap tasks by status and owning system
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFilter {
    pub status: Option<String>,
    pub system_id: Option<String>,
}

impl TaskFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_system(mut self, system_id: impl Into<String>) -> Self {
        self.system_id = Some(system_id.into());
        self
    }

    pub fn matches(&self, task: &RoadmapTask<'_>) -> bool {
        constrained(self.status.as_deref()).is_none_or(|status| task.status == status)
            && constrained(self.system_id.as_deref()).is_none_or(|id| task.system.id == id)
    }

    pub fn apply<'t, 'a>(&self, tasks: &'t [RoadmapTask<'a>]) -> Vec<&'t RoadmapTask<'a>> {
        tasks.iter().filter(|t| self.matches(t)).collect()
    }
}
