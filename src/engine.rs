//! Roadmap Engine
//!
//! Expands (system, obligation) pairs into roadmap tasks and derives urgency,
//! completion and per-system progress from them.
//!
//! The engine is a pure function of its inputs and of the `now` it is handed.
//! It keeps no state between calls, so it is safe to call concurrently and to
//! re-run on every change to either input collection.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;
use tracing::{debug, warn};

use crate::config::RoadmapConfig;
use crate::deadline::{days_remaining, parse_deadline};
use crate::error::{Result, RoadmapError};
use crate::types::{AiSystemRecord, Obligation, COMPLIANT, DEFAULT_URGENCY_WINDOW_DAYS};

/// One unit of compliance work: a system paired with an applicable obligation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapTask<'a> {
    /// `"{system.id}-{obligation.id}"`
    pub id: String,
    pub system: &'a AiSystemRecord,
    pub obligation: &'a Obligation,
    /// `None` when the obligation deadline could not be parsed
    pub deadline: Option<DateTime<Utc>>,
    /// The owning system's compliance status, applied to every task it owns
    pub status: &'a str,
    /// `None` when the obligation deadline could not be parsed
    pub days_remaining: Option<i64>,
}

impl RoadmapTask<'_> {
    pub fn is_completed(&self) -> bool {
        self.status == COMPLIANT
    }

    pub fn is_overdue(&self) -> bool {
        matches!(self.days_remaining, Some(days) if days < 0)
    }

    /// Not yet compliant and due within `window_days` (overdue included)
    pub fn is_urgent(&self, window_days: i64) -> bool {
        !self.is_completed() && matches!(self.days_remaining, Some(days) if days < window_days)
    }
}

/// Progress rollup for a single classified system
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemProgress<'a> {
    pub system: &'a AiSystemRecord,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    /// Percentage in `0.0..=100.0`, unrounded
    pub progress: f64,
    pub urgent_tasks: usize,
}

/// The full derived roadmap view
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapStats<'a> {
    /// Every task, ascending by deadline
    pub all_tasks: Vec<RoadmapTask<'a>>,
    pub urgent_tasks: Vec<RoadmapTask<'a>>,
    pub completed_count: usize,
    pub overdue_count: usize,
    pub progress_percent: u32,
    pub system_progress: Vec<SystemProgress<'a>>,
}

impl<'a> RoadmapStats<'a> {
    pub fn is_empty(&self) -> bool {
        self.all_tasks.is_empty()
    }

    /// Tasks owned by the given system, in roadmap order
    pub fn tasks_for_system<'s>(
        &'s self,
        system_id: &'s str,
    ) -> impl Iterator<Item = &'s RoadmapTask<'a>> + 's {
        self.all_tasks
            .iter()
            .filter(move |task| task.system.id == system_id)
    }
}

/// Computes roadmaps with a fixed urgency window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoadmapEngine {
    urgency_window_days: i64,
}

impl Default for RoadmapEngine {
    fn default() -> Self {
        Self {
            urgency_window_days: DEFAULT_URGENCY_WINDOW_DAYS,
        }
    }
}

impl RoadmapEngine {
    /// Fails unless the window is a positive number of days
    pub fn new(urgency_window_days: i64) -> Result<Self> {
        if urgency_window_days <= 0 {
            return Err(RoadmapError::Config(format!(
                "urgency_window_days must be positive, got {}",
                urgency_window_days
            )));
        }
        Ok(Self {
            urgency_window_days,
        })
    }

    pub fn from_config(config: &RoadmapConfig) -> Result<Self> {
        Self::new(config.urgency_window_days)
    }

    pub fn urgency_window_days(&self) -> i64 {
        self.urgency_window_days
    }

    /// Expand every classified system into one task per applicable obligation.
    ///
    /// The result is stable-sorted by deadline; tasks without a parseable
    /// deadline trail the dated ones in input order.
    pub fn expand_tasks<'a>(
        &self,
        systems: &'a [AiSystemRecord],
        obligations: &'a [Obligation],
        now: DateTime<Utc>,
    ) -> Vec<RoadmapTask<'a>> {
        let deadlines: Vec<Option<DateTime<Utc>>> = obligations
            .iter()
            .map(|obligation| {
                let parsed = obligation.deadline.as_deref().and_then(parse_deadline);
                if parsed.is_none() {
                    warn!(
                        obligation_id = %obligation.id,
                        deadline = ?obligation.deadline,
                        "Obligation deadline is not a valid date; task excluded from urgency"
                    );
                }
                parsed
            })
            .collect();

        let mut tasks = Vec::new();
        for system in systems.iter().filter(|s| s.is_classified()) {
            let status = system.effective_status();
            for (obligation, &deadline) in obligations.iter().zip(&deadlines) {
                if !obligation.applies_to(&system.risk_classification) {
                    continue;
                }
                tasks.push(RoadmapTask {
                    id: format!("{}-{}", system.id, obligation.id),
                    system,
                    obligation,
                    deadline,
                    status,
                    days_remaining: deadline.map(|d| days_remaining(d, now)),
                });
            }
        }

        // Vec::sort_by is stable, which keeps equal deadlines in input order
        tasks.sort_by(|a, b| compare_deadlines(a.deadline, b.deadline));
        tasks
    }

    /// Compute the full roadmap view for a snapshot of systems and obligations
    pub fn compute<'a>(
        &self,
        systems: &'a [AiSystemRecord],
        obligations: &'a [Obligation],
        now: DateTime<Utc>,
    ) -> RoadmapStats<'a> {
        let all_tasks = self.expand_tasks(systems, obligations, now);

        let urgent_tasks: Vec<RoadmapTask<'a>> = all_tasks
            .iter()
            .filter(|task| task.is_urgent(self.urgency_window_days))
            .cloned()
            .collect();
        let completed_count = all_tasks.iter().filter(|t| t.is_completed()).count();
        let overdue_count = all_tasks.iter().filter(|t| t.is_overdue()).count();
        let progress_percent = percent(completed_count, all_tasks.len()).round() as u32;

        let system_progress = systems
            .iter()
            .filter(|s| s.is_classified())
            .map(|system| self.system_progress(system, &all_tasks))
            .collect();

        debug!(
            systems = systems.len(),
            obligations = obligations.len(),
            tasks = all_tasks.len(),
            urgent = urgent_tasks.len(),
            overdue = overdue_count,
            "Computed compliance roadmap"
        );

        RoadmapStats {
            all_tasks,
            urgent_tasks,
            completed_count,
            overdue_count,
            progress_percent,
            system_progress,
        }
    }

    fn system_progress<'a>(
        &self,
        system: &'a AiSystemRecord,
        all_tasks: &[RoadmapTask<'a>],
    ) -> SystemProgress<'a> {
        let mut total_tasks = 0;
        let mut completed_tasks = 0;
        let mut urgent_tasks = 0;

        for task in all_tasks.iter().filter(|t| t.system.id == system.id) {
            total_tasks += 1;
            if task.is_completed() {
                completed_tasks += 1;
            }
            if task.is_urgent(self.urgency_window_days) {
                urgent_tasks += 1;
            }
        }

        SystemProgress {
            system,
            total_tasks,
            completed_tasks,
            progress: percent(completed_tasks, total_tasks),
            urgent_tasks,
        }
    }
}

/// Compute the roadmap with the default 90-day urgency window
pub fn compute_roadmap<'a>(
    systems: &'a [AiSystemRecord],
    obligations: &'a [Obligation],
    now: DateTime<Utc>,
) -> RoadmapStats<'a> {
    RoadmapEngine::default().compute(systems, obligations, now)
}

fn compare_deadlines(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
