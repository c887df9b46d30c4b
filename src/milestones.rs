//! EU AI Act enforcement timeline
//!
//! Fixed regulatory dates, annotated relative to `now` as active (already in
//! force), due soon, or upcoming.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::deadline::days_until_date;

/// Milestones this many days out (or fewer) are flagged as due soon
pub const DEFAULT_DUE_SOON_DAYS: i64 = 180;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnforcementMilestone {
    pub date: NaiveDate,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

impl EnforcementMilestone {
    fn new(date: NaiveDate, title: &str, description: &str) -> Self {
        Self {
            date,
            title: title.to_string(),
            description: description.to_string(),
        }
    }
}

/// The four EU AI Act application dates
pub fn default_milestones() -> Vec<EnforcementMilestone> {
    [
        (
            (2025, 2, 2),
            "Prohibited Practices & AI Literacy",
            "Ban on prohibited AI practices. AI literacy requirements for providers and deployers.",
        ),
        (
            (2025, 8, 2),
            "GPAI & Governance Rules",
            "General-Purpose AI obligations. EU AI Office governance framework active.",
        ),
        (
            (2026, 8, 2),
            "High-Risk AI Full Compliance",
            "All high-risk AI system obligations enforceable. CE marking, conformity assessment required.",
        ),
        (
            (2027, 8, 2),
            "High-Risk Systems in Regulated Products",
            "High-risk AI in products covered by Annex I must comply.",
        ),
    ]
    .into_iter()
    .filter_map(|((y, m, d), title, description)| {
        NaiveDate::from_ymd_opt(y, m, d)
            .map(|date| EnforcementMilestone::new(date, title, description))
    })
    .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestonePhase {
    /// The date has passed; obligations are in force
    Active,
    DueSoon,
    Upcoming,
}

impl MilestonePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::DueSoon => "due_soon",
            Self::Upcoming => "upcoming",
        }
    }
}

impl std::fmt::Display for MilestonePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneStatus<'a> {
    pub milestone: &'a EnforcementMilestone,
    pub days_until: i64,
    pub phase: MilestonePhase,
}

/// Annotate milestones relative to `now`, in date order
pub fn milestone_timeline(
    milestones: &[EnforcementMilestone],
    now: DateTime<Utc>,
    due_soon_days: i64,
) -> Vec<MilestoneStatus<'_>> {
    let mut timeline: Vec<MilestoneStatus<'_>> = milestones
        .iter()
        .map(|milestone| {
            let days_until = days_until_date(milestone.date, now);
            let phase = if is_past(milestone.date, now) {
                MilestonePhase::Active
            } else if days_until <= due_soon_days {
                MilestonePhase::DueSoon
            } else {
                MilestonePhase::Upcoming
            };
            MilestoneStatus {
                milestone,
                days_until,
                phase,
            }
        })
        .collect();

    timeline.sort_by_key(|status| status.milestone.date);
    timeline
}

fn is_past(date: NaiveDate, now: DateTime<Utc>) -> bool {
    date.and_hms_opt(0, 0, 0).is_some_and(|midnight| midnight.and_utc() < now)
}

/// The first milestone not yet in force
pub fn next_milestone<'a>(
    timeline: &'a [MilestoneStatus<'a>],
) -> Option<&'a MilestoneStatus<'a>> {
    timeline
        .iter()
        .find(|status| status.phase != MilestonePhase::Active)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_default_milestones_are_ordered() {
        let milestones = default_milestones();
        assert_eq!(milestones.len(), 4);
        assert!(milestones.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn test_phases_relative_to_now() {
        let milestones = default_milestones();
        let timeline = milestone_timeline(&milestones, at(2026, 3, 1), DEFAULT_DUE_SOON_DAYS);

        let phases: Vec<MilestonePhase> = timeline.iter().map(|s| s.phase).collect();
        assert_eq!(
            phases,
            vec![
                MilestonePhase::Active,
                MilestonePhase::Active,
                MilestonePhase::DueSoon,
                MilestonePhase::Upcoming,
            ]
        );
        assert!(timeline[0].days_until < 0);
        assert_eq!(timeline[2].days_until, 154);
    }

    #[test]
    fn test_milestone_on_the_day_is_active() {
        let milestones = default_milestones();
        let timeline = milestone_timeline(&milestones, at(2026, 8, 2), DEFAULT_DUE_SOON_DAYS);

        assert_eq!(timeline[2].phase, MilestonePhase::Active);
        assert_eq!(timeline[2].days_until, 0);
    }

    #[test]
    fn test_timeline_sorts_custom_milestones() {
        let milestones = vec![
            EnforcementMilestone::new(NaiveDate::from_ymd_opt(2031, 1, 1).unwrap(), "Late", ""),
            EnforcementMilestone::new(NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(), "Early", ""),
        ];
        let timeline = milestone_timeline(&milestones, at(2026, 1, 1), 30);

        assert_eq!(timeline[0].milestone.title, "Early");
        assert!(timeline.iter().all(|s| s.phase == MilestonePhase::Upcoming));
    }

    #[test]
    fn test_next_milestone() {
        let milestones = default_milestones();
        let timeline = milestone_timeline(&milestones, at(2026, 3, 1), DEFAULT_DUE_SOON_DAYS);
        let next = next_milestone(&timeline).unwrap();
        assert_eq!(next.milestone.title, "High-Risk AI Full Compliance");

        let timeline = milestone_timeline(&milestones, at(2028, 1, 1), DEFAULT_DUE_SOON_DAYS);
        assert!(next_milestone(&timeline).is_none());
    }
}
