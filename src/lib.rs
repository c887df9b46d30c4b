//! Sentinel compliance roadmap
//!
//! Derives the EU AI Act compliance roadmap for a set of registered AI
//! systems:
//! - Obligation-to-task expansion with deadline ordering
//! - Urgency, overdue and completion rollups
//! - Per-system progress
//! - Enforcement milestone timeline and inventory summary
//!
//! The [`engine`] is pure; [`service`] wraps it with concurrent loading from
//! a [`source`] and last-known-good state.

pub mod config;
pub mod deadline;
pub mod engine;
pub mod error;
pub mod filter;
pub mod inventory;
pub mod milestones;
pub mod service;
pub mod source;
pub mod types;

pub use config::{ConfigLoader, RoadmapConfig};
pub use engine::{compute_roadmap, RoadmapEngine, RoadmapStats, RoadmapTask, SystemProgress};
pub use error::{Result, RoadmapError, SourceError};
pub use filter::{SystemFilter, TaskFilter};
pub use inventory::InventorySummary;
pub use milestones::{
    default_milestones, milestone_timeline, next_milestone, EnforcementMilestone,
    MilestonePhase, MilestoneStatus,
};
pub use service::{RoadmapService, RoadmapSnapshot, RoadmapState};
pub use source::{FileSource, ObligationCatalog, OrgScope, SystemRegistry};
pub use types::{AiSystemRecord, Obligation, RiskTier};
