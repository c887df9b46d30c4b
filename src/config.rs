//! Configuration loader
//!
//! Loads the roadmap configuration (`roadmap.yaml`) from a config directory.
//! Every field has a default, so a missing file yields the stock EU AI Act
//! setup rather than an error.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{Result, RoadmapError};
use crate::milestones::{default_milestones, EnforcementMilestone, DEFAULT_DUE_SOON_DAYS};
use crate::types::DEFAULT_URGENCY_WINDOW_DAYS;

pub const CONFIG_DIR_ENV: &str = "SENTINEL_CONFIG_DIR";
pub const CONFIG_FILE_NAME: &str = "roadmap.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoadmapConfig {
    /// Non-compliant tasks due in fewer days than this are urgent
    pub urgency_window_days: i64,
    /// Milestones this close are flagged as due soon
    pub due_soon_days: i64,
    pub milestones: Vec<EnforcementMilestone>,
}

impl Default for RoadmapConfig {
    fn default() -> Self {
        Self {
            urgency_window_days: DEFAULT_URGENCY_WINDOW_DAYS,
            due_soon_days: DEFAULT_DUE_SOON_DAYS,
            milestones: default_milestones(),
        }
    }
}

impl RoadmapConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: RoadmapConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.urgency_window_days <= 0 {
            return Err(RoadmapError::Config(format!(
                "urgency_window_days must be positive, got {}",
                self.urgency_window_days
            )));
        }
        if self.due_soon_days <= 0 {
            return Err(RoadmapError::Config(format!(
                "due_soon_days must be positive, got {}",
                self.due_soon_days
            )));
        }
        if let Some(m) = self.milestones.iter().find(|m| m.title.trim().is_empty()) {
            return Err(RoadmapError::Config(format!(
                "milestone dated {} has no title",
                m.date
            )));
        }
        Ok(())
    }
}

pub struct ConfigLoader {
    config_dir: PathBuf,
}

impl ConfigLoader {
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
        }
    }

    /// Create loader from SENTINEL_CONFIG_DIR env var or default to "config"
    pub fn from_env() -> Self {
        let dir = std::env::var(CONFIG_DIR_ENV).unwrap_or_else(|_| "config".to_string());
        Self::new(dir)
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Load `roadmap.yaml`, falling back to defaults when it does not exist
    pub fn load_roadmap(&self) -> Result<RoadmapConfig> {
        let path = self.config_dir.join(CONFIG_FILE_NAME);
        if !path.exists() {
            info!(
                "No roadmap configuration at {}, using defaults",
                path.display()
            );
            return Ok(RoadmapConfig::default());
        }

        info!("Loading roadmap configuration from {}", path.display());
        let content = std::fs::read_to_string(&path)?;
        let config = RoadmapConfig::from_yaml_str(&content).map_err(|e| match e {
            RoadmapError::Yaml(err) => {
                RoadmapError::Config(format!("Failed to parse {}: {}", path.display(), err))
            }
            other => other,
        })?;

        info!(
            "Loaded roadmap configuration: {}-day urgency window, {} milestones",
            config.urgency_window_days,
            config.milestones.len()
        );
        Ok(config)
    }
}
