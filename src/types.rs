//! Roadmap Input Types
//!
//! Records supplied by the AI system registry and the obligation catalog.
//! Both are consumed read-only; the engine never writes them back.

use serde::{Deserialize, Deserializer, Serialize};

/// Risk classification meaning "not yet assessed"; such systems get no roadmap
pub const UNCLASSIFIED: &str = "unclassified";

/// Obligation risk category that applies to every classified system
pub const ALL_CATEGORIES: &str = "all";

/// The only compliance status treated as satisfied
pub const COMPLIANT: &str = "compliant";

/// Status materialized for systems without a compliance status
pub const NOT_STARTED: &str = "not-started";

/// Tasks due in fewer days than this are urgent
pub const DEFAULT_URGENCY_WINDOW_DAYS: i64 = 90;

/// Risk tiers a registry is known to emit.
///
/// The engine matches classifications as plain strings so unknown tiers pass
/// through untouched; this enum only names the ones reported on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RiskTier {
    Unclassified,
    MinimalRisk,
    LimitedRisk,
    HighRisk,
    UnacceptableRisk,
}

impl RiskTier {
    pub const ALL: [RiskTier; 5] = [
        Self::Unclassified,
        Self::MinimalRisk,
        Self::LimitedRisk,
        Self::HighRisk,
        Self::UnacceptableRisk,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unclassified => UNCLASSIFIED,
            Self::MinimalRisk => "minimal-risk",
            Self::LimitedRisk => "limited-risk",
            Self::HighRisk => "high-risk",
            Self::UnacceptableRisk => "unacceptable-risk",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tier| tier.as_str() == s)
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A registered AI system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiSystemRecord {
    /// Opaque unique identifier
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Owning organization; used by sources to scope the registry per tenant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
    /// Regulatory risk tier, matched verbatim against obligation categories
    #[serde(
        default = "default_classification",
        deserialize_with = "null_as_unclassified"
    )]
    pub risk_classification: String,
    /// Free-form status; only `"compliant"` is meaningful to the engine
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compliance_status: Option<String>,
}

fn default_classification() -> String {
    UNCLASSIFIED.to_string()
}

// Registry rows carry `null` for unset columns; treat it like an absent key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_unclassified<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_classification))
}

impl AiSystemRecord {
    /// Create a system with the given classification and no status
    pub fn new(id: impl Into<String>, risk_classification: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            purpose: None,
            description: None,
            organization_id: None,
            risk_classification: risk_classification.into(),
            compliance_status: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.compliance_status = Some(status.into());
        self
    }

    pub fn with_organization(mut self, organization_id: impl Into<String>) -> Self {
        self.organization_id = Some(organization_id.into());
        self
    }

    pub fn is_classified(&self) -> bool {
        self.risk_classification != UNCLASSIFIED
    }

    /// Status as reported on tasks: the raw status, or `"not-started"` when absent
    pub fn effective_status(&self) -> &str {
        self.compliance_status.as_deref().unwrap_or(NOT_STARTED)
    }

    pub fn is_compliant(&self) -> bool {
        self.effective_status() == COMPLIANT
    }
}

/// A regulatory obligation with a fixed deadline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obligation {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub obligation_title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub article_reference: String,
    /// `"all"` or a risk classification string; empty never matches
    #[serde(default, deserialize_with = "null_as_default")]
    pub risk_category: String,
    /// Raw ISO-8601 deadline, parsed by the engine. Missing or `null`
    /// deadlines are kept and treated like unparseable ones.
    #[serde(default)]
    pub deadline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
}

impl Obligation {
    pub fn new(
        id: impl Into<String>,
        risk_category: impl Into<String>,
        deadline: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            obligation_title: String::new(),
            description: String::new(),
            article_reference: String::new(),
            risk_category: risk_category.into(),
            deadline: Some(deadline.into()),
            priority: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.obligation_title = title.into();
        self
    }

    /// Whether this obligation applies to a system with the given classification.
    ///
    /// Unknown or empty categories simply never match.
    pub fn applies_to(&self, risk_classification: &str) -> bool {
        if self.risk_category.is_empty() {
            return false;
        }
        self.risk_category == ALL_CATEGORIES || self.risk_category == risk_classification
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_defaults_from_json() {
        let system: AiSystemRecord = serde_json::from_str(r#"{"id": "s1"}"#).unwrap();

        assert_eq!(system.risk_classification, UNCLASSIFIED);
        assert!(!system.is_classified());
        assert_eq!(system.effective_status(), NOT_STARTED);
        assert!(!system.is_compliant());
    }

    #[test]
    fn test_null_columns_fall_back_to_defaults() {
        let system: AiSystemRecord = serde_json::from_str(
            r#"{"id": "s1", "name": null, "purpose": null, "risk_classification": null, "compliance_status": null}"#,
        )
        .unwrap();
        assert_eq!(system.name, "");
        assert_eq!(system.risk_classification, UNCLASSIFIED);
        assert_eq!(system.effective_status(), NOT_STARTED);

        let obligation: Obligation = serde_json::from_str(
            r#"{"id": "o1", "obligation_title": null, "description": null,
                "article_reference": null, "risk_category": null, "deadline": null}"#,
        )
        .unwrap();
        assert_eq!(obligation.obligation_title, "");
        assert_eq!(obligation.deadline, None);
        assert!(!obligation.applies_to(""));
        assert!(!obligation.applies_to("high-risk"));
    }

    #[test]
    fn test_obligation_without_deadline_key() {
        let obligation: Obligation =
            serde_json::from_str(r#"{"id": "o1", "risk_category": "all"}"#).unwrap();
        assert_eq!(obligation.deadline, None);
        assert!(obligation.applies_to("minimal-risk"));
    }

    #[test]
    fn test_effective_status_passes_unknown_values_through() {
        let system = AiSystemRecord::new("s1", "high-risk").with_status("in-progress");
        assert_eq!(system.effective_status(), "in-progress");
        assert!(!system.is_compliant());

        let system = AiSystemRecord::new("s2", "high-risk").with_status(COMPLIANT);
        assert!(system.is_compliant());
    }

    #[test]
    fn test_obligation_applicability() {
        let universal = Obligation::new("o1", "all", "2026-08-02");
        let high = Obligation::new("o2", "high-risk", "2026-08-02");
        let future = Obligation::new("o3", "gpai-systemic", "2026-08-02");

        assert!(universal.applies_to("limited-risk"));
        assert!(high.applies_to("high-risk"));
        assert!(!high.applies_to("limited-risk"));
        assert!(!future.applies_to("high-risk"));
    }

    #[test]
    fn test_risk_tier_parsing() {
        assert_eq!(RiskTier::parse("high-risk"), Some(RiskTier::HighRisk));
        assert_eq!(RiskTier::parse("gpai"), None);
        assert_eq!(RiskTier::UnacceptableRisk.to_string(), "unacceptable-risk");
    }
}
