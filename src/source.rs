//! Data Source Abstraction
//!
//! Read-only access to the AI system registry (tenant-scoped) and the
//! obligation catalog (global reference data).
//! Implementations can target local fixture files or a hosted database.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::SourceError;
use crate::types::{AiSystemRecord, Obligation};

/// Tenant scope for registry reads
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgScope {
    /// `None` means every organization the caller can see
    pub organization_id: Option<String>,
}

impl OrgScope {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn organization(organization_id: impl Into<String>) -> Self {
        Self {
            organization_id: Some(organization_id.into()),
        }
    }

    pub fn includes(&self, system: &AiSystemRecord) -> bool {
        match &self.organization_id {
            None => true,
            Some(org) => system.organization_id.as_deref() == Some(org.as_str()),
        }
    }
}

/// Registered AI systems for a tenant
#[async_trait]
pub trait SystemRegistry: Send + Sync {
    /// The complete current set of systems in scope
    async fn list_ai_systems(&self, scope: &OrgScope) -> Result<Vec<AiSystemRecord>, SourceError>;
}

/// The regulatory obligation catalog
#[async_trait]
pub trait ObligationCatalog: Send + Sync {
    async fn list_obligations(&self) -> Result<Vec<Obligation>, SourceError>;
}

#[async_trait]
impl<T: SystemRegistry + ?Sized> SystemRegistry for std::sync::Arc<T> {
    async fn list_ai_systems(
        &self,
        scope: &OrgScope,
    ) -> Result<Vec<AiSystemRecord>, SourceError> {
        (**self).list_ai_systems(scope).await
    }
}

#[async_trait]
impl<T: ObligationCatalog + ?Sized> ObligationCatalog for std::sync::Arc<T> {
    async fn list_obligations(&self) -> Result<Vec<Obligation>, SourceError> {
        (**self).list_obligations().await
    }
}

/// Fixture-file implementation (JSON, or YAML by `.yaml`/`.yml` extension)
#[derive(Debug, Clone)]
pub struct FileSource {
    systems_path: PathBuf,
    obligations_path: PathBuf,
}

impl FileSource {
    pub fn new(systems_path: impl Into<PathBuf>, obligations_path: impl Into<PathBuf>) -> Self {
        Self {
            systems_path: systems_path.into(),
            obligations_path: obligations_path.into(),
        }
    }

    pub fn systems_path(&self) -> &Path {
        &self.systems_path
    }

    pub fn obligations_path(&self) -> &Path {
        &self.obligations_path
    }
}

async fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, SourceError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| SourceError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let is_yaml = matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml") | Some("yml")
    );
    let parsed: Result<Vec<T>, String> = if is_yaml {
        serde_yaml::from_str(&content).map_err(|e| e.to_string())
    } else {
        serde_json::from_str(&content).map_err(|e| e.to_string())
    };

    parsed.map_err(|message| SourceError::Parse {
        path: path.to_path_buf(),
        message,
    })
}

#[async_trait]
impl SystemRegistry for FileSource {
    async fn list_ai_systems(
        &self,
        scope: &OrgScope,
    ) -> Result<Vec<AiSystemRecord>, SourceError> {
        let systems: Vec<AiSystemRecord> = read_records(&self.systems_path).await?;
        let in_scope: Vec<AiSystemRecord> =
            systems.into_iter().filter(|s| scope.includes(s)).collect();
        debug!(
            path = %self.systems_path.display(),
            count = in_scope.len(),
            "Loaded AI systems"
        );
        Ok(in_scope)
    }
}

#[async_trait]
impl ObligationCatalog for FileSource {
    async fn list_obligations(&self) -> Result<Vec<Obligation>, SourceError> {
        let obligations: Vec<Obligation> = read_records(&self.obligations_path).await?;
        debug!(
            path = %self.obligations_path.display(),
            count = obligations.len(),
            "Loaded obligations"
        );
        Ok(obligations)
    }
}

/// In-memory source (for testing)
#[cfg(test)]
pub struct InMemorySource {
    systems: std::sync::Arc<tokio::sync::RwLock<Vec<AiSystemRecord>>>,
    obligations: std::sync::Arc<tokio::sync::RwLock<Vec<Obligation>>>,
    failure: std::sync::Arc<tokio::sync::RwLock<Option<SourceError>>>,
}

#[cfg(test)]
impl InMemorySource {
    pub fn new(systems: Vec<AiSystemRecord>, obligations: Vec<Obligation>) -> Self {
        Self {
            systems: std::sync::Arc::new(tokio::sync::RwLock::new(systems)),
            obligations: std::sync::Arc::new(tokio::sync::RwLock::new(obligations)),
            failure: std::sync::Arc::new(tokio::sync::RwLock::new(None)),
        }
    }

    pub async fn set_systems(&self, systems: Vec<AiSystemRecord>) {
        *self.systems.write().await = systems;
    }

    /// Make every subsequent read fail with `error` (or succeed again with `None`)
    pub async fn set_failure(&self, error: Option<SourceError>) {
        *self.failure.write().await = error;
    }
}

#[cfg(test)]
#[async_trait]
impl SystemRegistry for InMemorySource {
    async fn list_ai_systems(
        &self,
        scope: &OrgScope,
    ) -> Result<Vec<AiSystemRecord>, SourceError> {
        if let Some(err) = self.failure.read().await.clone() {
            return Err(err);
        }
        let systems = self.systems.read().await;
        Ok(systems.iter().filter(|s| scope.includes(s)).cloned().collect())
    }
}

#[cfg(test)]
#[async_trait]
impl ObligationCatalog for InMemorySource {
    async fn list_obligations(&self) -> Result<Vec<Obligation>, SourceError> {
        if let Some(err) = self.failure.read().await.clone() {
            return Err(err);
        }
        Ok(self.obligations.read().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SYSTEMS_JSON: &str = r#"[
        {"id": "s1", "name": "Chatbot", "organization_id": "org-a", "risk_classification": "limited-risk"},
        {"id": "s2", "name": "CV Screening", "organization_id": "org-b", "risk_classification": "high-risk", "compliance_status": "in-progress"}
    ]"#;

    const OBLIGATIONS_YAML: &str = r#"
- id: o1
  obligation_title: Transparency notice
  article_reference: Art. 50
  risk_category: limited-risk
  deadline: "2026-08-02"
- id: o2
  obligation_title: AI literacy
  risk_category: all
  deadline: "2025-02-02"
"#;

    fn write_fixtures(dir: &TempDir) -> FileSource {
        let systems = dir.path().join("systems.json");
        let obligations = dir.path().join("obligations.yaml");
        std::fs::write(&systems, SYSTEMS_JSON).unwrap();
        std::fs::write(&obligations, OBLIGATIONS_YAML).unwrap();
        FileSource::new(systems, obligations)
    }

    #[tokio::test]
    async fn test_file_source_reads_json_and_yaml() {
        let temp_dir = TempDir::new().unwrap();
        let source = write_fixtures(&temp_dir);

        let systems = source.list_ai_systems(&OrgScope::all()).await.unwrap();
        assert_eq!(systems.len(), 2);
        assert_eq!(systems[1].compliance_status.as_deref(), Some("in-progress"));

        let obligations = source.list_obligations().await.unwrap();
        assert_eq!(obligations.len(), 2);
        assert_eq!(obligations[0].article_reference, "Art. 50");
        assert_eq!(obligations[1].risk_category, "all");
    }

    #[tokio::test]
    async fn test_file_source_scopes_by_organization() {
        let temp_dir = TempDir::new().unwrap();
        let source = write_fixtures(&temp_dir);

        let systems = source
            .list_ai_systems(&OrgScope::organization("org-b"))
            .await
            .unwrap();
        assert_eq!(systems.len(), 1);
        assert_eq!(systems[0].id, "s2");
    }

    #[tokio::test]
    async fn test_null_columns_do_not_fail_the_fetch() {
        let temp_dir = TempDir::new().unwrap();
        let systems = temp_dir.path().join("systems.json");
        let obligations = temp_dir.path().join("obligations.json");
        std::fs::write(
            &systems,
            r#"[{"id": "s1", "name": null, "description": null, "risk_classification": null},
                {"id": "s2", "name": "CV Screening", "risk_classification": "high-risk"}]"#,
        )
        .unwrap();
        std::fs::write(
            &obligations,
            r#"[{"id": "o1", "obligation_title": null, "description": null,
                 "article_reference": null, "risk_category": "all", "deadline": null},
                {"id": "o2", "risk_category": "high-risk", "deadline": "2026-08-02T10:30Z"}]"#,
        )
        .unwrap();
        let source = FileSource::new(systems, obligations);

        let systems = source.list_ai_systems(&OrgScope::all()).await.unwrap();
        assert_eq!(systems[0].name, "");
        assert!(!systems[0].is_classified());

        let obligations = source.list_obligations().await.unwrap();
        assert_eq!(obligations[0].deadline, None);
        assert_eq!(obligations[0].description, "");

        let now = chrono::Utc::now();
        let stats = crate::engine::compute_roadmap(&systems, &obligations, now);
        let ids: Vec<&str> = stats.all_tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["s2-o2", "s2-o1"]);
        assert!(stats.all_tasks[0].days_remaining.is_some());
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let source = FileSource::new(
            temp_dir.path().join("nope.json"),
            temp_dir.path().join("nope.yaml"),
        );

        let result = source.list_ai_systems(&OrgScope::all()).await;
        assert!(matches!(result, Err(SourceError::Io { .. })));
    }

    #[tokio::test]
    async fn test_malformed_file_is_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let systems = temp_dir.path().join("systems.json");
        std::fs::write(&systems, "{not json").unwrap();
        let source = FileSource::new(&systems, &systems);

        let result = source.list_ai_systems(&OrgScope::all()).await;
        assert!(matches!(result, Err(SourceError::Parse { .. })));
    }

    #[tokio::test]
    async fn test_in_memory_source_failure_toggle() {
        let source = InMemorySource::new(vec![AiSystemRecord::new("s1", "high-risk")], vec![]);
        assert_eq!(source.list_ai_systems(&OrgScope::all()).await.unwrap().len(), 1);

        source
            .set_failure(Some(SourceError::Unavailable("offline".to_string())))
            .await;
        assert!(source.list_obligations().await.is_err());

        source.set_failure(None).await;
        assert!(source.list_obligations().await.is_ok());
    }
}
