//! Roadmap Service
//!
//! Fetches systems and obligations concurrently and keeps the last snapshot
//! that loaded successfully. The engine only ever sees complete snapshots:
//! a failed fetch never stands in for an empty list.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::engine::{RoadmapEngine, RoadmapStats};
use crate::error::{Result, SourceError};
use crate::source::{ObligationCatalog, OrgScope, SystemRegistry};
use crate::types::{AiSystemRecord, Obligation};

/// A complete, successfully fetched pair of input collections
#[derive(Debug, Clone, PartialEq)]
pub struct RoadmapSnapshot {
    pub systems: Vec<AiSystemRecord>,
    pub obligations: Vec<Obligation>,
    pub fetched_at: DateTime<Utc>,
}

impl RoadmapSnapshot {
    pub fn new(systems: Vec<AiSystemRecord>, obligations: Vec<Obligation>) -> Self {
        Self {
            systems,
            obligations,
            fetched_at: Utc::now(),
        }
    }

    /// Derive the roadmap; recomputed on every call
    pub fn roadmap(&self, engine: &RoadmapEngine, now: DateTime<Utc>) -> RoadmapStats<'_> {
        engine.compute(&self.systems, &self.obligations, now)
    }
}

/// What a consumer should show: nothing yet, data, or an error
#[derive(Debug, Clone, PartialEq)]
pub enum RoadmapState {
    /// No fetch has completed yet
    Loading,
    Ready(Arc<RoadmapSnapshot>),
    /// The latest fetch failed; `last_good` is the snapshot from before it
    Failed {
        error: SourceError,
        last_good: Option<Arc<RoadmapSnapshot>>,
    },
}

impl RoadmapState {
    /// The snapshot to render, if any
    pub fn snapshot(&self) -> Option<&Arc<RoadmapSnapshot>> {
        match self {
            Self::Loading => None,
            Self::Ready(snapshot) => Some(snapshot),
            Self::Failed { last_good, .. } => last_good.as_ref(),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

#[derive(Default)]
struct ServiceState {
    last_good: Option<Arc<RoadmapSnapshot>>,
    last_error: Option<SourceError>,
}

pub struct RoadmapService<R, C> {
    registry: R,
    catalog: C,
    scope: OrgScope,
    engine: RoadmapEngine,
    state: RwLock<ServiceState>,
}

impl<R, C> RoadmapService<R, C>
where
    R: SystemRegistry,
    C: ObligationCatalog,
{
    pub fn new(registry: R, catalog: C, scope: OrgScope) -> Self {
        Self {
            registry,
            catalog,
            scope,
            engine: RoadmapEngine::default(),
            state: RwLock::new(ServiceState::default()),
        }
    }

    pub fn with_engine(mut self, engine: RoadmapEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn engine(&self) -> &RoadmapEngine {
        &self.engine
    }

    pub fn scope(&self) -> &OrgScope {
        &self.scope
    }

    /// Fetch both collections in parallel and adopt them as the current snapshot.
    ///
    /// On failure the previous snapshot is kept and the error is recorded.
    pub async fn refresh(&self) -> Result<Arc<RoadmapSnapshot>> {
        let fetched = tokio::try_join!(
            self.registry.list_ai_systems(&self.scope),
            self.catalog.list_obligations()
        );

        let mut state = self.state.write().await;
        match fetched {
            Ok((systems, obligations)) => {
                info!(
                    systems = systems.len(),
                    obligations = obligations.len(),
                    "Roadmap data refreshed"
                );
                let snapshot = Arc::new(RoadmapSnapshot::new(systems, obligations));
                state.last_good = Some(snapshot.clone());
                state.last_error = None;
                Ok(snapshot)
            }
            Err(error) => {
                warn!(
                    error = %error,
                    has_last_good = state.last_good.is_some(),
                    "Failed to load roadmap data"
                );
                state.last_error = Some(error.clone());
                Err(error.into())
            }
        }
    }

    pub async fn state(&self) -> RoadmapState {
        let state = self.state.read().await;
        match (&state.last_error, &state.last_good) {
            (Some(error), last_good) => RoadmapState::Failed {
                error: error.clone(),
                last_good: last_good.clone(),
            },
            (None, Some(snapshot)) => RoadmapState::Ready(snapshot.clone()),
            (None, None) => RoadmapState::Loading,
        }
    }
}
