//! Table of launched pipeline instances.
//!
//! Each slot keeps the name and description captured at launch plus the engine handle behind
//! its own async mutex. Lookups clone the handle's `Arc` out of the map and drop the shard
//! guard before awaiting the handle lock, so a slow pipeline never blocks the table or any
//! other pipeline. Calls on the same id serialize on that lock.

use crate::config::PipelineConfig;
use crate::error::AgentError;
use dashmap::DashMap;
use mlagent_schema::{PipelineId, PipelineState};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::engine::{EngineError, EngineHandle, PipelineEngine};
use super::id::IdGenerator;
use super::PipelineSource;

/// Slack on top of the engine's own state timeout, covering lock and thread hand-off.
const STATE_QUERY_GRACE: Duration = Duration::from_millis(250);

type SharedEngine = Arc<Mutex<Option<Box<dyn EngineHandle>>>>;

/// What a pipeline was launched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineInfo {
    pub id: PipelineId,
    pub name: String,
    pub description: String,
}

struct PipelineSlot {
    name: String,
    description: String,
    /// `None` once destroy has taken the handle.
    engine: SharedEngine,
}

pub struct PipelineManager {
    engine: Arc<dyn PipelineEngine>,
    source: Arc<dyn PipelineSource>,
    table: DashMap<PipelineId, PipelineSlot>,
    ids: IdGenerator,
    state_timeout: Duration,
    teardown_timeout: Duration,
}

impl PipelineManager {
    pub fn new(
        engine: Arc<dyn PipelineEngine>,
        source: Arc<dyn PipelineSource>,
        cfg: &PipelineConfig,
    ) -> Self {
        Self {
            engine,
            source,
            table: DashMap::new(),
            ids: IdGenerator::new(),
            state_timeout: cfg.state_timeout(),
            teardown_timeout: cfg.teardown_timeout(),
        }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Builds an instance from the stored description of `name`, pauses it, and registers it
    /// under a fresh id. Nothing is registered if any step fails.
    pub async fn launch(&self, name: &str) -> Result<PipelineId, AgentError> {
        let description = self.source.pipeline_description(name).await?;

        let engine = Arc::clone(&self.engine);
        let line = description.clone();
        let handle = run_blocking(move || {
            let mut handle = engine.parse(&line)?;
            handle.set_state(PipelineState::Paused)?;
            Ok(handle)
        })
        .await?;

        let id = self.ids.next();
        self.table.insert(
            id,
            PipelineSlot {
                name: name.to_string(),
                description,
                engine: Arc::new(Mutex::new(Some(handle))),
            },
        );
        info!(id, name, "pipeline launched");
        Ok(id)
    }

    pub async fn start(&self, id: PipelineId) -> Result<(), AgentError> {
        self.transition(id, PipelineState::Playing).await?;
        info!(id, "pipeline started");
        Ok(())
    }

    pub async fn stop(&self, id: PipelineId) -> Result<(), AgentError> {
        self.transition(id, PipelineState::Paused).await?;
        info!(id, "pipeline stopped");
        Ok(())
    }

    /// Removes `id` from the table, then tears the engine instance down within the configured
    /// bound. The bound covers waiting for the handle lock as well as the engine's own
    /// shutdown. A teardown that fails or overruns is logged and left to finish on its own
    /// task; the id is gone either way.
    pub async fn destroy(&self, id: PipelineId) -> Result<(), AgentError> {
        let (_, slot) = self
            .table
            .remove(&id)
            .ok_or_else(|| unknown_pipeline(id))?;

        let teardown = tokio::spawn(release(slot.engine));

        match tokio::time::timeout(self.teardown_timeout, teardown).await {
            Ok(Ok(Ok(true))) => info!(id, name = %slot.name, "pipeline destroyed"),
            Ok(Ok(Ok(false))) => debug!(id, "pipeline handle already released"),
            Ok(Ok(Err(e))) => warn!(
                id,
                name = %slot.name,
                error = %e,
                "pipeline teardown failed; handle released without reaching null"
            ),
            Ok(Err(e)) => warn!(id, name = %slot.name, error = %e, "pipeline teardown panicked"),
            Err(_) => warn!(
                id,
                name = %slot.name,
                timeout_ms = u64::try_from(self.teardown_timeout.as_millis()).unwrap_or(u64::MAX),
                "pipeline teardown exceeded its bound; releasing in the background"
            ),
        }
        Ok(())
    }

    /// Current engine state, bounded by the configured state timeout.
    pub async fn get_state(&self, id: PipelineId) -> Result<PipelineState, AgentError> {
        let engine = self.shared_engine(id)?;
        let timeout = self.state_timeout;

        let query = async move {
            let guard = engine.lock_owned().await;
            run_blocking(move || {
                let handle = guard.as_ref().ok_or_else(|| unknown_pipeline(id))?;
                Ok(handle.state(timeout)?)
            })
            .await
        };

        tokio::time::timeout(timeout + STATE_QUERY_GRACE, query)
            .await
            .map_err(|_| AgentError::Timeout(format!("state query for pipeline {id}")))?
    }

    pub fn info(&self, id: PipelineId) -> Result<PipelineInfo, AgentError> {
        self.table
            .get(&id)
            .map(|slot| PipelineInfo {
                id,
                name: slot.name.clone(),
                description: slot.description.clone(),
            })
            .ok_or_else(|| unknown_pipeline(id))
    }

    /// Destroys every live pipeline.
    pub async fn shutdown(&self) {
        let ids: Vec<PipelineId> = self.table.iter().map(|entry| *entry.key()).collect();
        if !ids.is_empty() {
            info!(count = ids.len(), "destroying live pipelines");
        }
        for id in ids {
            if let Err(e) = self.destroy(id).await {
                debug!(id, error = %e, "pipeline vanished during shutdown");
            }
        }
    }

    async fn transition(&self, id: PipelineId, target: PipelineState) -> Result<(), AgentError> {
        let engine = self.shared_engine(id)?;
        let mut guard = engine.lock_owned().await;
        run_blocking(move || {
            let handle = guard.as_mut().ok_or_else(|| unknown_pipeline(id))?;
            handle.set_state(target)?;
            Ok(())
        })
        .await
    }

    fn shared_engine(&self, id: PipelineId) -> Result<SharedEngine, AgentError> {
        self.table
            .get(&id)
            .map(|slot| Arc::clone(&slot.engine))
            .ok_or_else(|| unknown_pipeline(id))
    }
}

/// Waits for the handle lock, takes the handle and shuts it down. Returns `false` when the
/// handle was already taken.
async fn release(engine: SharedEngine) -> Result<bool, AgentError> {
    let Some(mut handle) = engine.lock_owned().await.take() else {
        return Ok(false);
    };
    run_blocking(move || {
        let res = handle.shutdown();
        drop(handle);
        Ok(res?)
    })
    .await?;
    Ok(true)
}

fn unknown_pipeline(id: PipelineId) -> AgentError {
    AgentError::not_found(format!("no pipeline with id {id}"))
}

async fn run_blocking<T, F>(f: F) -> Result<T, AgentError>
where
    F: FnOnce() -> Result<T, AgentError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AgentError::Engine(EngineError::Panicked(e.to_string())))?
}
