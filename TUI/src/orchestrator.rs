//! Generation lifecycle: one request, one save, one terminal status.
//!
//! The orchestrator lives on the UI thread and owns the [`Status`]. Requests
//! run on the tokio runtime and report back through a channel that the UI
//! drains with [`Orchestrator::poll`], so status changes only ever happen on
//! the UI thread.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info, warn};

use crate::backend::{GenerationRequest, GenerationService, HealthResponse};
use crate::download::ArchiveWriter;
use crate::error::GenerationError;
use crate::status::Status;

pub type GenerationId = u64;

/// Returned by [`Orchestrator::start`] while another generation is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("generation {0} is still in progress")]
pub struct Busy(pub GenerationId);

#[derive(Debug, Clone)]
pub struct Completion {
    pub id: GenerationId,
    pub project_name: String,
    pub outcome: Result<PathBuf, GenerationError>,
}

impl Completion {
    pub fn succeeded(&self) -> bool {
        self.outcome.is_ok()
    }
}

#[derive(Debug)]
pub enum OrchestratorEvent {
    Finished(Completion),
    Health(Result<HealthResponse, GenerationError>),
}

pub struct Orchestrator {
    service: Arc<dyn GenerationService>,
    writer: ArchiveWriter,
    runtime: Handle,
    status: Status,
    in_flight: Option<GenerationId>,
    last_id: GenerationId,
    events_tx: UnboundedSender<OrchestratorEvent>,
    events_rx: UnboundedReceiver<OrchestratorEvent>,
}

impl Orchestrator {
    pub fn new(service: Arc<dyn GenerationService>, writer: ArchiveWriter, runtime: Handle) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            service,
            writer,
            runtime,
            status: Status::Idle,
            in_flight: None,
            last_id: 0,
            events_tx,
            events_rx,
        }
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn in_flight(&self) -> Option<GenerationId> {
        self.in_flight
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn writer(&self) -> &ArchiveWriter {
        &self.writer
    }

    fn begin(&mut self, request: &GenerationRequest) -> Result<GenerationId, Busy> {
        if let Some(id) = self.in_flight {
            return Err(Busy(id));
        }
        self.last_id += 1;
        let id = self.last_id;
        self.in_flight = Some(id);
        self.status = Status::InProgress;
        info!(
            generation_id = id,
            project_name = %request.project_name,
            prompt_chars = request.prompt.chars().count(),
            "Generation started"
        );
        Ok(id)
    }

    /// Start a generation in the background. The result arrives through
    /// [`poll`](Self::poll).
    pub fn start(&mut self, request: GenerationRequest) -> Result<GenerationId, Busy> {
        let id = self.begin(&request)?;

        let service = Arc::clone(&self.service);
        let writer = self.writer.clone();
        let tx = self.events_tx.clone();
        let project_name = request.project_name.clone();
        let work = self.runtime.spawn(async move {
            run_generation(service.as_ref(), &writer, &request).await
        });
        // A completion is always reported, even when the work task dies
        self.runtime.spawn(async move {
            let outcome = match work.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(generation_id = id, error = %e, "Generation task aborted");
                    Err(GenerationError::Transport(format!(
                        "generation task aborted: {}",
                        e
                    )))
                }
            };
            let _ = tx.send(OrchestratorEvent::Finished(Completion {
                id,
                project_name,
                outcome,
            }));
        });

        Ok(id)
    }

    /// Run a generation to completion on the current task.
    pub async fn run_once(&mut self, request: GenerationRequest) -> Result<&Status, Busy> {
        let id = self.begin(&request)?;
        let outcome = run_generation(self.service.as_ref(), &self.writer, &request).await;
        self.finish(Completion {
            id,
            project_name: request.project_name,
            outcome,
        });
        Ok(&self.status)
    }

    /// Drain one pending event, applying completions to the status.
    /// Completions for anything other than the outstanding generation are
    /// dropped.
    pub fn poll(&mut self) -> Option<OrchestratorEvent> {
        loop {
            match self.events_rx.try_recv().ok()? {
                OrchestratorEvent::Finished(completion) => {
                    if self.in_flight != Some(completion.id) {
                        debug!(generation_id = completion.id, "Ignoring stale completion");
                        continue;
                    }
                    self.finish(completion.clone());
                    return Some(OrchestratorEvent::Finished(completion));
                }
                health => return Some(health),
            }
        }
    }

    fn finish(&mut self, completion: Completion) {
        match &completion.outcome {
            Ok(path) => info!(
                generation_id = completion.id,
                project_name = %completion.project_name,
                path = %path.display(),
                "Generation finished"
            ),
            Err(e) => warn!(
                generation_id = completion.id,
                project_name = %completion.project_name,
                error = %e,
                "Generation failed"
            ),
        }
        self.in_flight = None;
        self.status = Status::from(completion.outcome);
    }

    /// Return the status to idle. Refused while a generation is outstanding.
    pub fn reset(&mut self) -> bool {
        if self.is_busy() {
            return false;
        }
        self.status = Status::Idle;
        true
    }

    /// Check the service once in the background; the answer comes back as
    /// [`OrchestratorEvent::Health`].
    pub fn probe_health(&self) {
        let service = Arc::clone(&self.service);
        let tx = self.events_tx.clone();
        self.runtime.spawn(async move {
            let result = service.health().await;
            let _ = tx.send(OrchestratorEvent::Health(result));
        });
    }
}

/// Request the archive and save it. Every failure is folded into the
/// returned error.
pub async fn run_generation(
    service: &dyn GenerationService,
    writer: &ArchiveWriter,
    request: &GenerationRequest,
) -> Result<PathBuf, GenerationError> {
    let bytes = service.generate(request).await?;

    let writer = writer.clone();
    let project_name = request.project_name.clone();
    let path = tokio::task::spawn_blocking(move || writer.save(&project_name, &bytes))
        .await
        .map_err(|e| GenerationError::Save(e.to_string()))??;
    Ok(path)
}
