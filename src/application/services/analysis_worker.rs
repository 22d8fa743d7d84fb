use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::application::ports::{AnalysisGateway, JobStore, StagingStore};
use crate::application::services::{BoundedWorkQueue, JobOrchestrator, QueueError};
use crate::domain::{SecondaryKind, WorkUnit};

/// Long-running consumer of the work queue. Jobs are processed strictly
/// one at a time; running more instances against the same queue is how
/// this scales, the queue already supports concurrent consumers.
pub struct AnalysisWorker {
    queue: Arc<BoundedWorkQueue<WorkUnit>>,
    job_store: Arc<dyn JobStore>,
    gateway: Arc<dyn AnalysisGateway>,
    staging_store: Arc<dyn StagingStore>,
    secondary_kinds: Vec<SecondaryKind>,
    shutdown: CancellationToken,
}

impl AnalysisWorker {
    pub fn new(
        queue: Arc<BoundedWorkQueue<WorkUnit>>,
        job_store: Arc<dyn JobStore>,
        gateway: Arc<dyn AnalysisGateway>,
        staging_store: Arc<dyn StagingStore>,
        secondary_kinds: Vec<SecondaryKind>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            queue,
            job_store,
            gateway,
            staging_store,
            secondary_kinds,
            shutdown,
        }
    }

    /// Dequeue and execute until the shutdown token fires or the queue is
    /// closed and drained. A failing or panicking unit never stops the
    /// loop; the in-flight unit runs to completion on shutdown while its
    /// analysis calls observe a child token.
    pub async fn run(self) {
        tracing::info!("analysis worker started");
        loop {
            let unit = match self.queue.dequeue(&self.shutdown).await {
                Ok(unit) => unit,
                Err(QueueError::Cancelled) => {
                    tracing::info!("analysis worker stopping: shutdown signalled");
                    break;
                }
                Err(QueueError::Closed) => {
                    tracing::info!("analysis worker stopping: queue closed and drained");
                    break;
                }
            };

            let span = tracing::info_span!("analysis_job", job_id = %unit.job_id.as_uuid());
            let job_id = unit.job_id;

            // fresh orchestrator per unit, torn down when the unit finishes;
            // the spawn isolates panics from the loop
            let orchestrator = JobOrchestrator::new(
                Arc::clone(&self.job_store),
                Arc::clone(&self.gateway),
                Arc::clone(&self.staging_store),
                self.secondary_kinds.clone(),
            );
            let cancel = self.shutdown.child_token();
            let handle = tokio::spawn(
                async move { orchestrator.execute(unit, &cancel).await }.instrument(span),
            );

            match handle.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::error!(job_id = %job_id.as_uuid(), error = %e, "work unit failed");
                }
                Err(e) => {
                    tracing::error!(job_id = %job_id.as_uuid(), error = %e, "work unit panicked");
                }
            }
        }
        tracing::info!("analysis worker stopped");
    }
}
