use std::sync::Arc;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use crate::application::ports::{AnalysisGateway, JobStore, JobStoreError, StagingStore};
use crate::domain::{AnalysisReport, JobStatus, SecondaryKind, SecondaryRecord, WorkUnit};

/// Executes one work unit against the job store and analysis gateway.
/// Built fresh for every unit and dropped when it finishes, so nothing
/// leaks between jobs.
pub struct JobOrchestrator {
    job_store: Arc<dyn JobStore>,
    gateway: Arc<dyn AnalysisGateway>,
    staging_store: Arc<dyn StagingStore>,
    secondary_kinds: Vec<SecondaryKind>,
}

impl JobOrchestrator {
    pub fn new(
        job_store: Arc<dyn JobStore>,
        gateway: Arc<dyn AnalysisGateway>,
        staging_store: Arc<dyn StagingStore>,
        secondary_kinds: Vec<SecondaryKind>,
    ) -> Self {
        Self {
            job_store,
            gateway,
            staging_store,
            secondary_kinds,
        }
    }

    /// Drive the unit's job to a terminal state. The Processing write
    /// strictly precedes any analysis call; the terminal write happens
    /// regardless of how the analyses went.
    pub async fn execute(
        &self,
        unit: WorkUnit,
        cancel: &CancellationToken,
    ) -> Result<(), OrchestratorError> {
        let job_id = unit.job_id;

        let Some(job) = self.job_store.get(job_id).await? else {
            // the record was lost or never committed; nothing to repair here
            tracing::warn!(
                job_id = %job_id.as_uuid(),
                "job record missing, dropping work unit"
            );
            return Ok(());
        };

        if job.status.is_terminal() {
            tracing::warn!(
                job_id = %job_id.as_uuid(),
                status = %job.status,
                "job already terminal, dropping work unit"
            );
            return Ok(());
        }

        self.job_store
            .update_status(job_id, JobStatus::Processing, Utc::now(), None)
            .await?;

        let report = self.run_analyses(&unit, cancel).await;
        let (status, payload) = serialize_outcome(report);

        if let Err(e) = self
            .job_store
            .update_status(job_id, status, Utc::now(), Some(&payload))
            .await
        {
            // the job is now stuck in Processing with no result; this needs
            // out-of-band detection, we do not retry
            tracing::error!(
                job_id = %job_id.as_uuid(),
                error = %e,
                "FATAL: terminal job write failed, job left without a result"
            );
            return Err(OrchestratorError::TerminalWrite(e));
        }

        // the staged upload is no longer needed once a result is recorded;
        // a job stuck without a terminal write keeps its input
        if let Err(e) = self.staging_store.delete(&unit.source_reference).await {
            tracing::warn!(
                job_id = %job_id.as_uuid(),
                source = %unit.source_reference,
                error = %e,
                "failed to delete staged image after terminal write"
            );
        }

        tracing::info!(job_id = %job_id.as_uuid(), status = %status, "job finished");
        Ok(())
    }

    /// Run the primary and all configured secondary analyses. Infallible:
    /// every failure is folded into the report so the terminal write
    /// always has something to persist.
    async fn run_analyses(&self, unit: &WorkUnit, cancel: &CancellationToken) -> AnalysisReport {
        let mut report = AnalysisReport::default();

        match self
            .gateway
            .run_primary(&unit.source_reference, cancel)
            .await
        {
            Ok(classification) => {
                tracing::debug!(
                    job_id = %unit.job_id.as_uuid(),
                    tag = %classification.tag,
                    score = classification.score,
                    "primary analysis succeeded"
                );
                report.classification = Some(classification);
            }
            Err(e) => {
                tracing::warn!(
                    job_id = %unit.job_id.as_uuid(),
                    error = %e,
                    "primary analysis failed"
                );
                report.error_message = Some(format!("primary analysis failed: {}", e));
            }
        }

        for kind in &self.secondary_kinds {
            match self
                .gateway
                .run_secondary(*kind, &unit.source_reference, cancel)
                .await
            {
                Ok(content) => {
                    report.secondaries.push(SecondaryRecord::succeeded(*kind, content));
                }
                Err(e) => {
                    // best effort only; never fails the job
                    tracing::warn!(
                        job_id = %unit.job_id.as_uuid(),
                        kind = %kind,
                        error = %e,
                        "secondary analysis failed"
                    );
                    report
                        .secondaries
                        .push(SecondaryRecord::failed(*kind, e.to_string()));
                }
            }
        }

        report
    }
}

/// Terminal status plus serialized payload for a finished report. A
/// serializer failure is itself folded into a failure payload so the
/// terminal write still happens.
fn serialize_outcome(report: AnalysisReport) -> (JobStatus, String) {
    let status = if report.is_failure() {
        JobStatus::Failed
    } else {
        JobStatus::Completed
    };

    match serde_json::to_string(&report) {
        Ok(payload) => (status, payload),
        Err(e) => {
            tracing::error!(error = %e, "failed to serialize analysis report");
            let fallback = AnalysisReport::failure(format!("result serialization failed: {}", e));
            let payload = serde_json::to_string(&fallback)
                .unwrap_or_else(|_| r#"{"error_message":"result serialization failed"}"#.into());
            (JobStatus::Failed, payload)
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    #[error("job store: {0}")]
    Store(#[from] JobStoreError),
    /// The terminal write failed after the analyses ran; the job is left
    /// in Processing with no result.
    #[error("terminal persistence failed: {0}")]
    TerminalWrite(JobStoreError),
}
