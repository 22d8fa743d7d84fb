use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Job, JobId, JobStatus};

/// Durable store of job records. Must tolerate a poller reading a job
/// while the orchestrator updates it; last writer wins.
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn create(&self, job: &Job) -> Result<(), JobStoreError>;

    async fn get(&self, id: JobId) -> Result<Option<Job>, JobStoreError>;

    /// Advance a job's status and stamp the matching timestamp.
    /// `result_payload` must be provided exactly when `status` is terminal.
    async fn update_status(
        &self,
        id: JobId,
        status: JobStatus,
        at: DateTime<Utc>,
        result_payload: Option<&str>,
    ) -> Result<(), JobStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum JobStoreError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
    #[error("query failed: {0}")]
    QueryFailed(String),
    #[error("job not found: {0}")]
    NotFound(Uuid),
    #[error("invalid status transition: {0}")]
    InvalidTransition(String),
}
