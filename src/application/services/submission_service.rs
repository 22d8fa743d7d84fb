use std::sync::Arc;

use crate::application::ports::{JobStore, JobStoreError};
use crate::application::services::{BoundedWorkQueue, QueueError};
use crate::domain::{Job, JobId, SourceReference, WorkUnit};

/// The submit/poll surface of the pipeline. Creates the job record, hands
/// a plain-data work unit to the queue and returns the id synchronously;
/// pollers re-read the record by id.
pub struct SubmissionService {
    job_store: Arc<dyn JobStore>,
    queue: Arc<BoundedWorkQueue<WorkUnit>>,
}

impl SubmissionService {
    pub fn new(job_store: Arc<dyn JobStore>, queue: Arc<BoundedWorkQueue<WorkUnit>>) -> Self {
        Self { job_store, queue }
    }

    pub async fn submit(&self, source: SourceReference) -> Result<JobId, SubmitError> {
        // defensive check before anything is created or enqueued
        if source.is_blank() {
            return Err(SubmitError::BlankSource);
        }

        let job = Job::new(source.clone());
        let job_id = job.id;
        self.job_store.create(&job).await?;

        self.queue.enqueue(WorkUnit::new(job_id, source)).await?;

        tracing::info!(job_id = %job_id.as_uuid(), "analysis job enqueued");
        Ok(job_id)
    }

    pub async fn get_status(&self, id: JobId) -> Result<Option<Job>, JobStoreError> {
        self.job_store.get(id).await
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("source reference is blank")]
    BlankSource,
    #[error("work queue: {0}")]
    Queue(#[from] QueueError),
    #[error("job store: {0}")]
    Store(#[from] JobStoreError),
}
