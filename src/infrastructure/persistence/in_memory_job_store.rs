use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::application::ports::{JobStore, JobStoreError};
use crate::domain::{Job, JobId, JobStatus};

/// Job store backed by a process-local map. Used by tests and by
/// database-less runs; job records do not survive a restart.
#[derive(Default)]
pub struct InMemoryJobStore {
    jobs: RwLock<HashMap<Uuid, Job>>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn create(&self, job: &Job) -> Result<(), JobStoreError> {
        let mut jobs = self.jobs.write().await;
        if jobs.contains_key(&job.id.as_uuid()) {
            return Err(JobStoreError::QueryFailed(format!(
                "duplicate job id: {}",
                job.id.as_uuid()
            )));
        }
        jobs.insert(job.id.as_uuid(), job.clone());
        Ok(())
    }

    async fn get(&self, id: JobId) -> Result<Option<Job>, JobStoreError> {
        let jobs = self.jobs.read().await;
        Ok(jobs.get(&id.as_uuid()).cloned())
    }

    async fn update_status(
        &self,
        id: JobId,
        status: JobStatus,
        at: DateTime<Utc>,
        result_payload: Option<&str>,
    ) -> Result<(), JobStoreError> {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .get_mut(&id.as_uuid())
            .ok_or(JobStoreError::NotFound(id.as_uuid()))?;

        if !job.status.can_transition_to(status) {
            return Err(JobStoreError::InvalidTransition(format!(
                "{} -> {}",
                job.status, status
            )));
        }

        job.status = status;
        match status {
            JobStatus::Processing => job.processing_started_at = Some(at),
            JobStatus::Completed | JobStatus::Failed => {
                job.completed_at = Some(at);
                job.result_payload = result_payload.map(str::to_string);
            }
            JobStatus::Queued => {}
        }
        Ok(())
    }
}
