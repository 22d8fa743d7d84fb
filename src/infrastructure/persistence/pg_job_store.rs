use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use tracing::instrument;

use crate::application::ports::{JobStore, JobStoreError};
use crate::domain::{Job, JobId, JobStatus, SourceReference};

pub struct PgJobStore {
    pool: PgPool,
}

impl PgJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_job(row: &sqlx::postgres::PgRow) -> Result<Job, JobStoreError> {
    let status: String = row
        .try_get("status")
        .map_err(|e| JobStoreError::QueryFailed(e.to_string()))?;
    let status = status
        .parse::<JobStatus>()
        .map_err(JobStoreError::QueryFailed)?;

    let source_reference: String = row
        .try_get("source_reference")
        .map_err(|e| JobStoreError::QueryFailed(e.to_string()))?;

    Ok(Job {
        id: JobId::from_uuid(
            row.try_get("id")
                .map_err(|e| JobStoreError::QueryFailed(e.to_string()))?,
        ),
        status,
        source_reference: SourceReference::from_raw(source_reference),
        created_at: row
            .try_get("created_at")
            .map_err(|e| JobStoreError::QueryFailed(e.to_string()))?,
        processing_started_at: row
            .try_get("processing_started_at")
            .map_err(|e| JobStoreError::QueryFailed(e.to_string()))?,
        completed_at: row
            .try_get("completed_at")
            .map_err(|e| JobStoreError::QueryFailed(e.to_string()))?,
        result_payload: row
            .try_get("result_payload")
            .map_err(|e| JobStoreError::QueryFailed(e.to_string()))?,
    })
}

#[async_trait]
impl JobStore for PgJobStore {
    #[instrument(skip(self, job), fields(job_id = %job.id.as_uuid()))]
    async fn create(&self, job: &Job) -> Result<(), JobStoreError> {
        sqlx::query(
            r#"
            INSERT INTO jobs
                (id, status, source_reference, created_at,
                 processing_started_at, completed_at, result_payload)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(job.id.as_uuid())
        .bind(job.status.as_str())
        .bind(job.source_reference.as_str())
        .bind(job.created_at)
        .bind(job.processing_started_at)
        .bind(job.completed_at)
        .bind(job.result_payload.as_deref())
        .execute(&self.pool)
        .await
        .map_err(|e| JobStoreError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    #[instrument(skip(self), fields(job_id = %id.as_uuid()))]
    async fn get(&self, id: JobId) -> Result<Option<Job>, JobStoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, status, source_reference, created_at,
                   processing_started_at, completed_at, result_payload
            FROM jobs
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| JobStoreError::QueryFailed(e.to_string()))?;

        row.as_ref().map(row_to_job).transpose()
    }

    #[instrument(skip(self, result_payload), fields(job_id = %id.as_uuid(), status = %status))]
    async fn update_status(
        &self,
        id: JobId,
        status: JobStatus,
        at: DateTime<Utc>,
        result_payload: Option<&str>,
    ) -> Result<(), JobStoreError> {
        // terminal rows are immutable; the status guard in the WHERE
        // clause enforces forward-only transitions
        let result = match status {
            JobStatus::Processing => {
                sqlx::query(
                    r#"
                    UPDATE jobs
                    SET status = $1, processing_started_at = $2
                    WHERE id = $3 AND status NOT IN ('COMPLETED', 'FAILED')
                    "#,
                )
                .bind(status.as_str())
                .bind(at)
                .bind(id.as_uuid())
                .execute(&self.pool)
                .await
            }
            JobStatus::Completed | JobStatus::Failed => {
                sqlx::query(
                    r#"
                    UPDATE jobs
                    SET status = $1, completed_at = $2, result_payload = $3
                    WHERE id = $4 AND status NOT IN ('COMPLETED', 'FAILED')
                    "#,
                )
                .bind(status.as_str())
                .bind(at)
                .bind(result_payload)
                .bind(id.as_uuid())
                .execute(&self.pool)
                .await
            }
            JobStatus::Queued => {
                return Err(JobStoreError::InvalidTransition(
                    "cannot move a job back to QUEUED".to_string(),
                ));
            }
        }
        .map_err(|e| JobStoreError::QueryFailed(e.to_string()))?;

        if result.rows_affected() == 0 {
            // distinguish a missing row from a terminal one
            return match self.get(id).await? {
                None => Err(JobStoreError::NotFound(id.as_uuid())),
                Some(job) => Err(JobStoreError::InvalidTransition(format!(
                    "{} -> {}",
                    job.status, status
                ))),
            };
        }

        Ok(())
    }
}
