use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{JobStatus, SourceReference};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JobId(Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

/// One submitted image's tracked analysis lifecycle. Only the orchestrator
/// mutates a job after creation; everyone else reads by id from the store.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: JobId,
    pub status: JobStatus,
    pub source_reference: SourceReference,
    pub created_at: DateTime<Utc>,
    pub processing_started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Serialized `AnalysisReport`. Present iff the status is terminal.
    pub result_payload: Option<String>,
}

impl Job {
    pub fn new(source_reference: SourceReference) -> Self {
        Self {
            id: JobId::new(),
            status: JobStatus::Queued,
            source_reference,
            created_at: Utc::now(),
            processing_started_at: None,
            completed_at: None,
            result_payload: None,
        }
    }
}
