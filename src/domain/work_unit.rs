use super::{JobId, SourceReference};

/// The deferred computation for one job, queued and executed exactly once.
/// Plain data only: the worker re-reads the job by id and builds its own
/// collaborators, so no live handles cross the queue boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkUnit {
    pub job_id: JobId,
    pub source_reference: SourceReference,
}

impl WorkUnit {
    pub fn new(job_id: JobId, source_reference: SourceReference) -> Self {
        Self {
            job_id,
            source_reference,
        }
    }
}
