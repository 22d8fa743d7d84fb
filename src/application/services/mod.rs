mod analysis_worker;
mod job_orchestrator;
mod submission_service;
mod work_queue;

pub use analysis_worker::AnalysisWorker;
pub use job_orchestrator::{JobOrchestrator, OrchestratorError};
pub use submission_service::{SubmissionService, SubmitError};
pub use work_queue::{BoundedWorkQueue, QueueError};
