mod analysis_report;
mod job;
mod job_status;
mod source_reference;
mod work_unit;

pub use analysis_report::{AnalysisReport, Classification, SecondaryKind, SecondaryRecord};
pub use job::{Job, JobId};
pub use job_status::JobStatus;
pub use source_reference::SourceReference;
pub use work_unit::WorkUnit;
