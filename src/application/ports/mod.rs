mod analysis_gateway;
mod job_store;
mod staging_store;

pub use analysis_gateway::{AnalysisError, AnalysisGateway};
pub use job_store::{JobStore, JobStoreError};
pub use staging_store::{StagingStore, StagingStoreError};
