use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::domain::{Classification, SecondaryKind, SourceReference};

/// External analysis backends, addressed by the job's source reference.
/// Calls take a cancellation token so a process shutdown can abort an
/// in-flight external call instead of hanging on it.
#[async_trait]
pub trait AnalysisGateway: Send + Sync {
    async fn run_primary(
        &self,
        source: &SourceReference,
        cancel: &CancellationToken,
    ) -> Result<Classification, AnalysisError>;

    async fn run_secondary(
        &self,
        kind: SecondaryKind,
        source: &SourceReference,
        cancel: &CancellationToken,
    ) -> Result<String, AnalysisError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("request failed: {0}")]
    RequestFailed(String),
    #[error("backend rejected input: {0}")]
    InvalidInput(String),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("source not readable: {0}")]
    SourceUnavailable(String),
    #[error("analysis cancelled")]
    Cancelled,
}
