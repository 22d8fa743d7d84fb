use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::SourceReference;

/// Short-term storage for uploaded images between submission and analysis.
#[async_trait]
pub trait StagingStore: Send + Sync {
    async fn store(
        &self,
        source: &SourceReference,
        data: Bytes,
    ) -> Result<u64, StagingStoreError>;

    async fn fetch(&self, source: &SourceReference) -> Result<Vec<u8>, StagingStoreError>;

    async fn delete(&self, source: &SourceReference) -> Result<(), StagingStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StagingStoreError {
    #[error("upload failed: {0}")]
    UploadFailed(String),
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("download failed: {0}")]
    DownloadFailed(String),
    #[error("delete failed: {0}")]
    DeleteFailed(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
