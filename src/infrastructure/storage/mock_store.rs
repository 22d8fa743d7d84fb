use std::collections::HashMap;

use bytes::Bytes;
use tokio::sync::RwLock;

use crate::application::ports::{StagingStore, StagingStoreError};
use crate::domain::SourceReference;

/// In-memory staging store for tests and database-less runs.
#[derive(Default)]
pub struct MockStagingStore {
    objects: RwLock<HashMap<String, Bytes>>,
}

impl MockStagingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl StagingStore for MockStagingStore {
    async fn store(
        &self,
        source: &SourceReference,
        data: Bytes,
    ) -> Result<u64, StagingStoreError> {
        let size = data.len() as u64;
        self.objects
            .write()
            .await
            .insert(source.as_str().to_string(), data);
        Ok(size)
    }

    async fn fetch(&self, source: &SourceReference) -> Result<Vec<u8>, StagingStoreError> {
        self.objects
            .read()
            .await
            .get(source.as_str())
            .map(|b| b.to_vec())
            .ok_or_else(|| StagingStoreError::NotFound(source.as_str().to_string()))
    }

    async fn delete(&self, source: &SourceReference) -> Result<(), StagingStoreError> {
        self.objects
            .write()
            .await
            .remove(source.as_str())
            .map(|_| ())
            .ok_or_else(|| StagingStoreError::NotFound(source.as_str().to_string()))
    }
}
