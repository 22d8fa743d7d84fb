use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::application::ports::{AnalysisError, AnalysisGateway};
use crate::domain::{Classification, SecondaryKind, SourceReference};

/// Canned gateway for tests and runs without a configured vision backend.
pub struct MockAnalysisGateway {
    classification: Classification,
    text: String,
}

impl MockAnalysisGateway {
    pub fn new(classification: Classification, text: String) -> Self {
        Self {
            classification,
            text,
        }
    }
}

impl Default for MockAnalysisGateway {
    fn default() -> Self {
        Self {
            classification: Classification {
                tag: "unlabeled".to_string(),
                score: 1.0,
            },
            text: String::new(),
        }
    }
}

#[async_trait]
impl AnalysisGateway for MockAnalysisGateway {
    async fn run_primary(
        &self,
        _source: &SourceReference,
        _cancel: &CancellationToken,
    ) -> Result<Classification, AnalysisError> {
        Ok(self.classification.clone())
    }

    async fn run_secondary(
        &self,
        _kind: SecondaryKind,
        _source: &SourceReference,
        _cancel: &CancellationToken,
    ) -> Result<String, AnalysisError> {
        Ok(self.text.clone())
    }
}
