use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use crate::application::ports::{AnalysisError, AnalysisGateway, StagingStore};
use crate::domain::{Classification, SecondaryKind, SourceReference};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct ClassifyResponse {
    tag: String,
    score: f32,
}

#[derive(Debug, Deserialize)]
struct TextResponse {
    text: String,
}

/// Gateway to an HTTP vision backend. Fetches the staged image and posts
/// it to the backend's classify/ocr/caption endpoints.
pub struct HttpVisionGateway {
    http: reqwest::Client,
    staging: Arc<dyn StagingStore>,
    base_url: String,
    api_key: String,
}

impl HttpVisionGateway {
    pub fn new(
        staging: Arc<dyn StagingStore>,
        base_url: String,
        api_key: String,
    ) -> Result<Self, AnalysisError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AnalysisError::RequestFailed(e.to_string()))?;
        Ok(Self {
            http,
            staging,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    async fn post_image(
        &self,
        endpoint: &str,
        source: &SourceReference,
        cancel: &CancellationToken,
    ) -> Result<reqwest::Response, AnalysisError> {
        let data = self
            .staging
            .fetch(source)
            .await
            .map_err(|e| AnalysisError::SourceUnavailable(e.to_string()))?;

        let request = self
            .http
            .post(format!("{}/{}", self.base_url, endpoint))
            .bearer_auth(&self.api_key)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(data)
            .send();

        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(AnalysisError::Cancelled),
            result = request => result.map_err(|e| AnalysisError::RequestFailed(e.to_string()))?,
        };

        if response.status() == reqwest::StatusCode::UNPROCESSABLE_ENTITY {
            let detail = response.text().await.unwrap_or_default();
            return Err(AnalysisError::InvalidInput(detail));
        }
        let response = response
            .error_for_status()
            .map_err(|e| AnalysisError::RequestFailed(e.to_string()))?;

        Ok(response)
    }
}

#[async_trait]
impl AnalysisGateway for HttpVisionGateway {
    #[instrument(skip(self, cancel), fields(source = %source))]
    async fn run_primary(
        &self,
        source: &SourceReference,
        cancel: &CancellationToken,
    ) -> Result<Classification, AnalysisError> {
        let response = self.post_image("v1/classify", source, cancel).await?;
        let body: ClassifyResponse = response
            .json()
            .await
            .map_err(|e| AnalysisError::MalformedResponse(e.to_string()))?;
        Ok(Classification {
            tag: body.tag,
            score: body.score,
        })
    }

    #[instrument(skip(self, cancel), fields(source = %source, kind = %kind))]
    async fn run_secondary(
        &self,
        kind: SecondaryKind,
        source: &SourceReference,
        cancel: &CancellationToken,
    ) -> Result<String, AnalysisError> {
        let endpoint = match kind {
            SecondaryKind::TextExtraction => "v1/ocr",
            SecondaryKind::Captioning => "v1/caption",
        };
        let response = self.post_image(endpoint, source, cancel).await?;
        let body: TextResponse = response
            .json()
            .await
            .map_err(|e| AnalysisError::MalformedResponse(e.to_string()))?;
        Ok(body.text)
    }
}
