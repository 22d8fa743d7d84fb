use axum::Json;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;
use uuid::Uuid;

use crate::application::services::{QueueError, SubmitError};
use crate::domain::SourceReference;
use crate::presentation::state::AppState;

#[derive(Serialize)]
pub struct SubmitResponse {
    pub job_id: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[tracing::instrument(skip(state, multipart))]
pub async fn submit_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let field = match multipart.next_field().await {
        Ok(Some(f)) => f,
        Ok(None) => {
            tracing::warn!("Submit request with no image");
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "No image uploaded".to_string(),
                }),
            )
                .into_response();
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to read multipart");
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: format!("Failed to read multipart: {}", e),
                }),
            )
                .into_response();
        }
    };

    let filename = field.file_name().unwrap_or("unknown").to_string();

    let data = match field.bytes().await {
        Ok(d) => d,
        Err(e) => {
            tracing::error!(error = %e, "Failed to read image bytes");
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: format!("Failed to read image: {}", e),
                }),
            )
                .into_response();
        }
    };

    if data.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Uploaded image is empty".to_string(),
            }),
        )
            .into_response();
    }

    tracing::debug!(filename = %filename, bytes = data.len(), "Image upload received");

    let source = SourceReference::staged(Uuid::new_v4(), &filename);
    if let Err(e) = state.staging_store.store(&source, data).await {
        tracing::error!(error = %e, "Failed to stage uploaded image");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: format!("Failed to stage image: {}", e),
            }),
        )
            .into_response();
    }

    match state.submission_service.submit(source).await {
        Ok(job_id) => (
            StatusCode::ACCEPTED,
            Json(SubmitResponse {
                job_id: job_id.as_uuid().to_string(),
                message: "Image analysis started".to_string(),
            }),
        )
            .into_response(),
        Err(SubmitError::Queue(QueueError::Closed)) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse {
                error: "Analysis queue is shut down".to_string(),
            }),
        )
            .into_response(),
        Err(SubmitError::BlankSource) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Invalid source reference".to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to submit analysis job");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Failed to submit job: {}", e),
                }),
            )
                .into_response()
        }
    }
}
