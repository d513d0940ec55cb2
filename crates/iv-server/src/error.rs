//! JSON error responses for the HTTP API.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use iv_search::PipelineError;
use iv_vectordb::VectorDbError;
use serde_json::json;

/// API error with status code and message.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self { status: StatusCode::NOT_FOUND, code: "not_found", message: msg.into() }
    }
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self { status: StatusCode::BAD_REQUEST, code: "bad_request", message: msg.into() }
    }
    pub fn bad_gateway(msg: impl Into<String>) -> Self {
        Self { status: StatusCode::BAD_GATEWAY, code: "embedding_failed", message: msg.into() }
    }
    pub fn internal(msg: impl Into<String>) -> Self {
        Self { status: StatusCode::INTERNAL_SERVER_ERROR, code: "internal_error", message: msg.into() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": {
                "code": self.code,
                "message": self.message,
            }
        });
        (self.status, Json(body)).into_response()
    }
}

impl From<VectorDbError> for ApiError {
    fn from(err: VectorDbError) -> Self {
        match &err {
            VectorDbError::CollectionNotFound(_) => ApiError::not_found(err.to_string()),
            VectorDbError::InvalidFilter(_)
            | VectorDbError::InvalidArgument(_)
            | VectorDbError::InvalidName(_)
            | VectorDbError::DimensionMismatch { .. } => ApiError::bad_request(err.to_string()),
            _ => ApiError::internal(err.to_string()),
        }
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        let message = err.to_string();
        match err {
            PipelineError::Store(e) => e.into(),
            PipelineError::EmptyResult(_) => ApiError::not_found(message),
            PipelineError::EmptyQuery => ApiError::bad_request(message),
            PipelineError::UnsupportedImage { .. } => ApiError::internal(message),
            PipelineError::Embedding(iv_embed::EmbedError::ImageNotFound { .. }) => ApiError::internal(message),
            PipelineError::Embedding(_) => ApiError::bad_gateway(message),
            PipelineError::Config(_) => ApiError::internal(message),
        }
    }
}
