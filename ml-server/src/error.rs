//! Error handling
//!
//! Every request failure is reported the same way: HTTP 500 with
//! `{"error": message}`.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use trustai_core::{FeatureError, ModelError};

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    // Request body could not be decoded
    #[error("{0}")]
    InvalidRequest(String),

    // Vectorization errors
    #[error(transparent)]
    Feature(#[from] FeatureError),

    // Prediction / explanation errors
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        match &self {
            AppError::InvalidRequest(_) => tracing::error!("Invalid request: {}", message),
            AppError::Feature(_) => tracing::error!("Feature error: {}", message),
            AppError::Model(_) => tracing::error!("Model error: {}", message),
        }

        let body = Json(json!({ "error": message }));
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_error_body_has_only_message() {
        let response = AppError::InvalidRequest("bad body".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value, json!({ "error": "bad body" }));
    }
}
