use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::fcm::FcmError;
use crate::triggers::TriggerError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Trigger error: {0}")]
    Trigger(#[from] TriggerError),

    #[error("Push error: {0}")]
    Push(#[from] FcmError),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

/// Check if running in production mode (based on RUN_MODE env var)
fn is_production() -> bool {
    std::env::var("RUN_MODE")
        .map(|m| m == "production" || m == "prod")
        .unwrap_or(false)
}

impl AppError {
    /// HTTP status and error code reported to the platform
    pub fn status_and_code(&self) -> (StatusCode, String) {
        match self {
            AppError::Trigger(_) => (StatusCode::BAD_REQUEST, "INVALID_EVENT".to_string()),
            AppError::Push(e) => (StatusCode::BAD_GATEWAY, format!("PUSH_{}", e.code())),
            AppError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR".to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let log_message = self.to_string();

        let client_message = match &self {
            AppError::Trigger(_) => log_message.clone(),
            AppError::Push(_) if is_production() => "Push delivery failed".to_string(),
            AppError::Internal(_) if is_production() => {
                "Internal server error".to_string()
            }
            _ => log_message.clone(),
        };

        // Always log the detailed error server-side
        tracing::error!(
            code = %code,
            status = %status.as_u16(),
            message = %log_message,
            "Invocation failed"
        );

        let body = ErrorResponse {
            error: ErrorBody {
                code,
                message: client_message,
            },
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
