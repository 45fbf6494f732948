//! Error handling
//!
//! Maps engine errors onto HTTP statuses. Cluster-not-found and
//! privacy-blocked deliberately share one denial response so remote
//! callers get no existence oracle for hidden clusters.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use veil_engine::EngineError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    /// Malformed request (unknown attribute, empty filter set, bad body)
    BadRequest(String),

    /// One denial signal for both out-of-range and below-threshold clusters
    AccessDenied,

    /// No model in the slot yet
    NotFitted,

    /// Fit attempt failed; the previous model, if any, stays active
    FitRejected(String),

    /// Generic errors
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.as_str()),
            AppError::AccessDenied => (StatusCode::FORBIDDEN, "Access denied"),
            AppError::NotFitted => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Model not fitted yet. Call POST /fit first.",
            ),
            AppError::FitRejected(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.as_str()),
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::UnknownAttribute(_) => AppError::BadRequest(err.to_string()),
            EngineError::ClusterNotFound(_) | EngineError::PrivacyBlocked => AppError::AccessDenied,
            EngineError::NotFitted => AppError::NotFitted,
            EngineError::SchemaViolation(_) | EngineError::InsufficientData { .. } => {
                AppError::FitRejected(err.to_string())
            }
            EngineError::InvalidConfig(_) => AppError::InternalError(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_and_blocked_share_denial() {
        let not_found: AppError = EngineError::ClusterNotFound(7).into();
        let blocked: AppError = EngineError::PrivacyBlocked.into();
        assert!(matches!(not_found, AppError::AccessDenied));
        assert!(matches!(blocked, AppError::AccessDenied));
    }
}
