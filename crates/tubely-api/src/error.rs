//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`. Anything that converts into
//! `AppError` (storage errors, upload failures) becomes an `HttpAppError` with `?` and is
//! rendered with a consistent status, body and log line.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tubely_core::{AppError, ErrorMetadata, LogLevel};
use tubely_storage::StorageError;
use utoipa::ToSchema;

use crate::services::upload::UploadFailure;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    /// Whether this error is recoverable (can be retried)
    pub recoverable: bool,
    /// Suggested action for the client
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

impl ErrorResponse {
    /// Build the client-facing body for an error. Details are only attached outside
    /// production and for errors that are not marked sensitive.
    pub fn from_app_error(error: &AppError, include_details: bool) -> Self {
        let (details, error_type) = if include_details && !error.is_sensitive() {
            (
                Some(error.detailed_message()),
                Some(error.error_type().to_string()),
            )
        } else {
            (None, None)
        };

        Self {
            error: error.client_message(),
            details,
            error_type,
            code: error.error_code().to_string(),
            recoverable: error.is_recoverable(),
            suggested_action: error.suggested_action().map(String::from),
        }
    }
}

/// Wrapper type for AppError to implement IntoResponse
/// This is necessary because of Rust's orphan rules - we can't implement
/// IntoResponse (external trait) for AppError (external type from tubely-core)
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        HttpAppError(storage_error_to_app_error(err))
    }
}

impl From<UploadFailure> for HttpAppError {
    fn from(failure: UploadFailure) -> Self {
        tracing::debug!(
            stage = %failure.stage,
            error_type = failure.cause.error_type(),
            "Upload aborted"
        );
        HttpAppError(failure.cause)
    }
}

/// Map a storage failure onto the pipeline outcome it represents.
pub fn storage_error_to_app_error(err: StorageError) -> AppError {
    match err {
        StorageError::UploadFailed(msg) => AppError::Upload(msg),
        StorageError::SigningFailed(msg) => AppError::Signing(msg),
        StorageError::MalformedReference(msg) => AppError::MalformedReference(msg),
        StorageError::NotFound(msg) => AppError::NotFound(msg),
        other => AppError::Internal(format!("Storage error: {}", other)),
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, "Error occurred");
        }
    }
}

fn is_production_env() -> bool {
    std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .map(|env| env.to_lowercase() == "production" || env.to_lowercase() == "prod")
        .unwrap_or(false)
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        let body = ErrorResponse::from_app_error(app_error, !is_production_env());
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_errors_map_to_pipeline_outcomes() {
        assert!(matches!(
            storage_error_to_app_error(StorageError::UploadFailed("boom".into())),
            AppError::Upload(_)
        ));
        assert!(matches!(
            storage_error_to_app_error(StorageError::SigningFailed("boom".into())),
            AppError::Signing(_)
        ));
        assert!(matches!(
            storage_error_to_app_error(StorageError::MalformedReference("x".into())),
            AppError::MalformedReference(_)
        ));
        assert!(matches!(
            storage_error_to_app_error(StorageError::InvalidKey("../x".into())),
            AppError::Internal(_)
        ));
    }

    #[test]
    fn test_sensitive_errors_hide_details() {
        let body = ErrorResponse::from_app_error(&AppError::Probe("exit 1".into()), true);
        assert!(body.details.is_none());
        assert!(body.error_type.is_none());
        assert_eq!(body.code, AppError::Probe(String::new()).error_code());
    }

    #[test]
    fn test_caller_errors_carry_details_outside_production() {
        let body = ErrorResponse::from_app_error(&AppError::BadRequest("no file".into()), true);
        assert!(body.details.is_some());

        let body = ErrorResponse::from_app_error(&AppError::BadRequest("no file".into()), false);
        assert!(body.details.is_none());
    }
}
