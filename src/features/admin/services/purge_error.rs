use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::core::database::sqlstate;
use crate::core::error::AppError;

/// Distinguishable reasons a purge operation can fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PurgeErrorCode {
    Unauthenticated,
    Forbidden,
    DependentRecords,
    RecordsModified,
    ConcurrentConflict,
    Timeout,
    Internal,
}

impl PurgeErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PurgeErrorCode::Unauthenticated => "UNAUTHENTICATED",
            PurgeErrorCode::Forbidden => "FORBIDDEN",
            PurgeErrorCode::DependentRecords => "DEPENDENT_RECORDS",
            PurgeErrorCode::RecordsModified => "RECORDS_MODIFIED",
            PurgeErrorCode::ConcurrentConflict => "CONCURRENT_CONFLICT",
            PurgeErrorCode::Timeout => "TIMEOUT",
            PurgeErrorCode::Internal => "INTERNAL",
        }
    }

    /// User-facing message, safe to show as is
    pub fn message(&self) -> &'static str {
        match self {
            PurgeErrorCode::Unauthenticated => "You must be signed in to do this",
            PurgeErrorCode::Forbidden => "Only administrators can purge completed tickets",
            PurgeErrorCode::DependentRecords => {
                "Some tickets still have dependent records. Please try again."
            }
            PurgeErrorCode::RecordsModified => {
                "Some tickets were modified by another process. Review the list and try again."
            }
            PurgeErrorCode::ConcurrentConflict => {
                "Another operation touched these tickets at the same time. Please try again."
            }
            PurgeErrorCode::Timeout => "The operation took too long and was cancelled. Please try again.",
            PurgeErrorCode::Internal => "Failed to purge completed tickets",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            PurgeErrorCode::Unauthenticated => StatusCode::UNAUTHORIZED,
            PurgeErrorCode::Forbidden => StatusCode::FORBIDDEN,
            PurgeErrorCode::DependentRecords
            | PurgeErrorCode::RecordsModified
            | PurgeErrorCode::ConcurrentConflict => StatusCode::CONFLICT,
            PurgeErrorCode::Timeout => StatusCode::SERVICE_UNAVAILABLE,
            PurgeErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the admin can reasonably retry the same request
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PurgeErrorCode::DependentRecords
                | PurgeErrorCode::RecordsModified
                | PurgeErrorCode::ConcurrentConflict
                | PurgeErrorCode::Timeout
        )
    }
}

/// Map a PostgreSQL SQLSTATE to a purge failure code
pub fn classify_sqlstate(code: Option<&str>) -> PurgeErrorCode {
    match code {
        Some("23503") => PurgeErrorCode::DependentRecords,
        Some("40001") | Some("40P01") => PurgeErrorCode::ConcurrentConflict,
        Some("55P03") | Some("57014") => PurgeErrorCode::Timeout,
        _ => PurgeErrorCode::Internal,
    }
}

/// Typed failure result of the completed-ticket operations
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct PurgeFailure {
    pub code: PurgeErrorCode,
    pub message: String,
}

impl PurgeFailure {
    pub fn new(code: PurgeErrorCode) -> Self {
        Self {
            code,
            message: code.message().to_string(),
        }
    }
}

impl From<&AppError> for PurgeErrorCode {
    fn from(err: &AppError) -> Self {
        match err {
            AppError::Database(sqlx::Error::PoolTimedOut) => PurgeErrorCode::Timeout,
            AppError::Database(e) => classify_sqlstate(sqlstate(e).as_deref()),
            AppError::Conflict(_) => PurgeErrorCode::RecordsModified,
            AppError::Timeout(_) => PurgeErrorCode::Timeout,
            AppError::Auth(_) | AppError::Unauthorized(_) => PurgeErrorCode::Unauthenticated,
            AppError::Forbidden(_) => PurgeErrorCode::Forbidden,
            _ => PurgeErrorCode::Internal,
        }
    }
}

impl From<&AppError> for PurgeFailure {
    fn from(err: &AppError) -> Self {
        PurgeFailure::new(PurgeErrorCode::from(err))
    }
}

impl From<AppError> for PurgeFailure {
    fn from(err: AppError) -> Self {
        PurgeFailure::from(&err)
    }
}

/// Error envelope of the admin purge endpoints
#[derive(Debug, Serialize, ToSchema)]
pub struct PurgeFailureBody {
    pub success: bool,
    pub message: String,
    pub errors: Vec<PurgeErrorCode>,
    /// Whether the same request may succeed if sent again
    pub retryable: bool,
}

impl From<PurgeFailure> for PurgeFailureBody {
    fn from(failure: PurgeFailure) -> Self {
        Self {
            success: false,
            message: failure.message,
            errors: vec![failure.code],
            retryable: failure.code.is_retryable(),
        }
    }
}

impl IntoResponse for PurgeFailure {
    fn into_response(self) -> Response {
        let status = self.code.status();
        (status, Json(PurgeFailureBody::from(self))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_sqlstate() {
        assert_eq!(
            classify_sqlstate(Some("23503")),
            PurgeErrorCode::DependentRecords
        );
        assert_eq!(
            classify_sqlstate(Some("40001")),
            PurgeErrorCode::ConcurrentConflict
        );
        assert_eq!(
            classify_sqlstate(Some("40P01")),
            PurgeErrorCode::ConcurrentConflict
        );
        assert_eq!(classify_sqlstate(Some("55P03")), PurgeErrorCode::Timeout);
        assert_eq!(classify_sqlstate(Some("57014")), PurgeErrorCode::Timeout);
        assert_eq!(classify_sqlstate(Some("42P01")), PurgeErrorCode::Internal);
        assert_eq!(classify_sqlstate(None), PurgeErrorCode::Internal);
    }

    #[test]
    fn test_app_error_classification() {
        let cases = [
            (
                AppError::Database(sqlx::Error::PoolTimedOut),
                PurgeErrorCode::Timeout,
            ),
            (
                AppError::Database(sqlx::Error::RowNotFound),
                PurgeErrorCode::Internal,
            ),
            (
                AppError::Conflict("gone".into()),
                PurgeErrorCode::RecordsModified,
            ),
            (AppError::Timeout("slow".into()), PurgeErrorCode::Timeout),
            (
                AppError::Internal("boom".into()),
                PurgeErrorCode::Internal,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(PurgeFailure::from(err).code, expected);
        }
    }

    #[test]
    fn test_failure_from_borrowed_error_keeps_code() {
        let err = AppError::Database(sqlx::Error::PoolTimedOut);
        let failure = PurgeFailure::from(&err);
        assert_eq!(failure.code, PurgeErrorCode::Timeout);
        assert_eq!(failure.message, PurgeErrorCode::Timeout.message());
        assert!(matches!(err, AppError::Database(_)));
    }

    #[test]
    fn test_failure_body_reports_retryability() {
        let body = serde_json::to_value(PurgeFailureBody::from(PurgeFailure::new(
            PurgeErrorCode::ConcurrentConflict,
        )))
        .unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["errors"][0], "CONCURRENT_CONFLICT");
        assert_eq!(body["retryable"], true);

        let body = serde_json::to_value(PurgeFailureBody::from(PurgeFailure::new(
            PurgeErrorCode::Internal,
        )))
        .unwrap();
        assert_eq!(body["retryable"], false);
    }

    #[test]
    fn test_failure_message_does_not_leak_details() {
        let failure = PurgeFailure::from(AppError::Internal("password=hunter2".into()));
        assert_eq!(failure.message, PurgeErrorCode::Internal.message());
    }

    #[test]
    fn test_status_codes_and_retryability() {
        assert_eq!(
            PurgeErrorCode::Unauthenticated.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(PurgeErrorCode::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            PurgeErrorCode::ConcurrentConflict.status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            PurgeErrorCode::Timeout.status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert!(PurgeErrorCode::ConcurrentConflict.is_retryable());
        assert!(!PurgeErrorCode::Forbidden.is_retryable());
    }

    #[test]
    fn test_code_serializes_like_as_str() {
        for code in [
            PurgeErrorCode::Unauthenticated,
            PurgeErrorCode::DependentRecords,
            PurgeErrorCode::ConcurrentConflict,
        ] {
            assert_eq!(
                serde_json::to_value(code).unwrap(),
                serde_json::Value::String(code.as_str().to_string())
            );
        }
    }
}
