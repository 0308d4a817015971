//! Shared API types
//!
//! Error responses common to every endpoint.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::filters::FilterError;

/// Standard API error response
#[derive(Debug)]
pub enum ApiError {
    NotFound { code: String, message: String },
    ServiceUnavailable { message: String },
    Internal { message: String },
}

impl ApiError {
    pub fn not_found(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NotFound {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable {
            message: message.into(),
        }
    }

    pub fn from_filter(e: FilterError) -> Self {
        match e {
            FilterError::Configuration(message) => {
                tracing::error!(error = %message, "Filter engine misconfigured");
                Self::service_unavailable("Filtering is not available")
            }
            FilterError::Backend(e) => {
                tracing::error!(error = %e, transient = e.is_transient(), "Filter query failed");
                if e.is_transient() {
                    Self::service_unavailable("Database temporarily unavailable")
                } else {
                    Self::internal("Database operation failed")
                }
            }
        }
    }
}

impl From<FilterError> for ApiError {
    fn from(e: FilterError) -> Self {
        Self::from_filter(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, code, message) = match self {
            Self::NotFound { code, message } => (StatusCode::NOT_FOUND, "not_found", code, message),
            Self::ServiceUnavailable { message } => (
                StatusCode::SERVICE_UNAVAILABLE,
                "service_unavailable",
                "SERVICE_UNAVAILABLE".to_string(),
                message,
            ),
            Self::Internal { message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "INTERNAL".to_string(),
                message,
            ),
        };
        (
            status,
            Json(serde_json::json!({
                "error": error_type,
                "code": code,
                "message": message
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DataError;

    #[test]
    fn test_error_status_codes() {
        let cases = [
            (ApiError::not_found("X", "missing"), StatusCode::NOT_FOUND),
            (ApiError::service_unavailable("down"), StatusCode::SERVICE_UNAVAILABLE),
            (ApiError::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[test]
    fn test_from_filter_error() {
        let unconfigured = ApiError::from(FilterError::not_configured());
        assert!(matches!(unconfigured, ApiError::ServiceUnavailable { .. }));

        let transient = ApiError::from(FilterError::Backend(DataError::from_sqlite(
            sqlx::Error::PoolTimedOut,
        )));
        assert!(matches!(transient, ApiError::ServiceUnavailable { .. }));

        let failed = ApiError::from(FilterError::Backend(DataError::Config("bad".into())));
        assert!(matches!(failed, ApiError::Internal { .. }));
    }
}
