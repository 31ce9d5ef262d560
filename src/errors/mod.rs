//! Unified error handling with consistent API response envelope.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Error detail in the API response envelope.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

/// Consistent JSON envelope for all API responses.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Wrap a successful result in the envelope.
    pub fn success(data: T) -> Json<Self> {
        Json(Self {
            data: Some(data),
            error: None,
        })
    }

    /// Wrap an error in the envelope.
    pub fn error(code: &str, message: &str) -> Json<Self> {
        Json(Self {
            data: None,
            error: Some(ApiError {
                code: code.to_string(),
                message: message.to_string(),
            }),
        })
    }
}

/// Application error type mapping to HTTP status codes.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Map a unique-constraint violation to `Conflict`, anything else to `Database`.
    pub fn from_unique_violation(err: sqlx::Error, message: impl Into<String>) -> Self {
        match err {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(message.into())
            }
            _ => AppError::Database(err),
        }
    }

    /// Map a foreign-key violation to `Validation`, anything else to `Database`.
    pub fn from_foreign_key_violation(err: sqlx::Error, message: impl Into<String>) -> Self {
        match err {
            sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                AppError::Validation(message.into())
            }
            _ => AppError::Database(err),
        }
    }

    /// HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable code placed in the envelope.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Unauthorized => "UNAUTHORIZED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Database(_) | AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Message safe to show to clients. Server-side details stay in the logs.
    fn client_message(&self) -> String {
        match self {
            AppError::NotFound(msg)
            | AppError::Validation(msg)
            | AppError::Forbidden(msg)
            | AppError::Conflict(msg) => msg.clone(),
            AppError::Unauthorized => "Authentication required".to_string(),
            AppError::Database(e) => {
                tracing::error!(error = %e, "Database error");
                "An internal error occurred".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                "An internal error occurred".to_string()
            }
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, ApiResponse::<()>::error(self.code(), &self.client_message())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn api_response_success() {
        let response = ApiResponse::success("hello");
        let json = serde_json::to_value(&response.0).unwrap();
        assert_eq!(json["data"], "hello");
        assert!(json["error"].is_null());
    }

    #[test]
    fn api_response_error() {
        let response = ApiResponse::<()>::error("NOT_FOUND", "Server not found");
        let json = serde_json::to_value(&response.0).unwrap();
        assert!(json["data"].is_null());
        assert_eq!(json["error"]["code"], "NOT_FOUND");
        assert_eq!(json["error"]["message"], "Server not found");
    }

    #[test]
    fn app_error_display() {
        let err = AppError::Validation("month must be between 1 and 12".to_string());
        assert_eq!(err.to_string(), "Validation error: month must be between 1 and 12");
    }

    #[test]
    fn app_error_from_sqlx() {
        let err: AppError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, AppError::Database(_)));
    }

    #[test]
    fn non_database_error_is_not_a_conflict() {
        let err = AppError::from_unique_violation(sqlx::Error::RowNotFound, "duplicate");
        assert!(matches!(err, AppError::Database(_)));
        let err = AppError::from_foreign_key_violation(sqlx::Error::PoolTimedOut, "unknown");
        assert!(matches!(err, AppError::Database(_)));
    }

    #[test]
    fn validation_errors_map_to_bad_request() {
        #[derive(Validate)]
        struct Probe {
            #[validate(range(min = 1, max = 12))]
            month: i32,
        }

        let err: AppError = Probe { month: 13 }.validate().unwrap_err().into();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn unauthorized_maps_to_401() {
        let response = AppError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn server_side_errors_share_a_code() {
        let db = AppError::Database(sqlx::Error::PoolTimedOut);
        let internal = AppError::Internal("csv".to_string());
        assert_eq!(db.code(), "INTERNAL_ERROR");
        assert_eq!(internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(internal.client_message(), "An internal error occurred");
    }

    #[test]
    fn conflict_keeps_its_message() {
        let err = AppError::Conflict("Server 'web' already exists".to_string());
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.client_message(), "Server 'web' already exists");
    }
}
