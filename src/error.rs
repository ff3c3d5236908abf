use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Authorization error: {0}")]
    Authorization(String),

    #[error("Conflict error: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Unknown error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

impl ApiError {
    /// Create a new validation error
    pub fn validation<T: Into<String>>(msg: T) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a new not found error
    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a new internal error
    pub fn internal<T: Into<String>>(msg: T) -> Self {
        Self::Internal(msg.into())
    }

    /// Create a new authentication error
    pub fn authentication<T: Into<String>>(msg: T) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a new authorization error
    pub fn authorization<T: Into<String>>(msg: T) -> Self {
        Self::Authorization(msg.into())
    }

    /// Create a new conflict error
    pub fn conflict<T: Into<String>>(msg: T) -> Self {
        Self::Conflict(msg.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v4();

        let (status, error_message, error_code) = match self {
            ApiError::Database(ref err) => {
                tracing::error!(error_id = %error_id, error = %err, "database error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error".to_string(),
                    "DATABASE_ERROR",
                )
            }
            ApiError::Validation(msg) => {
                tracing::warn!(error_id = %error_id, error = %msg, "validation error occurred");
                (StatusCode::BAD_REQUEST, msg, "VALIDATION_ERROR")
            }
            ApiError::NotFound(msg) => {
                tracing::info!(error_id = %error_id, error = %msg, "resource not found");
                (StatusCode::NOT_FOUND, msg, "NOT_FOUND")
            }
            ApiError::Config(ref err) => {
                tracing::error!(error_id = %error_id, error = %err, "configuration error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Configuration error".to_string(),
                    "CONFIG_ERROR",
                )
            }
            ApiError::Io(ref err) => {
                tracing::error!(error_id = %error_id, error = %err, "IO error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "IO error".to_string(),
                    "IO_ERROR",
                )
            }
            ApiError::Serialization(ref err) => {
                tracing::error!(error_id = %error_id, error = %err, "serialization error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Serialization error".to_string(),
                    "SERIALIZATION_ERROR",
                )
            }
            ApiError::Migration(ref err) => {
                tracing::error!(error_id = %error_id, error = %err, "database migration error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database migration error".to_string(),
                    "MIGRATION_ERROR",
                )
            }
            ApiError::Authentication(msg) => {
                tracing::warn!(error_id = %error_id, error = %msg, "authentication error occurred");
                (StatusCode::UNAUTHORIZED, msg, "AUTHENTICATION_ERROR")
            }
            ApiError::Authorization(msg) => {
                tracing::warn!(error_id = %error_id, error = %msg, "authorization error occurred");
                (StatusCode::FORBIDDEN, msg, "AUTHORIZATION_ERROR")
            }
            ApiError::Conflict(msg) => {
                tracing::warn!(error_id = %error_id, error = %msg, "conflict error occurred");
                (StatusCode::CONFLICT, msg, "CONFLICT_ERROR")
            }
            ApiError::Internal(msg) => {
                tracing::error!(error_id = %error_id, error = %msg, "internal server error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, msg, "INTERNAL_ERROR")
            }
            ApiError::Anyhow(ref err) => {
                tracing::error!(error_id = %error_id, error = %err, "unexpected error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    "INTERNAL_ERROR",
                )
            }
        };

        let body = Json(json!({
            "error": {
                "message": error_message,
                "code": error_code,
                "error_id": error_id,
                "timestamp": chrono::Utc::now().to_rfc3339(),
            }
        }));

        (status, body).into_response()
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        routing::get,
        Router,
    };
    use tower::ServiceExt;

    async fn validation_handler() -> Result<&'static str, ApiError> {
        Err(ApiError::validation("Container number is required"))
    }

    async fn not_found_handler() -> Result<&'static str, ApiError> {
        Err(ApiError::not_found("Inspection not found"))
    }

    async fn forbidden_handler() -> Result<&'static str, ApiError> {
        Err(ApiError::authorization("Admin role required"))
    }

    #[tokio::test]
    async fn test_validation_error_response() {
        let app = Router::new().route("/test", get(validation_handler));

        let request = Request::builder().uri("/test").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_not_found_error_response() {
        let app = Router::new().route("/test", get(not_found_handler));

        let request = Request::builder().uri("/test").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_authorization_error_response() {
        let app = Router::new().route("/test", get(forbidden_handler));

        let request = Request::builder().uri("/test").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_error_constructors() {
        assert!(matches!(ApiError::validation("x"), ApiError::Validation(_)));
        assert!(matches!(ApiError::not_found("x"), ApiError::NotFound(_)));
        assert!(matches!(ApiError::internal("x"), ApiError::Internal(_)));
        assert!(matches!(
            ApiError::authentication("x"),
            ApiError::Authentication(_)
        ));
        assert!(matches!(
            ApiError::authorization("x"),
            ApiError::Authorization(_)
        ));
        assert!(matches!(ApiError::conflict("x"), ApiError::Conflict(_)));
    }
}
