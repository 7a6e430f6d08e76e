//! HTTP-facing error type.
//!
//! Every error leaves as `{"error": {"code": ..., "message": ...}}` with a matching
//! status. Internal detail is logged, never returned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::AuthError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

/// A status code paired with a machine-readable code and a client-safe message.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl AppError {
    pub fn new(status: StatusCode, code: &str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                code: code.to_string(),
                message: message.into(),
            },
        }
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", "authentication required")
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    pub fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            "internal server error",
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorResponse { error: self.body })).into_response()
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Unauthorized => Self::unauthorized(),
            err if err.is_envelope_failure() => {
                tracing::warn!("rejected session cookie: {err}");
                Self::unauthorized()
            }
            err => {
                tracing::error!("Auth error: {err}");
                Self::internal()
            }
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Database error: {err}");
        Self::internal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use http_body_util::BodyExt;

    async fn read_error_body(resp: Response) -> (StatusCode, ErrorResponse) {
        let status = resp.status();
        let bytes = Body::new(resp.into_body())
            .collect()
            .await
            .expect("collect body")
            .to_bytes();
        let parsed: ErrorResponse = serde_json::from_slice(&bytes).expect("deserialize error body");
        (status, parsed)
    }

    #[tokio::test]
    async fn test_unauthorized_produces_401() {
        let (status, body) = read_error_body(AppError::unauthorized().into_response()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body.error.code, "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_bad_request_and_not_found() {
        let resp = AppError::bad_request("content is required").into_response();
        let (status, body) = read_error_body(resp).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error.code, "BAD_REQUEST");
        assert_eq!(body.error.message, "content is required");

        let (status, body) = read_error_body(AppError::not_found("note 7").into_response()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.error.code, "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_auth_errors_map_to_safe_responses() {
        let resp = AppError::from(AuthError::Unauthorized).into_response();
        let (status, _) = read_error_body(resp).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let resp = AppError::from(AuthError::Integrity).into_response();
        let (status, _) = read_error_body(resp).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let err = AuthError::Provider {
            status: Some(400),
            body: "invalid_grant".to_string(),
        };
        let (status, body) = read_error_body(AppError::from(err).into_response()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error.code, "INTERNAL_ERROR");
        assert!(!body.error.message.contains("invalid_grant"));
    }

    #[tokio::test]
    async fn test_database_errors_hide_detail() {
        let err = sqlx::Error::Protocol("connection reset by peer".to_string());
        let (status, body) = read_error_body(AppError::from(err).into_response()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.error.message.contains("connection reset"));
    }
}
