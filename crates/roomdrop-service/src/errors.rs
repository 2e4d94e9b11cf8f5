//! Roomdrop service error types.
//!
//! All errors map to appropriate HTTP status codes via the `IntoResponse` impl.
//! Storage error messages returned to clients are intentionally generic to
//! avoid leaking internal details. Actual errors are logged server-side.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use roomdrop_core::error::CoreError;
use serde::Serialize;
use thiserror::Error;

/// Roomdrop service error type.
///
/// Maps to appropriate HTTP status codes:
/// - BadRequest: 400 Bad Request
/// - Unauthorized: 401 Unauthorized
/// - NotFound: 404 Not Found
/// - Conflict: 409 Conflict
/// - Storage: 500 Internal Server Error
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl ApiError {
    /// Returns the HTTP status code for this error (for metrics recording).
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict(_) => 409,
            ApiError::Storage(_) => 500,
        }
    }
}

/// Convert core lifecycle errors to their HTTP-facing equivalents.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(msg) => ApiError::BadRequest(msg),
            CoreError::Unauthorized(msg) => ApiError::Unauthorized(msg),
            CoreError::Conflict(msg) => ApiError::Conflict(msg),
            CoreError::NotFound(msg) => ApiError::NotFound(msg),
            CoreError::Storage(msg) => ApiError::Storage(msg),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::BadRequest(reason) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", reason.clone())
            }
            ApiError::Unauthorized(reason) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", reason.clone())
            }
            ApiError::NotFound(resource) => (StatusCode::NOT_FOUND, "NOT_FOUND", resource.clone()),
            ApiError::Conflict(reason) => (StatusCode::CONFLICT, "CONFLICT", reason.clone()),
            ApiError::Storage(err) => {
                // Log actual error server-side, return generic message to client
                tracing::error!(target: "rd.storage", error = %err, "Storage operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "An internal storage error occurred".to_string(),
                )
            }
        };

        let error_response = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        let mut response = (status, Json(error_response)).into_response();

        // Add WWW-Authenticate header for 401 responses
        if status == StatusCode::UNAUTHORIZED {
            if let Ok(header_value) =
                "Bearer realm=\"roomdrop-api\", error=\"invalid_token\"".parse()
            {
                response
                    .headers_mut()
                    .insert("WWW-Authenticate", header_value);
            }
        }

        response
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::body::Body;
    use http_body_util::BodyExt;

    // Helper function to read the response body as JSON
    async fn read_body_json(body: Body) -> serde_json::Value {
        let bytes = body.collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_display_bad_request() {
        let error = ApiError::BadRequest("invalid input".to_string());
        assert_eq!(format!("{}", error), "Bad request: invalid input");
    }

    #[test]
    fn test_display_unauthorized() {
        let error = ApiError::Unauthorized("invalid session token".to_string());
        assert_eq!(format!("{}", error), "Unauthorized: invalid session token");
    }

    #[test]
    fn test_display_not_found() {
        let error = ApiError::NotFound("unknown room".to_string());
        assert_eq!(format!("{}", error), "Not found: unknown room");
    }

    #[test]
    fn test_display_conflict() {
        let error = ApiError::Conflict("email already registered".to_string());
        assert_eq!(format!("{}", error), "Conflict: email already registered");
    }

    #[test]
    fn test_display_storage() {
        let error = ApiError::Storage("disk full".to_string());
        assert_eq!(format!("{}", error), "Storage error: disk full");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::BadRequest("test".to_string()).status_code(), 400);
        assert_eq!(
            ApiError::Unauthorized("test".to_string()).status_code(),
            401
        );
        assert_eq!(ApiError::NotFound("test".to_string()).status_code(), 404);
        assert_eq!(ApiError::Conflict("test".to_string()).status_code(), 409);
        assert_eq!(ApiError::Storage("test".to_string()).status_code(), 500);
    }

    #[test]
    fn test_from_core_error_mapping() {
        assert!(matches!(
            ApiError::from(CoreError::Validation("empty email".to_string())),
            ApiError::BadRequest(msg) if msg == "empty email"
        ));
        assert!(matches!(
            ApiError::from(CoreError::Unauthorized("invalid credentials".to_string())),
            ApiError::Unauthorized(msg) if msg == "invalid credentials"
        ));
        assert!(matches!(
            ApiError::from(CoreError::Conflict("email already registered".to_string())),
            ApiError::Conflict(msg) if msg == "email already registered"
        ));
        assert!(matches!(
            ApiError::from(CoreError::NotFound("unknown room".to_string())),
            ApiError::NotFound(msg) if msg == "unknown room"
        ));
        assert!(matches!(
            ApiError::from(CoreError::Storage("RNG failure".to_string())),
            ApiError::Storage(msg) if msg == "RNG failure"
        ));
    }

    #[tokio::test]
    async fn test_into_response_bad_request() {
        let error = ApiError::BadRequest("file name must not be empty".to_string());
        let response = error.into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body_json = read_body_json(response.into_body()).await;
        assert_eq!(body_json["error"]["code"], "BAD_REQUEST");
        assert_eq!(
            body_json["error"]["message"],
            "file name must not be empty"
        );
    }

    #[tokio::test]
    async fn test_into_response_unauthorized() {
        let error = ApiError::Unauthorized("invalid session token".to_string());
        let response = error.into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        // Check WWW-Authenticate header
        let www_auth = response.headers().get("WWW-Authenticate");
        assert!(www_auth.is_some());
        let www_auth_str = www_auth.unwrap().to_str().unwrap();
        assert!(www_auth_str.contains("Bearer realm=\"roomdrop-api\""));

        let body_json = read_body_json(response.into_body()).await;
        assert_eq!(body_json["error"]["code"], "UNAUTHORIZED");
        assert_eq!(body_json["error"]["message"], "invalid session token");
    }

    #[tokio::test]
    async fn test_into_response_not_found() {
        let error = ApiError::NotFound("invalid room code or password".to_string());
        let response = error.into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body_json = read_body_json(response.into_body()).await;
        assert_eq!(body_json["error"]["code"], "NOT_FOUND");
        assert_eq!(
            body_json["error"]["message"],
            "invalid room code or password"
        );
    }

    #[tokio::test]
    async fn test_into_response_conflict() {
        let error = ApiError::Conflict("email already registered".to_string());
        let response = error.into_response();

        assert_eq!(response.status(), StatusCode::CONFLICT);

        let body_json = read_body_json(response.into_body()).await;
        assert_eq!(body_json["error"]["code"], "CONFLICT");
        assert_eq!(body_json["error"]["message"], "email already registered");
    }

    #[tokio::test]
    async fn test_into_response_storage() {
        let error = ApiError::Storage("disk full".to_string());
        let response = error.into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body_json = read_body_json(response.into_body()).await;
        assert_eq!(body_json["error"]["code"], "STORAGE_ERROR");
        // Generic message returned to client
        assert_eq!(
            body_json["error"]["message"],
            "An internal storage error occurred"
        );
    }
}
