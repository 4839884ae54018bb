//! Response envelope and error-to-HTTP mapping shared by all endpoints.
//!
//! All responses are JSON `ApiResponse` documents containing:
//! - `success`: whether the request succeeded
//! - `data`: the payload on success
//! - `message`: human-readable message
//! - `error.error_type`: machine-readable error category on failure
//!
//! Token failures always produce the same 403 body regardless of the cause.

use crate::auth::errors::AuthError;
use crate::errors::ServiceError;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

/// Standard API response wrapper for all endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Indicates if the request was successful
    pub success: bool,
    /// Response data (present on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Human-readable message
    pub message: String,
    /// Error details (present on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetails>,
    /// Response timestamp
    pub timestamp: String,
}

/// Error details for failed requests
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Machine-readable error type identifier
    pub error_type: String,
}

impl<T> ApiResponse<T> {
    /// Create a successful response
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: message.into(),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl ApiResponse<()> {
    /// Create a successful response without a payload
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: message.into(),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Create an error response
    pub fn error(message: impl Into<String>, error_type: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: message.into(),
            error: Some(ErrorDetails {
                error_type: error_type.into(),
            }),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

fn error_body(message: String, error_type: &str) -> String {
    let error_response = ApiResponse::error(message, error_type);
    serde_json::to_string(&error_response).unwrap_or_else(|_| {
        r#"{"success":false,"message":"Internal server error"}"#.to_string()
    })
}

/// Converts AuthError to the HTTP status and JSON body returned to clients
pub fn auth_error_to_http(error: AuthError) -> (StatusCode, String) {
    let (status, error_type) = match &error {
        AuthError::UsernameTaken => (StatusCode::BAD_REQUEST, "username_taken"),
        AuthError::AlreadyRegistered => (StatusCode::BAD_REQUEST, "already_registered"),
        AuthError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
        AuthError::NotFound => (StatusCode::NOT_FOUND, "not_found"),
        AuthError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
        AuthError::Forbidden => (StatusCode::FORBIDDEN, "invalid_token"),
        AuthError::Internal(source) => {
            tracing::error!("Internal error: {:#}", source);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_body("Internal server error".to_string(), "internal_error"),
            );
        }
    };

    (status, error_body(error.to_string(), error_type))
}

/// Converts ServiceError to appropriate HTTP response with standard format
pub fn service_error_to_http(error: ServiceError) -> (StatusCode, String) {
    let (status, error_type, message) = match error {
        ServiceError::Validation { message } => {
            (StatusCode::BAD_REQUEST, "validation_error", message)
        }
        ServiceError::NotFound { entity, identifier } => (
            StatusCode::NOT_FOUND,
            "not_found",
            format!("{} '{}' not found", entity, identifier),
        ),
        ServiceError::Unauthorized { message } => {
            (StatusCode::UNAUTHORIZED, "unauthorized", message)
        }
        ServiceError::Database { source } => {
            tracing::error!("Database error: {:#}", source);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "database_error",
                "Internal server error".to_string(),
            )
        }
        ServiceError::ExternalService { message } => {
            (StatusCode::BAD_GATEWAY, "external_service_error", message)
        }
    };

    (status, error_body(message, error_type))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> serde_json::Value {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn auth_errors_map_to_status_codes() {
        let cases = [
            (AuthError::UsernameTaken, StatusCode::BAD_REQUEST),
            (AuthError::AlreadyRegistered, StatusCode::BAD_REQUEST),
            (AuthError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (AuthError::NotFound, StatusCode::NOT_FOUND),
            (AuthError::Unauthorized, StatusCode::UNAUTHORIZED),
            (AuthError::Forbidden, StatusCode::FORBIDDEN),
            (
                AuthError::Internal(anyhow::anyhow!("disk on fire")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            let (status, _) = auth_error_to_http(error);
            assert_eq!(status, expected);
        }
    }

    #[test]
    fn internal_errors_do_not_leak_causes() {
        let (_, body) = auth_error_to_http(AuthError::Internal(anyhow::anyhow!("disk on fire")));
        let json = parse(&body);
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Internal server error");
        assert!(!body.contains("disk on fire"));
    }

    #[test]
    fn forbidden_body_is_generic() {
        let (_, body) = auth_error_to_http(AuthError::Forbidden);
        let json = parse(&body);
        assert_eq!(json["message"], "Invalid or expired token");
        assert_eq!(json["error"]["error_type"], "invalid_token");
    }

    #[test]
    fn service_errors_map_to_status_codes() {
        let (status, body) = service_error_to_http(ServiceError::not_found("User", "bob"));
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(parse(&body)["message"], "User 'bob' not found");

        let (status, _) = service_error_to_http(ServiceError::unauthorized("nope"));
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) =
            service_error_to_http(ServiceError::Database { source: anyhow::anyhow!("locked") });
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.contains("locked"));
    }

    #[test]
    fn success_envelope_omits_error() {
        let json = serde_json::to_value(ApiResponse::success(42, "ok")).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"], 42);
        assert!(json.get("error").is_none());
    }
}
