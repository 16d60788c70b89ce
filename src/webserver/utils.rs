/// Shared response helpers for REST handlers
///
/// Every endpoint answers with the same JSON envelope:
/// success: `{"success": true, "data": ...}`
/// failure: `{"success": false, "error": {"code", "message", "hint"}}`
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::errors::{AuthError, PlatformError, SubscriptionError};

/// Wrap payload data in the success envelope
pub fn success_response<T: Serialize>(data: T) -> Response {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "success": true, "data": data })),
    )
        .into_response()
}

/// Build an error envelope with the given status
pub fn error_response(
    status: StatusCode,
    code: &str,
    message: &str,
    hint: Option<&str>,
) -> Response {
    (
        status,
        Json(serde_json::json!({
            "success": false,
            "error": { "code": code, "message": message, "hint": hint },
        })),
    )
        .into_response()
}

/// Map a platform error onto the HTTP status space
pub fn platform_error_response(error: &PlatformError) -> Response {
    let (status, code) = match error {
        PlatformError::Auth(AuthError::InvalidCredentials)
        | PlatformError::Auth(AuthError::UserNotFound { .. })
        | PlatformError::Auth(AuthError::TokenExpired)
        | PlatformError::Auth(AuthError::TokenInvalid { .. }) => {
            (StatusCode::UNAUTHORIZED, "UNAUTHORIZED")
        }
        PlatformError::Auth(AuthError::UserAlreadyExists { .. }) => {
            (StatusCode::CONFLICT, "ALREADY_EXISTS")
        }
        PlatformError::Auth(_) | PlatformError::Data(_) => {
            (StatusCode::BAD_REQUEST, "INVALID_REQUEST")
        }
        PlatformError::Subscription(SubscriptionError::LimitExceeded { .. }) => {
            (StatusCode::TOO_MANY_REQUESTS, "LIMIT_EXCEEDED")
        }
        PlatformError::Subscription(SubscriptionError::FeatureLocked { .. }) => {
            (StatusCode::FORBIDDEN, "FEATURE_LOCKED")
        }
        PlatformError::Subscription(SubscriptionError::WebhookRejected { .. }) => {
            (StatusCode::BAD_REQUEST, "WEBHOOK_REJECTED")
        }
        PlatformError::Subscription(_) => (StatusCode::BAD_REQUEST, "SUBSCRIPTION_ERROR"),
        PlatformError::Network(_) | PlatformError::Market(_) => {
            (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR")
        }
        PlatformError::Database(_) | PlatformError::Configuration(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
        }
    };

    error_response(status, code, &error.to_string(), None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        let unauthorized = platform_error_response(&PlatformError::Auth(AuthError::InvalidCredentials));
        assert_eq!(unauthorized.status(), StatusCode::UNAUTHORIZED);

        let conflict = platform_error_response(&PlatformError::Auth(AuthError::UserAlreadyExists {
            email: "a@b.c".to_string(),
            username: "a".to_string(),
        }));
        assert_eq!(conflict.status(), StatusCode::CONFLICT);

        let limited = platform_error_response(&PlatformError::limit_exceeded("scans", 3, 3));
        assert_eq!(limited.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}
