use std::sync::Arc;

use axum::extract::State;
use axum::response::Response;
use axum::Json;

use crate::webserver::models::{
    LoginRequest, RegisterRequest, ResetPasswordRequest, ResetRequestRequest,
};
use crate::webserver::state::AppState;
use crate::webserver::utils::{platform_error_response, success_response};

/// POST /api/auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterRequest>,
) -> Response {
    match state
        .auth
        .register(&request.email, &request.username, &request.password)
    {
        Ok(summary) => success_response(summary),
        Err(e) => platform_error_response(&e),
    }
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Response {
    match state.auth.authenticate(&request.identifier, &request.password) {
        Ok(session) => success_response(session),
        Err(e) => platform_error_response(&e),
    }
}

/// POST /api/auth/reset-request
///
/// Always answers success so account existence cannot be probed; the token
/// goes out through the delivery channel, never the response.
pub async fn reset_request(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ResetRequestRequest>,
) -> Response {
    match state.auth.request_password_reset(&request.email) {
        Ok(_) => success_response(serde_json::json!({
            "message": "If the account exists, a reset token has been issued"
        })),
        Err(e) => platform_error_response(&e),
    }
}

/// POST /api/auth/reset
pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ResetPasswordRequest>,
) -> Response {
    match state.auth.reset_password(&request.token, &request.new_password) {
        Ok(true) => success_response(serde_json::json!({ "message": "Password updated" })),
        Ok(false) => platform_error_response(&crate::errors::PlatformError::Auth(
            crate::errors::AuthError::ResetTokenInvalid,
        )),
        Err(e) => platform_error_response(&e),
    }
}
