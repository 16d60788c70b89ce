/// Webserver middleware
///
/// Request interceptors for authentication and usage accounting
use std::sync::Arc;

use axum::{
  extract::{Request, State},
  http::{header, StatusCode},
  middleware::Next,
  response::Response,
};

use crate::{
  arguments::is_debug_webserver_enabled,
  logger::{self, LogTag},
  webserver::{state::AppState, utils},
};

/// Bearer-token gate for protected routes
///
/// Expects `Authorization: Bearer <jwt>`. On success the verified claims
/// are inserted into request extensions for handlers to read; anything
/// else is answered with a 401 envelope.
pub async fn auth_gate(
  State(state): State<Arc<AppState>>,
  mut request: Request,
  next: Next,
) -> Response {
  let token = request
    .headers()
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "));

  match token.and_then(|t| state.auth.verify_token(t)) {
    Some(claims) => {
      if is_debug_webserver_enabled() {
        logger::debug(
          LogTag::Webserver,
          &format!("Authenticated request from '{}'", claims.username),
        );
      }
      request.extensions_mut().insert(claims);
      next.run(request).await
    }
    None => {
      let path = request.uri().path().to_string();
      logger::warning(
        LogTag::Webserver,
        &format!("Blocked request to {} - missing or invalid token", path),
      );
      utils::error_response(
        StatusCode::UNAUTHORIZED,
        "UNAUTHORIZED",
        "Valid bearer token required",
        Some("Login via POST /api/auth/login and send Authorization: Bearer <token>"),
      )
    }
  }
}
