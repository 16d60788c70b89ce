use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Response;

use crate::logger::{self, LogTag};
use crate::webserver::state::AppState;
use crate::webserver::utils::{platform_error_response, success_response};

/// Header carrying the provider's payload signature
pub const SIGNATURE_HEADER: &str = "X-Billing-Signature";

/// POST /api/billing/webhook
///
/// Body is the provider's raw JSON event; the signature rides in
/// X-Billing-Signature.
pub async fn webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());

    match state.billing.handle_webhook(&body, signature) {
        Ok(action) => {
            logger::info(LogTag::Billing, &format!("Webhook processed: {}", action));
            success_response(serde_json::json!({ "action": action }))
        }
        Err(e) => {
            logger::warning(LogTag::Billing, &format!("Webhook failed: {}", e));
            platform_error_response(&e)
        }
    }
}
