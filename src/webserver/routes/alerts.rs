use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use axum::{Extension, Json};
use chrono::Utc;
use uuid::Uuid;

use crate::auth::Claims;
use crate::database::models::{Alert, NewAlert};
use crate::subscription::get_plan;
use crate::webserver::state::AppState;
use crate::webserver::utils::{error_response, success_response};

/// GET /api/alerts
pub async fn list(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> Response {
    match state.db.get_user_alerts(&claims.sub) {
        Ok(alerts) => success_response(alerts),
        Err(e) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            &e.to_string(),
            None,
        ),
    }
}

/// POST /api/alerts
///
/// Rejects the request when the tier's alert allowance is spent.
pub async fn create(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<NewAlert>,
) -> Response {
    let tier = state.effective_tier(&claims);
    let limit = get_plan(&tier).map(|p| p.limits.max_alerts).unwrap_or(5);
    let current = state.db.count_user_alerts(&claims.sub).unwrap_or(0);

    if current >= limit {
        return error_response(
            StatusCode::TOO_MANY_REQUESTS,
            "LIMIT_EXCEEDED",
            &format!("The {} tier allows {} alerts", tier, limit),
            Some("Upgrade your plan to create more alerts"),
        );
    }

    let alert = Alert {
        alert_id: Uuid::new_v4().to_string(),
        user_id: claims.sub.clone(),
        ticker: request.ticker.to_uppercase(),
        alert_type: request.alert_type,
        condition: request.condition,
        threshold: request.threshold,
        triggered: false,
        triggered_at: None,
        created_at: Utc::now().to_rfc3339(),
    };

    match state.db.create_alert(&alert) {
        Ok(()) => success_response(alert),
        Err(e) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            &e.to_string(),
            None,
        ),
    }
}
