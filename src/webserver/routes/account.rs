use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use axum::Extension;

use crate::auth::Claims;
use crate::subscription::{self, UsageStats};
use crate::webserver::state::AppState;
use crate::webserver::utils::{error_response, success_response};

/// GET /api/account
pub async fn get_account(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> Response {
    match state.db.get_user_by_id(&claims.sub) {
        Ok(Some(user)) => {
            let tier = state.effective_tier(&claims);
            let plan = subscription::get_plan(&tier);
            success_response(serde_json::json!({
                "user": user,
                "effective_tier": tier,
                "plan": plan,
            }))
        }
        Ok(None) => error_response(StatusCode::NOT_FOUND, "NOT_FOUND", "Account not found", None),
        Err(e) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            &e.to_string(),
            None,
        ),
    }
}

/// GET /api/account/export
pub async fn export_account(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> Response {
    match state.db.export_user_data(&claims.sub) {
        Ok(Some(export)) => success_response(export),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "NOT_FOUND", "Account not found", None),
        Err(e) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            &e.to_string(),
            None,
        ),
    }
}

/// GET /api/account/recommendation
///
/// Suggests the next tier when the account keeps hitting its limits.
pub async fn upgrade_recommendation(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> Response {
    let tier = state.effective_tier(&claims);

    let usage = UsageStats {
        alerts_used: state.db.count_user_alerts(&claims.sub).unwrap_or(0),
        scans_used: state.db.get_api_usage(&claims.sub, "scanner").unwrap_or(0),
        api_calls_used: state.db.get_total_api_usage(&claims.sub).unwrap_or(0),
    };

    let recommendation = subscription::get_upgrade_recommendation(&tier, &usage);
    let savings = recommendation.and_then(|target| subscription::calculate_savings(&tier, target));

    success_response(serde_json::json!({
        "current_tier": tier,
        "recommended_tier": recommendation,
        "savings": savings,
    }))
}
