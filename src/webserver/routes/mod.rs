use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::auth::Claims;
use crate::subscription::get_plan;
use crate::webserver::{middleware, state::AppState, utils};

pub mod account;
pub mod alerts;
pub mod auth;
pub mod billing;
pub mod market;
pub mod plans;
pub mod portfolio;
pub mod status;
pub mod watchlist;

/// Build the full API router
pub fn create_router(state: Arc<AppState>) -> Router {
    let public = Router::new()
        .route("/api/health", get(status::health_check))
        .route("/api/status", get(status::system_status))
        .route("/api/plans", get(plans::list_plans))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/reset-request", post(auth::reset_request))
        .route("/api/auth/reset", post(auth::reset_password))
        .route("/api/billing/webhook", post(billing::webhook));

    let protected = Router::new()
        .route("/api/account", get(account::get_account))
        .route("/api/account/export", get(account::export_account))
        .route("/api/account/recommendation", get(account::upgrade_recommendation))
        .route("/api/market/quote/:ticker", get(market::quote))
        .route("/api/market/candles/:ticker", get(market::candles))
        .route("/api/scanner/opportunities", get(market::scan))
        .route("/api/portfolios", get(portfolio::list).post(portfolio::create))
        .route("/api/trades", get(portfolio::list_trades).post(portfolio::record_trade))
        .route("/api/watchlist", get(watchlist::get_watchlist).post(watchlist::save_watchlist))
        .route("/api/alerts", get(alerts::list).post(alerts::create))
        .route_layer(axum::middleware::from_fn_with_state(
            Arc::clone(&state),
            middleware::auth_gate,
        ));

    let mut app = public.merge(protected).with_state(Arc::clone(&state));

    if state.config.server.enable_cors {
        app = app.layer(CorsLayer::permissive());
    }

    app
}

/// Enforce the tier's daily budget for a counted endpoint
///
/// `endpoint` selects both the usage counter and the plan limit: "scanner"
/// draws from daily_scans, everything else from api_calls_per_day. On
/// success the call is recorded against today's counter.
pub(crate) fn consume_budget(
    state: &AppState,
    claims: &Claims,
    endpoint: &str,
) -> Result<(), Response> {
    let tier = state.effective_tier(claims);
    let Some(plan) = get_plan(&tier) else {
        return Err(utils::error_response(
            StatusCode::FORBIDDEN,
            "UNKNOWN_TIER",
            &format!("Unknown subscription tier: {}", tier),
            None,
        ));
    };

    let limit = if endpoint == "scanner" {
        plan.limits.daily_scans
    } else {
        plan.limits.api_calls_per_day
    };

    let used = state.db.get_api_usage(&claims.sub, endpoint).unwrap_or(0);
    if used >= limit {
        return Err(utils::error_response(
            StatusCode::TOO_MANY_REQUESTS,
            "LIMIT_EXCEEDED",
            &format!("Daily {} limit reached for the {} tier ({})", endpoint, tier, limit),
            Some("Upgrade your plan to raise the limit"),
        ));
    }

    if let Err(e) = state.db.track_api_usage(&claims.sub, endpoint) {
        crate::logger::warning(
            crate::logger::LogTag::Webserver,
            &format!("Failed to record usage: {}", e),
        );
    }
    Ok(())
}
