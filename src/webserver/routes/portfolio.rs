use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use axum::{Extension, Json};
use chrono::Utc;
use uuid::Uuid;

use crate::auth::Claims;
use crate::database::models::{NewTrade, Portfolio, Trade};
use crate::subscription::get_plan;
use crate::webserver::models::CreatePortfolioRequest;
use crate::webserver::state::AppState;
use crate::webserver::utils::{error_response, success_response};

/// GET /api/portfolios
pub async fn list(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> Response {
    match state.db.get_user_portfolios(&claims.sub) {
        Ok(portfolios) => success_response(portfolios),
        Err(e) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            &e.to_string(),
            None,
        ),
    }
}

/// POST /api/portfolios
///
/// Rejects the request when the tier's portfolio allowance is spent.
pub async fn create(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<CreatePortfolioRequest>,
) -> Response {
    let tier = state.effective_tier(&claims);
    let limit = get_plan(&tier).map(|p| p.limits.max_portfolios).unwrap_or(1);
    let current = state.db.count_user_portfolios(&claims.sub).unwrap_or(0);

    if current >= limit {
        return error_response(
            StatusCode::TOO_MANY_REQUESTS,
            "LIMIT_EXCEEDED",
            &format!("The {} tier allows {} portfolios", tier, limit),
            Some("Upgrade your plan to create more portfolios"),
        );
    }

    let now = Utc::now().to_rfc3339();
    let portfolio = Portfolio {
        portfolio_id: Uuid::new_v4().to_string(),
        user_id: claims.sub.clone(),
        name: request.name,
        holdings: serde_json::json!({}),
        total_value: 0.0,
        created_at: now.clone(),
        updated_at: now,
    };

    match state.db.create_portfolio(&portfolio) {
        Ok(()) => success_response(portfolio),
        Err(e) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            &e.to_string(),
            None,
        ),
    }
}

/// GET /api/trades
pub async fn list_trades(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> Response {
    match state.db.get_user_trades(&claims.sub, 50) {
        Ok(trades) => success_response(trades),
        Err(e) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            &e.to_string(),
            None,
        ),
    }
}

/// POST /api/trades
pub async fn record_trade(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<NewTrade>,
) -> Response {
    if request.quantity <= 0.0 || request.price <= 0.0 {
        return error_response(
            StatusCode::BAD_REQUEST,
            "INVALID_REQUEST",
            "Quantity and price must be positive",
            None,
        );
    }
    if request.action != "buy" && request.action != "sell" {
        return error_response(
            StatusCode::BAD_REQUEST,
            "INVALID_REQUEST",
            "Action must be 'buy' or 'sell'",
            None,
        );
    }

    let trade = Trade {
        trade_id: Uuid::new_v4().to_string(),
        user_id: claims.sub.clone(),
        portfolio_id: request.portfolio_id,
        ticker: request.ticker.to_uppercase(),
        action: request.action,
        quantity: request.quantity,
        price: request.price,
        total: request.quantity * request.price,
        timestamp: Utc::now().to_rfc3339(),
        status: "completed".to_string(),
        notes: request.notes.unwrap_or_default(),
    };

    match state.db.create_trade(&trade) {
        Ok(()) => success_response(trade),
        Err(e) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            &e.to_string(),
            None,
        ),
    }
}
