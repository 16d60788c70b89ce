use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::Response;
use axum::Extension;

use crate::auth::Claims;
use crate::webserver::routes::consume_budget;
use crate::webserver::state::AppState;
use crate::webserver::utils::{platform_error_response, success_response};

/// GET /api/market/quote/:ticker
pub async fn quote(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(ticker): Path<String>,
) -> Response {
    if let Err(response) = consume_budget(&state, &claims, "quote") {
        return response;
    }

    success_response(state.engine.get_quote(&ticker).await)
}

/// GET /api/market/candles/:ticker
pub async fn candles(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(ticker): Path<String>,
) -> Response {
    if let Err(response) = consume_budget(&state, &claims, "candles") {
        return response;
    }

    match state.engine.get_candles(&ticker).await {
        Ok(series) => success_response(series),
        Err(e) => platform_error_response(&e),
    }
}

/// GET /api/scanner/opportunities
pub async fn scan(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> Response {
    if let Err(response) = consume_budget(&state, &claims, "scanner") {
        return response;
    }

    success_response(state.scanner.scan_best_opportunities().await)
}
