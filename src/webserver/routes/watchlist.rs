use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use axum::{Extension, Json};

use crate::auth::Claims;
use crate::webserver::models::SaveWatchlistRequest;
use crate::webserver::state::AppState;
use crate::webserver::utils::{error_response, success_response};

/// GET /api/watchlist
pub async fn get_watchlist(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> Response {
    match state.db.get_watchlist(&claims.sub, "Default") {
        Ok(tickers) => success_response(tickers),
        Err(e) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            &e.to_string(),
            None,
        ),
    }
}

/// POST /api/watchlist
pub async fn save_watchlist(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<SaveWatchlistRequest>,
) -> Response {
    let tickers: Vec<String> = request
        .tickers
        .iter()
        .map(|t| t.to_uppercase())
        .collect();

    match state.db.save_watchlist(&claims.sub, &tickers, &request.name) {
        Ok(()) => success_response(tickers),
        Err(e) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            &e.to_string(),
            None,
        ),
    }
}
