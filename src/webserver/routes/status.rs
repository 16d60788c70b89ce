use std::sync::Arc;

use axum::extract::State;
use axum::response::Response;
use chrono::Utc;

use crate::webserver::models::{HealthResponse, SystemStatusResponse};
use crate::webserver::state::AppState;
use crate::webserver::utils::{platform_error_response, success_response};

/// GET /api/health
pub async fn health_check() -> Response {
    success_response(HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /api/status
pub async fn system_status(State(state): State<Arc<AppState>>) -> Response {
    match state.db.get_stats() {
        Ok(stats) => success_response(SystemStatusResponse {
            timestamp: Utc::now(),
            uptime_seconds: state.uptime_seconds(),
            platform: state.config.general.platform_name.clone(),
            database: stats,
        }),
        Err(e) => platform_error_response(&crate::errors::PlatformError::database_error(
            e.to_string(),
        )),
    }
}
