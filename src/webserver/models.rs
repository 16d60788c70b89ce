/// Request and response type definitions for the REST API

use chrono::{ DateTime, Utc };
use serde::{ Deserialize, Serialize };

// ================================================================================================
// Requests
// ================================================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub identifier: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResetRequestRequest {
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePortfolioRequest {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SaveWatchlistRequest {
    #[serde(default = "default_watchlist_name")]
    pub name: String,
    pub tickers: Vec<String>,
}

fn default_watchlist_name() -> String {
    "Default".to_string()
}

// ================================================================================================
// Responses
// ================================================================================================

/// Simple health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

/// Complete system status response
#[derive(Debug, Clone, Serialize)]
pub struct SystemStatusResponse {
    pub timestamp: DateTime<Utc>,
    pub uptime_seconds: u64,
    pub platform: String,
    pub database: crate::database::DatabaseStats,
}
