use serde::{ Deserialize, Serialize };

/// A platform user account
///
/// Credential and reset fields never serialize into API responses or
/// exports.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub user_id: String,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub subscription_tier: String,
    pub subscription_expiry: Option<String>,
    pub created_at: String,
    pub last_login: Option<String>,
    pub api_key: Option<String>,
    pub settings: serde_json::Value,
    #[serde(skip_serializing)]
    pub reset_token: Option<String>,
    #[serde(skip_serializing)]
    pub reset_token_expiry: Option<String>,
    pub is_active: bool,
}

/// A user portfolio; holdings map ticker to quantity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Portfolio {
    pub portfolio_id: String,
    pub user_id: String,
    pub name: String,
    pub holdings: serde_json::Value,
    pub total_value: f64,
    pub created_at: String,
    pub updated_at: String,
}

/// A recorded trade
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub trade_id: String,
    pub user_id: String,
    pub portfolio_id: Option<String>,
    pub ticker: String,
    pub action: String,
    pub quantity: f64,
    pub price: f64,
    pub total: f64,
    pub timestamp: String,
    pub status: String,
    pub notes: String,
}

/// Fields accepted when recording a new trade
#[derive(Debug, Clone, Deserialize)]
pub struct NewTrade {
    pub portfolio_id: Option<String>,
    pub ticker: String,
    pub action: String,
    pub quantity: f64,
    pub price: f64,
    pub notes: Option<String>,
}

/// A named watchlist of tickers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Watchlist {
    pub watchlist_id: String,
    pub user_id: String,
    pub name: String,
    pub tickers: Vec<String>,
    pub created_at: String,
}

/// A price alert
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub alert_id: String,
    pub user_id: String,
    pub ticker: String,
    pub alert_type: String,
    pub condition: serde_json::Value,
    pub threshold: f64,
    pub triggered: bool,
    pub triggered_at: Option<String>,
    pub created_at: String,
}

/// Fields accepted when creating a new alert
#[derive(Debug, Clone, Deserialize)]
pub struct NewAlert {
    pub ticker: String,
    pub alert_type: String,
    #[serde(default)]
    pub condition: serde_json::Value,
    pub threshold: f64,
}

/// Full account export (sensitive fields already stripped from `user`)
#[derive(Debug, Clone, Serialize)]
pub struct AccountExport {
    pub user: User,
    pub portfolios: Vec<Portfolio>,
    pub trades: Vec<Trade>,
    pub watchlist: Vec<String>,
    pub alerts: Vec<Alert>,
    pub exported_at: String,
}
