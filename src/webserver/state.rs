/// Shared application state for the webserver
///
/// Holds the core platform systems route handlers need: the database, the
/// auth manager, the market engine, the scanner, and the billing
/// processor.
use std::sync::Arc;

use crate::auth::{AuthManager, Claims};
use crate::config::Config;
use crate::database::Database;
use crate::errors::PlatformError;
use crate::market::MarketDataEngine;
use crate::scanner::OpportunityScanner;
use crate::secrets::Secrets;
use crate::subscription::{self, BillingProcessor};

/// Shared application state passed to all route handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: Database,
    pub auth: AuthManager,
    pub engine: Arc<MarketDataEngine>,
    pub scanner: Arc<OpportunityScanner>,
    pub billing: BillingProcessor,
    pub startup_time: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    /// Wire up all platform systems from config, secrets, and the database
    pub fn new(config: Config, secrets: &Secrets, db: Database) -> Result<Self, PlatformError> {
        let auth = AuthManager::new(
            db.clone(),
            secrets.jwt_secret(),
            config.auth.token_expiry_days,
            config.auth.trial_days,
        );

        let engine = Arc::new(MarketDataEngine::new(
            db.clone(),
            config.market.clone(),
            secrets,
        )?);

        let scanner = Arc::new(OpportunityScanner::new(
            Arc::clone(&engine),
            config.scanner.clone(),
        ));

        let billing = BillingProcessor::new(db.clone(), secrets.billing_webhook_secret());

        Ok(Self {
            config: Arc::new(config),
            db,
            auth,
            engine,
            scanner,
            billing,
            startup_time: chrono::Utc::now(),
        })
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        (chrono::Utc::now() - self.startup_time)
            .num_seconds()
            .max(0) as u64
    }

    /// Resolve the tier a user should currently be served at
    ///
    /// Claims carry the tier from login time; an expired paid subscription
    /// downgrades to free until billing renews it.
    pub fn effective_tier(&self, claims: &Claims) -> String {
        match self.db.get_user_by_id(&claims.sub) {
            Ok(Some(user)) => {
                if subscription::is_subscription_active(
                    &user.subscription_tier,
                    user.subscription_expiry.as_deref(),
                ) {
                    user.subscription_tier
                } else {
                    "free".to_string()
                }
            }
            _ => "free".to_string(),
        }
    }
}

#[cfg(test)]
pub(crate) fn test_state() -> Arc<AppState> {
    let db = crate::database::test_database();
    let mut config = Config::default();
    config.market.store_endpoint = "http://127.0.0.1:1".to_string();
    config.market.quote_provider_url = "http://127.0.0.1:1".to_string();
    config.market.request_timeout_secs = 1;
    Arc::new(AppState::new(config, &Secrets::default(), db).unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn test_effective_tier_downgrades_expired() {
        let state = test_state();
        let summary = state
            .auth
            .register("alice@example.com", "alice", "password123")
            .unwrap();

        let claims = Claims {
            sub: summary.user_id.clone(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            tier: "premium".to_string(),
            exp: 0,
            iat: 0,
            jti: String::new(),
        };

        // Live premium subscription
        let future = (Utc::now() + Duration::days(5)).to_rfc3339();
        state
            .db
            .update_subscription(&summary.user_id, "premium", &future)
            .unwrap();
        assert_eq!(state.effective_tier(&claims), "premium");

        // Expired premium drops to free
        let past = (Utc::now() - Duration::days(5)).to_rfc3339();
        state
            .db
            .update_subscription(&summary.user_id, "premium", &past)
            .unwrap();
        assert_eq!(state.effective_tier(&claims), "free");
    }
}
