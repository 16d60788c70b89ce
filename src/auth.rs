//! Authentication and user management
//!
//! Handles user registration, credential verification, JWT session tokens,
//! API keys, and the password-reset flow. Passwords are bcrypt-hashed;
//! session tokens are HS256 JWTs carrying the user's tier so handlers can
//! gate features without a database round trip.

use anyhow::Result;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::database::models::{Portfolio, User};
use crate::database::Database;
use crate::errors::{AuthError, PlatformError};
use crate::logger::{self, LogTag};

/// Starting paper value for the default portfolio
const DEFAULT_PORTFOLIO_VALUE: f64 = 10000.0;

/// Watchlist every new account starts with
const STARTER_WATCHLIST: [&str; 5] = ["AAPL", "NVDA", "TSLA", "MSFT", "GOOGL"];

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap());
static USERNAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_]{3,20}$").unwrap());

/// JWT payload for a session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub username: String,
    pub email: String,
    pub tier: String,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

/// Public view of an account, returned by register/login
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub subscription_tier: String,
    pub api_key: Option<String>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.user_id.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            subscription_tier: user.subscription_tier.clone(),
            api_key: user.api_key.clone(),
        }
    }
}

/// Successful login: token plus the account it belongs to
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub token: String,
    pub user: UserSummary,
}

/// Authentication manager bound to the platform database
#[derive(Clone)]
pub struct AuthManager {
    db: Database,
    jwt_secret: String,
    token_expiry_days: i64,
    trial_days: i64,
}

impl AuthManager {
    pub fn new(db: Database, jwt_secret: String, token_expiry_days: i64, trial_days: i64) -> Self {
        Self {
            db,
            jwt_secret,
            token_expiry_days,
            trial_days,
        }
    }

    /// Securely hash a password
    pub fn hash_password(&self, password: &str) -> Result<String> {
        Ok(bcrypt::hash(password, bcrypt::DEFAULT_COST)?)
    }

    /// Verify a password against its hash
    pub fn verify_password(&self, plain: &str, hashed: &str) -> bool {
        bcrypt::verify(plain, hashed).unwrap_or(false)
    }

    /// Create a new user account
    ///
    /// Validates inputs, rejects duplicates, grants the trial period on the
    /// free tier, and creates the default portfolio.
    pub fn register(
        &self,
        email: &str,
        username: &str,
        password: &str,
    ) -> Result<UserSummary, PlatformError> {
        if !EMAIL_RE.is_match(email) {
            return Err(PlatformError::validation_failed("email", "Invalid email format"));
        }
        if !USERNAME_RE.is_match(username) {
            return Err(PlatformError::validation_failed(
                "username",
                "Username must be 3-20 characters, letters and numbers only",
            ));
        }
        if password.len() < 8 {
            return Err(PlatformError::validation_failed(
                "password",
                "Password must be at least 8 characters",
            ));
        }

        if self
            .db
            .user_exists(email, username)
            .map_err(|e| PlatformError::database_error(e.to_string()))?
        {
            return Err(PlatformError::Auth(AuthError::UserAlreadyExists {
                email: email.to_lowercase(),
                username: username.to_string(),
            }));
        }

        let now = Utc::now();
        let user = User {
            user_id: Uuid::new_v4().to_string(),
            email: email.to_lowercase(),
            username: username.to_string(),
            password_hash: self
                .hash_password(password)
                .map_err(|e| PlatformError::Auth(AuthError::Generic {
                    message: e.to_string(),
                }))?,
            subscription_tier: "free".to_string(),
            subscription_expiry: Some((now + Duration::days(self.trial_days)).to_rfc3339()),
            created_at: now.to_rfc3339(),
            last_login: None,
            api_key: Some(generate_api_key(username)),
            settings: serde_json::json!({
                "theme": "dark",
                "notifications": true,
                "default_portfolio": DEFAULT_PORTFOLIO_VALUE,
                "watchlist": STARTER_WATCHLIST,
            }),
            reset_token: None,
            reset_token_expiry: None,
            is_active: true,
        };

        self.db
            .create_user(&user)
            .map_err(|e| PlatformError::database_error(e.to_string()))?;

        let portfolio = Portfolio {
            portfolio_id: Uuid::new_v4().to_string(),
            user_id: user.user_id.clone(),
            name: "My Portfolio".to_string(),
            holdings: serde_json::json!({}),
            total_value: DEFAULT_PORTFOLIO_VALUE,
            created_at: now.to_rfc3339(),
            updated_at: now.to_rfc3339(),
        };
        self.db
            .create_portfolio(&portfolio)
            .map_err(|e| PlatformError::database_error(e.to_string()))?;

        logger::info(
            LogTag::Auth,
            &format!("Registered new account '{}' ({})", user.username, user.email),
        );

        Ok(UserSummary::from(&user))
    }

    /// Authenticate a user with email/username and password
    pub fn authenticate(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<AuthSession, PlatformError> {
        let user = self
            .db
            .get_user_by_identifier(identifier)
            .map_err(|e| PlatformError::database_error(e.to_string()))?
            .ok_or_else(|| PlatformError::Auth(AuthError::UserNotFound {
                identifier: identifier.to_string(),
            }))?;

        if !self.verify_password(password, &user.password_hash) {
            logger::warning(
                LogTag::Auth,
                &format!("Rejected login for '{}'", identifier),
            );
            return Err(PlatformError::Auth(AuthError::InvalidCredentials));
        }

        self.db
            .update_last_login(&user.user_id)
            .map_err(|e| PlatformError::database_error(e.to_string()))?;

        let token = self.create_token(&user)?;

        Ok(AuthSession {
            token,
            user: UserSummary::from(&user),
        })
    }

    /// Create a JWT session token for an authenticated user
    pub fn create_token(&self, user: &User) -> Result<String, PlatformError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.user_id.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            tier: user.subscription_tier.clone(),
            exp: (now + Duration::days(self.token_expiry_days)).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| PlatformError::Auth(AuthError::TokenInvalid {
            reason: e.to_string(),
        }))
    }

    /// Verify a JWT and return its payload if valid, None on expiry or
    /// tampering
    pub fn verify_token(&self, token: &str) -> Option<Claims> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .ok()
    }

    /// Start a password reset: stores a fresh token and returns it for
    /// delivery
    pub fn request_password_reset(&self, email: &str) -> Result<Option<String>, PlatformError> {
        let Some(user) = self
            .db
            .get_user_by_email(email)
            .map_err(|e| PlatformError::database_error(e.to_string()))?
        else {
            return Ok(None);
        };

        let token = generate_urlsafe_token(32);
        self.db
            .save_reset_token(&user.user_id, &token)
            .map_err(|e| PlatformError::database_error(e.to_string()))?;

        logger::info(
            LogTag::Auth,
            &format!("Password reset requested for {}", user.email),
        );
        Ok(Some(token))
    }

    /// Complete a password reset using a previously issued token
    pub fn reset_password(&self, token: &str, new_password: &str) -> Result<bool, PlatformError> {
        if new_password.len() < 8 {
            return Err(PlatformError::validation_failed(
                "password",
                "Password must be at least 8 characters",
            ));
        }

        let Some(user_id) = self
            .db
            .get_user_by_reset_token(token)
            .map_err(|e| PlatformError::database_error(e.to_string()))?
        else {
            return Ok(false);
        };

        let new_hash = self
            .hash_password(new_password)
            .map_err(|e| PlatformError::Auth(AuthError::Generic {
                message: e.to_string(),
            }))?;

        self.db
            .update_password(&user_id, &new_hash)
            .map_err(|e| PlatformError::database_error(e.to_string()))?;
        self.db
            .clear_reset_token(&user_id)
            .map_err(|e| PlatformError::database_error(e.to_string()))?;

        Ok(true)
    }

    /// Update a user's subscription tier with a fresh expiry window
    pub fn update_subscription(
        &self,
        user_id: &str,
        tier: &str,
        expiry_days: i64,
    ) -> Result<(), PlatformError> {
        let expiry = (Utc::now() + Duration::days(expiry_days)).to_rfc3339();
        self.db
            .update_subscription(user_id, tier, &expiry)
            .map_err(|e| PlatformError::database_error(e.to_string()))
    }
}

/// Derive a 32-character API key from the username, time, and fresh entropy
fn generate_api_key(username: &str) -> String {
    let timestamp = Utc::now().timestamp();
    let random = generate_urlsafe_token(16);
    let digest = Sha256::digest(format!("{}_{}_{}", username, timestamp, random).as_bytes());
    let hex: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
    hex[..32].to_string()
}

/// URL-safe random token of `bytes` bytes of entropy
fn generate_urlsafe_token(bytes: usize) -> String {
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;

    let mut buf = vec![0u8; bytes];
    rand::thread_rng().fill(&mut buf[..]);
    URL_SAFE_NO_PAD.encode(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_database;

    fn manager() -> AuthManager {
        AuthManager::new(test_database(), "test-secret".to_string(), 30, 14)
    }

    #[test]
    fn test_hash_verify_round_trip() {
        let auth = manager();
        let hash = auth.hash_password("hunter2hunter2").unwrap();
        assert!(auth.verify_password("hunter2hunter2", &hash));
        assert!(!auth.verify_password("wrong-password", &hash));
    }

    #[test]
    fn test_register_validation() {
        let auth = manager();

        assert!(auth.register("not-an-email", "alice", "longenough").is_err());
        assert!(auth.register("a@example.com", "x", "longenough").is_err());
        assert!(auth.register("a@example.com", "alice", "short").is_err());
        assert!(auth.register("a@example.com", "has space", "longenough").is_err());
    }

    #[test]
    fn test_register_and_authenticate() {
        let auth = manager();

        let summary = auth
            .register("Alice@Example.com", "alice", "password123")
            .unwrap();
        assert_eq!(summary.email, "alice@example.com");
        assert_eq!(summary.subscription_tier, "free");
        assert_eq!(summary.api_key.as_ref().unwrap().len(), 32);

        // Duplicate rejected
        assert!(auth.register("alice@example.com", "alice", "password123").is_err());

        // Login by username and by email
        let session = auth.authenticate("alice", "password123").unwrap();
        assert_eq!(session.user.username, "alice");
        let session = auth.authenticate("alice@example.com", "password123").unwrap();

        // Token round-trips with the tier claim
        let claims = auth.verify_token(&session.token).unwrap();
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.tier, "free");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_registration_creates_default_portfolio() {
        let db = test_database();
        let auth = AuthManager::new(db.clone(), "s".to_string(), 30, 14);

        let summary = auth.register("bob@example.com", "bob", "password123").unwrap();
        let portfolios = db.get_user_portfolios(&summary.user_id).unwrap();
        assert_eq!(portfolios.len(), 1);
        assert_eq!(portfolios[0].name, "My Portfolio");
        assert_eq!(portfolios[0].total_value, 10000.0);
    }

    #[test]
    fn test_wrong_password_rejected() {
        let auth = manager();
        auth.register("carol@example.com", "carol", "password123").unwrap();

        assert!(matches!(
            auth.authenticate("carol", "not-the-password"),
            Err(PlatformError::Auth(AuthError::InvalidCredentials))
        ));
        assert!(matches!(
            auth.authenticate("nobody", "password123"),
            Err(PlatformError::Auth(AuthError::UserNotFound { .. }))
        ));
    }

    #[test]
    fn test_tampered_token_rejected() {
        let auth = manager();
        auth.register("dave@example.com", "dave", "password123").unwrap();
        let session = auth.authenticate("dave", "password123").unwrap();

        let mut tampered = session.token.clone();
        tampered.push('x');
        assert!(auth.verify_token(&tampered).is_none());

        let other = AuthManager::new(test_database(), "other-secret".to_string(), 30, 14);
        assert!(other.verify_token(&session.token).is_none());
    }

    #[test]
    fn test_password_reset_flow() {
        let auth = manager();
        auth.register("erin@example.com", "erin", "password123").unwrap();

        // Unknown email yields no token but no error
        assert!(auth.request_password_reset("nobody@example.com").unwrap().is_none());

        let token = auth.request_password_reset("erin@example.com").unwrap().unwrap();
        assert!(auth.reset_password(&token, "newpassword456").unwrap());

        // Token is single-use
        assert!(!auth.reset_password(&token, "again-another1").unwrap());

        // Old password dead, new one live
        assert!(auth.authenticate("erin", "password123").is_err());
        assert!(auth.authenticate("erin", "newpassword456").is_ok());
    }
}
