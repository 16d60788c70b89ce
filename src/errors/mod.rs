/// Comprehensive error handling system for Omniscient One
/// Structured, domain-aware error types used across the platform
use chrono::{DateTime, Utc};

// =============================================================================
// MAIN ERROR TYPE
// =============================================================================

#[derive(Debug, Clone)]
pub enum PlatformError {
    // Authentication and account errors
    Auth(AuthError),

    // Persistence errors
    Database(DatabaseError),

    // Network connectivity errors
    Network(NetworkError),

    // Market data provider issues
    Market(MarketError),

    // Subscription and billing errors
    Subscription(SubscriptionError),

    // Configuration errors
    Configuration(ConfigurationError),

    // Data parsing & validation errors
    Data(DataError),
}

impl std::fmt::Display for PlatformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlatformError::Auth(e) => write!(f, "Auth Error: {}", e),
            PlatformError::Database(e) => write!(f, "Database Error: {}", e),
            PlatformError::Network(e) => write!(f, "Network Error: {}", e),
            PlatformError::Market(e) => write!(f, "Market Error: {}", e),
            PlatformError::Subscription(e) => write!(f, "Subscription Error: {}", e),
            PlatformError::Configuration(e) => write!(f, "Configuration Error: {}", e),
            PlatformError::Data(e) => write!(f, "Data Error: {}", e),
        }
    }
}

impl std::error::Error for PlatformError {}

// =============================================================================
// AUTH ERROR TYPES
// =============================================================================

#[derive(Debug, Clone)]
pub enum AuthError {
    InvalidCredentials,
    UserNotFound {
        identifier: String,
    },
    UserAlreadyExists {
        email: String,
        username: String,
    },
    ValidationFailed {
        field: String,
        reason: String,
    },
    TokenExpired,
    TokenInvalid {
        reason: String,
    },
    ResetTokenInvalid,
    Generic {
        message: String,
    },
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::InvalidCredentials => write!(f, "Invalid password"),
            AuthError::UserNotFound { identifier } => {
                write!(f, "User not found: {}", identifier)
            }
            AuthError::UserAlreadyExists { email, username } => {
                write!(f, "User already exists ({} / {})", email, username)
            }
            AuthError::ValidationFailed { field, reason } => {
                write!(f, "Invalid {}: {}", field, reason)
            }
            AuthError::TokenExpired => write!(f, "Session token expired"),
            AuthError::TokenInvalid { reason } => write!(f, "Invalid session token: {}", reason),
            AuthError::ResetTokenInvalid => write!(f, "Reset token is invalid or expired"),
            AuthError::Generic { message } => write!(f, "{}", message),
        }
    }
}

// =============================================================================
// DATABASE ERROR TYPES
// =============================================================================

#[derive(Debug, Clone)]
pub enum DatabaseError {
    QueryFailed {
        operation: String,
        error: String,
    },
    NotFound {
        entity: String,
        id: String,
    },
    BackupFailed {
        path: String,
        error: String,
    },
    Generic {
        message: String,
    },
}

impl std::fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatabaseError::QueryFailed { operation, error } => {
                write!(f, "{} failed: {}", operation, error)
            }
            DatabaseError::NotFound { entity, id } => {
                write!(f, "{} not found: {}", entity, id)
            }
            DatabaseError::BackupFailed { path, error } => {
                write!(f, "Backup to {} failed: {}", path, error)
            }
            DatabaseError::Generic { message } => write!(f, "{}", message),
        }
    }
}

// =============================================================================
// NETWORK ERROR TYPES
// =============================================================================

#[derive(Debug, Clone)]
pub enum NetworkError {
    ConnectionTimeout {
        endpoint: String,
        timeout_ms: u64,
    },
    HttpStatusError {
        endpoint: String,
        status: u16,
        body: Option<String>,
    },
    Generic {
        message: String,
    },
}

impl std::fmt::Display for NetworkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NetworkError::ConnectionTimeout {
                endpoint,
                timeout_ms,
            } => {
                write!(f, "Connection timeout to {} after {}ms", endpoint, timeout_ms)
            }
            NetworkError::HttpStatusError {
                endpoint,
                status,
                body,
            } => {
                write!(
                    f,
                    "HTTP {} from {}: {}",
                    status,
                    endpoint,
                    body.as_deref().unwrap_or("No body")
                )
            }
            NetworkError::Generic { message } => write!(f, "{}", message),
        }
    }
}

// =============================================================================
// MARKET ERROR TYPES
// =============================================================================

#[derive(Debug, Clone)]
pub enum MarketError {
    StoreFetchFailed {
        ticker: String,
        key: String,
        error: String,
    },
    ProviderDown {
        provider_name: String,
        since: DateTime<Utc>,
    },
    NoData {
        ticker: String,
    },
    Generic {
        message: String,
    },
}

impl std::fmt::Display for MarketError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MarketError::StoreFetchFailed { ticker, key, error } => {
                write!(f, "Flat-file fetch for {} ({}) failed: {}", ticker, key, error)
            }
            MarketError::ProviderDown {
                provider_name,
                since,
            } => {
                write!(f, "Provider {} down since {}", provider_name, since)
            }
            MarketError::NoData { ticker } => write!(f, "No market data for {}", ticker),
            MarketError::Generic { message } => write!(f, "{}", message),
        }
    }
}

// =============================================================================
// SUBSCRIPTION ERROR TYPES
// =============================================================================

#[derive(Debug, Clone)]
pub enum SubscriptionError {
    UnknownPlan {
        plan_id: String,
    },
    LimitExceeded {
        limit: String,
        current: u64,
        maximum: u64,
    },
    FeatureLocked {
        feature: String,
        tier: String,
    },
    WebhookRejected {
        reason: String,
    },
    Generic {
        message: String,
    },
}

impl std::fmt::Display for SubscriptionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubscriptionError::UnknownPlan { plan_id } => {
                write!(f, "Unknown plan: {}", plan_id)
            }
            SubscriptionError::LimitExceeded {
                limit,
                current,
                maximum,
            } => {
                write!(f, "{} limit exceeded: {}/{}", limit, current, maximum)
            }
            SubscriptionError::FeatureLocked { feature, tier } => {
                write!(f, "Feature '{}' not available on the {} tier", feature, tier)
            }
            SubscriptionError::WebhookRejected { reason } => {
                write!(f, "Billing webhook rejected: {}", reason)
            }
            SubscriptionError::Generic { message } => write!(f, "{}", message),
        }
    }
}

// =============================================================================
// CONFIGURATION ERROR TYPES
// =============================================================================

#[derive(Debug, Clone)]
pub enum ConfigurationError {
    InvalidConfig { field: String, reason: String },
    MissingConfig { field: String },
    MissingSecret { key: String },
    FileNotFound { path: String },
    Generic { message: String },
}

impl std::fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigurationError::InvalidConfig { field, reason } => {
                write!(f, "Invalid config field '{}': {}", field, reason)
            }
            ConfigurationError::MissingConfig { field } => {
                write!(f, "Missing config field '{}'", field)
            }
            ConfigurationError::MissingSecret { key } => {
                write!(f, "Missing secret '{}'", key)
            }
            ConfigurationError::FileNotFound { path } => {
                write!(f, "File not found: {}", path)
            }
            ConfigurationError::Generic { message } => write!(f, "{}", message),
        }
    }
}

// =============================================================================
// DATA ERROR TYPES
// =============================================================================

#[derive(Debug, Clone)]
pub enum DataError {
    ParseError {
        data_type: String,
        error: String,
    },
    ValidationError {
        field: String,
        value: String,
        reason: String,
    },
    InvalidFormat {
        expected: String,
        received: String,
    },
    Generic {
        message: String,
    },
}

impl std::fmt::Display for DataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataError::ParseError { data_type, error } => {
                write!(f, "Failed to parse {}: {}", data_type, error)
            }
            DataError::ValidationError {
                field,
                value,
                reason,
            } => {
                write!(f, "Invalid {} '{}': {}", field, value, reason)
            }
            DataError::InvalidFormat { expected, received } => {
                write!(f, "Expected {}, received {}", expected, received)
            }
            DataError::Generic { message } => write!(f, "{}", message),
        }
    }
}

// =============================================================================
// ERROR CONVERSIONS FROM LIBRARY TYPES
// =============================================================================

impl From<String> for PlatformError {
    fn from(err: String) -> Self {
        PlatformError::Data(DataError::Generic { message: err })
    }
}

impl From<&str> for PlatformError {
    fn from(err: &str) -> Self {
        PlatformError::Data(DataError::Generic {
            message: err.to_string(),
        })
    }
}

impl From<rusqlite::Error> for PlatformError {
    fn from(err: rusqlite::Error) -> Self {
        PlatformError::Database(DatabaseError::Generic {
            message: err.to_string(),
        })
    }
}

impl From<reqwest::Error> for PlatformError {
    fn from(err: reqwest::Error) -> Self {
        PlatformError::Network(NetworkError::Generic {
            message: format!("HTTP request failed: {}", err),
        })
    }
}

impl From<serde_json::Error> for PlatformError {
    fn from(err: serde_json::Error) -> Self {
        PlatformError::Data(DataError::ParseError {
            data_type: "JSON".to_string(),
            error: err.to_string(),
        })
    }
}

impl From<std::io::Error> for PlatformError {
    fn from(err: std::io::Error) -> Self {
        PlatformError::Data(DataError::Generic {
            message: format!("I/O error: {}", err),
        })
    }
}

// =============================================================================
// STRUCTURED ERROR BUILDERS
// =============================================================================

impl PlatformError {
    /// Create a validation error for an auth field
    pub fn validation_failed(field: impl Into<String>, reason: impl Into<String>) -> Self {
        PlatformError::Auth(AuthError::ValidationFailed {
            field: field.into(),
            reason: reason.into(),
        })
    }

    /// Create a network error
    pub fn network_error(message: impl Into<String>) -> Self {
        PlatformError::Network(NetworkError::Generic {
            message: message.into(),
        })
    }

    /// Create a database error
    pub fn database_error(message: impl Into<String>) -> Self {
        PlatformError::Database(DatabaseError::Generic {
            message: message.into(),
        })
    }

    /// Create a market data error
    pub fn market_error(message: impl Into<String>) -> Self {
        PlatformError::Market(MarketError::Generic {
            message: message.into(),
        })
    }

    /// Create a configuration error
    pub fn configuration_error(message: impl Into<String>) -> Self {
        PlatformError::Configuration(ConfigurationError::Generic {
            message: message.into(),
        })
    }

    /// Create a parse error
    pub fn parse_error(data_type: impl Into<String>, error: impl Into<String>) -> Self {
        PlatformError::Data(DataError::ParseError {
            data_type: data_type.into(),
            error: error.into(),
        })
    }

    /// Create a subscription limit error
    pub fn limit_exceeded(limit: impl Into<String>, current: u64, maximum: u64) -> Self {
        PlatformError::Subscription(SubscriptionError::LimitExceeded {
            limit: limit.into(),
            current,
            maximum,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_wraps_domain() {
        let err = PlatformError::Auth(AuthError::InvalidCredentials);
        assert_eq!(err.to_string(), "Auth Error: Invalid password");
    }

    #[test]
    fn test_limit_exceeded_builder() {
        let err = PlatformError::limit_exceeded("alerts", 5, 5);
        assert!(err.to_string().contains("alerts limit exceeded: 5/5"));
    }

    #[test]
    fn test_from_str_maps_to_data() {
        let err: PlatformError = "bad payload".into();
        assert!(matches!(err, PlatformError::Data(_)));
    }
}
