use anyhow::{ Context, Result };
use serde::{ Deserialize, Serialize };
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub market: MarketConfig,
    pub scanner: ScannerConfig,
    pub auth: AuthConfig,
    pub alerts: AlertsConfig,
    pub general: GeneralConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub enable_cors: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub cleanup_interval_hours: u64,
    pub cache_max_age_hours: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketConfig {
    pub store_endpoint: String,
    pub store_bucket: String,
    pub quote_provider_url: String,
    pub request_timeout_secs: u64,
    pub max_requests_per_minute: usize,
    pub candle_cache_ttl_minutes: i64,
    pub quote_cache_ttl_minutes: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    pub max_results: usize,
    pub min_score: f64,
    pub universe_slice: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub token_expiry_days: i64,
    pub trial_days: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertsConfig {
    pub enabled: bool,
    pub eval_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    pub platform_name: String,
    pub update_interval_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                enable_cors: true,
            },
            database: DatabaseConfig {
                cleanup_interval_hours: 1,
                cache_max_age_hours: 24,
            },
            market: MarketConfig {
                store_endpoint: "https://files.massive.com".to_string(),
                store_bucket: "flatfiles".to_string(),
                quote_provider_url: "https://query1.finance.yahoo.com/v8/finance/chart".to_string(),
                request_timeout_secs: 10,
                max_requests_per_minute: 60,
                candle_cache_ttl_minutes: 60,
                quote_cache_ttl_minutes: 1,
            },
            scanner: ScannerConfig {
                max_results: 5,
                min_score: 75.0,
                universe_slice: 15,
            },
            auth: AuthConfig {
                token_expiry_days: 30,
                trial_days: 14,
            },
            alerts: AlertsConfig {
                enabled: true,
                eval_interval_secs: 60,
            },
            general: GeneralConfig {
                platform_name: "OMNISCIENT ONE".to_string(),
                update_interval_seconds: 30,
            },
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            let default_config = Self::default();
            default_config.save(path)?;
            return Ok(default_config);
        }

        let content = fs
            ::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml
            ::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        // Validate required fields
        if config.market.store_endpoint.is_empty() {
            return Err(anyhow::anyhow!("market.store_endpoint is required in config"));
        }
        if config.server.port == 0 {
            return Err(anyhow::anyhow!("server.port must be non-zero"));
        }

        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml
            ::to_string_pretty(self)
            .with_context(|| "Failed to serialize config")?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    pub fn reload(&mut self, path: &Path) -> Result<()> {
        *self = Self::load(path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_round_trips_through_toml() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.server.port, config.server.port);
        assert_eq!(parsed.market.store_bucket, config.market.store_bucket);
        assert_eq!(parsed.scanner.max_results, config.scanner.max_results);
    }

    #[test]
    fn test_load_creates_default_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = Config::load(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_load_rejects_empty_endpoint() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.market.store_endpoint = String::new();
        config.save(&path).unwrap();

        assert!(Config::load(&path).is_err());
    }
}
