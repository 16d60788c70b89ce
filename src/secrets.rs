//! Secret material loading
//!
//! Secrets live in `secrets.toml` inside the data directory, with environment
//! variables as a fallback so containerized deployments can skip the file
//! entirely. Lookup order: file, then environment, then the hardcoded
//! development default (JWT secret only).

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};

/// Development-only fallback, overridden in any real deployment
const DEFAULT_JWT_SECRET: &str = "production-secret-key-change-me";

/// Parsed contents of secrets.toml
#[derive(Debug, Clone, Default)]
pub struct Secrets {
    values: HashMap<String, String>,
}

impl Secrets {
    /// Load secrets from a TOML file of flat `KEY = "value"` pairs
    ///
    /// A missing file is not an error; it yields an empty set so the
    /// environment fallback still applies.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read secrets file: {}", path.display()))?;

        let values: HashMap<String, String> = toml::from_str(&content)
            .with_context(|| format!("Failed to parse secrets file: {}", path.display()))?;

        Ok(Self { values })
    }

    /// Look up a secret: file first, then environment
    pub fn get(&self, key: &str) -> Option<String> {
        if let Some(value) = self.values.get(key) {
            if !value.is_empty() {
                return Some(value.clone());
            }
        }
        std::env::var(key).ok().filter(|v| !v.is_empty())
    }

    /// JWT signing secret (falls back to the development default)
    pub fn jwt_secret(&self) -> String {
        self.get("JWT_SECRET")
            .unwrap_or_else(|| DEFAULT_JWT_SECRET.to_string())
    }

    /// Flat-file store access key
    pub fn store_access_key(&self) -> Option<String> {
        self.get("S3_ACCESS_KEY")
    }

    /// Flat-file store secret key
    pub fn store_secret_key(&self) -> Option<String> {
        self.get("S3_SECRET_KEY")
    }

    /// Billing webhook signing secret
    pub fn billing_webhook_secret(&self) -> Option<String> {
        self.get("BILLING_WEBHOOK_SECRET")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_yields_empty() {
        let dir = tempfile::tempdir().unwrap();
        let secrets = Secrets::load(&dir.path().join("secrets.toml")).unwrap();
        assert_eq!(secrets.jwt_secret(), DEFAULT_JWT_SECRET);
    }

    #[test]
    fn test_file_values_win() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secrets.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "JWT_SECRET = \"from-file\"").unwrap();
        writeln!(file, "S3_ACCESS_KEY = \"key-123\"").unwrap();

        let secrets = Secrets::load(&path).unwrap();
        assert_eq!(secrets.jwt_secret(), "from-file");
        assert_eq!(secrets.store_access_key(), Some("key-123".to_string()));
    }

    #[test]
    fn test_empty_value_treated_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secrets.toml");
        std::fs::write(&path, "BILLING_WEBHOOK_SECRET = \"\"\n").unwrap();

        let secrets = Secrets::load(&path).unwrap();
        assert_eq!(secrets.billing_webhook_secret(), None);
    }
}
