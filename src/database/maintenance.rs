use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;
use rusqlite::params;

use crate::database::models::AccountExport;
use crate::database::Database;
use crate::paths;

/// Row counts across the platform tables
#[derive(Debug, Clone, serde::Serialize)]
pub struct DatabaseStats {
    pub total_users: u64,
    pub active_users: u64,
    pub total_portfolios: u64,
    pub total_trades: u64,
    pub total_alerts: u64,
    pub cache_entries: u64,
}

impl Database {
    /// Copy the database into a timestamped backup file
    ///
    /// Uses `VACUUM INTO`, which produces a compact consistent snapshot
    /// without blocking readers. Returns the backup path.
    pub fn backup_database(&self, backup_path: Option<PathBuf>) -> Result<PathBuf> {
        let backup_path = backup_path.unwrap_or_else(|| {
            let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
            paths::get_backups_directory().join(format!("omniscient_backup_{}.db", timestamp))
        });

        if let Some(parent) = backup_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = self.conn.lock().unwrap();
        conn.execute(
            "VACUUM INTO ?1",
            params![backup_path.to_string_lossy().to_string()],
        )?;

        Ok(backup_path)
    }

    /// Gather row counts for status reporting
    pub fn get_stats(&self) -> Result<DatabaseStats> {
        let conn = self.conn.lock().unwrap();

        let count = |sql: &str| -> Result<u64> {
            Ok(conn.query_row(sql, [], |row| row.get(0))?)
        };

        Ok(DatabaseStats {
            total_users: count("SELECT COUNT(*) FROM users")?,
            active_users: count("SELECT COUNT(*) FROM users WHERE is_active = 1")?,
            total_portfolios: count("SELECT COUNT(*) FROM portfolios")?,
            total_trades: count("SELECT COUNT(*) FROM trades")?,
            total_alerts: count("SELECT COUNT(*) FROM alerts")?,
            cache_entries: count("SELECT COUNT(*) FROM market_data_cache")?,
        })
    }

    /// Export everything belonging to a user
    ///
    /// Credential and reset fields are blanked before the record leaves the
    /// database layer.
    pub fn export_user_data(&self, user_id: &str) -> Result<Option<AccountExport>> {
        let Some(mut user) = self.get_user_by_id(user_id)? else {
            return Ok(None);
        };

        user.password_hash = String::new();
        user.reset_token = None;
        user.reset_token_expiry = None;

        Ok(Some(AccountExport {
            portfolios: self.get_user_portfolios(user_id)?,
            trades: self.get_user_trades(user_id, 1000)?,
            watchlist: self.get_watchlist(user_id, "Default")?,
            alerts: self.get_user_alerts(user_id)?,
            user,
            exported_at: Utc::now().to_rfc3339(),
        }))
    }

    /// Anonymize a user instead of deleting history
    ///
    /// Identity fields are blanked and the row deactivated; portfolios and
    /// trades stay for bookkeeping but no longer resolve to a person.
    pub fn anonymize_user(&self, user_id: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE users
             SET email = ?1, username = ?2, password_hash = 'deleted',
                 api_key = NULL, settings = '{}', is_active = 0
             WHERE user_id = ?3",
            params![
                format!("deleted_{}@deleted.com", user_id),
                format!("deleted_{}", user_id),
                user_id
            ],
        )?;
        Ok(())
    }

    /// Write an account export as pretty JSON next to the other exports
    pub fn export_user_data_to_file(&self, user_id: &str, dir: &Path) -> Result<Option<PathBuf>> {
        let Some(export) = self.export_user_data(user_id)? else {
            return Ok(None);
        };

        std::fs::create_dir_all(dir)?;
        let path = dir.join(format!("account_{}.json", user_id));
        std::fs::write(&path, serde_json::to_string_pretty(&export)?)?;
        Ok(Some(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_database;
    use crate::database::users::sample_user;

    #[test]
    fn test_backup_creates_file() {
        let db = test_database();
        db.create_user(&sample_user("alice")).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("snap.db");
        let path = db.backup_database(Some(target.clone())).unwrap();

        assert_eq!(path, target);
        assert!(path.exists());

        // The backup is itself a usable database
        let restored = Database::open(&path).unwrap();
        assert!(restored.get_user_by_id("alice").unwrap().is_some());
    }

    #[test]
    fn test_stats_counts() {
        let db = test_database();
        db.create_user(&sample_user("alice")).unwrap();
        db.create_user(&sample_user("bob")).unwrap();

        let stats = db.get_stats().unwrap();
        assert_eq!(stats.total_users, 2);
        assert_eq!(stats.active_users, 2);
        assert_eq!(stats.total_trades, 0);
    }

    #[test]
    fn test_export_strips_sensitive_fields() {
        let db = test_database();
        db.create_user(&sample_user("carol")).unwrap();

        let export = db.export_user_data("carol").unwrap().unwrap();
        assert!(export.user.password_hash.is_empty());
        assert!(export.user.reset_token.is_none());
        assert_eq!(export.user.username, "carol");
    }

    #[test]
    fn test_anonymized_user_invisible() {
        let db = test_database();
        db.create_user(&sample_user("dave")).unwrap();

        db.anonymize_user("dave").unwrap();

        assert!(db.get_user_by_id("dave").unwrap().is_none());
        assert!(db.get_user_by_email("dave@example.com").unwrap().is_none());
        assert!(!db.user_exists("dave@example.com", "dave").unwrap());

        // History remains countable
        let stats = db.get_stats().unwrap();
        assert_eq!(stats.total_users, 1);
        assert_eq!(stats.active_users, 0);
    }
}
