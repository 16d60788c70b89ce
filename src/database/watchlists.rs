use anyhow::Result;
use chrono::Utc;
use rusqlite::params;

use crate::database::Database;

impl Database {
    /// Save a user's watchlist, replacing it if one with the same name exists
    pub fn save_watchlist(&self, user_id: &str, tickers: &[String], name: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();

        let existing: Option<String> = {
            let mut stmt = conn.prepare(
                "SELECT watchlist_id FROM watchlists WHERE user_id = ?1 AND name = ?2",
            )?;
            let mut rows = stmt.query_map(params![user_id, name], |row| row.get(0))?;
            match rows.next() {
                Some(id) => Some(id?),
                None => None,
            }
        };

        let tickers_json = serde_json::to_string(tickers)?;

        if let Some(watchlist_id) = existing {
            conn.execute(
                "UPDATE watchlists SET tickers = ?1, created_at = ?2 WHERE watchlist_id = ?3",
                params![tickers_json, Utc::now().to_rfc3339(), watchlist_id],
            )?;
        } else {
            conn.execute(
                "INSERT INTO watchlists (watchlist_id, user_id, name, tickers, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    format!("watchlist_{}_{}", user_id, name),
                    user_id,
                    name,
                    tickers_json,
                    Utc::now().to_rfc3339()
                ],
            )?;
        }

        Ok(())
    }

    /// Get a user's watchlist tickers (empty when none saved)
    pub fn get_watchlist(&self, user_id: &str, name: &str) -> Result<Vec<String>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare("SELECT tickers FROM watchlists WHERE user_id = ?1 AND name = ?2")?;

        let mut rows = stmt.query_map(params![user_id, name], |row| {
            row.get::<_, Option<String>>(0)
        })?;

        if let Some(raw) = rows.next() {
            if let Some(json) = raw? {
                return Ok(serde_json::from_str(&json).unwrap_or_default());
            }
        }
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_database;
    use crate::database::users::sample_user;

    #[test]
    fn test_save_and_get() {
        let db = test_database();
        db.create_user(&sample_user("alice")).unwrap();

        let tickers = vec!["AAPL".to_string(), "NVDA".to_string()];
        db.save_watchlist("alice", &tickers, "Default").unwrap();

        assert_eq!(db.get_watchlist("alice", "Default").unwrap(), tickers);
        assert!(db.get_watchlist("alice", "Other").unwrap().is_empty());
    }

    #[test]
    fn test_save_replaces_existing() {
        let db = test_database();
        db.create_user(&sample_user("bob")).unwrap();

        db.save_watchlist("bob", &["AAPL".to_string()], "Default").unwrap();
        db.save_watchlist("bob", &["TSLA".to_string()], "Default").unwrap();

        assert_eq!(
            db.get_watchlist("bob", "Default").unwrap(),
            vec!["TSLA".to_string()]
        );
    }
}
