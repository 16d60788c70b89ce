use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use rusqlite::params;

use crate::database::Database;

impl Database {
    /// Cache serialized market data for a ticker with a TTL
    ///
    /// Entries are keyed `<ticker>_<data_type>` and replaced on write.
    pub fn cache_market_data(
        &self,
        ticker: &str,
        data_type: &str,
        data: &serde_json::Value,
        ttl_minutes: i64,
    ) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let cache_id = format!("{}_{}", ticker, data_type);
        let expiry = (Utc::now() + Duration::minutes(ttl_minutes)).to_rfc3339();

        conn.execute(
            "INSERT OR REPLACE INTO market_data_cache
             (cache_id, ticker, data_type, data, timestamp, expiry)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                cache_id,
                ticker,
                data_type,
                serde_json::to_string(data)?,
                Utc::now().to_rfc3339(),
                expiry
            ],
        )?;
        Ok(())
    }

    /// Read cached market data, returning None when absent or expired
    pub fn get_cached_market_data(
        &self,
        ticker: &str,
        data_type: &str,
    ) -> Result<Option<serde_json::Value>> {
        let conn = self.conn.lock().unwrap();
        let cache_id = format!("{}_{}", ticker, data_type);

        let mut stmt =
            conn.prepare("SELECT data, expiry FROM market_data_cache WHERE cache_id = ?1")?;

        let mut rows = stmt.query_map(params![cache_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        if let Some(row) = rows.next() {
            let (data, expiry) = row?;
            if let Ok(expiry) = DateTime::parse_from_rfc3339(&expiry) {
                if Utc::now() < expiry {
                    return Ok(serde_json::from_str(&data).ok());
                }
            }
        }
        Ok(None)
    }

    /// Delete cache entries whose expiry has passed; returns rows removed
    pub fn cleanup_expired_cache(&self) -> Result<u64> {
        let conn = self.conn.lock().unwrap();
        let removed = conn.execute(
            "DELETE FROM market_data_cache WHERE expiry < ?1",
            params![Utc::now().to_rfc3339()],
        )?;
        Ok(removed as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_database;

    #[test]
    fn test_cache_round_trip() {
        let db = test_database();
        let data = serde_json::json!({ "price": 123.45 });

        db.cache_market_data("NVDA", "quote", &data, 60).unwrap();
        let cached = db.get_cached_market_data("NVDA", "quote").unwrap().unwrap();
        assert_eq!(cached["price"], 123.45);

        // Different kind under the same ticker is a separate entry
        assert!(db.get_cached_market_data("NVDA", "candles").unwrap().is_none());
    }

    #[test]
    fn test_expired_entries_not_returned() {
        let db = test_database();
        let data = serde_json::json!({ "price": 1.0 });

        db.cache_market_data("AAPL", "quote", &data, -1).unwrap();
        assert!(db.get_cached_market_data("AAPL", "quote").unwrap().is_none());
    }

    #[test]
    fn test_cleanup_removes_only_expired() {
        let db = test_database();
        let data = serde_json::json!({});

        db.cache_market_data("AAPL", "quote", &data, -1).unwrap();
        db.cache_market_data("NVDA", "quote", &data, 60).unwrap();

        assert_eq!(db.cleanup_expired_cache().unwrap(), 1);
        assert!(db.get_cached_market_data("NVDA", "quote").unwrap().is_some());
    }
}
