use anyhow::Result;
use chrono::Utc;
use rusqlite::params;

use crate::database::Database;

impl Database {
    /// Increment today's usage counter for a user/endpoint pair
    pub fn track_api_usage(&self, user_id: &str, endpoint: &str) -> Result<()> {
        let date = Utc::now().format("%Y-%m-%d").to_string();
        let conn = self.conn.lock().unwrap();

        let existing: Option<String> = {
            let mut stmt = conn.prepare(
                "SELECT usage_id FROM api_usage
                 WHERE user_id = ?1 AND endpoint = ?2 AND date = ?3",
            )?;
            let mut rows = stmt.query_map(params![user_id, endpoint, date], |row| row.get(0))?;
            match rows.next() {
                Some(id) => Some(id?),
                None => None,
            }
        };

        if let Some(usage_id) = existing {
            conn.execute(
                "UPDATE api_usage SET count = count + 1 WHERE usage_id = ?1",
                params![usage_id],
            )?;
        } else {
            conn.execute(
                "INSERT INTO api_usage (usage_id, user_id, endpoint, count, date)
                 VALUES (?1, ?2, ?3, 1, ?4)",
                params![
                    format!("usage_{}_{}_{}", user_id, endpoint, date),
                    user_id,
                    endpoint,
                    date
                ],
            )?;
        }
        Ok(())
    }

    /// Read today's usage count for a user/endpoint pair
    pub fn get_api_usage(&self, user_id: &str, endpoint: &str) -> Result<u64> {
        let date = Utc::now().format("%Y-%m-%d").to_string();
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(
            "SELECT count FROM api_usage
             WHERE user_id = ?1 AND endpoint = ?2 AND date = ?3",
        )?;

        let mut rows =
            stmt.query_map(params![user_id, endpoint, date], |row| row.get::<_, u64>(0))?;

        match rows.next() {
            Some(count) => Ok(count?),
            None => Ok(0),
        }
    }

    /// Read today's total usage across all endpoints for a user
    pub fn get_total_api_usage(&self, user_id: &str) -> Result<u64> {
        let date = Utc::now().format("%Y-%m-%d").to_string();
        let conn = self.conn.lock().unwrap();

        let total: u64 = conn.query_row(
            "SELECT COALESCE(SUM(count), 0) FROM api_usage
             WHERE user_id = ?1 AND date = ?2",
            params![user_id, date],
            |row| row.get(0),
        )?;
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_database;
    use crate::database::users::sample_user;

    #[test]
    fn test_usage_increments() {
        let db = test_database();
        db.create_user(&sample_user("alice")).unwrap();

        assert_eq!(db.get_api_usage("alice", "quote").unwrap(), 0);

        db.track_api_usage("alice", "quote").unwrap();
        db.track_api_usage("alice", "quote").unwrap();
        db.track_api_usage("alice", "scanner").unwrap();

        assert_eq!(db.get_api_usage("alice", "quote").unwrap(), 2);
        assert_eq!(db.get_api_usage("alice", "scanner").unwrap(), 1);
        assert_eq!(db.get_total_api_usage("alice").unwrap(), 3);
    }
}
