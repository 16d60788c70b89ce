use anyhow::Result;
use chrono::Utc;
use rusqlite::{params, Row};

use crate::database::models::Portfolio;
use crate::database::Database;

impl Database {
    /// Insert a new portfolio
    pub fn create_portfolio(&self, portfolio: &Portfolio) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO portfolios (
                portfolio_id, user_id, name, holdings,
                total_value, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                portfolio.portfolio_id,
                portfolio.user_id,
                portfolio.name,
                serde_json::to_string(&portfolio.holdings)?,
                portfolio.total_value,
                portfolio.created_at,
                Utc::now().to_rfc3339()
            ],
        )?;
        Ok(())
    }

    /// Get all portfolios for a user
    pub fn get_user_portfolios(&self, user_id: &str) -> Result<Vec<Portfolio>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT * FROM portfolios WHERE user_id = ?1")?;

        let rows = stmt.query_map(params![user_id], |row| row_to_portfolio(row))?;

        let mut portfolios = Vec::new();
        for portfolio in rows {
            portfolios.push(portfolio?);
        }
        Ok(portfolios)
    }

    /// Get a single portfolio by id
    pub fn get_portfolio(&self, portfolio_id: &str) -> Result<Option<Portfolio>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT * FROM portfolios WHERE portfolio_id = ?1")?;

        let mut rows = stmt.query_map(params![portfolio_id], |row| row_to_portfolio(row))?;

        match rows.next() {
            Some(portfolio) => Ok(Some(portfolio?)),
            None => Ok(None),
        }
    }

    /// Count a user's portfolios (used for tier limit checks)
    pub fn count_user_portfolios(&self, user_id: &str) -> Result<u64> {
        let conn = self.conn.lock().unwrap();
        let count: u64 = conn.query_row(
            "SELECT COUNT(*) FROM portfolios WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Replace a portfolio's holdings and total value, stamping updated_at
    pub fn update_portfolio_holdings(
        &self,
        portfolio_id: &str,
        holdings: &serde_json::Value,
        total_value: f64,
    ) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE portfolios
             SET holdings = ?1, total_value = ?2, updated_at = ?3
             WHERE portfolio_id = ?4",
            params![
                serde_json::to_string(holdings)?,
                total_value,
                Utc::now().to_rfc3339(),
                portfolio_id
            ],
        )?;
        Ok(())
    }
}

/// Convert a database row to a Portfolio
fn row_to_portfolio(row: &Row) -> rusqlite::Result<Portfolio> {
    let holdings_raw: Option<String> = row.get("holdings")?;
    let holdings = holdings_raw
        .and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or(serde_json::json!({}));

    Ok(Portfolio {
        portfolio_id: row.get("portfolio_id")?,
        user_id: row.get("user_id")?,
        name: row.get("name")?,
        holdings,
        total_value: row.get("total_value")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_database;
    use crate::database::users::sample_user;

    fn sample_portfolio(user_id: &str, name: &str) -> Portfolio {
        Portfolio {
            portfolio_id: format!("pf_{}_{}", user_id, name),
            user_id: user_id.to_string(),
            name: name.to_string(),
            holdings: serde_json::json!({}),
            total_value: 10000.0,
            created_at: Utc::now().to_rfc3339(),
            updated_at: Utc::now().to_rfc3339(),
        }
    }

    #[test]
    fn test_create_and_list() {
        let db = test_database();
        db.create_user(&sample_user("alice")).unwrap();
        db.create_portfolio(&sample_portfolio("alice", "Main")).unwrap();
        db.create_portfolio(&sample_portfolio("alice", "Growth")).unwrap();

        let portfolios = db.get_user_portfolios("alice").unwrap();
        assert_eq!(portfolios.len(), 2);
        assert_eq!(db.count_user_portfolios("alice").unwrap(), 2);
    }

    #[test]
    fn test_update_holdings() {
        let db = test_database();
        db.create_user(&sample_user("bob")).unwrap();
        db.create_portfolio(&sample_portfolio("bob", "Main")).unwrap();

        let holdings = serde_json::json!({ "NVDA": 10.0 });
        db.update_portfolio_holdings("pf_bob_Main", &holdings, 12345.0).unwrap();

        let portfolio = db.get_portfolio("pf_bob_Main").unwrap().unwrap();
        assert_eq!(portfolio.holdings["NVDA"], 10.0);
        assert_eq!(portfolio.total_value, 12345.0);
    }
}
