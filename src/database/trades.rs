use anyhow::Result;
use rusqlite::{params, Row};

use crate::database::models::Trade;
use crate::database::Database;

impl Database {
    /// Record a trade
    pub fn create_trade(&self, trade: &Trade) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO trades (
                trade_id, user_id, portfolio_id, ticker,
                action, quantity, price, total, timestamp, status, notes
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                trade.trade_id,
                trade.user_id,
                trade.portfolio_id,
                trade.ticker,
                trade.action,
                trade.quantity,
                trade.price,
                trade.total,
                trade.timestamp,
                trade.status,
                trade.notes
            ],
        )?;
        Ok(())
    }

    /// Get a user's most recent trades
    pub fn get_user_trades(&self, user_id: &str, limit: u32) -> Result<Vec<Trade>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT * FROM trades
             WHERE user_id = ?1
             ORDER BY timestamp DESC
             LIMIT ?2",
        )?;

        let rows = stmt.query_map(params![user_id, limit], |row| row_to_trade(row))?;

        let mut trades = Vec::new();
        for trade in rows {
            trades.push(trade?);
        }
        Ok(trades)
    }
}

/// Convert a database row to a Trade
fn row_to_trade(row: &Row) -> rusqlite::Result<Trade> {
    Ok(Trade {
        trade_id: row.get("trade_id")?,
        user_id: row.get("user_id")?,
        portfolio_id: row.get("portfolio_id")?,
        ticker: row.get("ticker")?,
        action: row.get("action")?,
        quantity: row.get("quantity")?,
        price: row.get("price")?,
        total: row.get("total")?,
        timestamp: row.get("timestamp")?,
        status: row.get("status")?,
        notes: row.get::<_, Option<String>>("notes")?.unwrap_or_default(),
    })
}
