use anyhow::Result;
use chrono::Utc;
use rusqlite::{params, Row};

use crate::database::models::Alert;
use crate::database::Database;

impl Database {
    /// Create a new price alert
    pub fn create_alert(&self, alert: &Alert) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO alerts (
                alert_id, user_id, ticker, alert_type,
                condition, threshold, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                alert.alert_id,
                alert.user_id,
                alert.ticker,
                alert.alert_type,
                serde_json::to_string(&alert.condition)?,
                alert.threshold,
                alert.created_at
            ],
        )?;
        Ok(())
    }

    /// Get all alerts for a user, newest first
    pub fn get_user_alerts(&self, user_id: &str) -> Result<Vec<Alert>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT * FROM alerts WHERE user_id = ?1 ORDER BY created_at DESC",
        )?;

        let rows = stmt.query_map(params![user_id], |row| row_to_alert(row))?;

        let mut alerts = Vec::new();
        for alert in rows {
            alerts.push(alert?);
        }
        Ok(alerts)
    }

    /// Count a user's alerts (used for tier limit checks)
    pub fn count_user_alerts(&self, user_id: &str) -> Result<u64> {
        let conn = self.conn.lock().unwrap();
        let count: u64 = conn.query_row(
            "SELECT COUNT(*) FROM alerts WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Get every alert not yet triggered, across all users
    pub fn get_pending_alerts(&self) -> Result<Vec<Alert>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT * FROM alerts WHERE triggered = 0")?;

        let rows = stmt.query_map([], |row| row_to_alert(row))?;

        let mut alerts = Vec::new();
        for alert in rows {
            alerts.push(alert?);
        }
        Ok(alerts)
    }

    /// Mark an alert as triggered
    pub fn mark_alert_triggered(&self, alert_id: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE alerts SET triggered = 1, triggered_at = ?1 WHERE alert_id = ?2",
            params![Utc::now().to_rfc3339(), alert_id],
        )?;
        Ok(())
    }
}

/// Convert a database row to an Alert
fn row_to_alert(row: &Row) -> rusqlite::Result<Alert> {
    let condition_raw: String = row.get("condition")?;
    let condition = serde_json::from_str(&condition_raw).unwrap_or(serde_json::json!({}));

    Ok(Alert {
        alert_id: row.get("alert_id")?,
        user_id: row.get("user_id")?,
        ticker: row.get("ticker")?,
        alert_type: row.get("alert_type")?,
        condition,
        threshold: row.get("threshold")?,
        triggered: row.get::<_, i64>("triggered")? == 1,
        triggered_at: row.get("triggered_at")?,
        created_at: row.get("created_at")?,
    })
}
