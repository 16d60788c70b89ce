use anyhow::Result;
use chrono::{Duration, Utc};
use rusqlite::{params, Row};

use crate::database::models::User;
use crate::database::Database;

impl Database {
    /// Insert a new user row
    pub fn create_user(&self, user: &User) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO users (
                user_id, email, username, password_hash,
                subscription_tier, subscription_expiry, created_at,
                api_key, settings
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                user.user_id,
                user.email,
                user.username,
                user.password_hash,
                user.subscription_tier,
                user.subscription_expiry,
                user.created_at,
                user.api_key,
                serde_json::to_string(&user.settings)?
            ],
        )?;
        Ok(())
    }

    /// Look up an active user by email or username
    pub fn get_user_by_identifier(&self, identifier: &str) -> Result<Option<User>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT * FROM users
             WHERE (email = ?1 OR username = ?2) AND is_active = 1",
        )?;

        let mut rows = stmt.query_map(params![identifier.to_lowercase(), identifier], |row| {
            row_to_user(row)
        })?;

        match rows.next() {
            Some(user) => Ok(Some(user?)),
            None => Ok(None),
        }
    }

    /// Look up an active user by email
    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare("SELECT * FROM users WHERE email = ?1 AND is_active = 1")?;

        let mut rows = stmt.query_map(params![email.to_lowercase()], |row| row_to_user(row))?;

        match rows.next() {
            Some(user) => Ok(Some(user?)),
            None => Ok(None),
        }
    }

    /// Look up an active user by id
    pub fn get_user_by_id(&self, user_id: &str) -> Result<Option<User>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare("SELECT * FROM users WHERE user_id = ?1 AND is_active = 1")?;

        let mut rows = stmt.query_map(params![user_id], |row| row_to_user(row))?;

        match rows.next() {
            Some(user) => Ok(Some(user?)),
            None => Ok(None),
        }
    }

    /// Check if an active user with the given email or username exists
    pub fn user_exists(&self, email: &str, username: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM users
             WHERE (email = ?1 OR username = ?2) AND is_active = 1",
            params![email.to_lowercase(), username],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Stamp the user's last login time
    pub fn update_last_login(&self, user_id: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE users SET last_login = ?1 WHERE user_id = ?2",
            params![Utc::now().to_rfc3339(), user_id],
        )?;
        Ok(())
    }

    /// Update the user's subscription tier and expiry
    pub fn update_subscription(&self, user_id: &str, tier: &str, expiry: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE users
             SET subscription_tier = ?1, subscription_expiry = ?2
             WHERE user_id = ?3",
            params![tier, expiry, user_id],
        )?;
        Ok(())
    }

    /// Store a password-reset token valid for 24 hours
    pub fn save_reset_token(&self, user_id: &str, token: &str) -> Result<()> {
        let expiry = (Utc::now() + Duration::hours(24)).to_rfc3339();
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE users
             SET reset_token = ?1, reset_token_expiry = ?2
             WHERE user_id = ?3",
            params![token, expiry, user_id],
        )?;
        Ok(())
    }

    /// Resolve a reset token to its user id, if the token is still valid
    pub fn get_user_by_reset_token(&self, token: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT user_id FROM users
             WHERE reset_token = ?1 AND reset_token_expiry > ?2",
        )?;

        let mut rows = stmt.query_map(params![token, Utc::now().to_rfc3339()], |row| {
            row.get::<_, String>(0)
        })?;

        match rows.next() {
            Some(user_id) => Ok(Some(user_id?)),
            None => Ok(None),
        }
    }

    /// Clear a consumed reset token
    pub fn clear_reset_token(&self, user_id: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE users
             SET reset_token = NULL, reset_token_expiry = NULL
             WHERE user_id = ?1",
            params![user_id],
        )?;
        Ok(())
    }

    /// Replace the user's password hash
    pub fn update_password(&self, user_id: &str, new_hash: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE users SET password_hash = ?1 WHERE user_id = ?2",
            params![new_hash, user_id],
        )?;
        Ok(())
    }
}

/// Convert a database row to a User
pub(crate) fn row_to_user(row: &Row) -> rusqlite::Result<User> {
    let settings_raw: Option<String> = row.get("settings")?;
    let settings = settings_raw
        .and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or(serde_json::Value::Null);

    Ok(User {
        user_id: row.get("user_id")?,
        email: row.get("email")?,
        username: row.get("username")?,
        password_hash: row.get("password_hash")?,
        subscription_tier: row.get("subscription_tier")?,
        subscription_expiry: row.get("subscription_expiry")?,
        created_at: row.get("created_at")?,
        last_login: row.get("last_login")?,
        api_key: row.get("api_key")?,
        settings,
        reset_token: row.get("reset_token")?,
        reset_token_expiry: row.get("reset_token_expiry")?,
        is_active: row.get::<_, i64>("is_active")? == 1,
    })
}

#[cfg(test)]
pub(crate) fn sample_user(id: &str) -> User {
    User {
        user_id: id.to_string(),
        email: format!("{}@example.com", id),
        username: id.to_string(),
        password_hash: "hash".to_string(),
        subscription_tier: "free".to_string(),
        subscription_expiry: None,
        created_at: Utc::now().to_rfc3339(),
        last_login: None,
        api_key: Some(format!("key_{}", id)),
        settings: serde_json::json!({ "theme": "dark" }),
        reset_token: None,
        reset_token_expiry: None,
        is_active: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_database;

    #[test]
    fn test_create_and_lookup() {
        let db = test_database();
        db.create_user(&sample_user("alice")).unwrap();

        let by_email = db.get_user_by_email("ALICE@example.com").unwrap().unwrap();
        assert_eq!(by_email.username, "alice");

        let by_name = db.get_user_by_identifier("alice").unwrap().unwrap();
        assert_eq!(by_name.email, "alice@example.com");

        assert!(db.user_exists("alice@example.com", "other").unwrap());
        assert!(!db.user_exists("bob@example.com", "bob").unwrap());
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let db = test_database();
        db.create_user(&sample_user("carol")).unwrap();

        let mut dup = sample_user("carol2");
        dup.email = "carol@example.com".to_string();
        dup.api_key = Some("other-key".to_string());
        assert!(db.create_user(&dup).is_err());
    }

    #[test]
    fn test_reset_token_flow() {
        let db = test_database();
        db.create_user(&sample_user("dave")).unwrap();

        db.save_reset_token("dave", "tok-123").unwrap();
        assert_eq!(
            db.get_user_by_reset_token("tok-123").unwrap(),
            Some("dave".to_string())
        );

        db.clear_reset_token("dave").unwrap();
        assert_eq!(db.get_user_by_reset_token("tok-123").unwrap(), None);
    }

    #[test]
    fn test_expired_reset_token_rejected() {
        let db = test_database();
        db.create_user(&sample_user("erin")).unwrap();

        // Write a token that expired an hour ago
        {
            let conn = db.conn.lock().unwrap();
            let past = (Utc::now() - Duration::hours(1)).to_rfc3339();
            conn.execute(
                "UPDATE users SET reset_token = 'old', reset_token_expiry = ?1
                 WHERE user_id = 'erin'",
                params![past],
            )
            .unwrap();
        }

        assert_eq!(db.get_user_by_reset_token("old").unwrap(), None);
    }

    #[test]
    fn test_update_subscription() {
        let db = test_database();
        db.create_user(&sample_user("frank")).unwrap();

        let expiry = (Utc::now() + Duration::days(30)).to_rfc3339();
        db.update_subscription("frank", "premium", &expiry).unwrap();

        let user = db.get_user_by_id("frank").unwrap().unwrap();
        assert_eq!(user.subscription_tier, "premium");
        assert_eq!(user.subscription_expiry, Some(expiry));
    }
}
