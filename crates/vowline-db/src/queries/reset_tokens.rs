use super::OptionalExt;
use crate::Database;
use anyhow::Result;

impl Database {
    /// Store a new reset token hash. Outstanding tokens for the same user
    /// are invalidated first so only the latest emailed link works.
    pub fn create_reset_token(
        &self,
        id: &str,
        user_id: &str,
        token_hash: &str,
        expires_at: &str,
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "UPDATE password_reset_tokens SET used_at = datetime('now')
                 WHERE user_id = ?1 AND used_at IS NULL",
                [user_id],
            )?;
            conn.execute(
                "INSERT INTO password_reset_tokens (id, user_id, token_hash, expires_at)
                 VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![id, user_id, token_hash, expires_at],
            )?;
            Ok(())
        })
    }

    /// Atomically mark a live token used and return its user id. `None`
    /// means unknown, already used, or expired; a second call with the same
    /// hash always returns `None`.
    pub fn consume_reset_token(&self, token_hash: &str) -> Result<Option<String>> {
        self.with_conn_mut(|conn| {
            let user_id = conn
                .query_row(
                    "UPDATE password_reset_tokens SET used_at = datetime('now')
                     WHERE token_hash = ?1
                       AND used_at IS NULL
                       AND expires_at > datetime('now')
                     RETURNING user_id",
                    [token_hash],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(user_id)
        })
    }
}
