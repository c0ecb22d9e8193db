use super::OptionalExt;
use crate::Database;
use crate::models::ShareTokenRow;
use anyhow::Result;
use rusqlite::Row;

impl Database {
    pub fn create_share_token(&self, id: &str, timeline_id: &str, token: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO share_tokens (id, timeline_id, token) VALUES (?1, ?2, ?3)",
                rusqlite::params![id, timeline_id, token],
            )?;
            Ok(())
        })
    }

    pub fn get_share_token(&self, token: &str) -> Result<Option<ShareTokenRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, timeline_id, token, created_at FROM share_tokens WHERE token = ?1",
            )?;
            let row = stmt.query_row([token], map_share_token).optional()?;
            Ok(row)
        })
    }

    pub fn list_share_tokens(&self, timeline_id: &str) -> Result<Vec<ShareTokenRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, timeline_id, token, created_at FROM share_tokens
                 WHERE timeline_id = ?1
                 ORDER BY created_at DESC, id",
            )?;
            let rows = stmt
                .query_map([timeline_id], map_share_token)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Revoke one link. Scoped to the timeline so ownership checks carry
    /// through to the delete.
    pub fn delete_share_token(&self, id: &str, timeline_id: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "DELETE FROM share_tokens WHERE id = ?1 AND timeline_id = ?2",
                [id, timeline_id],
            )?;
            Ok(changed > 0)
        })
    }
}

fn map_share_token(row: &Row<'_>) -> rusqlite::Result<ShareTokenRow> {
    Ok(ShareTokenRow {
        id: row.get(0)?,
        timeline_id: row.get(1)?,
        token: row.get(2)?,
        created_at: row.get(3)?,
    })
}
