use super::OptionalExt;
use crate::Database;
use crate::models::RestrictionRow;
use anyhow::Result;
use rusqlite::Row;

impl Database {
    pub fn create_restriction(
        &self,
        id: &str,
        timeline_id: &str,
        name: &str,
        start_time: &str,
        end_time: &str,
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO restrictions (id, timeline_id, name, start_time, end_time)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![id, timeline_id, name, start_time, end_time],
            )?;
            Ok(())
        })
    }

    pub fn get_restriction(&self, id: &str) -> Result<Option<RestrictionRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, timeline_id, name, start_time, end_time, created_at
                 FROM restrictions WHERE id = ?1",
            )?;
            let row = stmt.query_row([id], map_restriction).optional()?;
            Ok(row)
        })
    }

    pub fn list_restrictions(&self, timeline_id: &str) -> Result<Vec<RestrictionRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, timeline_id, name, start_time, end_time, created_at
                 FROM restrictions WHERE timeline_id = ?1
                 ORDER BY start_time, end_time",
            )?;

            let rows = stmt
                .query_map([timeline_id], map_restriction)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    pub fn update_restriction(
        &self,
        id: &str,
        name: &str,
        start_time: &str,
        end_time: &str,
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "UPDATE restrictions SET name = ?2, start_time = ?3, end_time = ?4 WHERE id = ?1",
                rusqlite::params![id, name, start_time, end_time],
            )?;
            Ok(())
        })
    }

    pub fn delete_restriction(&self, id: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute("DELETE FROM restrictions WHERE id = ?1", [id])?;
            Ok(changed > 0)
        })
    }
}

fn map_restriction(row: &Row<'_>) -> rusqlite::Result<RestrictionRow> {
    Ok(RestrictionRow {
        id: row.get(0)?,
        timeline_id: row.get(1)?,
        name: row.get(2)?,
        start_time: row.get(3)?,
        end_time: row.get(4)?,
        created_at: row.get(5)?,
    })
}
