use super::OptionalExt;
use crate::Database;
use crate::models::TimelineRow;
use anyhow::Result;
use rusqlite::Row;

impl Database {
    pub fn create_timeline(
        &self,
        id: &str,
        user_id: &str,
        name: &str,
        wedding_date: &str,
        day_start_hour: i64,
        day_end_hour: i64,
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO timelines (id, user_id, name, wedding_date, day_start_hour, day_end_hour)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![id, user_id, name, wedding_date, day_start_hour, day_end_hour],
            )?;
            Ok(())
        })
    }

    pub fn get_timeline(&self, id: &str) -> Result<Option<TimelineRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, name, wedding_date, day_start_hour, day_end_hour,
                        created_at, updated_at
                 FROM timelines WHERE id = ?1",
            )?;
            let row = stmt.query_row([id], map_timeline).optional()?;
            Ok(row)
        })
    }

    /// A user's timelines, newest first.
    pub fn list_timelines_for_user(&self, user_id: &str) -> Result<Vec<TimelineRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, name, wedding_date, day_start_hour, day_end_hour,
                        created_at, updated_at
                 FROM timelines WHERE user_id = ?1
                 ORDER BY created_at DESC, id",
            )?;

            let rows = stmt
                .query_map([user_id], map_timeline)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    pub fn update_timeline(
        &self,
        id: &str,
        name: &str,
        wedding_date: &str,
        day_start_hour: i64,
        day_end_hour: i64,
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "UPDATE timelines
                 SET name = ?2, wedding_date = ?3, day_start_hour = ?4, day_end_hour = ?5,
                     updated_at = datetime('now')
                 WHERE id = ?1",
                rusqlite::params![id, name, wedding_date, day_start_hour, day_end_hour],
            )?;
            Ok(())
        })
    }

    pub fn delete_timeline(&self, id: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute("DELETE FROM timelines WHERE id = ?1", [id])?;
            Ok(changed > 0)
        })
    }
}

fn map_timeline(row: &Row<'_>) -> rusqlite::Result<TimelineRow> {
    Ok(TimelineRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        wedding_date: row.get(3)?,
        day_start_hour: row.get(4)?,
        day_end_hour: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}
