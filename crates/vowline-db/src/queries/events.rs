use super::OptionalExt;
use crate::Database;
use crate::models::EventRow;
use anyhow::Result;
use rusqlite::Row;

/// Fields a caller supplies when inserting one event. Ids are generated by
/// the API layer; template application inserts a whole batch of these.
#[derive(Debug, Clone)]
pub struct NewEvent<'a> {
    pub id: &'a str,
    pub title: &'a str,
    pub start_time: &'a str,
    pub end_time: &'a str,
    pub category: Option<&'a str>,
    pub color: Option<&'a str>,
    pub notes: Option<&'a str>,
}

impl Database {
    pub fn create_event(&self, timeline_id: &str, event: &NewEvent<'_>) -> Result<()> {
        self.with_conn_mut(|conn| {
            insert_event(conn, timeline_id, event)?;
            Ok(())
        })
    }

    /// Insert several events under one writer lock, for template application.
    pub fn create_events(&self, timeline_id: &str, events: &[NewEvent<'_>]) -> Result<()> {
        self.with_conn_mut(|conn| {
            for event in events {
                insert_event(conn, timeline_id, event)?;
            }
            Ok(())
        })
    }

    pub fn get_event(&self, id: &str) -> Result<Option<EventRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, timeline_id, title, start_time, end_time, category, color, notes,
                        created_at, updated_at
                 FROM events WHERE id = ?1",
            )?;
            let row = stmt.query_row([id], map_event).optional()?;
            Ok(row)
        })
    }

    /// Events for a timeline in chronological order. HH:MM strings sort
    /// lexicographically, which is also time order.
    pub fn list_events(&self, timeline_id: &str) -> Result<Vec<EventRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, timeline_id, title, start_time, end_time, category, color, notes,
                        created_at, updated_at
                 FROM events WHERE timeline_id = ?1
                 ORDER BY start_time, end_time, created_at",
            )?;

            let rows = stmt
                .query_map([timeline_id], map_event)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    pub fn update_event(&self, id: &str, event: &NewEvent<'_>) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "UPDATE events
                 SET title = ?2, start_time = ?3, end_time = ?4, category = ?5, color = ?6,
                     notes = ?7, updated_at = datetime('now')
                 WHERE id = ?1",
                rusqlite::params![
                    id,
                    event.title,
                    event.start_time,
                    event.end_time,
                    event.category,
                    event.color,
                    event.notes
                ],
            )?;
            Ok(())
        })
    }

    pub fn delete_event(&self, id: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute("DELETE FROM events WHERE id = ?1", [id])?;
            Ok(changed > 0)
        })
    }
}

fn insert_event(
    conn: &rusqlite::Connection,
    timeline_id: &str,
    event: &NewEvent<'_>,
) -> Result<()> {
    conn.execute(
        "INSERT INTO events (id, timeline_id, title, start_time, end_time, category, color, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        rusqlite::params![
            event.id,
            timeline_id,
            event.title,
            event.start_time,
            event.end_time,
            event.category,
            event.color,
            event.notes
        ],
    )?;
    Ok(())
}

fn map_event(row: &Row<'_>) -> rusqlite::Result<EventRow> {
    Ok(EventRow {
        id: row.get(0)?,
        timeline_id: row.get(1)?,
        title: row.get(2)?,
        start_time: row.get(3)?,
        end_time: row.get(4)?,
        category: row.get(5)?,
        color: row.get(6)?,
        notes: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}
