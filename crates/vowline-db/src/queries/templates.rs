use super::OptionalExt;
use crate::Database;
use crate::models::{TemplateEventRow, TemplateRow, TemplateWithCountRow};
use anyhow::Result;
use rusqlite::Row;

/// Caller-supplied fields for one template event.
#[derive(Debug, Clone)]
pub struct NewTemplateEvent<'a> {
    pub id: &'a str,
    pub title: &'a str,
    pub start_time: &'a str,
    pub end_time: &'a str,
    pub category: Option<&'a str>,
    pub color: Option<&'a str>,
    pub notes: Option<&'a str>,
    pub sort_order: i64,
}

impl Database {
    pub fn create_template(&self, id: &str, name: &str, description: Option<&str>) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO templates (id, name, description) VALUES (?1, ?2, ?3)",
                rusqlite::params![id, name, description],
            )?;
            Ok(())
        })
    }

    pub fn get_template(&self, id: &str) -> Result<Option<TemplateRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, description, created_at, updated_at FROM templates WHERE id = ?1",
            )?;
            let row = stmt.query_row([id], map_template).optional()?;
            Ok(row)
        })
    }

    /// All templates with their event counts, for the picker and admin list.
    pub fn list_templates_with_counts(&self) -> Result<Vec<TemplateWithCountRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT t.id, t.name, t.description, t.created_at, t.updated_at, COUNT(e.id)
                 FROM templates t
                 LEFT JOIN template_events e ON e.template_id = t.id
                 GROUP BY t.id
                 ORDER BY t.name",
            )?;

            let rows = stmt
                .query_map([], |row| {
                    Ok(TemplateWithCountRow {
                        template: map_template(row)?,
                        event_count: row.get(5)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    pub fn update_template(&self, id: &str, name: &str, description: Option<&str>) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "UPDATE templates
                 SET name = ?2, description = ?3, updated_at = datetime('now')
                 WHERE id = ?1",
                rusqlite::params![id, name, description],
            )?;
            Ok(())
        })
    }

    pub fn delete_template(&self, id: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute("DELETE FROM templates WHERE id = ?1", [id])?;
            Ok(changed > 0)
        })
    }

    // -- Template events --

    pub fn create_template_event(
        &self,
        template_id: &str,
        event: &NewTemplateEvent<'_>,
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO template_events
                     (id, template_id, title, start_time, end_time, category, color, notes, sort_order)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                rusqlite::params![
                    event.id,
                    template_id,
                    event.title,
                    event.start_time,
                    event.end_time,
                    event.category,
                    event.color,
                    event.notes,
                    event.sort_order
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_template_event(&self, id: &str) -> Result<Option<TemplateEventRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, template_id, title, start_time, end_time, category, color, notes, sort_order
                 FROM template_events WHERE id = ?1",
            )?;
            let row = stmt.query_row([id], map_template_event).optional()?;
            Ok(row)
        })
    }

    pub fn list_template_events(&self, template_id: &str) -> Result<Vec<TemplateEventRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, template_id, title, start_time, end_time, category, color, notes, sort_order
                 FROM template_events WHERE template_id = ?1
                 ORDER BY sort_order, start_time",
            )?;

            let rows = stmt
                .query_map([template_id], map_template_event)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    pub fn update_template_event(&self, id: &str, event: &NewTemplateEvent<'_>) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "UPDATE template_events
                 SET title = ?2, start_time = ?3, end_time = ?4, category = ?5, color = ?6,
                     notes = ?7, sort_order = ?8
                 WHERE id = ?1",
                rusqlite::params![
                    id,
                    event.title,
                    event.start_time,
                    event.end_time,
                    event.category,
                    event.color,
                    event.notes,
                    event.sort_order
                ],
            )?;
            Ok(())
        })
    }

    pub fn delete_template_event(&self, id: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute("DELETE FROM template_events WHERE id = ?1", [id])?;
            Ok(changed > 0)
        })
    }
}

fn map_template(row: &Row<'_>) -> rusqlite::Result<TemplateRow> {
    Ok(TemplateRow {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

fn map_template_event(row: &Row<'_>) -> rusqlite::Result<TemplateEventRow> {
    Ok(TemplateEventRow {
        id: row.get(0)?,
        template_id: row.get(1)?,
        title: row.get(2)?,
        start_time: row.get(3)?,
        end_time: row.get(4)?,
        category: row.get(5)?,
        color: row.get(6)?,
        notes: row.get(7)?,
        sort_order: row.get(8)?,
    })
}
