use super::OptionalExt;
use crate::Database;
use crate::models::EmailTemplateRow;
use anyhow::Result;
use rusqlite::Row;

impl Database {
    pub fn get_email_template(&self, name: &str) -> Result<Option<EmailTemplateRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, subject, body, updated_at FROM email_templates WHERE name = ?1",
            )?;
            let row = stmt.query_row([name], map_email_template).optional()?;
            Ok(row)
        })
    }

    pub fn list_email_templates(&self) -> Result<Vec<EmailTemplateRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, subject, body, updated_at FROM email_templates ORDER BY name",
            )?;
            let rows = stmt
                .query_map([], map_email_template)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Templates are seeded by migration; editing changes subject and body
    /// but never creates new names.
    pub fn update_email_template(&self, name: &str, subject: &str, body: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE email_templates
                 SET subject = ?2, body = ?3, updated_at = datetime('now')
                 WHERE name = ?1",
                rusqlite::params![name, subject, body],
            )?;
            Ok(changed > 0)
        })
    }
}

fn map_email_template(row: &Row<'_>) -> rusqlite::Result<EmailTemplateRow> {
    Ok(EmailTemplateRow {
        id: row.get(0)?,
        name: row.get(1)?,
        subject: row.get(2)?,
        body: row.get(3)?,
        updated_at: row.get(4)?,
    })
}
