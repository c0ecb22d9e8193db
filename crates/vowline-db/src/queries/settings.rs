use super::OptionalExt;
use crate::Database;
use crate::models::SettingRow;
use anyhow::Result;
use rusqlite::Row;

impl Database {
    pub fn get_setting(&self, key: &str) -> Result<Option<SettingRow>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT key, value, updated_at FROM settings WHERE key = ?1")?;
            let row = stmt.query_row([key], map_setting).optional()?;
            Ok(row)
        })
    }

    pub fn list_settings(&self) -> Result<Vec<SettingRow>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT key, value, updated_at FROM settings ORDER BY key")?;
            let rows = stmt
                .query_map([], map_setting)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO settings (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key)
                 DO UPDATE SET value = excluded.value, updated_at = datetime('now')",
                rusqlite::params![key, value],
            )?;
            Ok(())
        })
    }
}

fn map_setting(row: &Row<'_>) -> rusqlite::Result<SettingRow> {
    Ok(SettingRow {
        key: row.get(0)?,
        value: row.get(1)?,
        updated_at: row.get(2)?,
    })
}
