use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timeline {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub wedding_date: NaiveDate,
    pub day_start_hour: u8,
    pub day_end_hour: u8,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A named window during which no event should run. Violations surface as
/// display-only warnings, never write rejections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Restriction {
    pub id: Uuid,
    pub timeline_id: Uuid,
    pub name: String,
    pub start_time: String,
    pub end_time: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateEvent {
    pub id: Uuid,
    pub template_id: Uuid,
    pub title: String,
    pub start_time: String,
    pub end_time: String,
    pub category: Option<String>,
    pub color: Option<String>,
    pub notes: Option<String>,
    pub sort_order: i64,
}

/// An admin-defined yes/no prompt. A "yes" answer can auto-generate a block
/// from the `default_*` fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: Uuid,
    pub prompt: String,
    pub category: Option<String>,
    pub default_title: String,
    pub default_start_time: String,
    pub default_end_time: String,
    pub default_color: Option<String>,
    pub sort_order: i64,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub timeline_id: Uuid,
    pub question_id: Uuid,
    pub answer: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailTemplate {
    pub name: String,
    pub subject: String,
    pub body: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Setting {
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

/// Parse a timestamp as stored by SQLite. Canonical definition lives here so
/// every layer converts the same way.
///
/// SQLite's `datetime('now')` produces "YYYY-MM-DD HH:MM:SS" without a
/// timezone; RFC 3339 strings are accepted too.
pub fn parse_db_timestamp(raw: &str) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            tracing::warn!("Corrupt timestamp '{}': {}", raw, e);
            DateTime::default()
        })
}

/// Parse a `YYYY-MM-DD` date column, warning and defaulting on corrupt rows.
pub fn parse_db_date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap_or_else(|e| {
        tracing::warn!("Corrupt date '{}': {}", raw, e);
        NaiveDate::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_naive_timestamps_parse_as_utc() {
        let dt = parse_db_timestamp("2026-06-20 14:30:00");
        assert_eq!(dt.to_rfc3339(), "2026-06-20T14:30:00+00:00");
    }

    #[test]
    fn rfc3339_timestamps_parse_too() {
        let dt = parse_db_timestamp("2026-06-20T14:30:00Z");
        assert_eq!(dt.to_rfc3339(), "2026-06-20T14:30:00+00:00");
    }

    #[test]
    fn corrupt_timestamp_falls_back_to_default() {
        assert_eq!(parse_db_timestamp("not a date"), DateTime::<Utc>::default());
    }

    #[test]
    fn dates_round_trip() {
        let date = parse_db_date("2026-06-20");
        assert_eq!(date.to_string(), "2026-06-20");
    }
}
