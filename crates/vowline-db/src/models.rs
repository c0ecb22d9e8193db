//! Database row types. These map directly to SQLite rows; ids and
//! timestamps stay as TEXT until the API layer parses them.

#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub is_admin: bool,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct TimelineRow {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub wedding_date: String,
    pub day_start_hour: i64,
    pub day_end_hour: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone)]
pub struct EventRow {
    pub id: String,
    pub timeline_id: String,
    pub title: String,
    pub start_time: String,
    pub end_time: String,
    pub category: Option<String>,
    pub color: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone)]
pub struct RestrictionRow {
    pub id: String,
    pub timeline_id: String,
    pub name: String,
    pub start_time: String,
    pub end_time: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct TemplateRow {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Template joined with how many events it carries, for list views.
#[derive(Debug, Clone)]
pub struct TemplateWithCountRow {
    pub template: TemplateRow,
    pub event_count: i64,
}

#[derive(Debug, Clone)]
pub struct TemplateEventRow {
    pub id: String,
    pub template_id: String,
    pub title: String,
    pub start_time: String,
    pub end_time: String,
    pub category: Option<String>,
    pub color: Option<String>,
    pub notes: Option<String>,
    pub sort_order: i64,
}

#[derive(Debug, Clone)]
pub struct QuestionRow {
    pub id: String,
    pub prompt: String,
    pub category: Option<String>,
    pub default_title: String,
    pub default_start_time: String,
    pub default_end_time: String,
    pub default_color: Option<String>,
    pub sort_order: i64,
    pub active: bool,
}

#[derive(Debug, Clone)]
pub struct ResponseRow {
    pub id: String,
    pub user_id: String,
    pub timeline_id: String,
    pub question_id: String,
    pub answer: bool,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct EmailTemplateRow {
    pub id: String,
    pub name: String,
    pub subject: String,
    pub body: String,
    pub updated_at: String,
}

#[derive(Debug, Clone)]
pub struct SettingRow {
    pub key: String,
    pub value: String,
    pub updated_at: String,
}

#[derive(Debug, Clone)]
pub struct ShareTokenRow {
    pub id: String,
    pub timeline_id: String,
    pub token: String,
    pub created_at: String,
}

/// User joined with timeline count, for the admin listing.
#[derive(Debug, Clone)]
pub struct AdminUserRow {
    pub user: UserRow,
    pub timeline_count: i64,
}
