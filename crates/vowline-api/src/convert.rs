//! Row-to-response conversion. Corrupt rows log a warning and fall back to
//! defaults instead of failing the whole request.

use tracing::warn;
use uuid::Uuid;

use vowline_db::models::{
    AdminUserRow, EmailTemplateRow, EventRow, QuestionRow, ResponseRow, RestrictionRow, SettingRow,
    ShareTokenRow, TemplateEventRow, TemplateRow, TimelineRow, UserRow,
};
use vowline_schedule::{DayWindow, parse_hhmm};
use vowline_types::api::{AdminUserSummary, EventResponse, ShareLinkResponse};
use vowline_types::models::{
    EmailTemplate, Question, QuestionResponse, Restriction, Setting, Template, TemplateEvent,
    Timeline, User, parse_db_date, parse_db_timestamp,
};

use crate::error::ApiErr;

pub(crate) fn parse_id(raw: &str, what: &str) -> Uuid {
    raw.parse().unwrap_or_else(|e| {
        warn!("Corrupt {} id '{}': {}", what, raw, e);
        Uuid::default()
    })
}

/// The render window of a timeline row. Rows are validated on write, so a
/// failure here means on-disk corruption.
pub(crate) fn day_window(row: &TimelineRow) -> Result<DayWindow, ApiErr> {
    u8::try_from(row.day_start_hour)
        .ok()
        .zip(u8::try_from(row.day_end_hour).ok())
        .and_then(|(start, end)| DayWindow::from_hours(start, end).ok())
        .ok_or_else(|| {
            tracing::error!(
                "Timeline '{}' has invalid day window {}..{}",
                row.id,
                row.day_start_hour,
                row.day_end_hour
            );
            ApiErr::internal("internal server error")
        })
}

pub(crate) fn user(row: UserRow) -> User {
    User {
        id: parse_id(&row.id, "user"),
        username: row.username,
        email: row.email,
        is_admin: row.is_admin,
        created_at: parse_db_timestamp(&row.created_at),
    }
}

pub(crate) fn admin_user(row: AdminUserRow) -> AdminUserSummary {
    AdminUserSummary {
        id: parse_id(&row.user.id, "user"),
        username: row.user.username,
        email: row.user.email,
        is_admin: row.user.is_admin,
        created_at: parse_db_timestamp(&row.user.created_at),
        timeline_count: row.timeline_count,
    }
}

pub(crate) fn timeline(row: TimelineRow) -> Timeline {
    Timeline {
        id: parse_id(&row.id, "timeline"),
        user_id: parse_id(&row.user_id, "user"),
        name: row.name,
        wedding_date: parse_db_date(&row.wedding_date),
        day_start_hour: row.day_start_hour.clamp(0, 24) as u8,
        day_end_hour: row.day_end_hour.clamp(0, 24) as u8,
        created_at: parse_db_timestamp(&row.created_at),
        updated_at: parse_db_timestamp(&row.updated_at),
    }
}

pub(crate) fn event(row: EventRow, window: &DayWindow) -> EventResponse {
    let (position, width) = match (parse_hhmm(&row.start_time), parse_hhmm(&row.end_time)) {
        (Ok(start), Ok(end)) => (window.position(start), window.width(start, end)),
        _ => {
            warn!(
                "Corrupt times '{}'..'{}' on event '{}'",
                row.start_time, row.end_time, row.id
            );
            ("0%".to_string(), "0%".to_string())
        }
    };

    EventResponse {
        id: parse_id(&row.id, "event"),
        timeline_id: parse_id(&row.timeline_id, "timeline"),
        title: row.title,
        start_time: row.start_time,
        end_time: row.end_time,
        category: row.category,
        color: row.color,
        notes: row.notes,
        position,
        width,
        created_at: parse_db_timestamp(&row.created_at),
        updated_at: parse_db_timestamp(&row.updated_at),
    }
}

pub(crate) fn restriction(row: RestrictionRow) -> Restriction {
    Restriction {
        id: parse_id(&row.id, "restriction"),
        timeline_id: parse_id(&row.timeline_id, "timeline"),
        name: row.name,
        start_time: row.start_time,
        end_time: row.end_time,
        created_at: parse_db_timestamp(&row.created_at),
    }
}

pub(crate) fn template(row: TemplateRow) -> Template {
    Template {
        id: parse_id(&row.id, "template"),
        name: row.name,
        description: row.description,
        created_at: parse_db_timestamp(&row.created_at),
        updated_at: parse_db_timestamp(&row.updated_at),
    }
}

pub(crate) fn template_event(row: TemplateEventRow) -> TemplateEvent {
    TemplateEvent {
        id: parse_id(&row.id, "template event"),
        template_id: parse_id(&row.template_id, "template"),
        title: row.title,
        start_time: row.start_time,
        end_time: row.end_time,
        category: row.category,
        color: row.color,
        notes: row.notes,
        sort_order: row.sort_order,
    }
}

pub(crate) fn question(row: QuestionRow) -> Question {
    Question {
        id: parse_id(&row.id, "question"),
        prompt: row.prompt,
        category: row.category,
        default_title: row.default_title,
        default_start_time: row.default_start_time,
        default_end_time: row.default_end_time,
        default_color: row.default_color,
        sort_order: row.sort_order,
        active: row.active,
    }
}

pub(crate) fn response(row: ResponseRow) -> QuestionResponse {
    QuestionResponse {
        id: parse_id(&row.id, "response"),
        user_id: parse_id(&row.user_id, "user"),
        timeline_id: parse_id(&row.timeline_id, "timeline"),
        question_id: parse_id(&row.question_id, "question"),
        answer: row.answer,
        created_at: parse_db_timestamp(&row.created_at),
    }
}

pub(crate) fn email_template(row: EmailTemplateRow) -> EmailTemplate {
    EmailTemplate {
        name: row.name,
        subject: row.subject,
        body: row.body,
        updated_at: parse_db_timestamp(&row.updated_at),
    }
}

pub(crate) fn setting(row: SettingRow) -> Setting {
    Setting {
        key: row.key,
        value: row.value,
        updated_at: parse_db_timestamp(&row.updated_at),
    }
}

pub(crate) fn share_link(row: ShareTokenRow, base_url: &str) -> ShareLinkResponse {
    ShareLinkResponse {
        id: parse_id(&row.id, "share link"),
        url: format!("{}/share/{}", base_url, row.token),
        token: row.token,
        created_at: parse_db_timestamp(&row.created_at),
    }
}
