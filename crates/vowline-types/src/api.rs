use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{QuestionResponse, Restriction, Template, TemplateEvent, Timeline, User};

// -- JWT Claims --

/// Session claims shared between the REST middleware and the login/register
/// handlers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Returned by both register and login. The token also travels in the
/// `vowline_session` cookie; the body copy is for non-browser clients.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}

// -- Timelines --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateTimelineRequest {
    pub name: String,
    pub wedding_date: String,
    pub day_start_hour: Option<u8>,
    pub day_end_hour: Option<u8>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateTimelineRequest {
    pub name: Option<String>,
    pub wedding_date: Option<String>,
    pub day_start_hour: Option<u8>,
    pub day_end_hour: Option<u8>,
}

#[derive(Debug, Serialize)]
pub struct TimelineDetailResponse {
    pub timeline: Timeline,
    pub events: Vec<EventResponse>,
    pub restrictions: Vec<Restriction>,
}

// -- Events --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateEventRequest {
    pub title: String,
    pub start_time: String,
    pub end_time: String,
    pub category: Option<String>,
    pub color: Option<String>,
    pub notes: Option<String>,
}

/// Partial update; absent fields stay untouched. Drag-and-drop in a client
/// lands here as a times-only update.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub category: Option<String>,
    pub color: Option<String>,
    pub notes: Option<String>,
}

/// An event plus its render-ready percentage offsets within the timeline's
/// day window.
#[derive(Debug, Clone, Serialize)]
pub struct EventResponse {
    pub id: Uuid,
    pub timeline_id: Uuid,
    pub title: String,
    pub start_time: String,
    pub end_time: String,
    pub category: Option<String>,
    pub color: Option<String>,
    pub notes: Option<String>,
    pub position: String,
    pub width: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

// -- Restrictions --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateRestrictionRequest {
    pub name: String,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateRestrictionRequest {
    pub name: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

// -- Conflicts --

#[derive(Debug, Serialize)]
pub struct ConflictReport {
    pub event_overlaps: Vec<EventOverlap>,
    pub restriction_hits: Vec<RestrictionHit>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct EventOverlap {
    pub event_id: Uuid,
    pub other_event_id: Uuid,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct RestrictionHit {
    pub event_id: Uuid,
    pub restriction_id: Uuid,
}

// -- Templates --

#[derive(Debug, Serialize)]
pub struct TemplateSummary {
    #[serde(flatten)]
    pub template: Template,
    pub event_count: i64,
}

#[derive(Debug, Serialize)]
pub struct TemplateDetailResponse {
    pub template: Template,
    pub events: Vec<TemplateEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApplyTemplateRequest {
    pub template_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateTemplateRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateTemplateRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateTemplateEventRequest {
    pub title: String,
    pub start_time: String,
    pub end_time: String,
    pub category: Option<String>,
    pub color: Option<String>,
    pub notes: Option<String>,
    pub sort_order: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateTemplateEventRequest {
    pub title: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub category: Option<String>,
    pub color: Option<String>,
    pub notes: Option<String>,
    pub sort_order: Option<i64>,
}

// -- Guided questionnaire --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnswerRequest {
    pub answer: bool,
}

/// The recorded response, plus the block auto-generated by a first "yes".
#[derive(Debug, Serialize)]
pub struct AnswerResponse {
    pub response: QuestionResponse,
    pub generated_event: Option<EventResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateQuestionRequest {
    pub prompt: String,
    pub category: Option<String>,
    pub default_title: String,
    pub default_start_time: String,
    pub default_end_time: String,
    pub default_color: Option<String>,
    pub sort_order: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateQuestionRequest {
    pub prompt: Option<String>,
    pub category: Option<String>,
    pub default_title: Option<String>,
    pub default_start_time: Option<String>,
    pub default_end_time: Option<String>,
    pub default_color: Option<String>,
    pub sort_order: Option<i64>,
    pub active: Option<bool>,
}

// -- Sharing --

/// One read-only share link. `url` is ready to paste; the token alone is
/// enough to resolve the timeline.
#[derive(Debug, Serialize)]
pub struct ShareLinkResponse {
    pub id: Uuid,
    pub token: String,
    pub url: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

// -- Admin --

#[derive(Debug, Serialize)]
pub struct AdminUserSummary {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub is_admin: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub timeline_count: i64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateUserRequest {
    pub is_admin: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateEmailTemplateRequest {
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateSettingRequest {
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_event_request_accepts_sparse_bodies() {
        let req: UpdateEventRequest =
            serde_json::from_str(r#"{"start_time":"14:00","end_time":"15:00"}"#).unwrap();
        assert_eq!(req.start_time.as_deref(), Some("14:00"));
        assert!(req.title.is_none());
        assert!(req.notes.is_none());
    }

    #[test]
    fn register_request_rejects_unknown_fields() {
        let result = serde_json::from_str::<RegisterRequest>(
            r#"{"username":"a","email":"a@b.c","password":"x","is_admin":true}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn template_summary_flattens_template_fields() {
        let summary = TemplateSummary {
            template: crate::models::Template {
                id: Uuid::nil(),
                name: "Classic full day".into(),
                description: None,
                created_at: Default::default(),
                updated_at: Default::default(),
            },
            event_count: 7,
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["name"], "Classic full day");
        assert_eq!(json["event_count"], 7);
    }
}
