//! Admin-only handlers. Everything here sits behind `require_admin`, so the
//! request extension always carries a verified admin's claims.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use vowline_db::models::TemplateEventRow;
use vowline_db::queries::{NewQuestion, NewTemplateEvent};
use vowline_types::api::{
    Claims, CreateQuestionRequest, CreateTemplateEventRequest, CreateTemplateRequest,
    UpdateEmailTemplateRequest, UpdateQuestionRequest, UpdateSettingRequest,
    UpdateTemplateEventRequest, UpdateTemplateRequest, UpdateUserRequest,
};

use crate::auth::{AppState, AppStateInner};
use crate::blocking;
use crate::convert;
use crate::error::ApiErr;
use crate::events::validate_time_range;

// -- Users --

pub async fn list_users(State(state): State<AppState>) -> Result<impl IntoResponse, ApiErr> {
    let users = blocking(&state, move |s| {
        Ok(s
            .db
            .list_users_with_counts()
            .map_err(ApiErr::from_db("list users"))?
            .into_iter()
            .map(convert::admin_user)
            .collect::<Vec<_>>())
    })
    .await?;

    Ok(Json(users))
}

pub async fn update_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, ApiErr> {
    if claims.sub == id && !req.is_admin {
        return Err(ApiErr::bad_request("cannot remove your own admin access"));
    }

    let summary = blocking(&state, move |s| {
        let user_id = id.to_string();
        if !s
            .db
            .set_user_admin(&user_id, req.is_admin)
            .map_err(ApiErr::from_db("update user"))?
        {
            return Err(ApiErr::not_found("user not found"));
        }

        s.db.list_users_with_counts()
            .map_err(ApiErr::from_db("load user"))?
            .into_iter()
            .find(|row| row.user.id == user_id)
            .map(convert::admin_user)
            .ok_or_else(|| ApiErr::internal("internal server error"))
    })
    .await?;

    Ok(Json(summary))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiErr> {
    if claims.sub == id {
        return Err(ApiErr::bad_request("cannot delete your own account"));
    }

    blocking(&state, move |s| {
        if !s
            .db
            .delete_user(&id.to_string())
            .map_err(ApiErr::from_db("delete user"))?
        {
            return Err(ApiErr::not_found("user not found"));
        }
        Ok(())
    })
    .await?;

    Ok(StatusCode::NO_CONTENT)
}

// -- Templates --

pub async fn create_template(
    State(state): State<AppState>,
    Json(req): Json<CreateTemplateRequest>,
) -> Result<impl IntoResponse, ApiErr> {
    let name = req.name.trim().to_string();
    if name.is_empty() {
        return Err(ApiErr::bad_request("name must not be empty"));
    }

    let row = blocking(&state, move |s| {
        let template_id = Uuid::new_v4().to_string();
        s.db.create_template(&template_id, &name, req.description.as_deref())
            .map_err(ApiErr::from_db("create template"))?;

        s.db.get_template(&template_id)
            .map_err(ApiErr::from_db("load template"))?
            .ok_or_else(|| ApiErr::internal("internal server error"))
    })
    .await?;

    Ok((StatusCode::CREATED, Json(convert::template(row))))
}

pub async fn update_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTemplateRequest>,
) -> Result<impl IntoResponse, ApiErr> {
    let row = blocking(&state, move |s| {
        let row = load_template(s, id)?;

        let name = match req.name {
            Some(name) => {
                let name = name.trim().to_string();
                if name.is_empty() {
                    return Err(ApiErr::bad_request("name must not be empty"));
                }
                name
            }
            None => row.name.clone(),
        };
        let description = req.description.or_else(|| row.description.clone());

        s.db.update_template(&row.id, &name, description.as_deref())
            .map_err(ApiErr::from_db("update template"))?;

        s.db.get_template(&row.id)
            .map_err(ApiErr::from_db("load template"))?
            .ok_or_else(|| ApiErr::internal("internal server error"))
    })
    .await?;

    Ok(Json(convert::template(row)))
}

pub async fn delete_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiErr> {
    blocking(&state, move |s| {
        if !s
            .db
            .delete_template(&id.to_string())
            .map_err(ApiErr::from_db("delete template"))?
        {
            return Err(ApiErr::not_found("template not found"));
        }
        Ok(())
    })
    .await?;

    Ok(StatusCode::NO_CONTENT)
}

// -- Template events --

pub async fn create_template_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<CreateTemplateEventRequest>,
) -> Result<impl IntoResponse, ApiErr> {
    let title = req.title.trim().to_string();
    if title.is_empty() {
        return Err(ApiErr::bad_request("title must not be empty"));
    }
    validate_time_range(&req.start_time, &req.end_time)?;

    let row = blocking(&state, move |s| {
        let template = load_template(s, id)?;

        let sort_order = match req.sort_order {
            Some(sort_order) => sort_order,
            None => {
                let existing =
                    s.db.list_template_events(&template.id)
                        .map_err(ApiErr::from_db("list template events"))?;
                next_sort_order(existing.iter().map(|row| row.sort_order))
            }
        };

        let event_id = Uuid::new_v4().to_string();
        s.db.create_template_event(
            &template.id,
            &NewTemplateEvent {
                id: &event_id,
                title: &title,
                start_time: &req.start_time,
                end_time: &req.end_time,
                category: req.category.as_deref(),
                color: req.color.as_deref(),
                notes: req.notes.as_deref(),
                sort_order,
            },
        )
        .map_err(ApiErr::from_db("create template event"))?;

        s.db.get_template_event(&event_id)
            .map_err(ApiErr::from_db("load template event"))?
            .ok_or_else(|| ApiErr::internal("internal server error"))
    })
    .await?;

    Ok((StatusCode::CREATED, Json(convert::template_event(row))))
}

pub async fn update_template_event(
    State(state): State<AppState>,
    Path((id, event_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<UpdateTemplateEventRequest>,
) -> Result<impl IntoResponse, ApiErr> {
    let row = blocking(&state, move |s| {
        let template = load_template(s, id)?;
        let row = load_template_event(s, &template.id, event_id)?;

        let title = match req.title {
            Some(title) => {
                let title = title.trim().to_string();
                if title.is_empty() {
                    return Err(ApiErr::bad_request("title must not be empty"));
                }
                title
            }
            None => row.title.clone(),
        };
        let start_time = req.start_time.unwrap_or_else(|| row.start_time.clone());
        let end_time = req.end_time.unwrap_or_else(|| row.end_time.clone());
        validate_time_range(&start_time, &end_time)?;

        let category = req.category.or_else(|| row.category.clone());
        let color = req.color.or_else(|| row.color.clone());
        let notes = req.notes.or_else(|| row.notes.clone());
        let sort_order = req.sort_order.unwrap_or(row.sort_order);

        s.db.update_template_event(
            &row.id,
            &NewTemplateEvent {
                id: &row.id,
                title: &title,
                start_time: &start_time,
                end_time: &end_time,
                category: category.as_deref(),
                color: color.as_deref(),
                notes: notes.as_deref(),
                sort_order,
            },
        )
        .map_err(ApiErr::from_db("update template event"))?;

        s.db.get_template_event(&row.id)
            .map_err(ApiErr::from_db("load template event"))?
            .ok_or_else(|| ApiErr::internal("internal server error"))
    })
    .await?;

    Ok(Json(convert::template_event(row)))
}

pub async fn delete_template_event(
    State(state): State<AppState>,
    Path((id, event_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiErr> {
    blocking(&state, move |s| {
        let template = load_template(s, id)?;
        let row = load_template_event(s, &template.id, event_id)?;
        s.db.delete_template_event(&row.id)
            .map_err(ApiErr::from_db("delete template event"))?;
        Ok(())
    })
    .await?;

    Ok(StatusCode::NO_CONTENT)
}

// -- Questions --

pub async fn list_questions(State(state): State<AppState>) -> Result<impl IntoResponse, ApiErr> {
    let questions = blocking(&state, move |s| {
        Ok(s
            .db
            .list_questions()
            .map_err(ApiErr::from_db("list questions"))?
            .into_iter()
            .map(convert::question)
            .collect::<Vec<_>>())
    })
    .await?;

    Ok(Json(questions))
}

pub async fn create_question(
    State(state): State<AppState>,
    Json(req): Json<CreateQuestionRequest>,
) -> Result<impl IntoResponse, ApiErr> {
    let prompt = req.prompt.trim().to_string();
    if prompt.is_empty() {
        return Err(ApiErr::bad_request("prompt must not be empty"));
    }
    let default_title = req.default_title.trim().to_string();
    if default_title.is_empty() {
        return Err(ApiErr::bad_request("default_title must not be empty"));
    }
    validate_time_range(&req.default_start_time, &req.default_end_time)?;

    let row = blocking(&state, move |s| {
        let sort_order = match req.sort_order {
            Some(sort_order) => sort_order,
            None => {
                let existing =
                    s.db.list_questions()
                        .map_err(ApiErr::from_db("list questions"))?;
                next_sort_order(existing.iter().map(|row| row.sort_order))
            }
        };

        let question_id = Uuid::new_v4().to_string();
        s.db.create_question(&NewQuestion {
            id: &question_id,
            prompt: &prompt,
            category: req.category.as_deref(),
            default_title: &default_title,
            default_start_time: &req.default_start_time,
            default_end_time: &req.default_end_time,
            default_color: req.default_color.as_deref(),
            sort_order,
            active: true,
        })
        .map_err(ApiErr::from_db("create question"))?;

        s.db.get_question(&question_id)
            .map_err(ApiErr::from_db("load question"))?
            .ok_or_else(|| ApiErr::internal("internal server error"))
    })
    .await?;

    Ok((StatusCode::CREATED, Json(convert::question(row))))
}

pub async fn update_question(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateQuestionRequest>,
) -> Result<impl IntoResponse, ApiErr> {
    let row = blocking(&state, move |s| {
        let row =
            s.db.get_question(&id.to_string())
                .map_err(ApiErr::from_db("load question"))?
                .ok_or_else(|| ApiErr::not_found("question not found"))?;

        let prompt = match req.prompt {
            Some(prompt) => {
                let prompt = prompt.trim().to_string();
                if prompt.is_empty() {
                    return Err(ApiErr::bad_request("prompt must not be empty"));
                }
                prompt
            }
            None => row.prompt.clone(),
        };
        let default_title = match req.default_title {
            Some(title) => {
                let title = title.trim().to_string();
                if title.is_empty() {
                    return Err(ApiErr::bad_request("default_title must not be empty"));
                }
                title
            }
            None => row.default_title.clone(),
        };
        let default_start_time = req
            .default_start_time
            .unwrap_or_else(|| row.default_start_time.clone());
        let default_end_time = req
            .default_end_time
            .unwrap_or_else(|| row.default_end_time.clone());
        validate_time_range(&default_start_time, &default_end_time)?;

        let category = req.category.or_else(|| row.category.clone());
        let default_color = req.default_color.or_else(|| row.default_color.clone());
        let sort_order = req.sort_order.unwrap_or(row.sort_order);
        let active = req.active.unwrap_or(row.active);

        s.db.update_question(&NewQuestion {
            id: &row.id,
            prompt: &prompt,
            category: category.as_deref(),
            default_title: &default_title,
            default_start_time: &default_start_time,
            default_end_time: &default_end_time,
            default_color: default_color.as_deref(),
            sort_order,
            active,
        })
        .map_err(ApiErr::from_db("update question"))?;

        s.db.get_question(&row.id)
            .map_err(ApiErr::from_db("load question"))?
            .ok_or_else(|| ApiErr::internal("internal server error"))
    })
    .await?;

    Ok(Json(convert::question(row)))
}

pub async fn delete_question(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiErr> {
    blocking(&state, move |s| {
        if !s
            .db
            .delete_question(&id.to_string())
            .map_err(ApiErr::from_db("delete question"))?
        {
            return Err(ApiErr::not_found("question not found"));
        }
        Ok(())
    })
    .await?;

    Ok(StatusCode::NO_CONTENT)
}

// -- Email templates --

pub async fn list_email_templates(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiErr> {
    let templates = blocking(&state, move |s| {
        Ok(s
            .db
            .list_email_templates()
            .map_err(ApiErr::from_db("list email templates"))?
            .into_iter()
            .map(convert::email_template)
            .collect::<Vec<_>>())
    })
    .await?;

    Ok(Json(templates))
}

pub async fn get_email_template(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiErr> {
    let row = blocking(&state, move |s| {
        s.db.get_email_template(&name)
            .map_err(ApiErr::from_db("load email template"))?
            .ok_or_else(|| ApiErr::not_found("email template not found"))
    })
    .await?;

    Ok(Json(convert::email_template(row)))
}

/// Templates are seeded by migration; editing is limited to subject and body.
pub async fn update_email_template(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(req): Json<UpdateEmailTemplateRequest>,
) -> Result<impl IntoResponse, ApiErr> {
    let row = blocking(&state, move |s| {
        if !s
            .db
            .update_email_template(&name, &req.subject, &req.body)
            .map_err(ApiErr::from_db("update email template"))?
        {
            return Err(ApiErr::not_found("email template not found"));
        }

        s.db.get_email_template(&name)
            .map_err(ApiErr::from_db("load email template"))?
            .ok_or_else(|| ApiErr::internal("internal server error"))
    })
    .await?;

    Ok(Json(convert::email_template(row)))
}

// -- Settings --

pub async fn list_settings(State(state): State<AppState>) -> Result<impl IntoResponse, ApiErr> {
    let settings = blocking(&state, move |s| {
        Ok(s
            .db
            .list_settings()
            .map_err(ApiErr::from_db("list settings"))?
            .into_iter()
            .map(convert::setting)
            .collect::<Vec<_>>())
    })
    .await?;

    Ok(Json(settings))
}

pub async fn update_setting(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(req): Json<UpdateSettingRequest>,
) -> Result<impl IntoResponse, ApiErr> {
    let row = blocking(&state, move |s| {
        s.db.set_setting(&key, &req.value)
            .map_err(ApiErr::from_db("update setting"))?;

        s.db.get_setting(&key)
            .map_err(ApiErr::from_db("load setting"))?
            .ok_or_else(|| ApiErr::internal("internal server error"))
    })
    .await?;

    Ok(Json(convert::setting(row)))
}

// -- Helpers --

fn load_template(
    s: &AppStateInner,
    id: Uuid,
) -> Result<vowline_db::models::TemplateRow, ApiErr> {
    s.db.get_template(&id.to_string())
        .map_err(ApiErr::from_db("load template"))?
        .ok_or_else(|| ApiErr::not_found("template not found"))
}

/// Fetch a template event and confirm it belongs to the given template.
fn load_template_event(
    s: &AppStateInner,
    template_id: &str,
    event_id: Uuid,
) -> Result<TemplateEventRow, ApiErr> {
    let row =
        s.db.get_template_event(&event_id.to_string())
            .map_err(ApiErr::from_db("load template event"))?
            .ok_or_else(|| ApiErr::not_found("template event not found"))?;
    if row.template_id != template_id {
        return Err(ApiErr::not_found("template event not found"));
    }
    Ok(row)
}

/// New rows land at the end of the list, with the same gaps the seeds use.
fn next_sort_order(existing: impl Iterator<Item = i64>) -> i64 {
    existing.max().unwrap_or(0) + 10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_order_starts_at_ten() {
        assert_eq!(next_sort_order(std::iter::empty()), 10);
    }

    #[test]
    fn sort_order_appends_after_the_last_row() {
        assert_eq!(next_sort_order([10, 30, 20].into_iter()), 40);
    }
}
