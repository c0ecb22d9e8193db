use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use vowline_db::queries::NewEvent;
use vowline_types::api::{
    ApplyTemplateRequest, Claims, TemplateDetailResponse, TemplateSummary,
};

use crate::auth::AppState;
use crate::blocking;
use crate::convert;
use crate::error::ApiErr;
use crate::timelines::load_owned_timeline;

pub async fn list_templates(State(state): State<AppState>) -> Result<impl IntoResponse, ApiErr> {
    let templates = blocking(&state, move |s| {
        Ok(s
            .db
            .list_templates_with_counts()
            .map_err(ApiErr::from_db("list templates"))?
            .into_iter()
            .map(|row| TemplateSummary {
                template: convert::template(row.template),
                event_count: row.event_count,
            })
            .collect::<Vec<_>>())
    })
    .await?;

    Ok(Json(templates))
}

pub async fn get_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiErr> {
    let detail = blocking(&state, move |s| {
        let template =
            s.db.get_template(&id.to_string())
                .map_err(ApiErr::from_db("load template"))?
                .ok_or_else(|| ApiErr::not_found("template not found"))?;
        let events =
            s.db.list_template_events(&template.id)
                .map_err(ApiErr::from_db("list template events"))?;

        Ok(TemplateDetailResponse {
            template: convert::template(template),
            events: events.into_iter().map(convert::template_event).collect(),
        })
    })
    .await?;

    Ok(Json(detail))
}

/// Copy every event of a template into the timeline as fresh blocks.
/// Existing blocks are left untouched; the caller gets the copies back.
pub async fn apply_template(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(req): Json<ApplyTemplateRequest>,
) -> Result<impl IntoResponse, ApiErr> {
    let created = blocking(&state, move |s| {
        let timeline = load_owned_timeline(s, claims.sub, id)?;
        let window = convert::day_window(&timeline)?;

        let template =
            s.db.get_template(&req.template_id.to_string())
                .map_err(ApiErr::from_db("load template"))?
                .ok_or_else(|| ApiErr::not_found("template not found"))?;
        let source =
            s.db.list_template_events(&template.id)
                .map_err(ApiErr::from_db("list template events"))?;

        let ids: Vec<String> = source.iter().map(|_| Uuid::new_v4().to_string()).collect();
        let batch: Vec<NewEvent<'_>> = source
            .iter()
            .zip(&ids)
            .map(|(event, event_id)| NewEvent {
                id: event_id.as_str(),
                title: &event.title,
                start_time: &event.start_time,
                end_time: &event.end_time,
                category: event.category.as_deref(),
                color: event.color.as_deref(),
                notes: event.notes.as_deref(),
            })
            .collect();
        s.db.create_events(&timeline.id, &batch)
            .map_err(ApiErr::from_db("apply template"))?;

        let mut created = Vec::with_capacity(ids.len());
        for event_id in &ids {
            let row =
                s.db.get_event(event_id)
                    .map_err(ApiErr::from_db("load event"))?
                    .ok_or_else(|| ApiErr::internal("internal server error"))?;
            created.push(convert::event(row, &window));
        }
        Ok(created)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(created)))
}
