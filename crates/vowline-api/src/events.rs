use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use vowline_db::models::EventRow;
use vowline_db::queries::NewEvent;
use vowline_schedule::parse_hhmm;
use vowline_types::api::{Claims, CreateEventRequest, UpdateEventRequest};

use crate::auth::{AppState, AppStateInner};
use crate::blocking;
use crate::convert;
use crate::error::ApiErr;
use crate::timelines::load_owned_timeline;

pub async fn list_events(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiErr> {
    let events = blocking(&state, move |s| {
        let timeline = load_owned_timeline(s, claims.sub, id)?;
        let window = convert::day_window(&timeline)?;
        Ok(s
            .db
            .list_events(&timeline.id)
            .map_err(ApiErr::from_db("list events"))?
            .into_iter()
            .map(|row| convert::event(row, &window))
            .collect::<Vec<_>>())
    })
    .await?;

    Ok(Json(events))
}

pub async fn create_event(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(req): Json<CreateEventRequest>,
) -> Result<impl IntoResponse, ApiErr> {
    let title = req.title.trim().to_string();
    if title.is_empty() {
        return Err(ApiErr::bad_request("title must not be empty"));
    }
    validate_time_range(&req.start_time, &req.end_time)?;

    let (row, window) = blocking(&state, move |s| {
        let timeline = load_owned_timeline(s, claims.sub, id)?;
        let window = convert::day_window(&timeline)?;

        let event_id = Uuid::new_v4().to_string();
        s.db.create_event(
            &timeline.id,
            &NewEvent {
                id: &event_id,
                title: &title,
                start_time: &req.start_time,
                end_time: &req.end_time,
                category: req.category.as_deref(),
                color: req.color.as_deref(),
                notes: req.notes.as_deref(),
            },
        )
        .map_err(ApiErr::from_db("create event"))?;

        let row = s
            .db
            .get_event(&event_id)
            .map_err(ApiErr::from_db("load event"))?
            .ok_or_else(|| ApiErr::internal("internal server error"))?;
        Ok((row, window))
    })
    .await?;

    Ok((StatusCode::CREATED, Json(convert::event(row, &window))))
}

/// Partial update; a drag-and-drop client sends just the new times.
pub async fn update_event(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((id, event_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<UpdateEventRequest>,
) -> Result<impl IntoResponse, ApiErr> {
    let (row, window) = blocking(&state, move |s| {
        let timeline = load_owned_timeline(s, claims.sub, id)?;
        let window = convert::day_window(&timeline)?;
        let row = load_timeline_event(s, &timeline.id, event_id)?;

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

        s.db.update_event(
            &row.id,
            &NewEvent {
                id: &row.id,
                title: &title,
                start_time: &start_time,
                end_time: &end_time,
                category: category.as_deref(),
                color: color.as_deref(),
                notes: notes.as_deref(),
            },
        )
        .map_err(ApiErr::from_db("update event"))?;

        let row = s
            .db
            .get_event(&row.id)
            .map_err(ApiErr::from_db("load event"))?
            .ok_or_else(|| ApiErr::internal("internal server error"))?;
        Ok((row, window))
    })
    .await?;

    Ok(Json(convert::event(row, &window)))
}

pub async fn delete_event(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((id, event_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiErr> {
    blocking(&state, move |s| {
        let timeline = load_owned_timeline(s, claims.sub, id)?;
        let row = load_timeline_event(s, &timeline.id, event_id)?;
        s.db.delete_event(&row.id)
            .map_err(ApiErr::from_db("delete event"))?;
        Ok(())
    })
    .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Fetch an event and confirm it belongs to the given timeline.
fn load_timeline_event(
    s: &AppStateInner,
    timeline_id: &str,
    event_id: Uuid,
) -> Result<EventRow, ApiErr> {
    let row =
        s.db.get_event(&event_id.to_string())
            .map_err(ApiErr::from_db("load event"))?
            .ok_or_else(|| ApiErr::not_found("event not found"))?;
    if row.timeline_id != timeline_id {
        return Err(ApiErr::not_found("event not found"));
    }
    Ok(row)
}

/// `HH:MM` parse plus ordering. Overlap with other blocks is deliberately
/// not checked here: double-booking is a warning, not an error.
pub(crate) fn validate_time_range(start: &str, end: &str) -> Result<(), ApiErr> {
    let start_minutes =
        parse_hhmm(start).map_err(|e| ApiErr::bad_request(format!("start_time: {e}")))?;
    let end_minutes = parse_hhmm(end).map_err(|e| ApiErr::bad_request(format!("end_time: {e}")))?;
    if end_minutes <= start_minutes {
        return Err(ApiErr::bad_request("end_time must be after start_time"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_ranges_pass() {
        assert!(validate_time_range("09:00", "17:30").is_ok());
        assert!(validate_time_range("23:00", "24:00").is_ok());
    }

    #[test]
    fn reversed_or_empty_ranges_fail() {
        assert!(validate_time_range("17:00", "09:00").is_err());
        assert!(validate_time_range("12:00", "12:00").is_err());
    }

    #[test]
    fn malformed_times_fail() {
        assert!(validate_time_range("9am", "17:00").is_err());
        assert!(validate_time_range("09:00", "25:00").is_err());
        assert!(validate_time_range("09:60", "10:00").is_err());
    }
}
