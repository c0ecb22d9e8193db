use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::NaiveDate;
use tracing::warn;
use uuid::Uuid;

use vowline_db::models::{EventRow, RestrictionRow, TimelineRow};
use vowline_schedule::{DayWindow, TimedSpan, event_conflicts, parse_hhmm, restriction_conflicts};
use vowline_types::api::{
    Claims, ConflictReport, CreateTimelineRequest, EventOverlap, RestrictionHit,
    TimelineDetailResponse, UpdateTimelineRequest,
};

use crate::auth::{AppState, AppStateInner};
use crate::blocking;
use crate::convert;
use crate::error::ApiErr;

const FALLBACK_START_HOUR: u8 = 6;
const FALLBACK_END_HOUR: u8 = 24;

pub async fn list_timelines(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiErr> {
    let rows = blocking(&state, move |s| {
        s.db.list_timelines_for_user(&claims.sub.to_string())
            .map_err(ApiErr::from_db("list timelines"))
    })
    .await?;

    Ok(Json(
        rows.into_iter().map(convert::timeline).collect::<Vec<_>>(),
    ))
}

pub async fn create_timeline(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateTimelineRequest>,
) -> Result<impl IntoResponse, ApiErr> {
    let name = req.name.trim().to_string();
    if name.is_empty() {
        return Err(ApiErr::bad_request("name must not be empty"));
    }
    let wedding_date = validate_date(&req.wedding_date)?;

    let row = blocking(&state, move |s| {
        let start_hour = match req.day_start_hour {
            Some(hour) => hour,
            None => default_hour(s, "default_day_start_hour", FALLBACK_START_HOUR)?,
        };
        let end_hour = match req.day_end_hour {
            Some(hour) => hour,
            None => default_hour(s, "default_day_end_hour", FALLBACK_END_HOUR)?,
        };
        DayWindow::from_hours(start_hour, end_hour)
            .map_err(|e| ApiErr::bad_request(e.to_string()))?;

        let id = Uuid::new_v4().to_string();
        s.db.create_timeline(
            &id,
            &claims.sub.to_string(),
            &name,
            &wedding_date,
            i64::from(start_hour),
            i64::from(end_hour),
        )
        .map_err(ApiErr::from_db("create timeline"))?;

        s.db.get_timeline(&id)
            .map_err(ApiErr::from_db("load timeline"))?
            .ok_or_else(|| ApiErr::internal("internal server error"))
    })
    .await?;

    Ok((StatusCode::CREATED, Json(convert::timeline(row))))
}

pub async fn get_timeline(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiErr> {
    let detail = blocking(&state, move |s| {
        let row = load_owned_timeline(s, claims.sub, id)?;
        timeline_detail(s, row)
    })
    .await?;

    Ok(Json(detail))
}

pub async fn update_timeline(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTimelineRequest>,
) -> Result<impl IntoResponse, ApiErr> {
    let row = blocking(&state, move |s| {
        let row = load_owned_timeline(s, claims.sub, id)?;

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
        let wedding_date = match req.wedding_date {
            Some(date) => validate_date(&date)?,
            None => row.wedding_date.clone(),
        };
        let start_hour = req
            .day_start_hour
            .map(i64::from)
            .unwrap_or(row.day_start_hour);
        let end_hour = req.day_end_hour.map(i64::from).unwrap_or(row.day_end_hour);
        validate_window(start_hour, end_hour)?;

        s.db.update_timeline(&row.id, &name, &wedding_date, start_hour, end_hour)
            .map_err(ApiErr::from_db("update timeline"))?;

        s.db.get_timeline(&row.id)
            .map_err(ApiErr::from_db("load timeline"))?
            .ok_or_else(|| ApiErr::internal("internal server error"))
    })
    .await?;

    Ok(Json(convert::timeline(row)))
}

pub async fn delete_timeline(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiErr> {
    blocking(&state, move |s| {
        let row = load_owned_timeline(s, claims.sub, id)?;
        s.db.delete_timeline(&row.id)
            .map_err(ApiErr::from_db("delete timeline"))?;
        Ok(())
    })
    .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Overlap warnings for the editor. Purely informational: writes are never
/// rejected for overlapping, the UI renders these as badges.
pub async fn get_conflicts(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiErr> {
    let report = blocking(&state, move |s| {
        let row = load_owned_timeline(s, claims.sub, id)?;
        let events =
            s.db.list_events(&row.id)
                .map_err(ApiErr::from_db("list events"))?;
        let restrictions =
            s.db.list_restrictions(&row.id)
                .map_err(ApiErr::from_db("list restrictions"))?;
        Ok(conflict_report(&events, &restrictions))
    })
    .await?;

    Ok(Json(report))
}

// -- Helpers shared across handler modules --

/// Fetch a timeline owned by `user_id`. Foreign timelines are reported as
/// missing, not as forbidden, so ids can't be probed.
pub(crate) fn load_owned_timeline(
    s: &AppStateInner,
    user_id: Uuid,
    timeline_id: Uuid,
) -> Result<TimelineRow, ApiErr> {
    let row =
        s.db.get_timeline(&timeline_id.to_string())
            .map_err(ApiErr::from_db("load timeline"))?
            .ok_or_else(|| ApiErr::not_found("timeline not found"))?;

    if row.user_id != user_id.to_string() {
        return Err(ApiErr::not_found("timeline not found"));
    }
    Ok(row)
}

/// The timeline plus its render-ready events and restrictions. Also backs
/// the public share view.
pub(crate) fn timeline_detail(
    s: &AppStateInner,
    row: TimelineRow,
) -> Result<TimelineDetailResponse, ApiErr> {
    let window = convert::day_window(&row)?;

    let events =
        s.db.list_events(&row.id)
            .map_err(ApiErr::from_db("list events"))?
            .into_iter()
            .map(|event| convert::event(event, &window))
            .collect();
    let restrictions =
        s.db.list_restrictions(&row.id)
            .map_err(ApiErr::from_db("list restrictions"))?
            .into_iter()
            .map(convert::restriction)
            .collect();

    Ok(TimelineDetailResponse {
        timeline: convert::timeline(row),
        events,
        restrictions,
    })
}

pub(crate) fn validate_date(raw: &str) -> Result<String, ApiErr> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| ApiErr::bad_request("wedding_date must be YYYY-MM-DD"))?;
    Ok(raw.to_string())
}

fn validate_window(start_hour: i64, end_hour: i64) -> Result<(), ApiErr> {
    u8::try_from(start_hour)
        .ok()
        .zip(u8::try_from(end_hour).ok())
        .ok_or_else(|| ApiErr::bad_request("day window hours must be within 0..=24"))
        .and_then(|(start, end)| {
            DayWindow::from_hours(start, end).map_err(|e| ApiErr::bad_request(e.to_string()))
        })?;
    Ok(())
}

fn default_hour(s: &AppStateInner, key: &str, fallback: u8) -> Result<u8, ApiErr> {
    Ok(s.db
        .get_setting(key)
        .map_err(ApiErr::from_db("load settings"))?
        .and_then(|row| row.value.parse::<u8>().ok())
        .filter(|hour| *hour <= 24)
        .unwrap_or(fallback))
}

fn conflict_report(events: &[EventRow], restrictions: &[RestrictionRow]) -> ConflictReport {
    let event_spans: Vec<TimedSpan<Uuid>> = events
        .iter()
        .filter_map(|row| span(&row.id, &row.start_time, &row.end_time, "event"))
        .collect();
    let restriction_spans: Vec<TimedSpan<Uuid>> = restrictions
        .iter()
        .filter_map(|row| span(&row.id, &row.start_time, &row.end_time, "restriction"))
        .collect();

    let event_overlaps = event_conflicts(&event_spans)
        .into_iter()
        .map(|(event_id, other_event_id)| EventOverlap {
            event_id,
            other_event_id,
        })
        .collect();
    let restriction_hits = restriction_conflicts(&event_spans, &restriction_spans)
        .into_iter()
        .map(|(event_id, restriction_id)| RestrictionHit {
            event_id,
            restriction_id,
        })
        .collect();

    ConflictReport {
        event_overlaps,
        restriction_hits,
    }
}

fn span(id: &str, start: &str, end: &str, what: &str) -> Option<TimedSpan<Uuid>> {
    match (parse_hhmm(start), parse_hhmm(end)) {
        (Ok(start), Ok(end)) => Some(TimedSpan::new(convert::parse_id(id, what), start, end)),
        _ => {
            warn!("Skipping {what} '{id}' with corrupt times in conflict check");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event_row(id: &str, start: &str, end: &str) -> EventRow {
        EventRow {
            id: id.to_string(),
            timeline_id: "11111111-1111-1111-1111-111111111111".to_string(),
            title: "Block".to_string(),
            start_time: start.to_string(),
            end_time: end.to_string(),
            category: None,
            color: None,
            notes: None,
            created_at: "2026-01-01 00:00:00".to_string(),
            updated_at: "2026-01-01 00:00:00".to_string(),
        }
    }

    fn restriction_row(id: &str, start: &str, end: &str) -> RestrictionRow {
        RestrictionRow {
            id: id.to_string(),
            timeline_id: "11111111-1111-1111-1111-111111111111".to_string(),
            name: "Blocked".to_string(),
            start_time: start.to_string(),
            end_time: end.to_string(),
            created_at: "2026-01-01 00:00:00".to_string(),
        }
    }

    const A: &str = "aaaaaaaa-aaaa-aaaa-aaaa-aaaaaaaaaaaa";
    const B: &str = "bbbbbbbb-bbbb-bbbb-bbbb-bbbbbbbbbbbb";
    const R: &str = "cccccccc-cccc-cccc-cccc-cccccccccccc";

    #[test]
    fn overlapping_events_are_reported_once() {
        let events = [event_row(A, "10:00", "12:00"), event_row(B, "11:00", "13:00")];
        let report = conflict_report(&events, &[]);

        assert_eq!(report.event_overlaps.len(), 1);
        assert_eq!(report.event_overlaps[0].event_id, A.parse::<Uuid>().unwrap());
        assert_eq!(report.event_overlaps[0].other_event_id, B.parse::<Uuid>().unwrap());
    }

    #[test]
    fn touching_events_do_not_conflict() {
        let events = [event_row(A, "10:00", "12:00"), event_row(B, "12:00", "13:00")];
        let report = conflict_report(&events, &[]);
        assert!(report.event_overlaps.is_empty());
    }

    #[test]
    fn events_inside_restrictions_are_flagged() {
        let events = [event_row(A, "21:30", "23:00")];
        let restrictions = [restriction_row(R, "22:00", "24:00")];
        let report = conflict_report(&events, &restrictions);

        assert_eq!(report.restriction_hits.len(), 1);
        assert_eq!(report.restriction_hits[0].event_id, A.parse::<Uuid>().unwrap());
        assert_eq!(report.restriction_hits[0].restriction_id, R.parse::<Uuid>().unwrap());
    }

    #[test]
    fn corrupt_rows_are_skipped_not_fatal() {
        let events = [event_row(A, "bad", "12:00"), event_row(B, "11:00", "13:00")];
        let report = conflict_report(&events, &[]);
        assert!(report.event_overlaps.is_empty());
    }

    #[test]
    fn dates_must_be_iso() {
        assert!(validate_date("2026-09-12").is_ok());
        assert!(validate_date("12/09/2026").is_err());
        assert!(validate_date("2026-13-01").is_err());
    }

    #[test]
    fn windows_must_be_ordered_and_in_range() {
        assert!(validate_window(6, 24).is_ok());
        assert!(validate_window(10, 10).is_err());
        assert!(validate_window(12, 6).is_err());
        assert!(validate_window(0, 25).is_err());
        assert!(validate_window(-1, 12).is_err());
    }
}
