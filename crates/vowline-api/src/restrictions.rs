use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use vowline_db::models::RestrictionRow;
use vowline_types::api::{Claims, CreateRestrictionRequest, UpdateRestrictionRequest};

use crate::auth::{AppState, AppStateInner};
use crate::blocking;
use crate::convert;
use crate::error::ApiErr;
use crate::events::validate_time_range;
use crate::timelines::load_owned_timeline;

pub async fn list_restrictions(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiErr> {
    let restrictions = blocking(&state, move |s| {
        let timeline = load_owned_timeline(s, claims.sub, id)?;
        Ok(s
            .db
            .list_restrictions(&timeline.id)
            .map_err(ApiErr::from_db("list restrictions"))?
            .into_iter()
            .map(convert::restriction)
            .collect::<Vec<_>>())
    })
    .await?;

    Ok(Json(restrictions))
}

pub async fn create_restriction(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(req): Json<CreateRestrictionRequest>,
) -> Result<impl IntoResponse, ApiErr> {
    let name = req.name.trim().to_string();
    if name.is_empty() {
        return Err(ApiErr::bad_request("name must not be empty"));
    }
    validate_time_range(&req.start_time, &req.end_time)?;

    let row = blocking(&state, move |s| {
        let timeline = load_owned_timeline(s, claims.sub, id)?;

        let restriction_id = Uuid::new_v4().to_string();
        s.db.create_restriction(
            &restriction_id,
            &timeline.id,
            &name,
            &req.start_time,
            &req.end_time,
        )
        .map_err(ApiErr::from_db("create restriction"))?;

        s.db.get_restriction(&restriction_id)
            .map_err(ApiErr::from_db("load restriction"))?
            .ok_or_else(|| ApiErr::internal("internal server error"))
    })
    .await?;

    Ok((StatusCode::CREATED, Json(convert::restriction(row))))
}

pub async fn update_restriction(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((id, restriction_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<UpdateRestrictionRequest>,
) -> Result<impl IntoResponse, ApiErr> {
    let row = blocking(&state, move |s| {
        let timeline = load_owned_timeline(s, claims.sub, id)?;
        let row = load_timeline_restriction(s, &timeline.id, restriction_id)?;

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
        let start_time = req.start_time.unwrap_or_else(|| row.start_time.clone());
        let end_time = req.end_time.unwrap_or_else(|| row.end_time.clone());
        validate_time_range(&start_time, &end_time)?;

        s.db.update_restriction(&row.id, &name, &start_time, &end_time)
            .map_err(ApiErr::from_db("update restriction"))?;

        s.db.get_restriction(&row.id)
            .map_err(ApiErr::from_db("load restriction"))?
            .ok_or_else(|| ApiErr::internal("internal server error"))
    })
    .await?;

    Ok(Json(convert::restriction(row)))
}

pub async fn delete_restriction(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((id, restriction_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiErr> {
    blocking(&state, move |s| {
        let timeline = load_owned_timeline(s, claims.sub, id)?;
        let row = load_timeline_restriction(s, &timeline.id, restriction_id)?;
        s.db.delete_restriction(&row.id)
            .map_err(ApiErr::from_db("delete restriction"))?;
        Ok(())
    })
    .await?;

    Ok(StatusCode::NO_CONTENT)
}

fn load_timeline_restriction(
    s: &AppStateInner,
    timeline_id: &str,
    restriction_id: Uuid,
) -> Result<RestrictionRow, ApiErr> {
    let row =
        s.db.get_restriction(&restriction_id.to_string())
            .map_err(ApiErr::from_db("load restriction"))?
            .ok_or_else(|| ApiErr::not_found("restriction not found"))?;
    if row.timeline_id != timeline_id {
        return Err(ApiErr::not_found("restriction not found"));
    }
    Ok(row)
}
