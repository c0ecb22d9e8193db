use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use vowline_db::models::TimelineRow;
use vowline_types::api::Claims;

use crate::auth::{AppState, AppStateInner};
use crate::blocking;
use crate::convert;
use crate::error::ApiErr;
use crate::timelines::{load_owned_timeline, timeline_detail};
use crate::tokens::generate_token;

pub async fn create_share(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiErr> {
    let base_url = state.base_url.clone();
    let link = blocking(&state, move |s| {
        let timeline = load_owned_timeline(s, claims.sub, id)?;

        let share_id = Uuid::new_v4().to_string();
        let token = generate_token();
        s.db.create_share_token(&share_id, &timeline.id, &token)
            .map_err(ApiErr::from_db("create share token"))?;

        let row =
            s.db.get_share_token(&token)
                .map_err(ApiErr::from_db("load share token"))?
                .ok_or_else(|| ApiErr::internal("internal server error"))?;
        Ok(convert::share_link(row, &base_url))
    })
    .await?;

    Ok((StatusCode::CREATED, Json(link)))
}

pub async fn list_shares(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiErr> {
    let base_url = state.base_url.clone();
    let links = blocking(&state, move |s| {
        let timeline = load_owned_timeline(s, claims.sub, id)?;
        Ok(s
            .db
            .list_share_tokens(&timeline.id)
            .map_err(ApiErr::from_db("list share tokens"))?
            .into_iter()
            .map(|row| convert::share_link(row, &base_url))
            .collect::<Vec<_>>())
    })
    .await?;

    Ok(Json(links))
}

pub async fn revoke_share(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((id, share_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiErr> {
    blocking(&state, move |s| {
        let timeline = load_owned_timeline(s, claims.sub, id)?;
        if !s
            .db
            .delete_share_token(&share_id.to_string(), &timeline.id)
            .map_err(ApiErr::from_db("revoke share token"))?
        {
            return Err(ApiErr::not_found("share link not found"));
        }
        Ok(())
    })
    .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Public read-only view. Knowing the token is the whole authorization.
pub async fn shared_timeline(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, ApiErr> {
    let detail = blocking(&state, move |s| {
        let timeline = load_shared_timeline(s, &token)?;
        timeline_detail(s, timeline)
    })
    .await?;

    Ok(Json(detail))
}

/// Resolve a share token to its timeline row. Used by the JSON view and the
/// printable HTML page.
pub(crate) fn load_shared_timeline(
    s: &AppStateInner,
    token: &str,
) -> Result<TimelineRow, ApiErr> {
    let share =
        s.db.get_share_token(token)
            .map_err(ApiErr::from_db("look up share token"))?
            .ok_or_else(|| ApiErr::not_found("share link not found"))?;

    s.db.get_timeline(&share.timeline_id)
        .map_err(ApiErr::from_db("load timeline"))?
        .ok_or_else(|| ApiErr::not_found("share link not found"))
}
