use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{DecodingKey, Validation, decode};

use vowline_types::api::Claims;

use crate::auth::{AppState, SESSION_COOKIE};
use crate::blocking;
use crate::error::ApiErr;

/// Validate the session and stash [`Claims`] as a request extension. The
/// `vowline_session` cookie wins; `Authorization: Bearer` is the fallback
/// for non-browser clients.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiErr> {
    let jar = CookieJar::from_headers(req.headers());
    let token = jar
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .or_else(|| {
            req.headers()
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.strip_prefix("Bearer "))
                .map(|v| v.to_string())
        })
        .ok_or_else(|| ApiErr::unauthorized("authentication required"))?;

    let token_data = decode::<Claims>(
        &token,
        &DecodingKey::from_secret(state.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| ApiErr::unauthorized("invalid or expired session"))?;

    req.extensions_mut().insert(token_data.claims);
    Ok(next.run(req).await)
}

/// Gate for `/api/admin`. Re-reads the user row so a revoked admin flag
/// takes effect on the next request, not at the next login.
pub async fn require_admin(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiErr> {
    let claims = req
        .extensions()
        .get::<Claims>()
        .cloned()
        .ok_or_else(|| ApiErr::unauthorized("authentication required"))?;

    let user = blocking(&state, move |s| {
        s.db.get_user_by_id(&claims.sub.to_string())
            .map_err(ApiErr::from_db("load user"))?
            .ok_or_else(|| ApiErr::unauthorized("account no longer exists"))
    })
    .await?;

    if !user.is_admin {
        return Err(ApiErr::forbidden("admin access required"));
    }

    Ok(next.run(req).await)
}
