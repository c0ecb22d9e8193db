use std::sync::Arc;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{EncodingKey, Header, encode};
use tracing::warn;
use uuid::Uuid;

use vowline_db::Database;
use vowline_types::api::{
    AuthResponse, Claims, ForgotPasswordRequest, LoginRequest, RegisterRequest,
    ResetPasswordRequest,
};

use crate::blocking;
use crate::convert;
use crate::error::ApiErr;
use crate::mailer::Mailer;
use crate::render::render_template;
use crate::tokens::{generate_token, hash_token};

/// Name of the HttpOnly session cookie.
pub const SESSION_COOKIE: &str = "vowline_session";

const RESET_TOKEN_MINUTES: i64 = 60;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
    /// Public origin used to build share and password-reset links.
    pub base_url: String,
    pub mailer: Mailer,
}

pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiErr> {
    let username = req.username.trim().to_string();
    let email = req.email.trim().to_lowercase();

    if username.len() < 3 || username.len() > 32 {
        return Err(ApiErr::bad_request("username must be 3-32 characters"));
    }
    if !email.contains('@') {
        return Err(ApiErr::bad_request("email address is not valid"));
    }
    if req.password.len() < 8 {
        return Err(ApiErr::bad_request("password must be at least 8 characters"));
    }

    let password = req.password;
    let (user_row, welcome, site) = blocking(&state, move |s| {
        let closed = s
            .db
            .get_setting("registration_enabled")
            .map_err(ApiErr::from_db("load settings"))?
            .is_some_and(|row| row.value == "false");
        if closed {
            return Err(ApiErr::forbidden("registration is currently closed"));
        }

        if s.db
            .get_user_by_username(&username)
            .map_err(ApiErr::from_db("look up username"))?
            .is_some()
        {
            return Err(ApiErr::conflict("username already taken"));
        }
        if s.db
            .get_user_by_email(&email)
            .map_err(ApiErr::from_db("look up email"))?
            .is_some()
        {
            return Err(ApiErr::conflict("email already registered"));
        }

        // The very first account administers the install.
        let is_admin = s.db.count_users().map_err(ApiErr::from_db("count users"))? == 0;

        let password_hash = hash_password(&password)?;
        let user_id = Uuid::new_v4().to_string();
        s.db.create_user(&user_id, &username, &email, &password_hash, is_admin)
            .map_err(ApiErr::from_db("create user"))?;

        let user_row = s
            .db
            .get_user_by_id(&user_id)
            .map_err(ApiErr::from_db("load user"))?
            .ok_or_else(|| ApiErr::internal("internal server error"))?;
        let welcome = s
            .db
            .get_email_template("welcome")
            .map_err(ApiErr::from_db("load email template"))?;
        let site = site_name(s)?;

        Ok((user_row, welcome, site))
    })
    .await?;

    if let Some(welcome) = welcome {
        let vars = [
            ("username", user_row.username.as_str()),
            ("site_name", site.as_str()),
        ];
        let subject = render_template(&welcome.subject, &vars);
        let body = render_template(&welcome.body, &vars);
        if let Err(e) = state.mailer.send(&user_row.email, &subject, &body).await {
            warn!("Failed to send welcome email to {}: {}", user_row.email, e);
        }
    }

    let user = convert::user(user_row);
    let token = create_token(&state.jwt_secret, user.id, &user.username)
        .map_err(ApiErr::from_db("sign session token"))?;
    let jar = jar.add(session_cookie(&token));

    Ok((
        StatusCode::CREATED,
        jar,
        Json(AuthResponse { user, token }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiErr> {
    let username = req.username.trim().to_string();
    let password = req.password;

    let user_row = blocking(&state, move |s| {
        // Unknown user and wrong password are indistinguishable.
        let user = s
            .db
            .get_user_by_username(&username)
            .map_err(ApiErr::from_db("look up user"))?
            .ok_or_else(|| ApiErr::unauthorized("invalid username or password"))?;

        let parsed_hash =
            PasswordHash::new(&user.password).map_err(ApiErr::from_db("parse stored hash"))?;
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .map_err(|_| ApiErr::unauthorized("invalid username or password"))?;

        Ok(user)
    })
    .await?;

    let user = convert::user(user_row);
    let token = create_token(&state.jwt_secret, user.id, &user.username)
        .map_err(ApiErr::from_db("sign session token"))?;
    let jar = jar.add(session_cookie(&token));

    Ok((jar, Json(AuthResponse { user, token })))
}

pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    let jar = jar.remove(Cookie::build((SESSION_COOKIE, "")).path("/").build());
    (StatusCode::NO_CONTENT, jar)
}

pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiErr> {
    let user_row = blocking(&state, move |s| {
        s.db.get_user_by_id(&claims.sub.to_string())
            .map_err(ApiErr::from_db("load user"))?
            .ok_or_else(|| ApiErr::unauthorized("account no longer exists"))
    })
    .await?;

    Ok(Json(convert::user(user_row)))
}

/// Always answers 202 so the endpoint can't be used to probe which emails
/// have accounts.
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<impl IntoResponse, ApiErr> {
    let email = req.email.trim().to_lowercase();

    let prepared = blocking(&state, move |s| {
        let Some(user) = s
            .db
            .get_user_by_email(&email)
            .map_err(ApiErr::from_db("look up email"))?
        else {
            return Ok(None);
        };

        let token = generate_token();
        let expires_at = (chrono::Utc::now() + chrono::Duration::minutes(RESET_TOKEN_MINUTES))
            .format("%Y-%m-%d %H:%M:%S")
            .to_string();
        s.db.create_reset_token(
            &Uuid::new_v4().to_string(),
            &user.id,
            &hash_token(&token),
            &expires_at,
        )
        .map_err(ApiErr::from_db("store reset token"))?;

        let Some(template) = s
            .db
            .get_email_template("password_reset")
            .map_err(ApiErr::from_db("load email template"))?
        else {
            warn!("password_reset email template is missing; email not sent");
            return Ok(None);
        };
        let site = site_name(s)?;

        Ok(Some((user, token, template, site)))
    })
    .await?;

    if let Some((user, token, template, site)) = prepared {
        let reset_url = format!("{}/reset-password?token={}", state.base_url, token);
        let vars = [
            ("username", user.username.as_str()),
            ("site_name", site.as_str()),
            ("reset_url", reset_url.as_str()),
        ];
        let subject = render_template(&template.subject, &vars);
        let body = render_template(&template.body, &vars);
        if let Err(e) = state.mailer.send(&user.email, &subject, &body).await {
            tracing::error!("Failed to send password reset email: {e}");
        }
    }

    Ok((
        StatusCode::ACCEPTED,
        Json(serde_json::json!({
            "message": "If that account exists, a reset email is on its way"
        })),
    ))
}

pub async fn reset_password(
    State(state): State<AppState>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<impl IntoResponse, ApiErr> {
    if req.password.len() < 8 {
        return Err(ApiErr::bad_request("password must be at least 8 characters"));
    }

    blocking(&state, move |s| {
        let user_id = s
            .db
            .consume_reset_token(&hash_token(&req.token))
            .map_err(ApiErr::from_db("consume reset token"))?
            .ok_or_else(|| ApiErr::bad_request("invalid or expired reset token"))?;

        let password_hash = hash_password(&req.password)?;
        if !s
            .db
            .update_user_password(&user_id, &password_hash)
            .map_err(ApiErr::from_db("update password"))?
        {
            return Err(ApiErr::bad_request("invalid or expired reset token"));
        }
        Ok(())
    })
    .await?;

    Ok(StatusCode::NO_CONTENT)
}

// -- Helpers shared across handler modules --

pub(crate) fn site_name(s: &AppStateInner) -> Result<String, ApiErr> {
    Ok(s.db
        .get_setting("site_name")
        .map_err(ApiErr::from_db("load settings"))?
        .map(|row| row.value)
        .unwrap_or_else(|| "Vowline".to_string()))
}

fn hash_password(password: &str) -> Result<String, ApiErr> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(ApiErr::from_db("hash password"))?
        .to_string())
}

fn create_token(secret: &str, user_id: Uuid, username: &str) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::days(30)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

fn session_cookie(token: &str) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token.to_string()))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .permanent()
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_is_http_only_and_lax() {
        let cookie = session_cookie("tok");
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
    }

    #[test]
    fn password_hashes_verify_and_differ_per_salt() {
        let first = hash_password("hunter2!").unwrap();
        let second = hash_password("hunter2!").unwrap();
        assert_ne!(first, second);

        let parsed = PasswordHash::new(&first).unwrap();
        assert!(
            Argon2::default()
                .verify_password(b"hunter2!", &parsed)
                .is_ok()
        );
        assert!(
            Argon2::default()
                .verify_password(b"wrong", &parsed)
                .is_err()
        );
    }
}
