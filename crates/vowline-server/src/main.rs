use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Json, Router,
    middleware::from_fn_with_state,
    routing::{get, post, put},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use vowline_api::auth::{self, AppState, AppStateInner};
use vowline_api::mailer::Mailer;
use vowline_api::middleware::{require_admin, require_auth};
use vowline_api::{admin, events, export, questions, restrictions, share, templates, timelines};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vowline=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let jwt_secret = match std::env::var("VOWLINE_JWT_SECRET") {
        Ok(secret) => secret,
        Err(_) => {
            warn!("VOWLINE_JWT_SECRET not set, using a built-in development secret");
            "dev-secret-change-me".into()
        }
    };
    let db_path = std::env::var("VOWLINE_DB_PATH").unwrap_or_else(|_| "vowline.db".into());
    let host = std::env::var("VOWLINE_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("VOWLINE_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;
    let base_url = std::env::var("VOWLINE_BASE_URL")
        .unwrap_or_else(|_| "http://localhost:3000".into())
        .trim_end_matches('/')
        .to_string();

    // Init database
    let db = vowline_db::Database::open(&PathBuf::from(&db_path))?;

    // Mail goes over HTTP when an API endpoint is configured, to the log otherwise
    let mailer = Mailer::new(
        std::env::var("VOWLINE_MAIL_API_URL").ok(),
        std::env::var("VOWLINE_MAIL_API_KEY").ok(),
        std::env::var("VOWLINE_MAIL_FROM").unwrap_or_else(|_| "noreply@localhost".into()),
    );

    // Shared state
    let state: AppState = Arc::new(AppStateInner {
        db,
        jwt_secret,
        base_url,
        mailer,
    });

    // Routes
    let public_routes = Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/forgot-password", post(auth::forgot_password))
        .route("/api/auth/reset-password", post(auth::reset_password))
        .route("/api/health", get(health))
        .route("/api/share/{token}", get(share::shared_timeline))
        .route("/share/{token}", get(export::share_page))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/api/auth/me", get(auth::me))
        .route(
            "/api/timelines",
            get(timelines::list_timelines).post(timelines::create_timeline),
        )
        .route(
            "/api/timelines/{id}",
            get(timelines::get_timeline)
                .put(timelines::update_timeline)
                .delete(timelines::delete_timeline),
        )
        .route("/api/timelines/{id}/conflicts", get(timelines::get_conflicts))
        .route("/api/timelines/{id}/export", get(export::export_timeline))
        .route(
            "/api/timelines/{id}/events",
            get(events::list_events).post(events::create_event),
        )
        .route(
            "/api/timelines/{id}/events/{event_id}",
            put(events::update_event).delete(events::delete_event),
        )
        .route(
            "/api/timelines/{id}/restrictions",
            get(restrictions::list_restrictions).post(restrictions::create_restriction),
        )
        .route(
            "/api/timelines/{id}/restrictions/{restriction_id}",
            put(restrictions::update_restriction).delete(restrictions::delete_restriction),
        )
        .route("/api/templates", get(templates::list_templates))
        .route("/api/templates/{id}", get(templates::get_template))
        .route(
            "/api/timelines/{id}/apply-template",
            post(templates::apply_template),
        )
        .route("/api/questions", get(questions::list_questions))
        .route(
            "/api/timelines/{id}/responses",
            get(questions::list_responses),
        )
        .route(
            "/api/timelines/{id}/questions/{question_id}/answer",
            post(questions::answer_question),
        )
        .route(
            "/api/timelines/{id}/share",
            post(share::create_share).get(share::list_shares),
        )
        .route(
            "/api/timelines/{id}/share/{share_id}",
            axum::routing::delete(share::revoke_share),
        )
        .layer(from_fn_with_state(state.clone(), require_auth))
        .with_state(state.clone());

    let admin_routes = Router::new()
        .route("/users", get(admin::list_users))
        .route(
            "/users/{id}",
            put(admin::update_user).delete(admin::delete_user),
        )
        .route("/templates", post(admin::create_template))
        .route(
            "/templates/{id}",
            put(admin::update_template).delete(admin::delete_template),
        )
        .route("/templates/{id}/events", post(admin::create_template_event))
        .route(
            "/templates/{id}/events/{event_id}",
            put(admin::update_template_event).delete(admin::delete_template_event),
        )
        .route(
            "/questions",
            get(admin::list_questions).post(admin::create_question),
        )
        .route(
            "/questions/{id}",
            put(admin::update_question).delete(admin::delete_question),
        )
        .route("/email-templates", get(admin::list_email_templates))
        .route(
            "/email-templates/{name}",
            get(admin::get_email_template).put(admin::update_email_template),
        )
        .route("/settings", get(admin::list_settings))
        .route("/settings/{key}", put(admin::update_setting))
        .layer(from_fn_with_state(state.clone(), require_admin))
        .layer(from_fn_with_state(state.clone(), require_auth))
        .with_state(state.clone());

    let app = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .nest("/api/admin", admin_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Vowline server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}
