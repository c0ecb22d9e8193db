//! Route handlers, auth middleware, and the supporting pieces (mailer,
//! template rendering, export HTML) for the Vowline REST API. Routers are
//! assembled in the server binary.

pub mod admin;
pub mod auth;
mod convert;
pub mod error;
pub mod events;
pub mod export;
pub mod mailer;
pub mod middleware;
pub mod questions;
pub mod render;
pub mod restrictions;
pub mod share;
pub mod templates;
pub mod timelines;
pub mod tokens;

use auth::AppState;
use error::ApiErr;

/// Run rusqlite work off the async runtime. The closure gets the shared
/// state and reports failures as ready-to-serve [`ApiErr`]s.
pub(crate) async fn blocking<T, F>(state: &AppState, f: F) -> Result<T, ApiErr>
where
    F: FnOnce(&auth::AppStateInner) -> Result<T, ApiErr> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state))
        .await
        .map_err(|e| {
            tracing::error!("spawn_blocking join error: {e}");
            ApiErr::internal("internal server error")
        })?
}
