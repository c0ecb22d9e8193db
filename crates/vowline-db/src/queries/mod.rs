//! Query methods on [`Database`](crate::Database), one module per entity.

mod email_templates;
mod events;
mod questions;
mod reset_tokens;
mod restrictions;
mod settings;
mod share_tokens;
mod templates;
mod timelines;
mod users;

pub use events::NewEvent;
pub use questions::NewQuestion;
pub use templates::NewTemplateEvent;

/// Extension trait for optional query results
pub(crate) trait OptionalExt<T> {
    fn optional(self) -> anyhow::Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> anyhow::Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
