//! Schedule math for wedding-day timelines.
//!
//! Everything here is pure arithmetic over minutes-since-midnight: parsing
//! `HH:MM` strings, projecting instants onto a percentage axis for the
//! timeline view, and detecting overlaps between blocks and venue
//! restrictions. Conflicts are advisory: callers render warnings, they
//! never reject writes based on them.

pub mod clock;
pub mod conflict;

pub use clock::{DayWindow, TimeError, format_hhmm, parse_hhmm};
pub use conflict::{TimedSpan, event_conflicts, overlaps, restriction_conflicts};
