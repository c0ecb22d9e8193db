use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeError {
    #[error("invalid time '{0}': expected HH:MM")]
    Malformed(String),
    #[error("invalid time '{0}': hours 00-24, minutes 00-59")]
    OutOfRange(String),
    #[error("invalid day window {start}:00-{end}:00")]
    BadWindow { start: u8, end: u8 },
}

/// Minutes in a full day; also the value of the `24:00` end-of-day sentinel.
pub const DAY_MINUTES: u16 = 24 * 60;

/// Parse a strict `HH:MM` string into minutes since midnight.
///
/// `24:00` is accepted as the end-of-day sentinel (1440) so a block or
/// window can run to midnight; `24:01` and beyond are rejected.
pub fn parse_hhmm(raw: &str) -> Result<u16, TimeError> {
    let (h, m) = raw
        .split_once(':')
        .ok_or_else(|| TimeError::Malformed(raw.to_string()))?;
    if h.len() != 2 || m.len() != 2 {
        return Err(TimeError::Malformed(raw.to_string()));
    }
    let hours: u16 = h
        .parse()
        .map_err(|_| TimeError::Malformed(raw.to_string()))?;
    let minutes: u16 = m
        .parse()
        .map_err(|_| TimeError::Malformed(raw.to_string()))?;

    if minutes > 59 || hours > 24 || (hours == 24 && minutes != 0) {
        return Err(TimeError::OutOfRange(raw.to_string()));
    }
    Ok(hours * 60 + minutes)
}

/// Format minutes since midnight as `HH:MM` (1440 renders as `24:00`).
pub fn format_hhmm(minutes: u16) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// The visible portion of the day, e.g. 6:00-24:00 for a default timeline.
/// Positions and widths are percentages of this window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    start: u16,
    end: u16,
}

impl DayWindow {
    pub fn from_hours(start_hour: u8, end_hour: u8) -> Result<Self, TimeError> {
        if start_hour >= end_hour || end_hour > 24 {
            return Err(TimeError::BadWindow {
                start: start_hour,
                end: end_hour,
            });
        }
        Ok(Self {
            start: u16::from(start_hour) * 60,
            end: u16::from(end_hour) * 60,
        })
    }

    pub fn start_minutes(&self) -> u16 {
        self.start
    }

    pub fn end_minutes(&self) -> u16 {
        self.end
    }

    fn span(&self) -> f64 {
        f64::from(self.end - self.start)
    }

    /// Percentage offset of an instant within the window, clamped to
    /// 0-100 and formatted for CSS (`"0%"`, `"2.78%"`).
    pub fn position(&self, minutes: u16) -> String {
        let clamped = minutes.clamp(self.start, self.end);
        format_percent(f64::from(clamped - self.start) / self.span() * 100.0)
    }

    /// Percentage width of an interval, computed over the part of the
    /// interval that lies inside the window.
    pub fn width(&self, start: u16, end: u16) -> String {
        let start = start.clamp(self.start, self.end);
        let end = end.clamp(self.start, self.end);
        if end <= start {
            return "0%".to_string();
        }
        format_percent(f64::from(end - start) / self.span() * 100.0)
    }
}

/// Round to two decimal places and trim trailing zeros: 0 -> "0%",
/// 2.7777… -> "2.78%", 50 -> "50%".
fn format_percent(value: f64) -> String {
    let rendered = format!("{:.2}", value.clamp(0.0, 100.0));
    let trimmed = rendered.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed}%")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_formats_hhmm() {
        assert_eq!(parse_hhmm("06:30"), Ok(390));
        assert_eq!(parse_hhmm("00:00"), Ok(0));
        assert_eq!(parse_hhmm("23:59"), Ok(1439));
        assert_eq!(parse_hhmm("24:00"), Ok(DAY_MINUTES));
        assert_eq!(format_hhmm(390), "06:30");
        assert_eq!(format_hhmm(DAY_MINUTES), "24:00");
        assert_eq!(format_hhmm(0), "00:00");
    }

    #[test]
    fn rejects_malformed_times() {
        for bad in ["", "6:30", "06-30", "06:3", "ab:cd", "06:30:00", " 06:30"] {
            assert!(matches!(parse_hhmm(bad), Err(TimeError::Malformed(_))), "{bad}");
        }
    }

    #[test]
    fn rejects_out_of_range_times() {
        for bad in ["24:01", "25:00", "12:60", "99:99"] {
            assert!(matches!(parse_hhmm(bad), Err(TimeError::OutOfRange(_))), "{bad}");
        }
    }

    #[test]
    fn window_start_maps_to_zero_percent() {
        // The documented fixture: a 06:00 block in a day starting at 6 sits at 0%.
        let window = DayWindow::from_hours(6, 24).unwrap();
        assert_eq!(window.position(parse_hhmm("06:00").unwrap()), "0%");
    }

    #[test]
    fn positions_scale_across_the_window() {
        let window = DayWindow::from_hours(6, 24).unwrap();
        assert_eq!(window.position(parse_hhmm("15:00").unwrap()), "50%");
        assert_eq!(window.position(parse_hhmm("24:00").unwrap()), "100%");
        assert_eq!(window.position(parse_hhmm("06:30").unwrap()), "2.78%");
    }

    #[test]
    fn positions_clamp_outside_the_window() {
        let window = DayWindow::from_hours(6, 22).unwrap();
        assert_eq!(window.position(parse_hhmm("04:00").unwrap()), "0%");
        assert_eq!(window.position(parse_hhmm("23:30").unwrap()), "100%");
    }

    #[test]
    fn widths_cover_only_the_visible_part() {
        let window = DayWindow::from_hours(6, 24).unwrap();
        // A 90-minute block in an 18-hour day.
        assert_eq!(
            window.width(parse_hhmm("17:00").unwrap(), parse_hhmm("18:30").unwrap()),
            "8.33%"
        );
        // Starts before the window opens; only the inside part counts.
        assert_eq!(
            window.width(parse_hhmm("05:00").unwrap(), parse_hhmm("07:00").unwrap()),
            "5.56%"
        );
        // Entirely outside.
        assert_eq!(
            window.width(parse_hhmm("01:00").unwrap(), parse_hhmm("05:00").unwrap()),
            "0%"
        );
    }

    #[test]
    fn bad_windows_are_rejected() {
        assert!(DayWindow::from_hours(10, 10).is_err());
        assert!(DayWindow::from_hours(12, 6).is_err());
        assert!(DayWindow::from_hours(6, 25).is_err());
        assert!(DayWindow::from_hours(0, 24).is_ok());
    }
}
