//! Print-ready HTML rendering of a timeline.
//!
//! Serves two routes: the owner's export endpoint and the public share page.
//! Both render the same standalone document so a couple can hand their
//! vendors a single page with no styling dependencies.

use axum::{
    Extension,
    extract::{Path, State},
    response::Html,
};
use uuid::Uuid;

use vowline_schedule::{DayWindow, parse_hhmm};
use vowline_types::api::{Claims, TimelineDetailResponse};

use crate::auth::{AppState, site_name};
use crate::blocking;
use crate::convert;
use crate::error::ApiErr;
use crate::share::load_shared_timeline;
use crate::timelines::{load_owned_timeline, timeline_detail};

const FALLBACK_COLOR: &str = "#8a7ca8";

pub async fn export_timeline(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Html<String>, ApiErr> {
    let html = blocking(&state, move |s| {
        let row = load_owned_timeline(s, claims.sub, id)?;
        let window = convert::day_window(&row)?;
        let detail = timeline_detail(s, row)?;
        Ok(render_timeline_html(&detail, &window, &site_name(s)?))
    })
    .await?;

    Ok(Html(html))
}

pub async fn share_page(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Html<String>, ApiErr> {
    let html = blocking(&state, move |s| {
        let row = load_shared_timeline(s, &token)?;
        let window = convert::day_window(&row)?;
        let detail = timeline_detail(s, row)?;
        Ok(render_timeline_html(&detail, &window, &site_name(s)?))
    })
    .await?;

    Ok(Html(html))
}

/// Escape a string for insertion into HTML text or attribute values.
///
/// Covers the five HTML-special characters so user-supplied titles and notes
/// cannot break out of the surrounding markup.
pub(crate) fn escape(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '"' => output.push_str("&quot;"),
            '\'' => output.push_str("&#x27;"),
            _ => output.push(ch),
        }
    }
    output
}

fn render_timeline_html(detail: &TimelineDetailResponse, window: &DayWindow, site: &str) -> String {
    let timeline = &detail.timeline;
    let date = timeline.wedding_date.format("%A, %B %-d, %Y").to_string();

    let mut ruler = String::new();
    for hour in timeline.day_start_hour..=timeline.day_end_hour {
        let position = window.position(u16::from(hour) * 60);
        ruler.push_str(&format!(
            "<span class=\"tick\" style=\"left:{position}\">{hour:02}:00</span>\n"
        ));
    }

    let mut strip = String::new();
    for restriction in &detail.restrictions {
        // Restriction rows are validated on write; skip anything unreadable.
        let Ok(start) = parse_hhmm(&restriction.start_time) else {
            continue;
        };
        let Ok(end) = parse_hhmm(&restriction.end_time) else {
            continue;
        };
        strip.push_str(&format!(
            "<div class=\"blocked\" style=\"left:{};width:{}\" title=\"{}\"></div>\n",
            window.position(start),
            window.width(start, end),
            escape(&restriction.name),
        ));
    }
    for event in &detail.events {
        let color = event.color.as_deref().unwrap_or(FALLBACK_COLOR);
        strip.push_str(&format!(
            "<div class=\"block\" style=\"left:{};width:{};background:{}\" title=\"{}\"><span>{}</span></div>\n",
            event.position,
            event.width,
            escape(color),
            escape(&event.title),
            escape(&event.title),
        ));
    }

    let mut rows = String::new();
    if detail.events.is_empty() {
        rows.push_str("<tr><td colspan=\"4\" class=\"empty\">No events yet.</td></tr>\n");
    }
    for event in &detail.events {
        let category = event.category.as_deref().unwrap_or("");
        let notes = event.notes.as_deref().unwrap_or("");
        rows.push_str(&format!(
            "<tr><td class=\"time\">{} - {}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            escape(&event.start_time),
            escape(&event.end_time),
            escape(&event.title),
            escape(category),
            escape(notes),
        ));
    }

    let mut blocked = String::new();
    if !detail.restrictions.is_empty() {
        blocked.push_str("<h2>Blocked times</h2>\n<ul class=\"restrictions\">\n");
        for restriction in &detail.restrictions {
            blocked.push_str(&format!(
                "<li><strong>{} - {}</strong> {}</li>\n",
                escape(&restriction.start_time),
                escape(&restriction.end_time),
                escape(&restriction.name),
            ));
        }
        blocked.push_str("</ul>\n");
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{name} | {site}</title>
<style>
    body {{ font-family: Georgia, 'Times New Roman', serif; margin: 40px auto; max-width: 960px; color: #2b2b33; }}
    header {{ text-align: center; margin-bottom: 32px; }}
    header h1 {{ margin: 0 0 4px; font-size: 28px; }}
    header p {{ margin: 0; color: #6b6b75; }}
    .strip {{ position: relative; height: 64px; margin: 24px 0 40px; background: #f4f2f7; border-radius: 6px; }}
    .strip .block {{ position: absolute; top: 8px; bottom: 8px; border-radius: 4px; overflow: hidden; color: #fff; font-size: 11px; }}
    .strip .block span {{ display: block; padding: 4px 6px; white-space: nowrap; }}
    .strip .blocked {{ position: absolute; top: 0; bottom: 0; background: repeating-linear-gradient(45deg, rgba(180,60,60,.18), rgba(180,60,60,.18) 6px, transparent 6px, transparent 12px); }}
    .strip .tick {{ position: absolute; top: 100%; transform: translateX(-50%); padding-top: 4px; font-size: 10px; color: #8a8a94; }}
    table {{ width: 100%; border-collapse: collapse; margin-top: 24px; }}
    th, td {{ text-align: left; padding: 8px 10px; border-bottom: 1px solid #e3e0ea; vertical-align: top; }}
    th {{ font-size: 12px; text-transform: uppercase; letter-spacing: .08em; color: #8a8a94; }}
    td.time {{ white-space: nowrap; font-variant-numeric: tabular-nums; }}
    td.empty {{ text-align: center; color: #8a8a94; font-style: italic; }}
    .restrictions {{ padding-left: 20px; }}
    .restrictions li {{ margin: 4px 0; }}
    footer {{ margin-top: 48px; text-align: center; font-size: 12px; color: #8a8a94; }}
    @media print {{
        body {{ margin: 0; }}
        .strip .block {{ -webkit-print-color-adjust: exact; print-color-adjust: exact; }}
    }}
</style>
</head>
<body>
<header>
    <h1>{name}</h1>
    <p>{date}</p>
    <p>{start:02}:00 to {end:02}:00</p>
</header>
<div class="strip">
{ruler}{strip}</div>
<table>
<thead><tr><th>Time</th><th>Event</th><th>Category</th><th>Notes</th></tr></thead>
<tbody>
{rows}</tbody>
</table>
{blocked}<footer>Prepared with {site}</footer>
</body>
</html>
"#,
        name = escape(&timeline.name),
        site = escape(site),
        date = date,
        start = timeline.day_start_hour,
        end = timeline.day_end_hour,
        ruler = ruler,
        strip = strip,
        rows = rows,
        blocked = blocked,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use vowline_types::api::EventResponse;
    use vowline_types::models::{Restriction, Timeline};

    fn fixture() -> (TimelineDetailResponse, DayWindow) {
        let timeline_id = Uuid::new_v4();
        let timeline = Timeline {
            id: timeline_id,
            user_id: Uuid::new_v4(),
            name: "Sarah & Tom".into(),
            wedding_date: NaiveDate::from_ymd_opt(2026, 6, 13).unwrap(),
            day_start_hour: 8,
            day_end_hour: 22,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let window = DayWindow::from_hours(8, 22).unwrap();
        let events = vec![EventResponse {
            id: Uuid::new_v4(),
            timeline_id,
            title: "First <dance>".into(),
            start_time: "19:00".into(),
            end_time: "19:30".into(),
            category: Some("reception".into()),
            color: None,
            notes: Some("band cue".into()),
            position: window.position(19 * 60),
            width: window.width(19 * 60, 19 * 60 + 30),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }];
        let restrictions = vec![Restriction {
            id: Uuid::new_v4(),
            timeline_id,
            name: "Venue closed".into(),
            start_time: "21:30".into(),
            end_time: "22:00".into(),
            created_at: Utc::now(),
        }];
        (
            TimelineDetailResponse {
                timeline,
                events,
                restrictions,
            },
            window,
        )
    }

    #[test]
    fn escapes_html_special_characters() {
        assert_eq!(
            escape(r#"<b>&"tom's"</b>"#),
            "&lt;b&gt;&amp;&quot;tom&#x27;s&quot;&lt;/b&gt;"
        );
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn rendered_page_escapes_user_content() {
        let (detail, window) = fixture();
        let html = render_timeline_html(&detail, &window, "Vowline");

        assert!(html.contains("First &lt;dance&gt;"));
        assert!(!html.contains("First <dance>"));
        assert!(html.contains("Sarah &amp; Tom"));
    }

    #[test]
    fn rendered_page_includes_schedule_details() {
        let (detail, window) = fixture();
        let html = render_timeline_html(&detail, &window, "Vowline");

        assert!(html.contains("Saturday, June 13, 2026"));
        assert!(html.contains("08:00 to 22:00"));
        assert!(html.contains("19:00 - 19:30"));
        assert!(html.contains("Venue closed"));
        assert!(html.contains("band cue"));
        // Events without a color fall back to the house accent.
        assert!(html.contains(FALLBACK_COLOR));
    }

    #[test]
    fn rendered_page_handles_empty_timeline() {
        let (mut detail, window) = fixture();
        detail.events.clear();
        detail.restrictions.clear();
        let html = render_timeline_html(&detail, &window, "Vowline");

        assert!(html.contains("No events yet."));
        assert!(!html.contains("Blocked times"));
    }
}
