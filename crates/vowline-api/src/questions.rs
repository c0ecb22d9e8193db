use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use tracing::warn;
use uuid::Uuid;

use vowline_db::models::{QuestionRow, ResponseRow};
use vowline_db::queries::NewEvent;
use vowline_schedule::parse_hhmm;
use vowline_types::api::{AnswerRequest, AnswerResponse, Claims};

use crate::auth::AppState;
use crate::blocking;
use crate::convert;
use crate::error::ApiErr;
use crate::timelines::load_owned_timeline;

pub async fn list_questions(State(state): State<AppState>) -> Result<impl IntoResponse, ApiErr> {
    let questions = blocking(&state, move |s| {
        Ok(s
            .db
            .list_active_questions()
            .map_err(ApiErr::from_db("list questions"))?
            .into_iter()
            .map(convert::question)
            .collect::<Vec<_>>())
    })
    .await?;

    Ok(Json(questions))
}

pub async fn list_responses(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiErr> {
    let responses = blocking(&state, move |s| {
        let timeline = load_owned_timeline(s, claims.sub, id)?;
        Ok(s
            .db
            .list_responses(&timeline.id)
            .map_err(ApiErr::from_db("list responses"))?
            .into_iter()
            .map(convert::response)
            .collect::<Vec<_>>())
    })
    .await?;

    Ok(Json(responses))
}

/// Record a yes/no answer. A "yes" that wasn't already recorded generates a
/// block from the question's defaults; answering yes again is a no-op, so
/// replays never duplicate blocks.
pub async fn answer_question(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((id, question_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<AnswerRequest>,
) -> Result<impl IntoResponse, ApiErr> {
    let answer = blocking(&state, move |s| {
        let timeline = load_owned_timeline(s, claims.sub, id)?;
        let question =
            s.db.get_question(&question_id.to_string())
                .map_err(ApiErr::from_db("load question"))?
                .filter(|q| q.active)
                .ok_or_else(|| ApiErr::not_found("question not found"))?;

        let prior =
            s.db.get_response(&timeline.id, &question.id)
                .map_err(ApiErr::from_db("load response"))?;
        let generate = should_generate(req.answer, prior.as_ref());

        s.db.upsert_response(
            &Uuid::new_v4().to_string(),
            &claims.sub.to_string(),
            &timeline.id,
            &question.id,
            req.answer,
        )
        .map_err(ApiErr::from_db("record answer"))?;

        let generated_event = if generate {
            generate_event(s, &timeline.id, &question)?
        } else {
            None
        };

        let response =
            s.db.get_response(&timeline.id, &question.id)
                .map_err(ApiErr::from_db("load response"))?
                .ok_or_else(|| ApiErr::internal("internal server error"))?;

        let window = convert::day_window(&timeline)?;
        Ok(AnswerResponse {
            response: convert::response(response),
            generated_event: generated_event.map(|row| convert::event(row, &window)),
        })
    })
    .await?;

    Ok(Json(answer))
}

/// A block is generated only when the stored answer flips to yes.
fn should_generate(answer: bool, prior: Option<&ResponseRow>) -> bool {
    answer && prior.map(|p| !p.answer).unwrap_or(true)
}

fn generate_event(
    s: &crate::auth::AppStateInner,
    timeline_id: &str,
    question: &QuestionRow,
) -> Result<Option<vowline_db::models::EventRow>, ApiErr> {
    // Admin-entered defaults are validated on write; a corrupt row skips
    // generation rather than failing the answer.
    if parse_hhmm(&question.default_start_time).is_err()
        || parse_hhmm(&question.default_end_time).is_err()
    {
        warn!(
            "Question '{}' has unparseable default times; skipping block generation",
            question.id
        );
        return Ok(None);
    }

    let event_id = Uuid::new_v4().to_string();
    s.db.create_event(
        timeline_id,
        &NewEvent {
            id: &event_id,
            title: &question.default_title,
            start_time: &question.default_start_time,
            end_time: &question.default_end_time,
            category: question.category.as_deref(),
            color: question.default_color.as_deref(),
            notes: None,
        },
    )
    .map_err(ApiErr::from_db("generate event"))?;

    let row =
        s.db.get_event(&event_id)
            .map_err(ApiErr::from_db("load event"))?
            .ok_or_else(|| ApiErr::internal("internal server error"))?;
    Ok(Some(row))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response_row(answer: bool) -> ResponseRow {
        ResponseRow {
            id: "r1".to_string(),
            user_id: "u1".to_string(),
            timeline_id: "t1".to_string(),
            question_id: "q1".to_string(),
            answer,
            created_at: "2026-01-01 00:00:00".to_string(),
        }
    }

    #[test]
    fn first_yes_generates() {
        assert!(should_generate(true, None));
    }

    #[test]
    fn repeated_yes_does_not_duplicate() {
        assert!(!should_generate(true, Some(&response_row(true))));
    }

    #[test]
    fn no_never_generates() {
        assert!(!should_generate(false, None));
        assert!(!should_generate(false, Some(&response_row(true))));
    }

    #[test]
    fn flipping_no_to_yes_generates() {
        assert!(should_generate(true, Some(&response_row(false))));
    }
}
