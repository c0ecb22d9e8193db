use super::OptionalExt;
use crate::Database;
use crate::models::{QuestionRow, ResponseRow};
use anyhow::Result;
use rusqlite::Row;

/// Caller-supplied fields for one guided question.
#[derive(Debug, Clone)]
pub struct NewQuestion<'a> {
    pub id: &'a str,
    pub prompt: &'a str,
    pub category: Option<&'a str>,
    pub default_title: &'a str,
    pub default_start_time: &'a str,
    pub default_end_time: &'a str,
    pub default_color: Option<&'a str>,
    pub sort_order: i64,
    pub active: bool,
}

impl Database {
    pub fn create_question(&self, question: &NewQuestion<'_>) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO questions
                     (id, prompt, category, default_title, default_start_time, default_end_time,
                      default_color, sort_order, active)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                rusqlite::params![
                    question.id,
                    question.prompt,
                    question.category,
                    question.default_title,
                    question.default_start_time,
                    question.default_end_time,
                    question.default_color,
                    question.sort_order,
                    question.active
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_question(&self, id: &str) -> Result<Option<QuestionRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&select_questions("WHERE id = ?1"))?;
            let row = stmt.query_row([id], map_question).optional()?;
            Ok(row)
        })
    }

    /// Questions shown to planners, in guided order. Inactive ones stay
    /// admin-only.
    pub fn list_active_questions(&self) -> Result<Vec<QuestionRow>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare(&select_questions("WHERE active = 1 ORDER BY sort_order, prompt"))?;
            let rows = stmt
                .query_map([], map_question)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn list_questions(&self) -> Result<Vec<QuestionRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&select_questions("ORDER BY sort_order, prompt"))?;
            let rows = stmt
                .query_map([], map_question)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn update_question(&self, question: &NewQuestion<'_>) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "UPDATE questions
                 SET prompt = ?2, category = ?3, default_title = ?4, default_start_time = ?5,
                     default_end_time = ?6, default_color = ?7, sort_order = ?8, active = ?9
                 WHERE id = ?1",
                rusqlite::params![
                    question.id,
                    question.prompt,
                    question.category,
                    question.default_title,
                    question.default_start_time,
                    question.default_end_time,
                    question.default_color,
                    question.sort_order,
                    question.active
                ],
            )?;
            Ok(())
        })
    }

    pub fn delete_question(&self, id: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute("DELETE FROM questions WHERE id = ?1", [id])?;
            Ok(changed > 0)
        })
    }

    // -- Responses --

    pub fn get_response(&self, timeline_id: &str, question_id: &str) -> Result<Option<ResponseRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, timeline_id, question_id, answer, created_at
                 FROM question_responses
                 WHERE timeline_id = ?1 AND question_id = ?2",
            )?;
            let row = stmt
                .query_row([timeline_id, question_id], map_response)
                .optional()?;
            Ok(row)
        })
    }

    pub fn list_responses(&self, timeline_id: &str) -> Result<Vec<ResponseRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, timeline_id, question_id, answer, created_at
                 FROM question_responses
                 WHERE timeline_id = ?1
                 ORDER BY created_at",
            )?;
            let rows = stmt
                .query_map([timeline_id], map_response)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Record an answer, replacing any earlier one for the same question on
    /// this timeline. The original row id survives a replay.
    pub fn upsert_response(
        &self,
        id: &str,
        user_id: &str,
        timeline_id: &str,
        question_id: &str,
        answer: bool,
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO question_responses (id, user_id, timeline_id, question_id, answer)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(timeline_id, question_id)
                 DO UPDATE SET answer = excluded.answer",
                rusqlite::params![id, user_id, timeline_id, question_id, answer],
            )?;
            Ok(())
        })
    }
}

fn select_questions(tail: &str) -> String {
    format!(
        "SELECT id, prompt, category, default_title, default_start_time, default_end_time,
                default_color, sort_order, active
         FROM questions {tail}"
    )
}

fn map_question(row: &Row<'_>) -> rusqlite::Result<QuestionRow> {
    Ok(QuestionRow {
        id: row.get(0)?,
        prompt: row.get(1)?,
        category: row.get(2)?,
        default_title: row.get(3)?,
        default_start_time: row.get(4)?,
        default_end_time: row.get(5)?,
        default_color: row.get(6)?,
        sort_order: row.get(7)?,
        active: row.get(8)?,
    })
}

fn map_response(row: &Row<'_>) -> rusqlite::Result<ResponseRow> {
    Ok(ResponseRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        timeline_id: row.get(2)?,
        question_id: row.get(3)?,
        answer: row.get(4)?,
        created_at: row.get(5)?,
    })
}
