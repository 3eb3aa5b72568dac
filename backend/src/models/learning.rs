use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerProgress {
    pub typed_answer: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseProgress {
    pub completed_subtopics: BTreeMap<String, bool>,
    /// subtopic id -> question id -> answer
    pub answers: BTreeMap<String, BTreeMap<String, AnswerProgress>>,
}

/// Progress keyed by course id.
pub type LearningProgress = BTreeMap<String, CourseProgress>;

#[derive(Debug, Clone, FromRow)]
pub struct CompletedSubtopicRow {
    pub course_id: String,
    pub subtopic_id: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct AnswerRow {
    pub course_id: String,
    pub subtopic_id: String,
    pub question_id: String,
    pub typed_answer: String,
    pub is_correct: bool,
}

/// Folds completed-subtopic and answer rows into per-course progress.
pub fn assemble_progress(
    completed: Vec<CompletedSubtopicRow>,
    answers: Vec<AnswerRow>,
) -> LearningProgress {
    let mut progress = LearningProgress::new();
    for row in completed {
        progress
            .entry(row.course_id)
            .or_default()
            .completed_subtopics
            .insert(row.subtopic_id, true);
    }
    for row in answers {
        progress
            .entry(row.course_id)
            .or_default()
            .answers
            .entry(row.subtopic_id)
            .or_default()
            .insert(
                row.question_id,
                AnswerProgress {
                    typed_answer: row.typed_answer,
                    is_correct: row.is_correct,
                },
            );
    }
    progress
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubmitAnswerRequest {
    pub question_id: String,
    pub typed_answer: String,
    pub is_correct: bool,
}
