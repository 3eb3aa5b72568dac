//! Repository functions for per-user learning progress.

use sqlx::{PgExecutor, PgPool};

use crate::error::AppError;
use crate::models::learning::{assemble_progress, AnswerRow, CompletedSubtopicRow, LearningProgress};
use crate::repositories::transaction::{begin_transaction, commit_transaction};

async fn ensure_enrollment<'e, E>(executor: E, username: &str, course_id: &str) -> Result<(), AppError>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        "INSERT INTO user_course_enrollments (username, course_id) VALUES ($1, $2) \
         ON CONFLICT (username, course_id) DO NOTHING",
    )
    .bind(username)
    .bind(course_id)
    .execute(executor)
    .await?;
    Ok(())
}

/// Records a completed subtopic. Completing it again is a no-op.
pub async fn mark_subtopic_complete(
    pool: &PgPool,
    username: &str,
    course_id: &str,
    subtopic_id: &str,
) -> Result<(), AppError> {
    let mut tx = begin_transaction(pool).await?;
    ensure_enrollment(&mut *tx, username, course_id).await?;
    sqlx::query(
        "INSERT INTO learning_subtopic_progress (username, course_id, subtopic_id) \
         VALUES ($1, $2, $3) \
         ON CONFLICT (username, course_id, subtopic_id) DO NOTHING",
    )
    .bind(username)
    .bind(course_id)
    .bind(subtopic_id)
    .execute(&mut *tx)
    .await?;
    commit_transaction(tx).await
}

/// Stores the latest answer to a question, replacing any earlier one.
pub async fn upsert_subtopic_answer(
    pool: &PgPool,
    username: &str,
    course_id: &str,
    subtopic_id: &str,
    question_id: &str,
    typed_answer: &str,
    is_correct: bool,
) -> Result<(), AppError> {
    let mut tx = begin_transaction(pool).await?;
    ensure_enrollment(&mut *tx, username, course_id).await?;
    sqlx::query(
        "INSERT INTO learning_subtopic_answers \
             (username, course_id, subtopic_id, question_id, typed_answer, is_correct) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         ON CONFLICT (username, course_id, subtopic_id, question_id) DO UPDATE SET \
             typed_answer = EXCLUDED.typed_answer, \
             is_correct = EXCLUDED.is_correct, \
             answered_at = NOW()",
    )
    .bind(username)
    .bind(course_id)
    .bind(subtopic_id)
    .bind(question_id)
    .bind(typed_answer)
    .bind(is_correct)
    .execute(&mut *tx)
    .await?;
    commit_transaction(tx).await
}

pub async fn get_learning_progress(
    pool: &PgPool,
    username: &str,
) -> Result<LearningProgress, AppError> {
    let completed = sqlx::query_as::<_, CompletedSubtopicRow>(
        "SELECT course_id, subtopic_id FROM learning_subtopic_progress WHERE username = $1",
    )
    .bind(username)
    .fetch_all(pool)
    .await?;

    let answers = sqlx::query_as::<_, AnswerRow>(
        "SELECT course_id, subtopic_id, question_id, typed_answer, is_correct \
         FROM learning_subtopic_answers WHERE username = $1",
    )
    .bind(username)
    .fetch_all(pool)
    .await?;

    Ok(assemble_progress(completed, answers))
}
