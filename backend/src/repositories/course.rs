//! Repository functions for the course catalogue.

use std::collections::HashMap;

use sqlx::{FromRow, PgPool};

use crate::error::AppError;
use crate::models::auth::AuthContext;
use crate::models::course::{Course, CourseInput, CourseRow, CourseStatus, SkillReward};
use crate::repositories::transaction::{begin_transaction, commit_transaction};

const COURSE_COLUMNS: &str = "id, title, creator, owner_username, status, description, image, \
     content, skill_points, subtopic_completion_score, course_completion_score, created_at";

#[derive(Debug, FromRow)]
struct RewardRow {
    course_id: String,
    skill: String,
    points: i32,
}

/// Lists every course, newest first, with skill rewards attached.
pub async fn list_courses(pool: &PgPool) -> Result<Vec<Course>, AppError> {
    let rows = sqlx::query_as::<_, CourseRow>(&format!(
        "SELECT {COURSE_COLUMNS} FROM courses ORDER BY created_at DESC, id"
    ))
    .fetch_all(pool)
    .await?;

    let rewards = sqlx::query_as::<_, RewardRow>(
        "SELECT course_id, skill, points FROM course_skill_rewards ORDER BY course_id, id",
    )
    .fetch_all(pool)
    .await?;

    let mut by_course: HashMap<String, Vec<SkillReward>> = HashMap::new();
    for reward in rewards {
        by_course
            .entry(reward.course_id)
            .or_default()
            .push(SkillReward {
                skill: reward.skill,
                points: reward.points,
            });
    }

    Ok(rows
        .into_iter()
        .map(|row| {
            let rewards = by_course.remove(&row.id).unwrap_or_default();
            Course::from_row(row, rewards)
        })
        .collect())
}

/// Inserts or updates a course and replaces its skill rewards.
///
/// A new course is owned by the caller. An existing one may only be changed
/// by its owner or an admin, and keeps its owner.
pub async fn upsert_course(
    pool: &PgPool,
    input: &CourseInput,
    caller: &AuthContext,
) -> Result<Course, AppError> {
    let mut tx = begin_transaction(pool).await?;

    // Ownership is checked on the conflicting row, including one committed by a
    // concurrent insert of the same id.
    let row = sqlx::query_as::<_, CourseRow>(&format!(
        "INSERT INTO courses (id, title, creator, owner_username, status, description, image, \
             content, skill_points, subtopic_completion_score, course_completion_score) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
         ON CONFLICT (id) DO UPDATE SET \
             title = EXCLUDED.title, \
             creator = EXCLUDED.creator, \
             status = EXCLUDED.status, \
             description = EXCLUDED.description, \
             image = EXCLUDED.image, \
             content = EXCLUDED.content, \
             skill_points = EXCLUDED.skill_points, \
             subtopic_completion_score = EXCLUDED.subtopic_completion_score, \
             course_completion_score = EXCLUDED.course_completion_score \
         WHERE courses.owner_username = $4 OR $12 \
         RETURNING {COURSE_COLUMNS}"
    ))
    .bind(&input.id)
    .bind(&input.title)
    .bind(&input.creator)
    .bind(&caller.username)
    .bind(input.status.as_str())
    .bind(&input.description)
    .bind(&input.image)
    .bind(&input.content)
    .bind(input.skill_points)
    .bind(input.subtopic_completion_score)
    .bind(input.course_completion_score)
    .bind(caller.is_admin)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::Forbidden("not allowed to edit this course".into()))?;

    sqlx::query("DELETE FROM course_skill_rewards WHERE course_id = $1")
        .bind(&input.id)
        .execute(&mut *tx)
        .await?;

    let mut rewards = Vec::with_capacity(input.skill_rewards.len());
    for reward in input
        .skill_rewards
        .iter()
        .filter(|reward| !reward.skill.trim().is_empty())
    {
        sqlx::query(
            "INSERT INTO course_skill_rewards (course_id, skill, points) VALUES ($1, $2, $3)",
        )
        .bind(&input.id)
        .bind(&reward.skill)
        .bind(reward.points)
        .execute(&mut *tx)
        .await?;
        rewards.push(reward.clone());
    }

    commit_transaction(tx).await?;
    Ok(Course::from_row(row, rewards))
}

async fn ensure_course_owner(
    pool: &PgPool,
    id: &str,
    caller: &AuthContext,
    denied: &str,
) -> Result<(), AppError> {
    let owner = sqlx::query_scalar::<_, Option<String>>(
        "SELECT owner_username FROM courses WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("course not found".into()))?;

    if caller.can_modify(owner.as_deref()) {
        Ok(())
    } else {
        Err(AppError::Forbidden(denied.to_string()))
    }
}

pub async fn update_course_status(
    pool: &PgPool,
    id: &str,
    status: CourseStatus,
    caller: &AuthContext,
) -> Result<(), AppError> {
    ensure_course_owner(pool, id, caller, "not allowed to edit this course").await?;
    let result = sqlx::query("UPDATE courses SET status = $2 WHERE id = $1")
        .bind(id)
        .bind(status.as_str())
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("course not found".into()));
    }
    Ok(())
}

/// Deletes a course; its skill rewards cascade.
pub async fn delete_course(pool: &PgPool, id: &str, caller: &AuthContext) -> Result<(), AppError> {
    ensure_course_owner(pool, id, caller, "not allowed to delete this course").await?;
    let result = sqlx::query("DELETE FROM courses WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("course not found".into()));
    }
    Ok(())
}
