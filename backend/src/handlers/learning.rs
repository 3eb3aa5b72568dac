use axum::{
    extract::{Extension, Path, State},
    Json,
};
use serde_json::{json, Value};

use crate::{
    error::AppError,
    models::{auth::AuthContext, learning::SubmitAnswerRequest},
    repositories::learning as learning_repo,
    state::AppState,
};

pub async fn get_learning_progress(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthContext>,
) -> Result<Json<Value>, AppError> {
    let progress = learning_repo::get_learning_progress(&state.pool, &caller.username).await?;
    Ok(Json(json!({ "progress": progress })))
}

pub async fn mark_subtopic_complete(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthContext>,
    Path((course_id, subtopic_id)): Path<(String, String)>,
) -> Result<Json<Value>, AppError> {
    let (course_id, subtopic_id) = required_ids(&course_id, &subtopic_id)?;
    learning_repo::mark_subtopic_complete(&state.pool, &caller.username, course_id, subtopic_id)
        .await?;
    Ok(Json(json!({ "message": "subtopic marked complete" })))
}

pub async fn submit_subtopic_answer(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthContext>,
    Path((course_id, subtopic_id)): Path<(String, String)>,
    Json(payload): Json<SubmitAnswerRequest>,
) -> Result<Json<Value>, AppError> {
    let (course_id, subtopic_id) = required_ids(&course_id, &subtopic_id)?;
    let question_id = payload.question_id.trim();
    if question_id.is_empty() {
        return Err(AppError::BadRequest("questionId is required".into()));
    }

    learning_repo::upsert_subtopic_answer(
        &state.pool,
        &caller.username,
        course_id,
        subtopic_id,
        question_id,
        &payload.typed_answer,
        payload.is_correct,
    )
    .await?;
    Ok(Json(json!({ "message": "answer saved" })))
}

fn required_ids<'a>(course_id: &'a str, subtopic_id: &'a str) -> Result<(&'a str, &'a str), AppError> {
    let (course_id, subtopic_id) = (course_id.trim(), subtopic_id.trim());
    if course_id.is_empty() || subtopic_id.is_empty() {
        return Err(AppError::BadRequest(
            "courseId and subtopicId are required".into(),
        ));
    }
    Ok((course_id, subtopic_id))
}
