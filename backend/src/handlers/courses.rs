use axum::{
    extract::{Extension, Path, State},
    Json,
};
use serde_json::{json, Value};
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        auth::AuthContext,
        course::{CourseStatus, UpdateCourseStatusRequest, UpsertCourseRequest},
    },
    repositories::course as course_repo,
    state::AppState,
};

pub async fn list_courses(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let courses = course_repo::list_courses(&state.pool).await?;
    Ok(Json(json!({ "courses": courses })))
}

pub async fn upsert_course(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthContext>,
    Json(payload): Json<UpsertCourseRequest>,
) -> Result<Json<Value>, AppError> {
    let payload = payload.normalized();
    payload.validate()?;

    let course = course_repo::upsert_course(&state.pool, &payload.into_input(), &caller).await?;
    tracing::info!(course_id = %course.id, username = %caller.username, "Course saved");
    Ok(Json(json!({ "course": course })))
}

pub async fn update_course_status(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthContext>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateCourseStatusRequest>,
) -> Result<Json<Value>, AppError> {
    let id = required_course_id(&id)?;
    payload.validate()?;
    let status = CourseStatus::parse(&payload.status)
        .ok_or_else(|| AppError::BadRequest("status must be active, inprogress or inactive".into()))?;

    course_repo::update_course_status(&state.pool, id, status, &caller).await?;
    Ok(Json(json!({ "message": "status updated" })))
}

pub async fn delete_course(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthContext>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = required_course_id(&id)?;
    course_repo::delete_course(&state.pool, id, &caller).await?;
    tracing::info!(course_id = %id, username = %caller.username, "Course deleted");
    Ok(Json(json!({ "message": "course deleted" })))
}

fn required_course_id(raw: &str) -> Result<&str, AppError> {
    let id = raw.trim();
    if id.is_empty() {
        return Err(AppError::BadRequest("course id is required".into()));
    }
    Ok(id)
}
