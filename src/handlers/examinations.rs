// src/handlers/examinations.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde_json::json;
use sqlx::PgPool;

use crate::{
    error::AppError,
    models::{
        examination::Examination, question::Question, score::Score, test::Test,
        user::User, user_response::UserResponse,
    },
    policies::{Action, ExaminationPolicy, Policy},
};

/// Lists the current user's examinations, newest first. The policy scope is
/// the only query path, so nobody ever sees another user's attempts.
pub async fn index(
    State(pool): State<PgPool>,
    Extension(current_user): Extension<User>,
) -> Result<impl IntoResponse, AppError> {
    let examinations = ExaminationPolicy::scope(&pool, &current_user).await?;
    Ok(Json(examinations))
}

/// Shows one of the current user's examinations with its score, test, and
/// the questions and recorded answers of the attempt.
///
/// The lookup is owner-scoped: a foreign examination id reads as not-found,
/// never as forbidden, so existence does not leak.
pub async fn show(
    State(pool): State<PgPool>,
    Extension(current_user): Extension<User>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let examination = Examination::find_for_user(&pool, current_user.id, id)
        .await?
        .ok_or(AppError::NotFound("Examination not found".to_string()))?;

    // Second gate behind the scoped find; logs a denial if ever reached
    // through a future unscoped path.
    if !ExaminationPolicy::allows(&current_user, &examination, Action::Show) {
        tracing::warn!(
            "User {} denied Show on examination {}",
            current_user.id,
            examination.id
        );
        return Err(AppError::NotFound("Examination not found".to_string()));
    }

    let score = Score::find_by_examination(&pool, examination.id).await?;
    let test = Test::find(&pool, examination.test_id).await?;
    let questions = Question::for_test(&pool, examination.test_id).await?;
    let questions = Question::attach_associations(&pool, questions).await?;
    let user_responses = UserResponse::for_examination(&pool, examination.id).await?;

    Ok(Json(json!({
        "examination": examination,
        "score": score,
        "test": test,
        "questions": questions,
        "user_responses": user_responses,
    })))
}

/// Deletes one of the current user's examinations; responses and score
/// cascade. The policy denial is logged as such but surfaces as not-found.
pub async fn destroy(
    State(pool): State<PgPool>,
    Extension(current_user): Extension<User>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let examination = Examination::find(&pool, id)
        .await?
        .ok_or(AppError::NotFound("Examination not found".to_string()))?;

    if !ExaminationPolicy::allows(&current_user, &examination, Action::Destroy) {
        tracing::warn!(
            "User {} denied Destroy on examination {}",
            current_user.id,
            examination.id
        );
        return Err(AppError::NotFound("Examination not found".to_string()));
    }

    examination.destroy(&pool).await?;

    Ok(Json(json!({ "deleted": true })))
}
