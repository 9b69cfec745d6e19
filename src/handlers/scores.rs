// src/handlers/scores.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use sqlx::PgPool;

use crate::{
    error::AppError,
    models::{examination::Examination, score::Score, user::User},
    policies::{Action, Policy, ScorePolicy},
};

/// Shows the score of an examination. Visibility follows the owning
/// examination's user; a denial is logged but surfaces as not-found so the
/// record's existence does not leak.
pub async fn show(
    State(pool): State<PgPool>,
    Extension(current_user): Extension<User>,
    Path(examination_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let examination = Examination::find(&pool, examination_id)
        .await?
        .ok_or(AppError::NotFound("Score not found".to_string()))?;

    let score = Score::find_by_examination(&pool, examination.id)
        .await?
        .ok_or(AppError::NotFound("Score not found".to_string()))?;

    let record = (score, examination);
    if !ScorePolicy::allows(&current_user, &record, Action::Show) {
        tracing::warn!(
            "User {} denied Show on score {}",
            current_user.id,
            record.0.id
        );
        return Err(AppError::NotFound("Score not found".to_string()));
    }

    Ok(Json(record.0))
}
