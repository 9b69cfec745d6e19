// src/handlers/user_responses.rs

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;

use crate::{
    error::AppError,
    models::{
        examination::{Examination, SubmissionError},
        user::User,
    },
    utils::sanitize::{self, RawId},
};

/// DTO for submitting an examination attempt.
#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub test_id: RawId,
    #[serde(default)]
    pub choice_ids: Vec<RawId>,
}

/// The submission boundary: sanitizes the raw identifier lists, runs the
/// transactional pipeline, and performs the post-commit guest bookkeeping
/// before responding.
///
/// A failed submission persists nothing; the sanitized answers are echoed
/// back in the failure body so the client can redisplay them.
pub async fn create(
    State(pool): State<PgPool>,
    Extension(current_user): Extension<User>,
    Json(payload): Json<SubmitRequest>,
) -> Result<Response, AppError> {
    let test_id = sanitize::normalize_ids(std::slice::from_ref(&payload.test_id))
        .first()
        .copied()
        .unwrap_or(0);
    let choice_ids = sanitize::normalize_ids(&payload.choice_ids);

    if current_user
        .guest_examination_limit_reached(&pool)
        .await?
    {
        return Err(AppError::Forbidden(format!(
            "guest user {} has reached the examination limit",
            current_user.id
        )));
    }

    match Examination::create_result(&pool, current_user.id, test_id, Utc::now(), &choice_ids).await
    {
        Ok((examination, score)) => {
            // Post-commit quota bookkeeping; a failure here is logged
            // rather than failing the already-saved attempt.
            if let Err(e) = current_user.mark_guest_limit_if_reached(&pool).await {
                tracing::warn!(
                    "Guest limit bookkeeping failed for user {}: {:?}",
                    current_user.id,
                    e
                );
            }

            Ok((
                StatusCode::CREATED,
                Json(json!({
                    "examination_id": examination.id,
                    "score": score,
                })),
            )
                .into_response())
        }
        Err(SubmissionError::TestNotFound) => {
            Err(AppError::NotFound("Test not found".to_string()))
        }
        Err(SubmissionError::InvalidChoice) => {
            tracing::error!(
                "Failed to save examination result for user {}: invalid choice IDs",
                current_user.id
            );
            Ok((
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "could not save examination result",
                    "user_responses": choice_ids,
                })),
            )
                .into_response())
        }
        Err(SubmissionError::Database(e)) => {
            tracing::error!(
                "Failed to save examination result for user {}: {:?}",
                current_user.id,
                e
            );
            Err(AppError::InternalServerError(e.to_string()))
        }
    }
}
