// src/handlers/tests.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde_json::json;
use sqlx::PgPool;

use crate::{
    error::AppError,
    models::{question::Question, test::Test},
};

/// Lists all test definitions.
pub async fn list_tests(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let tests = Test::list(&pool).await?;
    Ok(Json(tests))
}

/// Shows one test with its questions in question_number order, each carrying
/// its choices (correctness hidden) and tags.
pub async fn get_test(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let test = Test::find(&pool, id)
        .await?
        .ok_or(AppError::NotFound("Test not found".to_string()))?;

    let questions = Question::for_test(&pool, test.id).await?;
    let questions = Question::attach_associations(&pool, questions).await?;

    Ok(Json(json!({
        "test": test,
        "questions": questions,
    })))
}
