// src/models/examination.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use std::fmt;

use crate::models::{score::Score, user_response::UserResponse};

/// Represents the 'examinations' table: one attempt by one user at one test.
/// Rows are created only through `create_result`, never directly, so an
/// examination can never exist without its responses and score.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Examination {
    pub id: i64,
    pub user_id: i64,
    pub test_id: i64,
    pub attempt_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Failure modes of the submission pipeline.
#[derive(Debug)]
pub enum SubmissionError {
    /// The referenced test does not exist.
    TestNotFound,
    /// The answer set failed bulk validation (empty, too many, duplicates,
    /// or unknown choice ids). The transaction was rolled back.
    InvalidChoice,
    /// Infrastructure failure; the transaction was rolled back.
    Database(sqlx::Error),
}

impl fmt::Display for SubmissionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionError::TestNotFound => write!(f, "test not found"),
            SubmissionError::InvalidChoice => write!(f, "invalid choice IDs provided"),
            SubmissionError::Database(e) => write!(f, "database error: {}", e),
        }
    }
}

impl std::error::Error for SubmissionError {}

impl From<sqlx::Error> for SubmissionError {
    fn from(err: sqlx::Error) -> Self {
        SubmissionError::Database(err)
    }
}

impl Examination {
    /// The submission pipeline: creates the examination, its responses, and
    /// its score inside one transaction.
    ///
    /// Any failure after `begin` returns early; dropping the uncommitted
    /// transaction rolls everything back, so no partial attempt is ever
    /// persisted. Guest quota bookkeeping is the caller's post-commit step
    /// (`User::mark_guest_limit_if_reached`).
    pub async fn create_result(
        pool: &PgPool,
        user_id: i64,
        test_id: i64,
        attempt_date: DateTime<Utc>,
        choice_ids: &[i64],
    ) -> Result<(Examination, Score), SubmissionError> {
        let mut tx = pool.begin().await?;

        let pass_mark: Option<(i32,)> =
            sqlx::query_as("SELECT pass_mark FROM tests WHERE id = $1")
                .bind(test_id)
                .fetch_optional(&mut *tx)
                .await?;
        let (pass_mark,) = pass_mark.ok_or(SubmissionError::TestNotFound)?;

        let examination = sqlx::query_as::<_, Examination>(
            r#"
            INSERT INTO examinations (user_id, test_id, attempt_date)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, test_id, attempt_date, created_at
            "#,
        )
        .bind(user_id)
        .bind(test_id)
        .bind(attempt_date)
        .fetch_one(&mut *tx)
        .await?;

        if !UserResponse::bulk_create_responses(&mut *tx, examination.id, choice_ids).await? {
            return Err(SubmissionError::InvalidChoice);
        }

        let score = Score::create_for(&mut *tx, examination.id, test_id, pass_mark).await?;

        tx.commit().await?;

        Ok((examination, score))
    }

    /// All examinations belonging to a user, newest attempt first.
    pub async fn for_user(pool: &PgPool, user_id: i64) -> Result<Vec<Examination>, sqlx::Error> {
        sqlx::query_as::<_, Examination>(
            r#"
            SELECT id, user_id, test_id, attempt_date, created_at
            FROM examinations
            WHERE user_id = $1
            ORDER BY attempt_date DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    pub async fn find(pool: &PgPool, id: i64) -> Result<Option<Examination>, sqlx::Error> {
        sqlx::query_as::<_, Examination>(
            r#"
            SELECT id, user_id, test_id, attempt_date, created_at
            FROM examinations
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Owner-scoped lookup: a foreign examination reads as absent, so the
    /// caller surfaces not-found and existence never leaks.
    pub async fn find_for_user(
        pool: &PgPool,
        user_id: i64,
        id: i64,
    ) -> Result<Option<Examination>, sqlx::Error> {
        sqlx::query_as::<_, Examination>(
            r#"
            SELECT id, user_id, test_id, attempt_date, created_at
            FROM examinations
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Deletes the examination; responses and score go with it via cascade.
    pub async fn destroy(&self, pool: &PgPool) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM examinations WHERE id = $1")
            .bind(self.id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
