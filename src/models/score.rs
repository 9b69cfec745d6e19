// src/models/score.rs

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection, PgPool};

/// Represents the 'scores' table: the derived evaluation of one examination.
/// Created exactly once by the scoring step, never updated afterwards.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Score {
    pub id: i64,
    pub examination_id: i64,
    pub correct_count: i32,
    pub total_questions: i32,
    pub passed: bool,
}

/// Pass decision in integer arithmetic: correct/total >= pass_mark percent.
/// An empty test only passes at a zero pass mark.
pub fn is_passing(correct_count: i64, total_questions: i64, pass_mark: i32) -> bool {
    correct_count * 100 >= i64::from(pass_mark) * total_questions
}

impl Score {
    /// Computes and persists the score for a freshly inserted examination.
    /// Runs on the submission transaction's connection: the responses counted
    /// here are the ones inserted moments ago in the same transaction.
    pub async fn create_for(
        conn: &mut PgConnection,
        examination_id: i64,
        test_id: i64,
        pass_mark: i32,
    ) -> Result<Score, sqlx::Error> {
        let (correct_count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM user_responses ur
            JOIN choices c ON ur.choice_id = c.id
            WHERE ur.examination_id = $1 AND c.is_correct
            "#,
        )
        .bind(examination_id)
        .fetch_one(&mut *conn)
        .await?;

        let (total_questions,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM questions q
            JOIN test_sessions ts ON q.test_session_id = ts.id
            WHERE ts.test_id = $1
            "#,
        )
        .bind(test_id)
        .fetch_one(&mut *conn)
        .await?;

        let passed = is_passing(correct_count, total_questions, pass_mark);

        sqlx::query_as::<_, Score>(
            r#"
            INSERT INTO scores (examination_id, correct_count, total_questions, passed)
            VALUES ($1, $2, $3, $4)
            RETURNING id, examination_id, correct_count, total_questions, passed
            "#,
        )
        .bind(examination_id)
        .bind(correct_count as i32)
        .bind(total_questions as i32)
        .bind(passed)
        .fetch_one(&mut *conn)
        .await
    }

    pub async fn find_by_examination(
        pool: &PgPool,
        examination_id: i64,
    ) -> Result<Option<Score>, sqlx::Error> {
        sqlx::query_as::<_, Score>(
            r#"
            SELECT id, examination_id, correct_count, total_questions, passed
            FROM scores
            WHERE examination_id = $1
            "#,
        )
        .bind(examination_id)
        .fetch_optional(pool)
        .await
    }
}
