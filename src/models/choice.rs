// src/models/choice.rs

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres};

/// Represents the 'choices' table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Choice {
    pub id: i64,
    pub question_id: i64,
    pub content: String,
    pub is_correct: bool,
}

/// DTO for presenting a choice to a test taker (hides correctness).
#[derive(Debug, Serialize)]
pub struct PublicChoice {
    pub id: i64,
    pub question_id: i64,
    pub content: String,
}

impl From<Choice> for PublicChoice {
    fn from(c: Choice) -> Self {
        PublicChoice {
            id: c.id,
            question_id: c.question_id,
            content: c.content,
        }
    }
}

impl Choice {
    /// Subset of `ids` that exist, for bulk existence validation.
    pub async fn existing_ids(pool: &PgPool, ids: &[i64]) -> Result<Vec<i64>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut query_builder =
            sqlx::QueryBuilder::<Postgres>::new("SELECT id FROM choices WHERE id IN (");
        let mut separated = query_builder.separated(",");
        for id in ids {
            separated.push_bind(id);
        }
        separated.push_unseparated(")");

        let rows: Vec<(i64,)> = query_builder.build_query_as().fetch_all(pool).await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Loads full choice rows for a set of ids, correctness included. Used to
    /// associate a mini test's selected answers back to their questions.
    pub async fn by_ids(pool: &PgPool, ids: &[i64]) -> Result<Vec<Choice>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut query_builder = sqlx::QueryBuilder::<Postgres>::new(
            "SELECT id, question_id, content, is_correct FROM choices WHERE id IN (",
        );
        let mut separated = query_builder.separated(",");
        for id in ids {
            separated.push_bind(id);
        }
        separated.push_unseparated(")");

        query_builder.build_query_as().fetch_all(pool).await
    }

    /// All choices belonging to the given questions.
    pub async fn for_questions(pool: &PgPool, question_ids: &[i64]) -> Result<Vec<Choice>, sqlx::Error> {
        if question_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut query_builder = sqlx::QueryBuilder::<Postgres>::new(
            "SELECT id, question_id, content, is_correct FROM choices WHERE question_id IN (",
        );
        let mut separated = query_builder.separated(",");
        for id in question_ids {
            separated.push_bind(id);
        }
        separated.push_unseparated(") ORDER BY id");

        query_builder.build_query_as().fetch_all(pool).await
    }
}
