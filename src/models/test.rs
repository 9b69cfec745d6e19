// src/models/test.rs

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres};

/// Represents the 'tests' table: a named exam definition.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Test {
    pub id: i64,
    pub title: String,
    /// Percentage of questions (0-100) that must be correct to pass.
    pub pass_mark: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Test {
    pub async fn find(pool: &PgPool, id: i64) -> Result<Option<Test>, sqlx::Error> {
        sqlx::query_as::<_, Test>("SELECT id, title, pass_mark, created_at FROM tests WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Test>, sqlx::Error> {
        sqlx::query_as::<_, Test>("SELECT id, title, pass_mark, created_at FROM tests ORDER BY id")
            .fetch_all(pool)
            .await
    }

    /// Subset of `ids` that exist, for bulk existence validation.
    pub async fn existing_ids(pool: &PgPool, ids: &[i64]) -> Result<Vec<i64>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut query_builder =
            sqlx::QueryBuilder::<Postgres>::new("SELECT id FROM tests WHERE id IN (");
        let mut separated = query_builder.separated(",");
        for id in ids {
            separated.push_bind(id);
        }
        separated.push_unseparated(")");

        let rows: Vec<(i64,)> = query_builder.build_query_as().fetch_all(pool).await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}
