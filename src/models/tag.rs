// src/models/tag.rs

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres};

/// Represents the 'tags' table: labels attached to questions.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

impl Tag {
    /// Subset of `ids` that exist, for bulk existence validation.
    pub async fn existing_ids(pool: &PgPool, ids: &[i64]) -> Result<Vec<i64>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut query_builder =
            sqlx::QueryBuilder::<Postgres>::new("SELECT id FROM tags WHERE id IN (");
        let mut separated = query_builder.separated(",");
        for id in ids {
            separated.push_bind(id);
        }
        separated.push_unseparated(")");

        let rows: Vec<(i64,)> = query_builder.build_query_as().fetch_all(pool).await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}
