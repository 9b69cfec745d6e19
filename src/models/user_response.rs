// src/models/user_response.rs

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection, PgPool, Postgres};

use crate::{config::MAX_CHOICE_IDS, utils::sanitize};

/// Represents the 'user_responses' table: one (examination, choice) pair
/// recording what the user selected.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub examination_id: i64,
    pub choice_id: i64,
}

impl UserResponse {
    /// Bulk-inserts one response per choice id for the given examination.
    ///
    /// The whole set is validated before anything is written: an empty list,
    /// more than the maximum, duplicates, or ids with no matching choice row
    /// reject the step and return `Ok(false)` with the reason logged. The
    /// caller runs this inside its transaction, so a rejection leaves no
    /// partial response set behind.
    pub async fn bulk_create_responses(
        conn: &mut PgConnection,
        examination_id: i64,
        choice_ids: &[i64],
    ) -> Result<bool, sqlx::Error> {
        if choice_ids.is_empty() {
            tracing::error!("No choice IDs submitted for examination {}", examination_id);
            return Ok(false);
        }

        if choice_ids.len() > MAX_CHOICE_IDS {
            tracing::error!("Too many choice IDs: {}", choice_ids.len());
            return Ok(false);
        }

        let duplicates = sanitize::duplicate_ids(choice_ids);
        if !duplicates.is_empty() {
            tracing::error!(
                "Duplicate choice IDs detected: {}",
                duplicates
                    .iter()
                    .map(|id| id.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            return Ok(false);
        }

        let mut query_builder =
            sqlx::QueryBuilder::<Postgres>::new("SELECT id FROM choices WHERE id IN (");
        let mut separated = query_builder.separated(",");
        for id in choice_ids {
            separated.push_bind(id);
        }
        separated.push_unseparated(")");

        let existing: Vec<(i64,)> = query_builder.build_query_as().fetch_all(&mut *conn).await?;
        if existing.len() != choice_ids.len() {
            let existing: std::collections::HashSet<i64> =
                existing.into_iter().map(|(id,)| id).collect();
            let missing: Vec<String> = choice_ids
                .iter()
                .filter(|id| !existing.contains(id))
                .map(|id| id.to_string())
                .collect();
            tracing::error!("Missing choice IDs: {}", missing.join(", "));
            return Ok(false);
        }

        let mut insert =
            sqlx::QueryBuilder::<Postgres>::new("INSERT INTO user_responses (examination_id, choice_id) ");
        insert.push_values(choice_ids.iter(), |mut row, choice_id| {
            row.push_bind(examination_id).push_bind(choice_id);
        });
        insert.build().execute(&mut *conn).await?;

        Ok(true)
    }

    /// All responses of an examination, joined with their choice rows so the
    /// attempt can be redisplayed with correctness.
    pub async fn for_examination(
        pool: &PgPool,
        examination_id: i64,
    ) -> Result<Vec<ResponseView>, sqlx::Error> {
        sqlx::query_as::<_, ResponseView>(
            r#"
            SELECT ur.id, ur.choice_id, c.question_id, c.content, c.is_correct
            FROM user_responses ur
            JOIN choices c ON ur.choice_id = c.id
            WHERE ur.examination_id = $1
            ORDER BY ur.id
            "#,
        )
        .bind(examination_id)
        .fetch_all(pool)
        .await
    }
}

/// A recorded response with its choice, for examination display.
#[derive(Debug, FromRow, Serialize)]
pub struct ResponseView {
    pub id: i64,
    pub choice_id: i64,
    pub question_id: i64,
    pub content: String,
    pub is_correct: bool,
}
