// src/policies/score_policy.rs

use async_trait::async_trait;
use sqlx::PgPool;

use crate::models::{examination::Examination, score::Score, user::User};
use crate::policies::{Action, Policy};

/// Scores are system-derived: visible only through the owning examination,
/// never creatable, mutable, or destroyable by a user.
pub struct ScorePolicy;

#[async_trait]
impl Policy for ScorePolicy {
    /// A score together with its owning examination; ownership of the
    /// examination decides visibility.
    type Record = (Score, Examination);
    type Scoped = Score;

    fn allows(user: &User, record: &(Score, Examination), action: Action) -> bool {
        let (_, examination) = record;
        match action {
            Action::Show => examination.user_id == user.id,
            _ => false,
        }
    }

    async fn scope(pool: &PgPool, user: &User) -> Result<Vec<Score>, sqlx::Error> {
        sqlx::query_as::<_, Score>(
            r#"
            SELECT s.id, s.examination_id, s.correct_count, s.total_questions, s.passed
            FROM scores s
            JOIN examinations e ON s.examination_id = e.id
            WHERE e.user_id = $1
            ORDER BY s.id
            "#,
        )
        .bind(user.id)
        .fetch_all(pool)
        .await
    }
}
