// src/policies/examination_policy.rs

use async_trait::async_trait;
use sqlx::PgPool;

use crate::models::{examination::Examination, user::User};
use crate::policies::{Action, Policy};

/// Examinations belong to the user who took them. Results are immutable once
/// created, so update and edit are denied for everyone, owner included.
pub struct ExaminationPolicy;

#[async_trait]
impl Policy for ExaminationPolicy {
    type Record = Examination;
    type Scoped = Examination;

    fn allows(user: &User, record: &Examination, action: Action) -> bool {
        match action {
            // Any authenticated user may list their attempts or create one.
            Action::Index | Action::Create | Action::New => true,
            Action::Show | Action::Destroy => record.user_id == user.id,
            Action::Update | Action::Edit => false,
        }
    }

    async fn scope(pool: &PgPool, user: &User) -> Result<Vec<Examination>, sqlx::Error> {
        Examination::for_user(pool, user.id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(id: i64) -> User {
        User {
            id,
            email: format!("user{}@example.org", id),
            username: "someone".to_string(),
            password: "hash".to_string(),
            admin: false,
            guest_limit_reached_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn examination(user_id: i64) -> Examination {
        Examination {
            id: 1,
            user_id,
            test_id: 1,
            attempt_date: Utc::now(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn owner_may_show_and_destroy() {
        let owner = user(1);
        let record = examination(1);
        assert!(ExaminationPolicy::allows(&owner, &record, Action::Show));
        assert!(ExaminationPolicy::allows(&owner, &record, Action::Destroy));
    }

    #[test]
    fn non_owner_may_not_show_or_destroy() {
        let other = user(2);
        let record = examination(1);
        assert!(!ExaminationPolicy::allows(&other, &record, Action::Show));
        assert!(!ExaminationPolicy::allows(&other, &record, Action::Destroy));
    }

    #[test]
    fn results_are_immutable_even_for_the_owner() {
        let owner = user(1);
        let record = examination(1);
        assert!(!ExaminationPolicy::allows(&owner, &record, Action::Update));
        assert!(!ExaminationPolicy::allows(&owner, &record, Action::Edit));
    }

    #[test]
    fn any_authenticated_user_may_index_and_create() {
        let other = user(2);
        let record = examination(1);
        assert!(ExaminationPolicy::allows(&other, &record, Action::Index));
        assert!(ExaminationPolicy::allows(&other, &record, Action::Create));
        assert!(ExaminationPolicy::allows(&other, &record, Action::New));
    }
}
