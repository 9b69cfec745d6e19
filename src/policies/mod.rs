// src/policies/mod.rs
//
// Capability checks for record access. Each policy answers, for a given
// (acting user, record, action), whether the operation is permitted, and
// exposes a scope that narrows list views to what the user may see. Handlers
// log denials distinctly from missing records; an unauthorized show-by-id is
// surfaced to the caller as not-found so existence never leaks.

pub mod examination_policy;
pub mod score_policy;

pub use examination_policy::ExaminationPolicy;
pub use score_policy::ScorePolicy;

use async_trait::async_trait;
use sqlx::PgPool;

use crate::models::user::User;

/// The controller-level actions a policy rules on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Index,
    Show,
    Create,
    New,
    Update,
    Edit,
    Destroy,
}

#[async_trait]
pub trait Policy {
    /// What the per-record check rules on.
    type Record;
    /// What the list scope yields.
    type Scoped;

    /// Whether `user` may perform `action` on `record`. The middleware has
    /// already established authentication; this only rules on capability.
    fn allows(user: &User, record: &Self::Record, action: Action) -> bool;

    /// The subset of records `user` may see, evaluated eagerly.
    async fn scope(pool: &PgPool, user: &User) -> Result<Vec<Self::Scoped>, sqlx::Error>;
}
