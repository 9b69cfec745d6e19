// src/models/user.rs

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use validator::Validate;

use crate::{
    config::{GUEST_EMAIL_DOMAIN, GUEST_EMAIL_PREFIX, GUEST_EXAM_LIMIT, GUEST_RETENTION_DAYS},
    error::AppError,
    utils::hash::hash_password,
};

/// Central guest classification predicate.
///
/// An identity is a guest if and only if its email matches the reserved
/// synthetic pattern. Every consumer (quota check, policies, cleanup sweep,
/// admin seeding) goes through here; the pattern is never re-derived ad hoc.
pub fn is_guest_email(email: &str) -> bool {
    email.starts_with(GUEST_EMAIL_PREFIX) && email.ends_with(GUEST_EMAIL_DOMAIN)
}

/// Represents the 'users' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,

    /// Unique email. Guest identities use the reserved
    /// `guest_<hex>@example.com` pattern.
    pub email: String,

    /// Display name.
    pub username: String,

    /// Argon2 password hash.
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub password: String,

    pub admin: bool,

    /// Sticky quota marker: set once a guest reaches the examination limit,
    /// cleared only when the guest converts to a registered account.
    pub guest_limit_reached_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub async fn find(pool: &PgPool, id: i64) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, username, password, admin, guest_limit_reached_at,
                   created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, username, password, admin, guest_limit_reached_at,
                   created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await
    }

    pub fn is_guest(&self) -> bool {
        is_guest_email(&self.email)
    }

    pub fn guest_limit_reached(&self) -> bool {
        self.guest_limit_reached_at.is_some()
    }

    pub async fn examination_count(&self, pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM examinations WHERE user_id = $1")
                .bind(self.id)
                .fetch_one(pool)
                .await?;
        Ok(count)
    }

    /// Quota check: the sticky flag OR the live attempt count. The flag keeps
    /// a guest capped even after some of their attempts are deleted.
    /// Registered users are never limited.
    pub async fn guest_examination_limit_reached(&self, pool: &PgPool) -> Result<bool, sqlx::Error> {
        if !self.is_guest() {
            return Ok(false);
        }
        if self.guest_limit_reached() {
            return Ok(true);
        }
        Ok(self.examination_count(pool).await? >= GUEST_EXAM_LIMIT)
    }

    /// Sets the sticky quota marker. Idempotent: a second racing set keeps the
    /// first timestamp. No-op for registered users.
    pub async fn mark_guest_limit_reached(&self, pool: &PgPool) -> Result<(), sqlx::Error> {
        if !self.is_guest() {
            return Ok(());
        }
        sqlx::query(
            "UPDATE users SET guest_limit_reached_at = NOW(), updated_at = NOW()
             WHERE id = $1 AND guest_limit_reached_at IS NULL",
        )
        .bind(self.id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Post-commit bookkeeping for the submission pipeline: once a guest's
    /// attempt count reaches the limit, set the flag. Runs strictly after the
    /// triggering examination's transaction commits, so concurrent
    /// submissions by the same guest may briefly overrun the quota before
    /// the flag takes effect.
    pub async fn mark_guest_limit_if_reached(&self, pool: &PgPool) -> Result<(), sqlx::Error> {
        if !self.is_guest() {
            return Ok(());
        }
        if self.examination_count(pool).await? >= GUEST_EXAM_LIMIT {
            self.mark_guest_limit_reached(pool).await?;
        }
        Ok(())
    }

    /// Creates an ephemeral guest identity with random credentials.
    pub async fn create_guest(pool: &PgPool) -> Result<User, AppError> {
        // Confine the non-`Send` `ThreadRng` to a sync block so it never
        // straddles the `.await` below (axum handler futures must be `Send`).
        let (email, raw_password) = {
            let mut rng = rand::thread_rng();
            let token: [u8; 5] = rng.r#gen();
            let email = format!(
                "{}{}{}",
                GUEST_EMAIL_PREFIX,
                token.iter().map(|b| format!("{:02x}", b)).collect::<String>(),
                GUEST_EMAIL_DOMAIN
            );
            let raw_password: String = (&mut rng)
                .sample_iter(&rand::distributions::Alphanumeric)
                .take(24)
                .map(char::from)
                .collect();
            (email, raw_password)
        };
        let password = hash_password(&raw_password)?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, username, password)
            VALUES ($1, $2, $3)
            RETURNING id, email, username, password, admin, guest_limit_reached_at,
                      created_at, updated_at
            "#,
        )
        .bind(&email)
        .bind("Guest User")
        .bind(&password)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Deletes the user; examinations, responses, and scores go with it
    /// through the cascade.
    pub async fn destroy(&self, pool: &PgPool) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(self.id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Guest identities created before the retention window.
    ///
    /// The SQL LIKE is only a prefilter; the rows are re-checked against the
    /// central predicate before anything is destroyed.
    pub async fn old_guests(pool: &PgPool) -> Result<Vec<User>, sqlx::Error> {
        let cutoff = Utc::now() - Duration::days(GUEST_RETENTION_DAYS);
        let candidates = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, username, password, admin, guest_limit_reached_at,
                   created_at, updated_at
            FROM users
            WHERE email LIKE 'guest\_%@example.com' AND created_at < $1
            "#,
        )
        .bind(cutoff)
        .fetch_all(pool)
        .await?;

        Ok(candidates.into_iter().filter(User::is_guest).collect())
    }

    /// Destroys expired guests one by one and returns how many were removed.
    /// A failure on one guest is logged and does not abort the sweep; no
    /// transaction spans the whole run.
    pub async fn cleanup_old_guests(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let mut deleted = 0u64;
        for guest in User::old_guests(pool).await? {
            match guest.destroy(pool).await {
                Ok(()) => deleted += 1,
                Err(e) => {
                    tracing::error!("Failed to delete guest user {}: {:?}", guest.id, e);
                }
            }
        }
        Ok(deleted)
    }
}

/// DTO for creating a new user (Registration).
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "A valid email is required."))]
    pub email: String,
    #[validate(length(min = 1, max = 50, message = "Username must be 1-50 characters."))]
    pub username: String,
    #[validate(length(
        min = 8,
        max = 128,
        message = "Password length must be between 8 and 128 characters."
    ))]
    pub password: String,
}

/// DTO for user login.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 255))]
    pub email: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

/// DTO for account update; also the guest-to-registered conversion path.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateAccountRequest {
    #[validate(email(message = "A valid email is required."))]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 50, message = "Username must be 1-50 characters."))]
    pub username: Option<String>,
    #[validate(length(
        min = 8,
        max = 128,
        message = "Password length must be between 8 and 128 characters."
    ))]
    pub password: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with(email: &str, flagged: bool) -> User {
        User {
            id: 1,
            email: email.to_string(),
            username: "someone".to_string(),
            password: "hash".to_string(),
            admin: false,
            guest_limit_reached_at: flagged.then(Utc::now),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn guest_email_pattern_matches_reserved_form_only() {
        assert!(is_guest_email("guest_ab12cd34ef@example.com"));
        assert!(!is_guest_email("alice@example.com"));
        assert!(!is_guest_email("guest_abc@elsewhere.org"));
        assert!(!is_guest_email("prefix_guest_abc@example.com"));
    }

    #[test]
    fn guest_predicate_goes_through_email_pattern() {
        assert!(user_with("guest_0011223344@example.com", false).is_guest());
        assert!(!user_with("bob@example.com", false).is_guest());
    }

    #[test]
    fn sticky_flag_reads_from_timestamp() {
        assert!(user_with("guest_0011223344@example.com", true).guest_limit_reached());
        assert!(!user_with("guest_0011223344@example.com", false).guest_limit_reached());
    }
}
