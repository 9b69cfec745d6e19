// src/config.rs

use dotenvy::dotenv;
use std::env;

/// Reserved email pattern marking guest identities.
pub const GUEST_EMAIL_PREFIX: &str = "guest_";
pub const GUEST_EMAIL_DOMAIN: &str = "@example.com";

/// How many examinations a guest may submit before the account is capped.
pub const GUEST_EXAM_LIMIT: i64 = 5;

/// Guests older than this are removed by the cleanup sweep.
pub const GUEST_RETENTION_DAYS: i64 = 7;

/// Bulk input bounds for identifier lists.
pub const MAX_QUESTION_IDS: usize = 50;
pub const MAX_CHOICE_IDS: usize = 250;

/// Mini-test search form bounds.
pub const MAX_TAG_IDS: usize = 26;
pub const MAX_TEST_IDS: usize = 10;
pub const MAX_QUESTION_COUNT: i64 = 50;
pub const DEFAULT_QUESTION_COUNT: i64 = 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub rust_log: String,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    /// Seconds between guest cleanup sweeps. Defaults to once a day.
    pub guest_cleanup_interval_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");

        let jwt_expiration = env::var("JWT_EXPIRATION_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(86_400);

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let admin_email = env::var("ADMIN_EMAIL").ok();
        let admin_password = env::var("ADMIN_PASSWORD").ok();

        let guest_cleanup_interval_secs = env::var("GUEST_CLEANUP_INTERVAL_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(86_400);

        Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            rust_log,
            admin_email,
            admin_password,
            guest_cleanup_interval_secs,
        }
    }
}
