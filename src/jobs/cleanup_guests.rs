// src/jobs/cleanup_guests.rs

use sqlx::PgPool;
use std::time::Duration;

use crate::models::user::User;

/// One sweep over expired guest identities. Deletes each old guest
/// individually (examinations, responses, and scores cascade) and returns the
/// number removed. Stateless and safe to re-run: a second invocation with no
/// new old guests deletes nothing.
pub async fn run(pool: &PgPool) -> Result<u64, sqlx::Error> {
    let deleted = User::cleanup_old_guests(pool).await?;
    tracing::info!("Guest cleanup removed {} old guest users", deleted);
    Ok(deleted)
}

/// Registers the periodic guest cleanup at process startup: one named task,
/// one entry point, externally driven by the interval timer. The task keeps
/// no state between runs.
pub fn spawn_scheduler(pool: PgPool, interval_secs: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
        // The first tick fires immediately; skip it so startup isn't a sweep.
        interval.tick().await;
        loop {
            interval.tick().await;
            if let Err(e) = run(&pool).await {
                tracing::error!("Guest cleanup sweep failed: {:?}", e);
            }
        }
    });
    tracing::info!(
        "Registered guest cleanup task (every {} seconds)",
        interval_secs
    );
}
