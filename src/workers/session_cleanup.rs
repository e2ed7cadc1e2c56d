use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::db::operations::{auth_sessions, password_reset};
use crate::db::{now_iso, Database};
use crate::services::session_store::SessionStore;

#[derive(Debug, Default)]
struct CleanupStats {
    expired_sessions: u64,
    stale_reset_tokens: u64,
    duration_secs: f64,
}

/// Drops auth sessions past their expiry and reset tokens that are used or expired.
pub async fn cleanup_expired_tokens(db: Database) -> Result<(), super::WorkerError> {
    let start = Instant::now();
    debug!("Starting token cleanup cycle");

    let now = now_iso();
    let mut stats = CleanupStats {
        expired_sessions: auth_sessions::delete_expired_sessions(&db, &now).await?,
        stale_reset_tokens: password_reset::delete_stale_tokens(&db, &now).await?,
        ..CleanupStats::default()
    };
    stats.duration_secs = start.elapsed().as_secs_f64();

    info!(
        expired_sessions = stats.expired_sessions,
        stale_reset_tokens = stats.stale_reset_tokens,
        duration_secs = format!("{:.2}", stats.duration_secs),
        "Token cleanup completed"
    );

    Ok(())
}

pub fn evict_idle_study_sessions(store: &SessionStore, ttl: Duration) -> usize {
    let evicted = store.evict_idle(ttl);
    if evicted > 0 {
        info!(evicted, remaining = store.len(), "Idle study sessions evicted");
    }
    evicted
}
