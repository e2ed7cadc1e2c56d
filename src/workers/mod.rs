mod session_cleanup;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, Mutex};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, warn};

use crate::db::{Database, DbError};
use crate::services::session_store::SessionStore;

const TOKEN_CLEANUP_SCHEDULE: &str = "0 0 * * * *";
const STUDY_SESSION_EVICTION_SCHEDULE: &str = "0 * * * * *";

pub struct WorkerManager {
    scheduler: Mutex<JobScheduler>,
    shutdown_tx: broadcast::Sender<()>,
    db: Database,
    sessions: Arc<SessionStore>,
    study_session_ttl: Duration,
}

impl WorkerManager {
    pub async fn new(
        db: Database,
        sessions: Arc<SessionStore>,
        study_session_ttl: Duration,
    ) -> Result<Self, WorkerError> {
        let scheduler = JobScheduler::new().await?;
        let (shutdown_tx, _) = broadcast::channel(1);
        Ok(Self {
            scheduler: Mutex::new(scheduler),
            shutdown_tx,
            db,
            sessions,
            study_session_ttl,
        })
    }

    pub async fn start(&self) -> Result<(), WorkerError> {
        let scheduler = self.scheduler.lock().await;

        {
            let db = self.db.clone();
            let shutdown_rx = self.shutdown_tx.subscribe();
            let job = Job::new_async(TOKEN_CLEANUP_SCHEDULE, move |_uuid, _lock| {
                let db = db.clone();
                let mut rx = shutdown_rx.resubscribe();
                Box::pin(async move {
                    tokio::select! {
                        _ = rx.recv() => {},
                        result = session_cleanup::cleanup_expired_tokens(db) => {
                            if let Err(e) = result {
                                error!(error = %e, "Token cleanup worker error");
                            }
                        }
                    }
                })
            })?;
            scheduler.add(job).await?;
            info!("Token cleanup worker scheduled (hourly)");
        }

        {
            let sessions = Arc::clone(&self.sessions);
            let ttl = self.study_session_ttl;
            let job = Job::new_async(STUDY_SESSION_EVICTION_SCHEDULE, move |_uuid, _lock| {
                let sessions = Arc::clone(&sessions);
                Box::pin(async move {
                    session_cleanup::evict_idle_study_sessions(&sessions, ttl);
                })
            })?;
            scheduler.add(job).await?;
            info!(ttl_secs = ttl.as_secs(), "Study session eviction scheduled (every minute)");
        }

        scheduler.start().await?;
        info!("All workers started");
        Ok(())
    }

    pub async fn stop(&self) {
        info!("Stopping workers...");
        let _ = self.shutdown_tx.send(());
        let mut scheduler = self.scheduler.lock().await;
        if let Err(e) = scheduler.shutdown().await {
            warn!(error = %e, "Error shutting down scheduler");
        }
        info!("Workers stopped");
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("Scheduler error: {0}")]
    Scheduler(#[from] tokio_cron_scheduler::JobSchedulerError),
    #[error("Database error: {0}")]
    Database(#[from] DbError),
}
