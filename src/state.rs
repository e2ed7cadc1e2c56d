use std::sync::Arc;
use std::time::{Instant, SystemTime};

use crate::config::Config;
use crate::db::Database;
use crate::services::email_provider::EmailService;
use crate::services::session_store::SessionStore;

#[derive(Clone)]
pub struct AppState {
    started_at: Instant,
    started_at_system: SystemTime,
    config: Arc<Config>,
    db: Database,
    sessions: Arc<SessionStore>,
    email_service: Arc<EmailService>,
}

impl AppState {
    pub fn new(config: Config, db: Database, email_service: EmailService) -> Self {
        Self {
            started_at: Instant::now(),
            started_at_system: SystemTime::now(),
            config: Arc::new(config),
            db,
            sessions: Arc::new(SessionStore::new()),
            email_service: Arc::new(email_service),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn started_at_system(&self) -> SystemTime {
        self.started_at_system
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn sessions(&self) -> Arc<SessionStore> {
        Arc::clone(&self.sessions)
    }

    pub fn email_service(&self) -> Arc<EmailService> {
        Arc::clone(&self.email_service)
    }
}
