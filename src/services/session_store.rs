use std::collections::HashMap;
use std::time::Duration;

use parking_lot::RwLock;

use super::study_session::StudySession;

/// In-memory study sessions keyed by id. Sessions belong to one user and are
/// invisible to everybody else.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, StudySession>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, session: StudySession) {
        self.sessions.write().insert(session.id.clone(), session);
    }

    /// Runs `f` on the session if it exists and belongs to `user_id`.
    pub fn with_session<T>(
        &self,
        id: &str,
        user_id: &str,
        f: impl FnOnce(&mut StudySession) -> T,
    ) -> Option<T> {
        let mut sessions = self.sessions.write();
        let session = sessions.get_mut(id).filter(|s| s.user_id == user_id)?;
        session.touch();
        Some(f(session))
    }

    pub fn remove(&self, id: &str, user_id: &str) -> bool {
        let mut sessions = self.sessions.write();
        if sessions.get(id).is_some_and(|s| s.user_id == user_id) {
            sessions.remove(id);
            return true;
        }
        false
    }

    /// Drops sessions untouched for longer than `ttl`.
    pub fn evict_idle(&self, ttl: Duration) -> usize {
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|_, session| session.idle_for() <= ttl);
        before - sessions.len()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
