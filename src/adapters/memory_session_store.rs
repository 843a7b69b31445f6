//! In-process session registry.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::domain::paper::Session;
use crate::ports::session_port::SessionStore;

/// Sessions live for the lifetime of the store.
///
/// The map lock is held for writing only on insert. Each session has its own
/// lock, so stopping one session never blocks reads of another.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, Arc<RwLock<Session>>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, id: &str) -> Option<Arc<RwLock<Session>>> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }
}

impl SessionStore for InMemorySessionStore {
    fn insert(&self, session: Session) {
        let id = session.id.clone();
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Arc::new(RwLock::new(session)));
    }

    fn get(&self, id: &str) -> Option<Session> {
        let entry = self.entry(id)?;
        let session = entry.read().unwrap_or_else(PoisonError::into_inner);
        Some(session.clone())
    }

    fn list(&self) -> Vec<Session> {
        let entries: Vec<Arc<RwLock<Session>>> = self
            .sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        entries
            .iter()
            .map(|e| e.read().unwrap_or_else(PoisonError::into_inner).clone())
            .collect()
    }

    fn modify(&self, id: &str, update: &mut dyn FnMut(&mut Session)) -> Option<Session> {
        let entry = self.entry(id)?;
        let mut session = entry.write().unwrap_or_else(PoisonError::into_inner);
        update(&mut session);
        Some(session.clone())
    }
}
