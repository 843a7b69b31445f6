//! Paper-trading session registry port.

use crate::domain::paper::Session;

/// Shared registry of paper-trading sessions, keyed by session id.
///
/// Implementations must be safe to call from several threads at once.
/// Mutation of one session must not block reads of another.
pub trait SessionStore: Send + Sync {
    fn insert(&self, session: Session);

    fn get(&self, id: &str) -> Option<Session>;

    /// Every stored session, in no particular order.
    fn list(&self) -> Vec<Session>;

    /// Apply `update` to the session under an exclusive lock and return the
    /// updated copy. `None` when the id is unknown.
    fn modify(&self, id: &str, update: &mut dyn FnMut(&mut Session)) -> Option<Session>;
}
