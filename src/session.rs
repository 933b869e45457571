//! In-memory per-user session store
//!
//! One mutable record per user, guarded by a single coarse lock: every
//! operation serializes against every other, which is fine here because
//! session cardinality equals concurrent operators, not end users.
//!
//! Sessions have no expiry. An abandoned flow stays in memory until an
//! explicit cancel, a successful commit, or process restart.

use crate::state_machine::FlowState;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Default)]
struct Session {
    state: FlowState,
    fields: HashMap<String, String>,
}

/// Thread-safe store of in-progress intake sessions.
///
/// All operations are total: none blocks (beyond the lock) or fails. A
/// user with no record is in `FlowState::Idle`.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<i64, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state for a user; `Idle` if no record exists.
    pub fn state(&self, user_id: i64) -> FlowState {
        let sessions = self.sessions.lock().unwrap();
        sessions.get(&user_id).map_or(FlowState::Idle, |s| s.state)
    }

    /// Set the state, creating the record if absent.
    pub fn set_state(&self, user_id: i64, state: FlowState) {
        let mut sessions = self.sessions.lock().unwrap();
        sessions.entry(user_id).or_default().state = state;
    }

    /// Upsert one collected field, creating the record if absent.
    pub fn put_field(&self, user_id: i64, key: &str, value: &str) {
        let mut sessions = self.sessions.lock().unwrap();
        sessions
            .entry(user_id)
            .or_default()
            .fields
            .insert(key.to_string(), value.to_string());
    }

    /// Defensive copy of the collected fields; empty if no record.
    pub fn fields(&self, user_id: i64) -> HashMap<String, String> {
        let sessions = self.sessions.lock().unwrap();
        sessions
            .get(&user_id)
            .map(|s| s.fields.clone())
            .unwrap_or_default()
    }

    /// Delete the record entirely.
    pub fn reset(&self, user_id: i64) {
        let mut sessions = self.sessions.lock().unwrap();
        sessions.remove(&user_id);
    }
}
