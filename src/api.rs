//! HTTP embedding surface
//!
//! The core is transport-agnostic; this module adapts it to a plain
//! request/response API. Outbound prompts land in a per-user outbox the
//! message handler drains into its response.

mod handlers;
mod types;

pub use handlers::create_router;

use crate::db::Database;
use crate::flow::{FlowRuntime, HikeStoreSink, PromptError, PromptSink, SystemClock};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Flow runtime with the production collaborators.
pub type ProductionRuntime = FlowRuntime<OutboxPromptSink, HikeStoreSink, SystemClock>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub runtime: Arc<ProductionRuntime>,
    pub outbox: Arc<OutboxPromptSink>,
    pub db: Database,
}

impl AppState {
    pub fn new(db: Database, offset: chrono::FixedOffset) -> Self {
        let outbox = Arc::new(OutboxPromptSink::new());
        let commits = Arc::new(HikeStoreSink::new(db.clone()));
        let runtime = Arc::new(FlowRuntime::new(
            Arc::clone(&outbox),
            commits,
            SystemClock::new(offset),
        ));
        Self {
            runtime,
            outbox,
            db,
        }
    }
}

/// Prompt sink that buffers prompts per user until the transport picks
/// them up. Delivery cannot fail.
#[derive(Debug, Default)]
pub struct OutboxPromptSink {
    slots: Mutex<HashMap<i64, Vec<String>>>,
}

impl OutboxPromptSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take everything buffered for a user.
    pub fn drain(&self, user_id: i64) -> Vec<String> {
        let mut slots = self.slots.lock().unwrap();
        slots.remove(&user_id).unwrap_or_default()
    }
}

#[async_trait]
impl PromptSink for OutboxPromptSink {
    async fn send_prompt(&self, user_id: i64, text: &str) -> Result<(), PromptError> {
        let mut slots = self.slots.lock().unwrap();
        slots.entry(user_id).or_default().push(text.to_string());
        Ok(())
    }
}
