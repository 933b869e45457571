//! Trait abstractions for the flow runtime's collaborators
//!
//! These traits let tests drive the runtime with mock implementations
//! and keep the embedding transport out of the core.

use crate::db::{Database, NewHike};
use crate::state_machine::state::{field, STAGED_STAMP_FORMAT};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Prompt delivery failed; the embedding system decides what to do.
#[derive(Debug, Error)]
#[error("prompt delivery failed: {0}")]
pub struct PromptError(pub String);

/// The commit collaborator rejected or failed to persist a draft.
#[derive(Debug, Error)]
pub enum CommitError {
    #[error("staged field `{0}` is missing or malformed")]
    InvalidField(&'static str),
    #[error(transparent)]
    Store(#[from] crate::db::DbError),
}

/// Delivers outbound prompts to a user.
#[async_trait]
pub trait PromptSink: Send + Sync {
    async fn send_prompt(&self, user_id: i64, text: &str) -> Result<(), PromptError>;
}

/// Persists a fully collected draft.
#[async_trait]
pub trait CommitSink: Send + Sync {
    async fn commit(
        &self,
        fields: &HashMap<String, String>,
        tz: FixedOffset,
    ) -> Result<(), CommitError>;
}

/// Injected reference clock. The returned instant carries the fixed
/// offset used for all date resolution.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: PromptSink + ?Sized> PromptSink for Arc<T> {
    async fn send_prompt(&self, user_id: i64, text: &str) -> Result<(), PromptError> {
        (**self).send_prompt(user_id, text).await
    }
}

#[async_trait]
impl<T: CommitSink + ?Sized> CommitSink for Arc<T> {
    async fn commit(
        &self,
        fields: &HashMap<String, String>,
        tz: FixedOffset,
    ) -> Result<(), CommitError> {
        (**self).commit(fields, tz).await
    }
}

impl<T: Clock + ?Sized> Clock for Arc<T> {
    fn now(&self) -> DateTime<FixedOffset> {
        (**self).now()
    }
}

// ============================================================================
// Production Adapters
// ============================================================================

/// Wall clock pinned to the configured offset.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    offset: FixedOffset,
}

impl SystemClock {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.offset)
    }
}

/// Commit sink backed by the hike store.
///
/// Parses the staged `%d.%m.%Y %H:%M` stamps back into instants in the
/// injected offset and inserts the hike.
#[derive(Clone)]
pub struct HikeStoreSink {
    db: Database,
}

impl HikeStoreSink {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CommitSink for HikeStoreSink {
    async fn commit(
        &self,
        fields: &HashMap<String, String>,
        tz: FixedOffset,
    ) -> Result<(), CommitError> {
        let new = NewHike {
            title: fields.get(field::TITLE).cloned().unwrap_or_default(),
            description: fields.get(field::DESCRIPTION).cloned().unwrap_or_default(),
            starts_at: staged_stamp(fields, field::STARTS_AT, tz)?,
            ends_at: staged_stamp(fields, field::ENDS_AT, tz)?,
        };
        self.db.create_hike(&new)?;
        Ok(())
    }
}

fn staged_stamp(
    fields: &HashMap<String, String>,
    key: &'static str,
    tz: FixedOffset,
) -> Result<DateTime<FixedOffset>, CommitError> {
    let raw = fields.get(key).ok_or(CommitError::InvalidField(key))?;
    let naive = NaiveDateTime::parse_from_str(raw, STAGED_STAMP_FORMAT)
        .map_err(|_| CommitError::InvalidField(key))?;
    tz.from_local_datetime(&naive)
        .single()
        .ok_or(CommitError::InvalidField(key))
}
