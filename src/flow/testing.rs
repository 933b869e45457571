//! Mock collaborators for flow tests

use super::traits::{Clock, CommitError, CommitSink, PromptError, PromptSink};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, TimeZone};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// Prompt sink that records everything it is asked to deliver.
#[derive(Debug, Default)]
pub struct RecordingPromptSink {
    sent: Mutex<Vec<(i64, String)>>,
    fail: Mutex<bool>,
}

impl RecordingPromptSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent delivery fail.
    pub fn start_failing(&self) {
        *self.fail.lock().unwrap() = true;
    }

    pub fn recorded(&self) -> Vec<(i64, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl PromptSink for RecordingPromptSink {
    async fn send_prompt(&self, user_id: i64, text: &str) -> Result<(), PromptError> {
        if *self.fail.lock().unwrap() {
            return Err(PromptError("delivery disabled".to_string()));
        }
        self.sent.lock().unwrap().push((user_id, text.to_string()));
        Ok(())
    }
}

/// Commit sink with a queue of scripted failures; once the queue is
/// empty every commit succeeds and is recorded.
#[derive(Debug, Default)]
pub struct ScriptedCommitSink {
    failures: Mutex<VecDeque<CommitError>>,
    committed: Mutex<Vec<HashMap<String, String>>>,
}

impl ScriptedCommitSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next(&self, error: CommitError) {
        self.failures.lock().unwrap().push_back(error);
    }

    pub fn recorded(&self) -> Vec<HashMap<String, String>> {
        self.committed.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommitSink for ScriptedCommitSink {
    async fn commit(
        &self,
        fields: &HashMap<String, String>,
        _tz: FixedOffset,
    ) -> Result<(), CommitError> {
        if let Some(error) = self.failures.lock().unwrap().pop_front() {
            return Err(error);
        }
        self.committed.lock().unwrap().push(fields.clone());
        Ok(())
    }
}

/// Clock frozen at a known instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl FixedClock {
    /// 2024-03-15 12:00 at +03:00, the reference instant most tests use.
    pub fn mid_march() -> Self {
        let tz = FixedOffset::east_opt(3 * 3600).unwrap();
        Self(tz.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}
