//! Event system for pipeline observability.
//!
//! Every stage of the orchestrator emits structured log events instead of
//! writing ad-hoc strings. This mirrors the event-listener pattern used
//! throughout the resilience layers this workspace is built on, generalized
//! from a single-event-type-per-layer design to one shared, stage-tagged
//! event envelope that the orchestrator accumulates into `SearchResult::logs`.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

/// The pipeline stage that produced a [`LogEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Discovery,
    Rerank,
    Filter,
    Prioritise,
    Extract,
    Quality,
    AutoExpand,
    Rank,
    Orchestrator,
    Cache,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Discovery => "discovery",
            Stage::Rerank => "rerank",
            Stage::Filter => "filter",
            Stage::Prioritise => "prioritise",
            Stage::Extract => "extract",
            Stage::Quality => "quality",
            Stage::AutoExpand => "auto_expand",
            Stage::Rank => "rank",
            Stage::Orchestrator => "orchestrator",
            Stage::Cache => "cache",
        }
    }
}

/// A single ordered log entry, as required by `SearchResult.logs` (spec §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEvent {
    pub stage: Stage,
    pub message: String,
    /// Milliseconds since the UNIX epoch.
    pub timestamp: u64,
    pub data: serde_json::Value,
}

impl LogEvent {
    pub fn new(stage: Stage, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
            timestamp: now_millis(),
            data: serde_json::Value::Null,
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Thread-safe append-only log accumulator shared across pipeline stages.
///
/// Stages hold a clone and push events as they occur; the orchestrator reads
/// the final ordered sequence out at the end of the run.
#[derive(Clone, Default)]
pub struct LogSink {
    inner: Arc<Mutex<Vec<LogEvent>>>,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: LogEvent) {
        #[cfg(feature = "tracing")]
        tracing::debug!(stage = event.stage.as_str(), message = %event.message, "pipeline event");
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).push(event);
    }

    pub fn log(&self, stage: Stage, message: impl Into<String>) {
        self.push(LogEvent::new(stage, message));
    }

    pub fn log_with(&self, stage: Stage, message: impl Into<String>, data: serde_json::Value) {
        self.push(LogEvent::new(stage, message).with_data(data));
    }

    /// Drains the accumulated events in insertion order.
    pub fn into_events(self) -> Vec<LogEvent> {
        match Arc::try_unwrap(self.inner) {
            Ok(mutex) => mutex.into_inner().unwrap_or_else(|e| e.into_inner()),
            Err(arc) => arc.lock().unwrap_or_else(|e| e.into_inner()).clone(),
        }
    }

    pub fn snapshot(&self) -> Vec<LogEvent> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}
