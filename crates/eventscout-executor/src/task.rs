//! Task and result types for the pool (spec §4.8).

use crate::config::TaskKind;
use std::time::Duration;

/// A unit of work submitted to the pool. `priority` is pulled highest-first;
/// ties keep submission order (the pool sorts with a stable sort).
pub struct Task<T> {
    pub id: String,
    pub data: T,
    pub priority: i64,
    pub kind: TaskKind,
}

impl<T> Task<T> {
    pub fn new(id: impl Into<String>, data: T, priority: i64, kind: TaskKind) -> Self {
        Self {
            id: id.into(),
            data,
            priority,
            kind,
        }
    }
}

/// Outcome of one submitted task. Exactly one of `result`/`error` is set
/// unless the task was cancelled by early termination, in which case both
/// are `None` and `cancelled` is `true`.
#[derive(Debug, Clone)]
pub struct TaskResult<R> {
    pub id: String,
    pub success: bool,
    pub result: Option<R>,
    pub duration: Duration,
    pub error: Option<String>,
    pub cancelled: bool,
}

impl<R> TaskResult<R> {
    pub fn success(id: impl Into<String>, result: R, duration: Duration) -> Self {
        Self {
            id: id.into(),
            success: true,
            result: Some(result),
            duration,
            error: None,
            cancelled: false,
        }
    }

    pub fn failure(id: impl Into<String>, error: impl Into<String>, duration: Duration) -> Self {
        Self {
            id: id.into(),
            success: false,
            result: None,
            duration,
            error: Some(error.into()),
            cancelled: false,
        }
    }

    pub fn cancelled(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            success: false,
            result: None,
            duration: Duration::ZERO,
            error: Some("cancelled".to_string()),
            cancelled: true,
        }
    }
}
