//! Core infrastructure for the EventScout search orchestrator.
//!
//! This crate provides shared functionality used across every pipeline
//! stage crate: the domain model (spec §3), an event/log system for
//! observability, and the common transient-failure error taxonomy.

pub mod error;
pub mod events;
pub mod types;

pub use error::StageError;
pub use events::{LogEvent, LogSink, Stage};
pub use types::*;
