//! Top-level pipeline wiring every EventScout stage into one call, plus the
//! aggregated configuration surface and a CLI demo binary.
//!
//! Generalizes `tower_resilience_coalesce`'s composition root: the same way
//! that crate wires a rate limiter, circuit breaker and retry layer around a
//! single service call, this crate wires discovery, reranking,
//! prioritisation, extraction and quality scoring around a single
//! `SearchParams -> SearchResult` call, with a whole-pipeline result cache
//! and in-flight dedup sitting at the very top.

mod cache;
mod collaborators;
mod config;
mod error;
mod pipeline;
mod query;

pub mod demo;

pub use cache::{normalise_key, ResultInFlight, SharedResultInFlight};
pub use collaborators::{StaticUserProfileStore, UserProfileStore};
pub use config::{Limits, OrchestratorConfig, Parallel, SearchTuning, Thresholds, Timeouts, Warming};
pub use error::OrchestratorError;
pub use pipeline::Orchestrator;
pub use query::{build_base_query, query_variations};
