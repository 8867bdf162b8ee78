//! LLM-backed URL prioritiser: chunked scoring, JSON repair, heuristic
//! fallback, and post-LLM bias (spec §4.7 / C7).

mod client;
mod config;
mod engine;
mod json_repair;
mod scoring;

pub use client::{classify, FailureCategory, PrioritiserLlm};
pub use config::PrioritiserConfig;
pub use engine::{Prioritiser, PrioritiserMetrics};
pub use scoring::{calculate_url_bonus, fallback_score};
