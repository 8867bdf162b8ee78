//! Voyage rerank gate: reduces the candidate URL set before the expensive
//! LLM prioritiser call (spec §4.6 / C6).

mod config;
mod gate;
mod reranker;

pub use config::RerankConfig;
pub use gate::{gate, RerankMetrics};
pub use reranker::{build_instruction, Reranker};
