//! Quality scoring and auto-expand window widening (spec §4.10 / C10).

mod config;
mod expand;
mod filter;
mod merge;
mod solid_hit;

pub use config::{QualityConfig, SolidHitWeights};
pub use expand::compute_expanded_window;
pub use filter::{has_tos_title, is_non_event_url};
pub use merge::merge_solid_candidates;
pub use solid_hit::{is_solid_hit, SolidHit};
