//! Cache optimisation: dependency-driven invalidation, background warming,
//! and rolling performance analytics (spec §4.12 / C12).

mod analytics;
mod invalidation;
mod warming;

pub use analytics::{AnalyticsCollector, AnalyticsHistory, CacheSnapshot};
pub use invalidation::{spawn_drain_timer, InvalidatableCache, InvalidationGraph, InvalidationRoute};
pub use warming::{WarmableCache, WarmingDataProvider, WarmingOutcome, WarmingRegistry, WarmingStrategy};
