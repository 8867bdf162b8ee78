//! Unified multi-provider event search (spec §4.5 / C5).

mod engine;
mod error;
mod item;
mod provider;
mod query;

pub use engine::{SearchEngine, CSE_DEADLINE, DATABASE_DEADLINE, FIRECRAWL_DEADLINE};
pub use error::SearchError;
pub use item::{SearchItem, SearchResponse};
pub use provider::{DatabaseProvider, SearchProvider};
pub use query::{normalise_cache_key, passes_country_filter, simplify_cse_query, SearchRequest};
