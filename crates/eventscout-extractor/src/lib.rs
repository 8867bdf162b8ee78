//! Deep-crawl extractor: main page plus speaker sub-pages, metadata and
//! speaker parsing (spec §4.9 / C9).

mod config;
mod discovery;
mod extractor;
mod metadata;
mod scraper;
mod speakers;

pub use config::ExtractorConfig;
pub use discovery::discover_subpages;
pub use extractor::Extractor;
pub use metadata::{merge_metadata, rule_based_metadata, FromLlmJson, MetadataLlm, RawMetadata};
pub use scraper::PageScraper;
pub use speakers::extract_speakers;
