//! The fetch boundary this crate needs from a web scraper (spec §4.9 step 1
//! names "request the page as Markdown via the scraper" as a narrow
//! collaborator interface, per spec §1's out-of-scope note on third-party
//! transports).

use async_trait::async_trait;
use eventscout_core::StageError;
use std::sync::Arc;

/// Fetches a single URL and returns its content rendered as Markdown.
#[async_trait]
pub trait PageScraper: Send + Sync {
    async fn fetch_markdown(&self, url: &str) -> Result<String, StageError>;
}

#[async_trait]
impl PageScraper for Arc<dyn PageScraper> {
    async fn fetch_markdown(&self, url: &str) -> Result<String, StageError> {
        (**self).fetch_markdown(url).await
    }
}
