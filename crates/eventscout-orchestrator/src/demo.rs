//! Deterministic, offline-safe collaborator stand-ins.
//!
//! Real HTTP/LLM/scraper clients are out of scope (spec §1, §6: "no
//! concrete HTTP client is implemented ... left as an external
//! collaborator"); these exist only to prove the pipeline's wiring compiles
//! and runs end-to-end, for the CLI demo binary and as reusable test
//! doubles.

use async_trait::async_trait;
use eventscout_core::StageError;
use eventscout_extractor::{MetadataLlm, PageScraper};
use eventscout_prioritiser::PrioritiserLlm;
use eventscout_rerank::Reranker;
use eventscout_search::{SearchItem, SearchProvider, SearchRequest};

/// Always returns no results; used to back providers the demo doesn't
/// actually wire up to a real backend.
pub struct EmptyProvider {
    name: &'static str,
}

impl EmptyProvider {
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }
}

#[async_trait]
impl SearchProvider for EmptyProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn search(&self, _req: &SearchRequest) -> Result<Vec<SearchItem>, StageError> {
        Ok(Vec::new())
    }
}

/// A reranker that returns the input's natural order unscored (every URL
/// gets the same base score; the gate's micro-bias still differentiates
/// them).
pub struct NullReranker;

#[async_trait]
impl Reranker for NullReranker {
    async fn rerank(&self, _instruction: &str, urls: &[String]) -> Result<Vec<f64>, StageError> {
        Ok(vec![0.5; urls.len()])
    }
}

/// A `PrioritiserLlm` that scores every URL identically without making any
/// network call, so the demo binary runs fully offline.
pub struct EchoPrioritiserLlm;

#[async_trait]
impl PrioritiserLlm for EchoPrioritiserLlm {
    async fn complete(&self, _instruction: &str, urls: &[String]) -> Result<String, StageError> {
        let entries: Vec<String> = urls
            .iter()
            .map(|url| format!(r#"{{"url":"{url}","score":0.6,"reason":"demo"}}"#))
            .collect();
        Ok(format!("[{}]", entries.join(",")))
    }
}

/// A `MetadataLlm` that always defers to the rule-based fallback by
/// returning an empty JSON object.
pub struct EchoMetadataLlm;

#[async_trait]
impl MetadataLlm for EchoMetadataLlm {
    async fn complete(&self, _content: &str) -> Result<String, StageError> {
        Ok("{}".to_string())
    }
}

/// A scraper that returns a small fixed Markdown page regardless of URL, so
/// the demo binary has something to extract.
pub struct FixturePageScraper;

#[async_trait]
impl PageScraper for FixturePageScraper {
    async fn fetch_markdown(&self, url: &str) -> Result<String, StageError> {
        Ok(format!(
            "# Demo Event\n\nDate: 2026-09-15\nLocation: Berlin\nCity: Berlin\n\nSample content for {url}."
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_provider_returns_no_items() {
        let provider = EmptyProvider::new("demo");
        let req = SearchRequest {
            query: "fintech".to_string(),
            country: None,
            date_from: None,
            date_to: None,
            limit: 10,
            use_cache: false,
        };
        assert!(provider.search(&req).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn echo_prioritiser_llm_emits_parseable_json() {
        let llm = EchoPrioritiserLlm;
        let raw = llm.complete("instr", &["https://a.de".to_string()]).await.unwrap();
        assert!(raw.contains("\"score\":0.6"));
    }

    #[tokio::test]
    async fn fixture_scraper_always_succeeds() {
        let scraper = FixturePageScraper;
        let content = scraper.fetch_markdown("https://example.com").await.unwrap();
        assert!(content.contains("Demo Event"));
    }
}
