//! Deep-crawl orchestration: main fetch, speaker sub-pages, metadata and
//! speaker extraction, confidence accumulation (spec §4.9).

use crate::config::ExtractorConfig;
use crate::discovery::discover_subpages;
use crate::metadata::{merge_metadata, rule_based_metadata, FromLlmJson, MetadataLlm, RawMetadata};
use crate::scraper::PageScraper;
use crate::speakers::extract_speakers;
use eventscout_core::{CandidateAnalysis, CandidateMetadata, DateRangeSource, EventCandidate, Source, StageError};
use eventscout_retry::{execute_with_retry, RetryConfig};

const SUBPAGE_SEPARATOR: &str = "\n\n--- SPEAKER PAGES ---\n\n";

pub struct Extractor<S: PageScraper, L: MetadataLlm> {
    config: ExtractorConfig,
    scraper: S,
    llm: Option<L>,
}

impl<S: PageScraper, L: MetadataLlm> Extractor<S, L> {
    pub fn new(config: ExtractorConfig, scraper: S, llm: Option<L>) -> Self {
        Self { config, scraper, llm }
    }

    /// Deep-crawls one URL into an [`EventCandidate`]. Per spec §4.9,
    /// extraction failures are the caller's to log and drop; this only
    /// returns `Err` for the main-page fetch, which the caller treats as
    /// "this URL produced nothing".
    pub async fn extract(&self, url: &str, source: Source, original_query: &str, country: Option<&str>) -> Result<EventCandidate, StageError> {
        let retry_config = RetryConfig::new("extractor-main").timeouts(self.config.main_page_timeouts.clone());
        let main_markdown = execute_with_retry(&retry_config, |_attempt| self.scraper.fetch_markdown(url)).await?;

        let subpage_urls = discover_subpages(url, &main_markdown);
        let mut subpages = Vec::new();
        for subpage_url in subpage_urls.into_iter().take(self.config.max_subpages) {
            let outcome = tokio::time::timeout(self.config.subpage_timeout, self.scraper.fetch_markdown(&subpage_url)).await;
            if let Ok(Ok(content)) = outcome {
                if content.chars().count() >= self.config.min_subpage_content_len {
                    subpages.push(content);
                }
            }
        }

        let combined = if subpages.is_empty() {
            main_markdown.clone()
        } else {
            format!("{main_markdown}{SUBPAGE_SEPARATOR}{}", subpages.join("\n\n---\n\n"))
        };

        let metadata = self.extract_metadata(&combined).await;
        let speakers = extract_speakers(&combined, self.config.max_speakers);

        let mut candidate = EventCandidate {
            url: url.to_string(),
            title: metadata.title.unwrap_or_default(),
            description: metadata.description.unwrap_or_default(),
            date: metadata.date.unwrap_or_default(),
            location: metadata.location.unwrap_or_default(),
            venue: metadata.venue.unwrap_or_default(),
            city: metadata.city.unwrap_or_default(),
            speakers,
            sponsors: Vec::new(),
            confidence: 0.0,
            source,
            date_range_source: DateRangeSource::Original,
            metadata: CandidateMetadata {
                original_query: original_query.to_string(),
                country: country.map(str::to_string),
                processing_time_ms: 0,
                stage_timings_ms: Default::default(),
                analysis: CandidateAnalysis {
                    organiser: metadata.organiser,
                    website: metadata.website,
                    registration_url: metadata.registration_url,
                    pages_crawled: 1 + subpages.len() as u32,
                    total_content_length: combined.chars().count(),
                },
            },
        };
        candidate.dedup_speakers();
        candidate.confidence = accumulate_confidence(&candidate);
        Ok(candidate)
    }

    async fn extract_metadata(&self, combined: &str) -> RawMetadata {
        let fallback = rule_based_metadata(combined);
        let Some(llm) = &self.llm else {
            return fallback;
        };
        match llm.complete(combined).await {
            Ok(raw) => match RawMetadata::from_llm_json(&raw) {
                Ok(parsed) => merge_metadata(parsed, fallback),
                Err(_) => fallback,
            },
            Err(_) => fallback,
        }
    }
}

/// Confidence starts at 0.3 and accumulates per present field, clamped to
/// 1.0 (spec §4.9 step 7).
fn accumulate_confidence(candidate: &EventCandidate) -> f64 {
    let mut confidence = 0.3;
    if !candidate.title.is_empty() {
        confidence += 0.2;
    }
    if !candidate.description.is_empty() {
        confidence += 0.2;
    }
    if !candidate.date.is_empty() {
        confidence += 0.1;
    }
    if !candidate.location.is_empty() || !candidate.venue.is_empty() || !candidate.city.is_empty() {
        confidence += 0.1;
    }
    if !candidate.speakers.is_empty() {
        confidence += 0.1;
    }
    confidence.clamp(0.0, 1.0)
}
