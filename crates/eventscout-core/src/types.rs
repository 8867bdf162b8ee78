//! Domain model (spec §3).
//!
//! Dynamic, `any`-typed records in the source system become tagged structs
//! here with named optional fields, per the design note in spec §9. JSON
//! parsing of anything that crosses a provider boundary is a two-step
//! {parse, validate} — see `RawMetadata::from_llm_json` in
//! `eventscout-extractor` for the consumer side of that contract.

use crate::events::LogEvent;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use url::Url;

/// The request driving one pipeline invocation (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchParams {
    pub user_text: String,
    pub country: Option<String>,
    pub date_from: String,
    pub date_to: String,
    pub location: Option<String>,
    pub timeframe: Option<String>,
    pub locale: Option<String>,
}

/// Why a [`SearchParams`] failed validation.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum SearchParamsError {
    #[error("userText must be non-empty")]
    EmptyUserText,
    #[error("userText must be at most 500 characters, got {0}")]
    UserTextTooLong(usize),
    #[error("country must be an upper-case ISO-3166-1 alpha-2 code, got {0:?}")]
    InvalidCountry(String),
    #[error("dateFrom/dateTo must be YYYY-MM-DD, got {0:?}")]
    InvalidDate(String),
    #[error("dateFrom ({from}) must be <= dateTo ({to})")]
    DateRangeInverted { from: String, to: String },
}

impl SearchParams {
    /// Validates the invariants spec §3 requires before the pipeline runs.
    pub fn validate(&self) -> Result<(), SearchParamsError> {
        let trimmed = self.user_text.trim();
        if trimmed.is_empty() {
            return Err(SearchParamsError::EmptyUserText);
        }
        if trimmed.chars().count() > 500 {
            return Err(SearchParamsError::UserTextTooLong(trimmed.chars().count()));
        }
        if let Some(country) = &self.country {
            let valid = country.len() == 2
                && country.chars().all(|c| c.is_ascii_uppercase());
            if !valid {
                return Err(SearchParamsError::InvalidCountry(country.clone()));
            }
        }
        let from = parse_iso_date(&self.date_from)
            .ok_or_else(|| SearchParamsError::InvalidDate(self.date_from.clone()))?;
        let to = parse_iso_date(&self.date_to)
            .ok_or_else(|| SearchParamsError::InvalidDate(self.date_to.clone()))?;
        if from > to {
            return Err(SearchParamsError::DateRangeInverted {
                from: self.date_from.clone(),
                to: self.date_to.clone(),
            });
        }
        Ok(())
    }

    pub fn trimmed_user_text(&self) -> &str {
        self.user_text.trim()
    }
}

/// Parses `YYYY-MM-DD` into a comparable tuple without pulling in a date
/// crate's full calendar validation (chrono is used downstream where real
/// calendar arithmetic is needed, e.g. auto-expand window widening).
pub fn parse_iso_date(s: &str) -> Option<chrono::NaiveDate> {
    chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Per-industry precision controls (spec §3). Static data, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightedTemplate {
    pub industry: String,
    pub industry_specific_query: u8,
    pub cross_industry_prevention: u8,
    pub geographic_coverage: u8,
    pub quality_requirements: u8,
    pub event_type_specificity: u8,
    pub negative_filters: Vec<WeightedTerm>,
    pub cities: Vec<String>,
    pub regions: Vec<String>,
    pub quality_threshold: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightedTerm {
    pub term: String,
    pub weight: u8,
}

/// Industry terms, ICP terms and competitors read once at pipeline start.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProfile {
    pub industry_terms: Vec<String>,
    pub icp_terms: Vec<String>,
    pub competitors: Vec<String>,
}

/// Hosts whose content is primarily third-party event listings.
pub const AGGREGATOR_HOSTS: &[&str] = &[
    "eventbrite.com",
    "10times.com",
    "linkedin.com",
    "cvent.com",
    "meetup.com",
    "allevents.in",
];

/// A URL candidate pre-extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateUrl {
    pub url: String,
}

impl CandidateUrl {
    pub fn new(url: impl Into<String>) -> Option<Self> {
        let url = url.into();
        let parsed = Url::parse(&url).ok()?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return None;
        }
        Some(Self { url })
    }

    pub fn host(&self) -> Option<String> {
        Url::parse(&self.url).ok().and_then(|u| u.host_str().map(|h| h.to_string()))
    }

    pub fn is_aggregator(&self) -> bool {
        match self.host() {
            Some(host) => AGGREGATOR_HOSTS.iter().any(|agg| host == *agg || host.ends_with(&format!(".{agg}"))),
            None => false,
        }
    }
}

/// A URL scored for relevance by the prioritiser (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrioritisedUrl {
    pub url: String,
    pub score: f64,
    pub reason: String,
}

impl PrioritisedUrl {
    pub fn new(url: impl Into<String>, score: f64, reason: impl Into<String>) -> Self {
        let reason: String = reason.into();
        Self {
            url: url.into(),
            score: score.clamp(0.0, 1.0),
            reason: reason.chars().take(10).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Speaker {
    pub name: String,
    pub title: Option<String>,
    pub company: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Sponsor {
    pub name: String,
    pub level: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Firecrawl,
    Cse,
    Database,
}

/// The window an [`EventCandidate`] was found under. Auto-expand (spec
/// §4.10) widens the original window in three tiers depending on how many
/// solid hits the un-expanded window produced; `Original` covers every
/// candidate found without expanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateRangeSource {
    Original,
    #[serde(rename = "45-days")]
    FortyFiveDays,
    #[serde(rename = "60-days")]
    SixtyDays,
    #[serde(rename = "90-days")]
    NinetyDays,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidateAnalysis {
    pub organiser: Option<String>,
    pub website: Option<String>,
    pub registration_url: Option<String>,
    pub pages_crawled: u32,
    pub total_content_length: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidateMetadata {
    pub original_query: String,
    pub country: Option<String>,
    pub processing_time_ms: u64,
    pub stage_timings_ms: std::collections::BTreeMap<String, u64>,
    pub analysis: CandidateAnalysis,
}

/// The central record produced by the extractor and refined by quality/rank.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventCandidate {
    pub url: String,
    pub title: String,
    pub description: String,
    /// ISO date or empty string.
    pub date: String,
    pub location: String,
    pub venue: String,
    pub city: String,
    pub speakers: Vec<Speaker>,
    pub sponsors: Vec<Sponsor>,
    pub confidence: f64,
    pub source: Source,
    pub date_range_source: DateRangeSource,
    pub metadata: CandidateMetadata,
}

impl EventCandidate {
    /// Speakers deduplicated by case-insensitive full name (invariant iii).
    pub fn dedup_speakers(&mut self) {
        let mut seen = HashSet::new();
        self.speakers.retain(|s| seen.insert(s.name.to_lowercase()));
    }

    /// Clamps confidence into [0,1] and never lets it decrease relative to
    /// `floor` (invariant i: confidence never decreases along the pipeline).
    pub fn raise_confidence_to(&mut self, floor: f64) {
        self.confidence = self.confidence.max(floor).clamp(0.0, 1.0);
    }
}

/// Aggregate counts and per-stage timings for one invocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchMetadata {
    pub total_candidates: usize,
    pub prioritised_candidates: usize,
    pub extracted_candidates: usize,
    pub solid_candidates: usize,
    pub low_confidence: bool,
    pub total_duration_ms: u64,
    pub stage_timings_ms: std::collections::BTreeMap<String, u64>,
    pub providers_used: Vec<String>,
    pub auto_expanded: bool,
}

/// The immutable result of one pipeline invocation (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub events: Vec<EventCandidate>,
    pub metadata: SearchMetadata,
    pub logs: Vec<LogEvent>,
}

impl SearchResult {
    /// An empty result shaped like a normal output, used by the
    /// orchestrator's top-level catch (spec §7 policy 7).
    pub fn empty(logs: Vec<LogEvent>) -> Self {
        Self {
            events: Vec::new(),
            metadata: SearchMetadata::default(),
            logs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_params() -> SearchParams {
        SearchParams {
            user_text: "legal compliance".into(),
            country: Some("DE".into()),
            date_from: "2025-03-01".into(),
            date_to: "2025-03-07".into(),
            location: None,
            timeframe: None,
            locale: None,
        }
    }

    #[test]
    fn valid_params_pass() {
        assert!(valid_params().validate().is_ok());
    }

    #[test]
    fn empty_user_text_rejected() {
        let mut p = valid_params();
        p.user_text = "   ".into();
        assert_eq!(p.validate(), Err(SearchParamsError::EmptyUserText));
    }

    #[test]
    fn overlong_user_text_rejected() {
        let mut p = valid_params();
        p.user_text = "a".repeat(501);
        assert!(matches!(
            p.validate(),
            Err(SearchParamsError::UserTextTooLong(501))
        ));
    }

    #[test]
    fn lowercase_country_rejected() {
        let mut p = valid_params();
        p.country = Some("de".into());
        assert!(matches!(p.validate(), Err(SearchParamsError::InvalidCountry(_))));
    }

    #[test]
    fn inverted_date_range_rejected() {
        let mut p = valid_params();
        p.date_from = "2025-03-10".into();
        p.date_to = "2025-03-01".into();
        assert!(matches!(
            p.validate(),
            Err(SearchParamsError::DateRangeInverted { .. })
        ));
    }

    #[test]
    fn malformed_date_rejected() {
        let mut p = valid_params();
        p.date_from = "03/01/2025".into();
        assert!(matches!(p.validate(), Err(SearchParamsError::InvalidDate(_))));
    }

    #[test]
    fn aggregator_hosts_detected() {
        let c = CandidateUrl::new("https://www.eventbrite.com/e/foo").unwrap();
        assert!(c.is_aggregator());
        let c = CandidateUrl::new("https://acme-conference.com/speakers").unwrap();
        assert!(!c.is_aggregator());
    }

    #[test]
    fn non_http_scheme_rejected() {
        assert!(CandidateUrl::new("ftp://example.com/file").is_none());
    }

    #[test]
    fn prioritised_url_reason_truncated_and_score_clamped() {
        let p = PrioritisedUrl::new("https://x.com", 1.4, "way too long reason text");
        assert_eq!(p.score, 1.0);
        assert_eq!(p.reason.len(), 10);
    }

    #[test]
    fn speaker_dedup_is_case_insensitive() {
        let mut c = EventCandidate {
            url: "https://x.com".into(),
            title: String::new(),
            description: String::new(),
            date: String::new(),
            location: String::new(),
            venue: String::new(),
            city: String::new(),
            speakers: vec![
                Speaker { name: "Jane Doe".into(), ..Default::default() },
                Speaker { name: "jane doe".into(), ..Default::default() },
                Speaker { name: "John Smith".into(), ..Default::default() },
            ],
            sponsors: vec![],
            confidence: 0.3,
            source: Source::Firecrawl,
            date_range_source: DateRangeSource::Original,
            metadata: CandidateMetadata::default(),
        };
        c.dedup_speakers();
        assert_eq!(c.speakers.len(), 2);
    }

    #[test]
    fn confidence_never_decreases() {
        let mut c = EventCandidate {
            url: "https://x.com".into(),
            title: String::new(),
            description: String::new(),
            date: String::new(),
            location: String::new(),
            venue: String::new(),
            city: String::new(),
            speakers: vec![],
            sponsors: vec![],
            confidence: 0.6,
            source: Source::Cse,
            date_range_source: DateRangeSource::Original,
            metadata: CandidateMetadata::default(),
        };
        c.raise_confidence_to(0.3);
        assert_eq!(c.confidence, 0.6);
        c.raise_confidence_to(0.8);
        assert_eq!(c.confidence, 0.8);
    }
}
