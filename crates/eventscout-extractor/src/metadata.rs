//! Metadata extraction from combined crawl content: an LLM collaborator
//! when available, rule-based heuristics otherwise (spec §4.9 step 5).

use async_trait::async_trait;
use eventscout_core::StageError;
use regex::Regex;
use serde::Deserialize;
use std::sync::{Arc, OnceLock};

/// The fields an LLM (or the rule-based fallback) fills in from combined
/// crawl content.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMetadata {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub organiser: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub registration_url: Option<String>,
}

/// The LLM backend used to pull structured metadata out of combined crawl
/// content. Returns raw text, expected to be (possibly malformed) JSON
/// shaped like [`RawMetadata`].
#[async_trait]
pub trait MetadataLlm: Send + Sync {
    async fn complete(&self, content: &str) -> Result<String, StageError>;
}

#[async_trait]
impl MetadataLlm for Arc<dyn MetadataLlm> {
    async fn complete(&self, content: &str) -> Result<String, StageError> {
        (**self).complete(content).await
    }
}

/// Two-step {parse, validate} for whatever an LLM hands back, named after
/// the forward reference in `eventscout_core::EventCandidate`'s module doc.
/// Implemented as an extension trait since `EventCandidate` lives in
/// `eventscout-core` and this crate owns the JSON contract for LLM output.
pub trait FromLlmJson: Sized {
    fn from_llm_json(raw: &str) -> Result<Self, StageError>;
}

impl FromLlmJson for RawMetadata {
    fn from_llm_json(raw: &str) -> Result<Self, StageError> {
        let value: serde_json::Value =
            serde_json::from_str(raw.trim()).map_err(|e| StageError::InvalidInput(e.to_string()))?;
        if !value.is_object() {
            return Err(StageError::InvalidInput("metadata JSON must be an object".to_string()));
        }
        serde_json::from_value(value).map_err(|e| StageError::InvalidInput(e.to_string()))
    }
}

fn date_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(\d{4}-\d{2}-\d{2})\b").unwrap())
}

fn first_heading(content: &str) -> Option<String> {
    content
        .lines()
        .find(|l| l.trim_start().starts_with('#'))
        .map(|l| l.trim_start_matches('#').trim().to_string())
        .filter(|s| !s.is_empty())
}

fn labelled_field<'a>(content: &'a str, labels: &[&str]) -> Option<&'a str> {
    content.lines().find_map(|line| {
        labels.iter().find_map(|label| {
            let prefix = format!("{label}:");
            line.trim()
                .strip_prefix(prefix.as_str())
                .or_else(|| line.trim().strip_prefix(&prefix.to_lowercase()))
                .map(|rest| rest.trim())
                .filter(|s| !s.is_empty())
        })
    })
}

/// Rule-based metadata extraction used when no LLM is configured, or as a
/// post-processing fill-in for fields the LLM left blank.
pub fn rule_based_metadata(content: &str) -> RawMetadata {
    RawMetadata {
        title: first_heading(content),
        description: content
            .lines()
            .find(|l| !l.trim().is_empty() && !l.trim_start().starts_with('#'))
            .map(|l| l.trim().to_string()),
        date: date_regex().find(content).map(|m| m.as_str().to_string()),
        location: labelled_field(content, &["Location", "Standort"]).map(str::to_string),
        venue: labelled_field(content, &["Venue", "Veranstaltungsort"]).map(str::to_string),
        city: labelled_field(content, &["City", "Stadt"]).map(str::to_string),
        organiser: labelled_field(content, &["Organiser", "Organizer", "Veranstalter"]).map(str::to_string),
        website: labelled_field(content, &["Website"]).map(str::to_string),
        registration_url: labelled_field(content, &["Registration", "Anmeldung"]).map(str::to_string),
    }
}

/// Fills any field left empty by the primary source with the fallback's
/// value for the same field.
pub fn merge_metadata(primary: RawMetadata, fallback: RawMetadata) -> RawMetadata {
    RawMetadata {
        title: primary.title.or(fallback.title),
        description: primary.description.or(fallback.description),
        date: primary.date.or(fallback.date),
        location: primary.location.or(fallback.location),
        venue: primary.venue.or(fallback.venue),
        city: primary.city.or(fallback.city),
        organiser: primary.organiser.or(fallback.organiser),
        website: primary.website.or(fallback.website),
        registration_url: primary.registration_url.or(fallback.registration_url),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_becomes_title() {
        let meta = rule_based_metadata("# Fintech Summit 2026\n\nJoin us in Berlin.");
        assert_eq!(meta.title.as_deref(), Some("Fintech Summit 2026"));
    }

    #[test]
    fn iso_date_is_found() {
        let meta = rule_based_metadata("Date: 2026-03-14\nLocation: Berlin");
        assert_eq!(meta.date.as_deref(), Some("2026-03-14"));
    }

    #[test]
    fn labelled_location_is_extracted() {
        let meta = rule_based_metadata("Location: Berlin, Germany");
        assert_eq!(meta.location.as_deref(), Some("Berlin, Germany"));
    }

    #[test]
    fn from_llm_json_parses_valid_object() {
        let raw = r#"{"title":"Fintech Summit","city":"Berlin"}"#;
        let meta = RawMetadata::from_llm_json(raw).unwrap();
        assert_eq!(meta.title.as_deref(), Some("Fintech Summit"));
    }

    #[test]
    fn from_llm_json_rejects_non_object() {
        assert!(RawMetadata::from_llm_json("[1,2,3]").is_err());
    }

    #[test]
    fn merge_prefers_primary_and_fills_gaps() {
        let primary = RawMetadata {
            title: Some("Primary Title".into()),
            ..Default::default()
        };
        let fallback = RawMetadata {
            title: Some("Fallback Title".into()),
            city: Some("Berlin".into()),
            ..Default::default()
        };
        let merged = merge_metadata(primary, fallback);
        assert_eq!(merged.title.as_deref(), Some("Primary Title"));
        assert_eq!(merged.city.as_deref(), Some("Berlin"));
    }
}
