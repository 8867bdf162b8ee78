//! `isSolidHit`: the quality predicate gating which extracted candidates
//! survive into the final ranked output (spec §4.10).

use crate::config::QualityConfig;
use eventscout_core::{parse_iso_date, EventCandidate};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolidHit {
    pub ok: bool,
    pub quality: f64,
}

fn date_in_window(candidate: &EventCandidate, window_from: &str, window_to: &str) -> bool {
    let (Some(date), Some(from), Some(to)) = (
        parse_iso_date(&candidate.date),
        parse_iso_date(window_from),
        parse_iso_date(window_to),
    ) else {
        return false;
    };
    date >= from && date <= to
}

fn country_tld(country: &str) -> Option<&'static str> {
    match country.to_uppercase().as_str() {
        "DE" => Some(".de"),
        "AT" => Some(".at"),
        "CH" => Some(".ch"),
        "UK" | "GB" => Some(".co.uk"),
        "FR" => Some(".fr"),
        _ => None,
    }
}

fn host_country_correlates(candidate: &EventCandidate) -> bool {
    match candidate.metadata.country.as_deref().and_then(country_tld) {
        Some(tld) => candidate.url.to_lowercase().contains(tld),
        None => false,
    }
}

/// Scores one extracted candidate against the active search window.
/// `has_speaker_page` should reflect whether the extractor actually crawled
/// a speaker sub-page for this candidate (spec §4.9's `pagesCrawled > 1`).
pub fn is_solid_hit(config: &QualityConfig, candidate: &EventCandidate, window_from: &str, window_to: &str) -> SolidHit {
    let w = &config.weights;
    let mut quality = 0.0;

    if date_in_window(candidate, window_from, window_to) {
        quality += w.date_in_window;
    }
    if !candidate.city.is_empty() || !candidate.venue.is_empty() {
        quality += w.city_or_venue;
    }
    if candidate.speakers.len() >= 2 {
        quality += w.speakers_present;
    }
    if candidate.metadata.analysis.pages_crawled > 1 {
        quality += w.has_speaker_page;
    }
    if host_country_correlates(candidate) {
        quality += w.host_country_correlation;
    }

    let quality = quality.clamp(0.0, 1.0);
    SolidHit {
        ok: quality >= config.threshold,
        quality,
    }
}
