//! Heuristic fallback scoring and post-LLM bonus (spec §4.7).

use eventscout_core::CandidateUrl;
use regex::Regex;
use std::sync::OnceLock;

const AGGREGATOR_FALLBACK_SCORE: f64 = 0.05;

fn event_path_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)/(event|summit|conference)/[a-z0-9-]+").unwrap())
}

const INDUSTRY_PATH_KEYWORDS: &[&str] = &["fintech", "healthtech", "insurtech", "martech", "proptech"];

fn is_aggregator(url: &str) -> bool {
    CandidateUrl::new(url.to_string()).is_some_and(|c| c.is_aggregator())
}

fn has_in_country_hint(url: &str, country: Option<&str>) -> bool {
    match country {
        Some(c) => {
            let tld = match c.to_uppercase().as_str() {
                "DE" => ".de",
                "AT" => ".at",
                "CH" => ".ch",
                "UK" | "GB" => ".co.uk",
                "FR" => ".fr",
                _ => return false,
            };
            url.to_lowercase().contains(tld)
        }
        None => false,
    }
}

/// Bonus components shared between the fallback score and the post-LLM
/// bias (spec §4.7: "Apply `calculateUrlBonus` to each returned score").
pub fn calculate_url_bonus(url: &str, country: Option<&str>) -> f64 {
    let lower = url.to_lowercase();
    let mut bonus = 0.0;

    if event_path_regex().is_match(&lower) {
        bonus += 0.3;
    }
    if let Some(keyword) = INDUSTRY_PATH_KEYWORDS.iter().find(|k| lower.contains(**k)) {
        bonus += if keyword.len() > 8 { 0.35 } else { 0.25 };
    }
    if has_in_country_hint(&lower, country) {
        bonus += 0.05;
    }

    bonus
}

/// Per-URL score used when the LLM call fails entirely for a chunk.
///
/// Does not apply `calculate_url_bonus` itself: every score, fallback or
/// LLM-derived, gets the bonus exactly once from the post-scoring pass in
/// `Prioritiser::prioritise`.
pub fn fallback_score(url: &str, idx: usize, _country: Option<&str>) -> f64 {
    if is_aggregator(url) {
        return AGGREGATOR_FALLBACK_SCORE;
    }
    let base = 0.3 - (idx as f64) * 0.02;
    base.clamp(0.0, 1.0)
}
