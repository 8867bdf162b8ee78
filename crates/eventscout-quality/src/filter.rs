//! Non-event URL filter, applied after the rerank gate (spec §4.10).

use regex::Regex;
use std::sync::OnceLock;

const BLOCKED_PATH_TERMS: &[&str] = &[
    "/docs", "documentation", "/people", "/person", "/profile", "/privacy", "/terms", "/impressum", "/agb",
];

const BLOCKED_EXTENSIONS: &[&str] = &[".pdf", ".doc", ".docx"];

/// Documentation hosts and government-upload paths excluded regardless of
/// the generic path-term check.
const STATIC_EXCLUDED_HOSTS: &[&str] = &["docs.google.com", "drive.google.com"];

const TOS_TITLE_KEYWORDS: &[&str] = &["terms of service", "terms and conditions", "privacy policy", "cookie policy"];

fn events_suffix_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)/events/?$").unwrap())
}

/// True when `url` should be dropped as a non-event page.
pub fn is_non_event_url(url: &str) -> bool {
    let lower = url.to_lowercase();

    if events_suffix_regex().is_match(&lower) {
        return true;
    }
    if BLOCKED_PATH_TERMS.iter().any(|term| lower.contains(term)) {
        return true;
    }
    if BLOCKED_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
        return true;
    }
    if STATIC_EXCLUDED_HOSTS.iter().any(|host| lower.contains(host)) {
        return true;
    }
    false
}

/// True when `title` reads like terms-of-service boilerplate rather than an
/// event page (spec §4.10: "the extractor additionally drops candidates
/// whose title contains terms-of-service keywords").
pub fn has_tos_title(title: &str) -> bool {
    let lower = title.to_lowercase();
    TOS_TITLE_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_listing_suffix_is_blocked() {
        assert!(is_non_event_url("https://example.com/events"));
        assert!(is_non_event_url("https://example.com/events/"));
    }

    #[test]
    fn blocked_path_terms_are_caught() {
        assert!(is_non_event_url("https://example.com/docs/faq"));
        assert!(is_non_event_url("https://example.com/privacy"));
    }

    #[test]
    fn document_extensions_are_blocked() {
        assert!(is_non_event_url("https://example.com/brochure.pdf"));
    }

    #[test]
    fn static_excluded_hosts_are_blocked() {
        assert!(is_non_event_url("https://docs.google.com/document/d/xyz"));
    }

    #[test]
    fn ordinary_event_url_passes() {
        assert!(!is_non_event_url("https://example.com/conference/fintech-2026"));
    }

    #[test]
    fn tos_title_is_detected() {
        assert!(has_tos_title("Terms of Service - Acme Inc"));
        assert!(!has_tos_title("Fintech Summit 2026"));
    }
}
