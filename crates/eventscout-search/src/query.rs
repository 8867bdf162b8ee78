//! Query normalisation, cache-key derivation, and CSE-specific query
//! simplification (spec §4.5).

use regex::Regex;
use std::sync::OnceLock;

/// A provider-agnostic request, already validated by the caller.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub query: String,
    pub country: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub limit: usize,
    pub use_cache: bool,
}

const DEFAULT_LIMIT: usize = 20;
const EVENT_SUFFIXES: &[&str] = &["event", "events", "conference", "summit"];

/// Normalises a query the same way regardless of which provider ultimately
/// serves it, so all three providers share one cache key for equivalent
/// requests.
pub fn normalise_cache_key(req: &SearchRequest) -> String {
    let mut text = req.query.to_lowercase();
    text = collapse_whitespace(&text);
    for suffix in EVENT_SUFFIXES {
        if let Some(stripped) = text.strip_suffix(suffix) {
            text = stripped.trim_end().to_string();
        }
    }
    text = strip_boolean_operators(&text);

    let country = req.country.as_deref().unwrap_or("").to_uppercase();
    let limit = if req.limit == 0 { DEFAULT_LIMIT } else { req.limit };

    format!(
        "{}|{}|{}|{}|{}",
        text,
        country,
        req.date_from.as_deref().unwrap_or(""),
        req.date_to.as_deref().unwrap_or(""),
        limit
    )
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn boolean_operator_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(and|or)\b").unwrap())
}

fn strip_boolean_operators(s: &str) -> String {
    collapse_whitespace(&boolean_operator_regex().replace_all(s, " "))
}

const CSE_MAX_LEN: usize = 256;

/// Simplifies a long boolean query for Google CSE: strips parentheses and
/// boolean operators, keeps quoted phrases intact, caps at 256 chars.
pub fn simplify_cse_query(query: &str) -> String {
    let without_parens: String = query.chars().filter(|c| *c != '(' && *c != ')').collect();
    let simplified = strip_boolean_operators(&without_parens);
    let simplified = collapse_whitespace(&simplified);
    if simplified.len() <= CSE_MAX_LEN {
        simplified
    } else {
        let mut truncated = simplified;
        truncated.truncate(CSE_MAX_LEN);
        truncated
    }
}

/// Fixed TLD -> country mapping used to filter CSE results to the
/// requested country, plus a small exclusion pattern list for
/// aggregator-heavy TLDs that are never country-correlated.
pub fn country_tld(country: &str) -> Option<&'static str> {
    match country.to_uppercase().as_str() {
        "DE" => Some(".de"),
        "AT" => Some(".at"),
        "CH" => Some(".ch"),
        "US" => Some(".com"),
        "UK" | "GB" => Some(".co.uk"),
        "FR" => Some(".fr"),
        _ => None,
    }
}

const EXCLUDED_HOST_PATTERNS: &[&str] = &["pinterest.", "facebook.com/groups"];

/// Keeps a result only if its host matches the country TLD (when known)
/// and isn't on the fixed exclusion list.
pub fn passes_country_filter(url: &str, country: Option<&str>) -> bool {
    let lower = url.to_lowercase();
    if EXCLUDED_HOST_PATTERNS.iter().any(|p| lower.contains(p)) {
        return false;
    }
    match country.and_then(country_tld) {
        Some(tld) => lower.contains(tld),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(query: &str) -> SearchRequest {
        SearchRequest {
            query: query.to_string(),
            country: Some("de".to_string()),
            date_from: None,
            date_to: None,
            limit: 0,
            use_cache: true,
        }
    }

    #[test]
    fn cache_key_lowercases_and_collapses_whitespace() {
        let key = normalise_cache_key(&req("  Fintech   Conference  "));
        assert!(key.starts_with("fintech|DE|"));
    }

    #[test]
    fn cache_key_strips_event_suffix() {
        let key = normalise_cache_key(&req("fintech summit"));
        assert!(key.starts_with("fintech|"));
    }

    #[test]
    fn cache_key_strips_boolean_operators() {
        let key = normalise_cache_key(&req("fintech AND berlin OR munich"));
        assert!(!key.contains(" and "));
        assert!(!key.contains(" or "));
    }

    #[test]
    fn cache_key_uses_default_limit_when_zero() {
        let key = normalise_cache_key(&req("fintech"));
        assert!(key.ends_with(&DEFAULT_LIMIT.to_string()));
    }

    #[test]
    fn cse_simplify_strips_parens_and_operators_keeps_quotes() {
        let simplified = simplify_cse_query(r#"(fintech OR banking) AND "Berlin 2026""#);
        assert!(!simplified.contains('('));
        assert!(simplified.contains("\"Berlin 2026\""));
    }

    #[test]
    fn cse_simplify_caps_at_256_chars() {
        let long = "a".repeat(500);
        assert_eq!(simplify_cse_query(&long).len(), 256);
    }

    #[test]
    fn country_filter_matches_tld() {
        assert!(passes_country_filter("https://events.example.de/fintech", Some("DE")));
        assert!(!passes_country_filter("https://events.example.fr/fintech", Some("DE")));
    }

    #[test]
    fn country_filter_passes_through_unknown_country() {
        assert!(passes_country_filter("https://example.xyz", Some("ZZ")));
    }

    #[test]
    fn country_filter_excludes_blocked_hosts() {
        assert!(!passes_country_filter("https://pinterest.com/pin/1", Some("DE")));
    }
}
