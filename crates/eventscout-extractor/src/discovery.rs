//! Speaker sub-page discovery from a main page's Markdown anchors (spec
//! §4.9 step 2).

use regex::Regex;
use std::sync::OnceLock;
use url::Url;

const HIGH_KEYWORDS: &[&str] = &["referenten", "speakers", "presenters", "faculty"];
const MEDIUM_KEYWORDS: &[&str] = &["agenda", "program", "schedule"];
const LOW_KEYWORDS: &[&str] = &["team", "organiser", "organizer", "about"];

/// Paths worth trying even when no anchor on the main page mentions them.
const COMMON_PATHS: &[&str] = &[
    "/referenten/",
    "/speakers/",
    "/presenters/",
    "/agenda/",
    "/program/",
    "/schedule/",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Priority {
    High,
    Medium,
    Low,
}

fn classify(path: &str) -> Option<Priority> {
    let lower = path.to_lowercase();
    if HIGH_KEYWORDS.iter().any(|k| lower.contains(k)) {
        Some(Priority::High)
    } else if MEDIUM_KEYWORDS.iter().any(|k| lower.contains(k)) {
        Some(Priority::Medium)
    } else if LOW_KEYWORDS.iter().any(|k| lower.contains(k)) {
        Some(Priority::Low)
    } else {
        None
    }
}

fn anchor_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[[^\]]*\]\(([^)\s]+)\)").unwrap())
}

/// Returns up to 3 same-origin sub-page URLs worth crawling for speaker
/// information, highest priority first.
pub fn discover_subpages(base_url: &str, main_markdown: &str) -> Vec<String> {
    let Ok(base) = Url::parse(base_url) else {
        return Vec::new();
    };

    let mut candidates: Vec<(Priority, String)> = Vec::new();
    let mut seen = std::collections::HashSet::new();

    for href in anchor_regex().captures_iter(main_markdown).map(|c| c[1].to_string()) {
        if let Ok(resolved) = base.join(&href) {
            if resolved.host_str() != base.host_str() {
                continue;
            }
            if let Some(priority) = classify(resolved.path()) {
                let key = resolved.to_string();
                if seen.insert(key.clone()) {
                    candidates.push((priority, key));
                }
            }
        }
    }

    for path in COMMON_PATHS {
        if let Ok(resolved) = base.join(path) {
            let key = resolved.to_string();
            if let Some(priority) = classify(resolved.path()) {
                if seen.insert(key.clone()) {
                    candidates.push((priority, key));
                }
            }
        }
    }

    candidates.sort_by_key(|(priority, _)| *priority);
    candidates.into_iter().take(3).map(|(_, url)| url).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn high_priority_anchors_rank_first() {
        let markdown = "[Team](https://example.com/team/) [Speakers](https://example.com/speakers/)";
        let result = discover_subpages("https://example.com/", markdown);
        assert_eq!(result[0], "https://example.com/speakers/");
    }

    #[test]
    fn cross_origin_anchors_are_ignored() {
        let markdown = "[Speakers](https://other.com/speakers/)";
        let result = discover_subpages("https://example.com/", markdown);
        assert!(result.iter().all(|u| u.contains("example.com")));
    }

    #[test]
    fn common_paths_are_synthesised_when_not_linked() {
        let result = discover_subpages("https://example.com/", "no anchors here");
        assert!(!result.is_empty());
    }

    #[test]
    fn caps_at_three_results() {
        let markdown = "[Referenten](https://example.com/referenten/) \
             [Speakers](https://example.com/speakers/) \
             [Presenters](https://example.com/presenters/) \
             [Faculty](https://example.com/faculty/)";
        let result = discover_subpages("https://example.com/", markdown);
        assert!(result.len() <= 3);
    }

    #[test]
    fn duplicate_urls_are_deduplicated() {
        let markdown = "[A](https://example.com/speakers/) [B](https://example.com/speakers/)";
        let result = discover_subpages("https://example.com/", markdown);
        assert_eq!(result.iter().filter(|u| u.contains("speakers")).count(), 1);
    }
}
