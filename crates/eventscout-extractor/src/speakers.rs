//! Ordered-pattern speaker extraction from combined crawl content (spec
//! §4.9 step 6).

use eventscout_core::Speaker;
use regex::Regex;
use std::sync::OnceLock;

const DEFAULT_TITLE: &str = "Professional";
const DEFAULT_COMPANY: &str = "Various";
const MAX_NAME_LEN: usize = 50;

/// Lines containing these words are navigation chrome, not speaker bios.
const NAV_BLACKLIST: &[&str] = &[
    "home", "contact", "login", "register", "sitemap", "privacy", "imprint", "newsletter", "cookie",
];

/// Generic industry nouns that look like a "Name, Title, Company" line but
/// aren't one.
const INDUSTRY_BLACKLIST: &[&str] = &["platform", "solution", "software", "technology", "services"];

/// Ordered (regex, name-group-index) pairs; title/company are the two
/// capture groups that follow the name group, when present.
fn patterns() -> &'static Vec<(Regex, usize)> {
    static PATTERNS: OnceLock<Vec<(Regex, usize)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        vec![
            (Regex::new(r"^([A-Z][\p{L}.'-]+(?: [A-Z][\p{L}.'-]+)+),\s*([^,]+),\s*(.+)$").unwrap(), 1),
            (Regex::new(r"^(.+?)\s+[–-]\s+(.+?)\s+at\s+(.+)$").unwrap(), 1),
            (Regex::new(r"^(.+?)\s*\((.+?),\s*(.+?)\)$").unwrap(), 1),
            (Regex::new(r"^(.+?)\s*\|\s*(.+?)\s*\|\s*(.+?)$").unwrap(), 1),
            (Regex::new(r"(?i)^(?:Referent|Sprecher|Moderator):\s*(.+)$").unwrap(), 1),
            (Regex::new(r"(?i)^Keynote Speaker:\s*(.+)$").unwrap(), 1),
        ]
    })
}

fn is_blacklisted(line: &str) -> bool {
    let lower = line.to_lowercase();
    NAV_BLACKLIST.iter().any(|w| lower.contains(w)) || INDUSTRY_BLACKLIST.iter().any(|w| lower.contains(w))
}

fn looks_like_name(candidate: &str) -> bool {
    let trimmed = candidate.trim();
    if trimmed.is_empty() || trimmed.chars().count() > MAX_NAME_LEN {
        return false;
    }
    let capitalised_words = trimmed
        .split_whitespace()
        .filter(|w| w.chars().next().is_some_and(|c| c.is_uppercase()))
        .count();
    capitalised_words >= 2
}

fn extract_line(line: &str) -> Option<Speaker> {
    let trimmed = line.trim().trim_start_matches(['-', '*', '•']).trim();
    if trimmed.is_empty() || is_blacklisted(trimmed) {
        return None;
    }

    for (regex, name_group) in patterns() {
        if let Some(caps) = regex.captures(trimmed) {
            let name = caps.get(*name_group)?.as_str().trim().to_string();
            if !looks_like_name(&name) {
                continue;
            }
            let title = caps.get(name_group + 1).map(|m| m.as_str().trim().to_string());
            let company = caps.get(name_group + 2).map(|m| m.as_str().trim().to_string());
            return Some(Speaker {
                name,
                title: Some(title.filter(|t| !t.is_empty()).unwrap_or_else(|| DEFAULT_TITLE.to_string())),
                company: Some(company.filter(|c| !c.is_empty()).unwrap_or_else(|| DEFAULT_COMPANY.to_string())),
            });
        }
    }
    None
}

/// Extracts speakers from combined crawl content, capped at `max_speakers`
/// and deduplicated by case-insensitive name.
pub fn extract_speakers(content: &str, max_speakers: usize) -> Vec<Speaker> {
    let mut seen = std::collections::HashSet::new();
    let mut speakers = Vec::new();

    for line in content.lines() {
        if speakers.len() >= max_speakers {
            break;
        }
        if let Some(speaker) = extract_line(line) {
            if seen.insert(speaker.name.to_lowercase()) {
                speakers.push(speaker);
            }
        }
    }

    speakers
}
