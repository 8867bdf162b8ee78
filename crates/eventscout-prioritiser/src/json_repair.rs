//! Best-effort recovery of `[{url,score,reason}]` arrays from raw LLM text
//! that isn't valid JSON (spec §4.7's five-step repair ladder).

use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;

#[derive(Debug, Deserialize)]
pub struct RawScore {
    pub url: String,
    #[serde(default)]
    pub score: serde_json::Value,
    #[serde(default)]
    pub reason: String,
}

/// Tries each repair step in order, returning the first one that parses.
pub fn parse_scores(raw: &str) -> Vec<RawScore> {
    let trimmed = raw.trim();

    if let Ok(scores) = serde_json::from_str::<Vec<RawScore>>(trimmed) {
        return scores;
    }

    if trimmed.starts_with('[') && !trimmed.trim_end().ends_with(']') {
        let mut patched = trimmed.to_string();
        patched.push(']');
        if let Ok(scores) = serde_json::from_str::<Vec<RawScore>>(&patched) {
            return scores;
        }
    }

    if let Some(slice) = extract_bracket_slice(trimmed) {
        if let Ok(scores) = serde_json::from_str::<Vec<RawScore>>(slice) {
            return scores;
        }
        let repaired = close_unbalanced(slice);
        if let Ok(scores) = serde_json::from_str::<Vec<RawScore>>(&repaired) {
            return scores;
        }
    }

    greedy_extract_objects(trimmed)
}

fn extract_bracket_slice(s: &str) -> Option<&str> {
    let start = s.find('[')?;
    let end = s.rfind(']')?;
    if end > start {
        Some(&s[start..=end])
    } else {
        None
    }
}

fn close_unbalanced(s: &str) -> String {
    let mut opens = Vec::new();
    for c in s.chars() {
        match c {
            '[' | '{' => opens.push(c),
            ']' => {
                if opens.last() == Some(&'[') {
                    opens.pop();
                }
            }
            '}' => {
                if opens.last() == Some(&'{') {
                    opens.pop();
                }
            }
            _ => {}
        }
    }
    let mut repaired = s.to_string();
    for c in opens.into_iter().rev() {
        repaired.push(if c == '[' { ']' } else { '}' });
    }
    repaired
}

fn object_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{[^{}]*\}").unwrap())
}

fn greedy_extract_objects(s: &str) -> Vec<RawScore> {
    object_regex()
        .find_iter(s)
        .filter_map(|m| serde_json::from_str::<RawScore>(m.as_str()).ok())
        .collect()
}
