//! Merging auto-expand results back into the original solid-hit set (spec
//! §4.10 step 4).

use eventscout_core::EventCandidate;
use std::collections::HashSet;

/// Merges `expanded` solid candidates into `original`, deduplicated by URL.
/// Candidates already present in `original` win — they were found under the
/// narrower, more specific window.
pub fn merge_solid_candidates(original: Vec<EventCandidate>, expanded: Vec<EventCandidate>) -> Vec<EventCandidate> {
    let mut seen: HashSet<String> = original.iter().map(|c| c.url.clone()).collect();
    let mut merged = original;
    for candidate in expanded {
        if seen.insert(candidate.url.clone()) {
            merged.push(candidate);
        }
    }
    merged
}
