//! Auto-expand window widening (spec §4.10). Callers are responsible for
//! enforcing "expansion runs at most once per invocation"; this module only
//! computes the widened window for a given solid-hit count.

use chrono::Duration as ChronoDuration;
use eventscout_core::{parse_iso_date, DateRangeSource};

/// Widened-window tiers, keyed by how many solid hits the un-expanded
/// window produced. Per spec §4.10's REDESIGN note, the richer four-way
/// source-file tier table was adopted over the coarser one.
fn tier_for(solid_count: usize) -> (i64, DateRangeSource) {
    match solid_count {
        0 => (90, DateRangeSource::NinetyDays),
        1 => (60, DateRangeSource::SixtyDays),
        _ => (45, DateRangeSource::FortyFiveDays),
    }
}

/// Computes the widened `(date_from, date_to, tier)` when `solid_count` is
/// below `min_solid_hits` and auto-expand is allowed. Returns `None`
/// otherwise. The new window never shrinks relative to the original.
pub fn compute_expanded_window(
    date_from: &str,
    date_to: &str,
    solid_count: usize,
    min_solid_hits: usize,
    allow_auto_expand: bool,
) -> Option<(String, String, DateRangeSource)> {
    if !allow_auto_expand || solid_count >= min_solid_hits {
        return None;
    }

    let from = parse_iso_date(date_from)?;
    let original_to = parse_iso_date(date_to)?;
    let (span_days, tier) = tier_for(solid_count);
    let widened_to = from + ChronoDuration::days(span_days);
    let widened_to = widened_to.max(original_to);

    Some((date_from.to_string(), widened_to.format("%Y-%m-%d").to_string(), tier))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_solid_hits_widens_to_ninety_days() {
        let (from, to, tier) = compute_expanded_window("2026-03-01", "2026-03-08", 0, 3, true).unwrap();
        assert_eq!(from, "2026-03-01");
        assert_eq!(to, "2026-05-30");
        assert_eq!(tier, DateRangeSource::NinetyDays);
    }

    #[test]
    fn one_solid_hit_widens_to_sixty_days() {
        let (_, _, tier) = compute_expanded_window("2026-03-01", "2026-03-08", 1, 3, true).unwrap();
        assert_eq!(tier, DateRangeSource::SixtyDays);
    }

    #[test]
    fn below_minimum_but_at_least_two_widens_to_forty_five_days() {
        let (_, _, tier) = compute_expanded_window("2026-03-01", "2026-03-08", 2, 3, true).unwrap();
        assert_eq!(tier, DateRangeSource::FortyFiveDays);
    }

    #[test]
    fn meeting_minimum_does_not_expand() {
        assert!(compute_expanded_window("2026-03-01", "2026-03-08", 3, 3, true).is_none());
    }

    #[test]
    fn disabled_auto_expand_never_expands() {
        assert!(compute_expanded_window("2026-03-01", "2026-03-08", 0, 3, false).is_none());
    }

    #[test]
    fn widened_window_never_shrinks_original() {
        let (_, to, _) = compute_expanded_window("2026-03-01", "2026-12-31", 0, 3, true).unwrap();
        assert_eq!(to, "2026-12-31");
    }
}
