//! Tuning knobs for the solid-hit predicate and auto-expand loop (spec
//! §4.10).

/// Weights for [`crate::solid_hit::is_solid_hit`]'s quality score. Spec
/// §4.10 names relative weight classes ("largest", "medium", "small")
/// without numbers; these sum to 1.0 in that relative order.
#[derive(Debug, Clone, Copy)]
pub struct SolidHitWeights {
    pub date_in_window: f64,
    pub city_or_venue: f64,
    pub speakers_present: f64,
    pub has_speaker_page: f64,
    pub host_country_correlation: f64,
}

impl Default for SolidHitWeights {
    fn default() -> Self {
        Self {
            date_in_window: 0.4,
            city_or_venue: 0.2,
            speakers_present: 0.2,
            has_speaker_page: 0.1,
            host_country_correlation: 0.1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct QualityConfig {
    pub weights: SolidHitWeights,
    pub threshold: f64,
    pub min_solid_hits: usize,
    pub allow_auto_expand: bool,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            weights: SolidHitWeights::default(),
            threshold: 0.5,
            min_solid_hits: 3,
            allow_auto_expand: true,
        }
    }
}
