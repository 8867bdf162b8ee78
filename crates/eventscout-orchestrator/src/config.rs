//! Aggregated configuration surface (spec §6's Configuration table), wired
//! the way `tower_resilience::composition` describes combining several
//! layers' configs into one owner, with defaults overridable via
//! `EVENTSCOUT_*` environment variables or an optional TOML file.

use serde::{Deserialize, Serialize};
use std::time::Duration;

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(d)?))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Thresholds {
    pub prioritisation: f64,
    pub confidence: f64,
    pub parse_quality: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self { prioritisation: 0.4, confidence: 0.6, parse_quality: 0.5 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Limits {
    pub max_candidates: usize,
    pub max_extractions: usize,
    pub max_speakers: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self { max_candidates: 40, max_extractions: 12, max_speakers: 30 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Timeouts {
    #[serde(with = "duration_secs")]
    pub discovery: Duration,
    #[serde(with = "duration_secs")]
    pub prioritisation_per_chunk: Duration,
    #[serde(with = "duration_secs")]
    pub extraction: Duration,
    #[serde(with = "duration_secs")]
    pub enhancement: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            discovery: Duration::from_secs(40),
            prioritisation_per_chunk: Duration::from_secs(12),
            extraction: Duration::from_secs(30),
            enhancement: Duration::from_secs(20),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Parallel {
    pub max_concurrent_extractions: usize,
    pub max_concurrent_enhancements: usize,
    pub max_concurrent_discoveries: usize,
    pub enable_early_termination: bool,
    pub enable_smart_batching: bool,
}

impl Default for Parallel {
    fn default() -> Self {
        Self {
            max_concurrent_extractions: 4,
            max_concurrent_enhancements: 3,
            max_concurrent_discoveries: 12,
            enable_early_termination: true,
            enable_smart_batching: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchTuning {
    pub min_solid_hits: usize,
    pub allow_auto_expand: bool,
    pub max_voyage_docs: usize,
    pub voyage_top_k: usize,
    pub min_non_aggregator_urls: usize,
    pub max_backstop_aggregators: usize,
}

impl Default for SearchTuning {
    fn default() -> Self {
        Self {
            min_solid_hits: 3,
            allow_auto_expand: true,
            max_voyage_docs: 50,
            voyage_top_k: 30,
            min_non_aggregator_urls: 5,
            max_backstop_aggregators: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Warming {
    pub warming_batch_size: usize,
    #[serde(with = "duration_secs")]
    pub warming_interval: Duration,
    #[serde(with = "duration_secs")]
    pub warming_timeout: Duration,
    pub max_warming_concurrency: usize,
}

impl Default for Warming {
    fn default() -> Self {
        Self {
            warming_batch_size: 50,
            warming_interval: Duration::from_secs(5 * 60),
            warming_timeout: Duration::from_secs(30),
            max_warming_concurrency: 10,
        }
    }
}

/// Top-level config owner, aggregating every sub-component's config struct
/// (spec §4.11 [NEW]).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrchestratorConfig {
    pub thresholds: Thresholds,
    pub limits: Limits,
    pub timeouts: Timeouts,
    pub parallel: Parallel,
    pub search_tuning: SearchTuning,
    pub warming: Warming,
    /// Industry label used by the generic query-builder fallback when no
    /// weighted template matches the request.
    pub default_industry: String,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            limits: Limits::default(),
            timeouts: Timeouts::default(),
            parallel: Parallel::default(),
            search_tuning: SearchTuning::default(),
            warming: Warming::default(),
            default_industry: "general events".to_string(),
        }
    }
}

impl OrchestratorConfig {
    /// Overlays `EVENTSCOUT_*` environment variables (double-underscore
    /// nested, e.g. `EVENTSCOUT_LIMITS__MAX_CANDIDATES`) and an optional
    /// `eventscout.toml` file over these defaults.
    pub fn load() -> Result<Self, figment::Error> {
        use figment::providers::{Env, Format, Serialized, Toml};
        use figment::Figment;

        Figment::from(Serialized::defaults(OrchestratorConfig::default()))
            .merge(Toml::file("eventscout.toml"))
            .merge(Env::prefixed("EVENTSCOUT_").split("__"))
            .extract()
    }
}
