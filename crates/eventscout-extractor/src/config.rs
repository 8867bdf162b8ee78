//! Extractor tuning knobs (spec §4.9).

use eventscout_retry::TimeoutSchedule;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    pub max_speakers: usize,
    pub max_subpages: usize,
    pub min_subpage_content_len: usize,
    pub main_page_timeouts: TimeoutSchedule,
    pub subpage_timeout: Duration,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_speakers: 30,
            max_subpages: 3,
            min_subpage_content_len: 100,
            main_page_timeouts: TimeoutSchedule::fixed(Duration::from_secs(40)),
            subpage_timeout: Duration::from_secs(15),
        }
    }
}
