use std::time::Duration;

/// Configuration for the LLM prioritiser (spec §4.7).
#[derive(Debug, Clone)]
pub struct PrioritiserConfig {
    pub chunk_size: usize,
    pub min_call_spacing: Duration,
    pub call_timeout: Duration,
    pub threshold: f64,
    pub industry: String,
    pub country: Option<String>,
    pub date_window: String,
    pub industry_term: Option<String>,
    pub icp_term: Option<String>,
}

impl PrioritiserConfig {
    pub fn new(industry: impl Into<String>) -> Self {
        Self {
            chunk_size: 3,
            min_call_spacing: Duration::from_secs(1),
            call_timeout: Duration::from_secs(12),
            threshold: 0.4,
            industry: industry.into(),
            country: None,
            date_window: String::new(),
            industry_term: None,
            icp_term: None,
        }
    }

    pub fn country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn date_window(mut self, window: impl Into<String>) -> Self {
        self.date_window = window.into();
        self
    }

    pub fn industry_term(mut self, term: impl Into<String>) -> Self {
        self.industry_term = Some(term.into());
        self
    }

    pub fn icp_term(mut self, term: impl Into<String>) -> Self {
        self.icp_term = Some(term.into());
        self
    }

    pub fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }
}

/// Builds the instruction sent with each chunk: industry focus, country,
/// date window, one industry term, one ICP term; forbids prose and caps
/// `reason` at 10 characters.
pub fn build_instruction(config: &PrioritiserConfig) -> String {
    format!(
        "Score each URL 0-1 for relevance to {industry} events in {country} during {window}. \
         Consider industry term \"{industry_term}\" and ideal-customer term \"{icp_term}\". \
         Respond with JSON only: [{{\"url\":...,\"score\":...,\"reason\":...}}]. \
         No prose. reason must be <= 10 characters.",
        industry = config.industry,
        country = config.country.as_deref().unwrap_or("any country"),
        window = if config.date_window.is_empty() { "any time" } else { &config.date_window },
        industry_term = config.industry_term.as_deref().unwrap_or(""),
        icp_term = config.icp_term.as_deref().unwrap_or(""),
    )
}
