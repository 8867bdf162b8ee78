use async_trait::async_trait;
use eventscout_core::StageError;

/// An external reranker API (e.g. Voyage). Returns a relevance score per
/// URL, in the same order as the input slice.
#[async_trait]
pub trait Reranker: Send + Sync {
    async fn rerank(&self, instruction: &str, urls: &[String]) -> Result<Vec<f64>, StageError>;
}

/// Builds the templated instruction carrying country/date/industry context
/// (spec §4.6 step 4).
pub fn build_instruction(industry: &str, country: Option<&str>, date_window: &str) -> String {
    format!(
        "Rank these event pages for relevance to the {industry} industry in {country} during {date_window}.",
        industry = industry,
        country = country.unwrap_or("any country"),
        date_window = date_window,
    )
}
