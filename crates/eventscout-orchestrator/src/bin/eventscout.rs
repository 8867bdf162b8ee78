//! Demo CLI: runs one pipeline invocation end-to-end against the offline
//! collaborator stand-ins in [`eventscout_orchestrator::demo`] and prints the
//! resulting `SearchResult` as JSON.

use clap::Parser;
use eventscout_cache::{BoundedCache, DEFAULT_TTL};
use eventscout_core::{SearchParams, UserProfile};
use eventscout_extractor::{Extractor, ExtractorConfig};
use eventscout_orchestrator::demo::{
    EchoMetadataLlm, EchoPrioritiserLlm, EmptyProvider, FixturePageScraper, NullReranker,
};
use eventscout_orchestrator::{Orchestrator, OrchestratorConfig, StaticUserProfileStore};
use eventscout_prioritiser::{Prioritiser, PrioritiserConfig};
use eventscout_quality::QualityConfig;
use eventscout_ratelimiter::RateLimiter;
use eventscout_search::SearchEngine;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "eventscout", about = "Discover, rank and extract events for a search query")]
struct Args {
    /// Free-text description of the events to find, e.g. "fintech conferences in Berlin".
    #[arg(long, env = "EVENTSCOUT_QUERY")]
    query: String,

    /// ISO-3166 country code to bias results toward.
    #[arg(long, env = "EVENTSCOUT_COUNTRY")]
    country: Option<String>,

    /// Inclusive start date, YYYY-MM-DD.
    #[arg(long, default_value = "2026-01-01")]
    date_from: String,

    /// Inclusive end date, YYYY-MM-DD.
    #[arg(long, default_value = "2026-12-31")]
    date_to: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = OrchestratorConfig::load()?;

    let profile_store = Arc::new(StaticUserProfileStore::new(UserProfile::default()));

    let search_engine = Arc::new(SearchEngine::new(
        Arc::new(EmptyProvider::new("firecrawl")),
        Arc::new(EmptyProvider::new("cse")),
        Arc::new(EmptyProvider::new("database")),
        RateLimiter::new(120),
        BoundedCache::new("eventscout-cli-search", 128)?,
        DEFAULT_TTL,
    ));

    let reranker: Option<Arc<dyn eventscout_rerank::Reranker>> = Some(Arc::new(NullReranker));
    let prioritiser_llm: Arc<dyn eventscout_prioritiser::PrioritiserLlm> = Arc::new(EchoPrioritiserLlm);
    let _ = Prioritiser::new(PrioritiserConfig::new("general events"), Arc::clone(&prioritiser_llm));

    let scraper: Arc<dyn eventscout_extractor::PageScraper> = Arc::new(FixturePageScraper);
    let metadata_llm: Arc<dyn eventscout_extractor::MetadataLlm> = Arc::new(EchoMetadataLlm);
    let extractor = Arc::new(Extractor::new(ExtractorConfig::default(), scraper, Some(metadata_llm)));

    let orchestrator = Orchestrator::new(
        config,
        Vec::new(),
        profile_store,
        search_engine,
        reranker,
        prioritiser_llm,
        extractor,
        QualityConfig::default(),
    )?;

    let params = SearchParams {
        user_text: args.query,
        country: args.country,
        date_from: args.date_from,
        date_to: args.date_to,
        location: None,
        timeframe: None,
        locale: None,
    };

    let result = orchestrator.run(params).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
