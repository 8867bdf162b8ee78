//! The top-level pipeline (spec §4.11 / C11): wires discovery through
//! quality scoring into one `Orchestrator::run` call, catches catastrophic
//! failures at the boundary (spec §7 policy 7), and dedups/caches whole
//! pipeline runs (spec §8 scenarios 1 and 6).

use crate::cache::{normalise_key, ResultInFlight, SharedResultInFlight};
use crate::collaborators::UserProfileStore;
use crate::config::OrchestratorConfig;
use crate::error::OrchestratorError;
use crate::query;
use eventscout_cache::{BoundedCache, DEFAULT_TTL};
use eventscout_core::{
    CandidateUrl, DateRangeSource, EventCandidate, LogSink, PrioritisedUrl, SearchMetadata, SearchParams,
    SearchResult, Source, Stage, UserProfile, WeightedTemplate,
};
use eventscout_executor::{execute_all, ExecutorConfig, Task, TaskKind};
use eventscout_extractor::{Extractor, MetadataLlm, PageScraper};
use eventscout_prioritiser::{Prioritiser, PrioritiserConfig, PrioritiserLlm};
use eventscout_quality::{
    compute_expanded_window, has_tos_title, is_non_event_url, is_solid_hit, merge_solid_candidates, QualityConfig,
};
use eventscout_rerank::{build_instruction, gate, Reranker, RerankConfig};
use eventscout_search::{SearchEngine, SearchRequest};
use futures::FutureExt;
use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

const RESULT_CACHE_CAPACITY: usize = 256;

/// One window's worth of the discover→rerank→prioritise→extract chain
/// (spec §4.11 steps 2-7), returned so the auto-expand loop can run it a
/// second time over a widened window and fold the counts together.
struct WindowOutcome {
    events: Vec<EventCandidate>,
    total_candidates: usize,
    prioritised_candidates: usize,
    providers_used: Vec<String>,
}

/// Wires every component crate into the one pipeline spec §4.11 describes.
/// Cheap to clone (every field is already an `Arc`-backed handle or owned
/// config), but typically held behind a single `Arc<Orchestrator>`.
pub struct Orchestrator {
    config: OrchestratorConfig,
    templates: Vec<WeightedTemplate>,
    profile_store: Arc<dyn UserProfileStore>,
    search_engine: Arc<SearchEngine>,
    reranker: Option<Arc<dyn Reranker>>,
    prioritiser_llm: Arc<dyn PrioritiserLlm>,
    extractor: Arc<Extractor<Arc<dyn PageScraper>, Arc<dyn MetadataLlm>>>,
    quality_config: QualityConfig,
    result_cache: BoundedCache<String, SearchResult>,
    in_flight: SharedResultInFlight<SearchResult>,
}

impl Orchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: OrchestratorConfig,
        templates: Vec<WeightedTemplate>,
        profile_store: Arc<dyn UserProfileStore>,
        search_engine: Arc<SearchEngine>,
        reranker: Option<Arc<dyn Reranker>>,
        prioritiser_llm: Arc<dyn PrioritiserLlm>,
        extractor: Arc<Extractor<Arc<dyn PageScraper>, Arc<dyn MetadataLlm>>>,
        quality_config: QualityConfig,
    ) -> Result<Self, OrchestratorError> {
        let result_cache = BoundedCache::new("orchestrator-results", RESULT_CACHE_CAPACITY)
            .map_err(|e| OrchestratorError::Config(e.to_string()))?;
        Ok(Self {
            config,
            templates,
            profile_store,
            search_engine,
            reranker,
            prioritiser_llm,
            extractor,
            quality_config,
            result_cache,
            in_flight: Arc::new(ResultInFlight::new()),
        })
    }

    /// Runs one full invocation. Only input-invariant violations surface as
    /// `Err`; everything else, including an internal panic, degrades to an
    /// empty-shaped [`SearchResult`] (spec §7 policy 7).
    pub async fn run(&self, params: SearchParams) -> Result<SearchResult, OrchestratorError> {
        params.validate()?;

        let key = normalise_key(&params);
        let lookup_start = Instant::now();

        if let Some(mut cached) = self.result_cache.get(&key) {
            cached.metadata.total_duration_ms = lookup_start.elapsed().as_millis() as u64;
            cached.logs = vec![eventscout_core::LogEvent::new(Stage::Cache, "cache_hit")];
            return Ok(cached);
        }

        if let Some(mut receiver) = self.in_flight.try_join(&key) {
            return Ok(match receiver.recv().await {
                Ok(result) => result,
                Err(_) => SearchResult::empty(vec![eventscout_core::LogEvent::new(
                    Stage::Orchestrator,
                    "in_flight_leader_dropped",
                )]),
            });
        }

        let log_sink = LogSink::new();
        let recovery_sink = log_sink.clone();
        let pipeline = AssertUnwindSafe(self.run_pipeline(params, log_sink)).catch_unwind();
        let result = match pipeline.await {
            Ok(result) => result,
            Err(_) => SearchResult::empty(recovery_sink.snapshot()),
        };

        if !result.events.is_empty() {
            self.result_cache.set(key.clone(), result.clone(), DEFAULT_TTL);
        }
        self.in_flight.complete(&key, result.clone());

        Ok(result)
    }

    async fn run_pipeline(&self, params: SearchParams, log_sink: LogSink) -> SearchResult {
        let pipeline_start = Instant::now();
        log_sink.log(Stage::Orchestrator, "pipeline started");

        let profile = self.profile_store.load().await.unwrap_or_default();
        let (base_query, industry) =
            query::build_base_query(&params, &profile, &self.templates, &self.config.default_industry);

        let window_from = params.date_from.clone();
        let window_to = params.date_to.clone();

        let outcome = self
            .search_window(
                &base_query,
                &industry,
                &params,
                &profile,
                &window_from,
                &window_to,
                DateRangeSource::Original,
                &log_sink,
            )
            .await;

        let mut extracted_candidates = outcome.events.len();
        let mut total_candidates = outcome.total_candidates;
        let mut prioritised_candidates = outcome.prioritised_candidates;
        let mut providers_used = outcome.providers_used;

        let solids: Vec<EventCandidate> = outcome
            .events
            .into_iter()
            .filter(|c| is_solid_hit(&self.quality_config, c, &window_from, &window_to).ok)
            .collect();
        let mut solid_count = solids.len();
        let mut final_events = solids.clone();
        let mut auto_expanded = false;

        // Auto-expand runs at most once per invocation (spec §4.10).
        if let Some((expanded_from, expanded_to, tier)) = compute_expanded_window(
            &window_from,
            &window_to,
            solid_count,
            self.config.search_tuning.min_solid_hits,
            self.config.search_tuning.allow_auto_expand,
        ) {
            log_sink.log_with(
                Stage::AutoExpand,
                "widening search window",
                serde_json::json!({ "from": expanded_from, "to": expanded_to }),
            );

            let expanded = self
                .search_window(
                    &base_query,
                    &industry,
                    &params,
                    &profile,
                    &expanded_from,
                    &expanded_to,
                    tier,
                    &log_sink,
                )
                .await;

            extracted_candidates += expanded.events.len();
            total_candidates += expanded.total_candidates;
            prioritised_candidates += expanded.prioritised_candidates;
            for provider in expanded.providers_used {
                if !providers_used.contains(&provider) {
                    providers_used.push(provider);
                }
            }

            let expanded_solids: Vec<EventCandidate> = expanded
                .events
                .into_iter()
                .filter(|c| is_solid_hit(&self.quality_config, c, &expanded_from, &expanded_to).ok)
                .collect();

            final_events = merge_solid_candidates(solids, expanded_solids);
            solid_count = final_events.len();
            auto_expanded = true;
        }

        final_events.retain(|c| !has_tos_title(&c.title));
        final_events.sort_by(|a, b| b.confidence.partial_cmp(&a.confidence).unwrap_or(std::cmp::Ordering::Equal));
        final_events.truncate(self.config.limits.max_extractions);
        log_sink.log(Stage::Rank, "final ranking applied");

        let metadata = SearchMetadata {
            total_candidates,
            prioritised_candidates,
            extracted_candidates,
            solid_candidates: solid_count,
            low_confidence: solid_count < self.config.search_tuning.min_solid_hits,
            total_duration_ms: pipeline_start.elapsed().as_millis() as u64,
            stage_timings_ms: Default::default(),
            providers_used,
            auto_expanded,
        };

        log_sink.log(Stage::Orchestrator, "pipeline finished");

        SearchResult { events: final_events, metadata, logs: log_sink.into_events() }
    }

    #[allow(clippy::too_many_arguments)]
    async fn search_window(
        &self,
        base_query: &str,
        industry: &str,
        params: &SearchParams,
        profile: &UserProfile,
        date_from: &str,
        date_to: &str,
        date_range_source: DateRangeSource,
        log_sink: &LogSink,
    ) -> WindowOutcome {
        log_sink.log(Stage::Discovery, format!("discovering over {date_from}..{date_to}"));

        let variations = query::query_variations(base_query);
        let discovery_tasks: Vec<Task<String>> = variations
            .iter()
            .enumerate()
            .map(|(i, q)| Task::new(format!("discover-{i}"), q.clone(), 0, TaskKind::Firecrawl))
            .collect();

        let search_engine = Arc::clone(&self.search_engine);
        let country = params.country.clone();
        let date_from_owned = date_from.to_string();
        let date_to_owned = date_to.to_string();
        let limit = self.config.limits.max_candidates.max(1);

        let discovery_config = ExecutorConfig::new(self.config.parallel.max_concurrent_discoveries);
        let discovery_results = execute_all(&discovery_config, discovery_tasks, move |query_text| {
            let search_engine = Arc::clone(&search_engine);
            let req = SearchRequest {
                query: query_text,
                country: country.clone(),
                date_from: Some(date_from_owned.clone()),
                date_to: Some(date_to_owned.clone()),
                limit,
                use_cache: true,
            };
            async move {
                let response = search_engine.search(req).await;
                Ok::<_, String>((response, 1.0))
            }
        })
        .await;

        let mut providers_used: Vec<String> = Vec::new();
        let mut seen_urls: HashSet<String> = HashSet::new();
        let mut discovered: Vec<String> = Vec::new();
        for result in discovery_results {
            let Some(response) = result.result else { continue };
            for provider in response.providers {
                if !providers_used.contains(&provider) {
                    providers_used.push(provider);
                }
            }
            for item in response.items {
                let url = item.url().to_string();
                if CandidateUrl::new(url.clone()).is_some() && seen_urls.insert(url.clone()) {
                    discovered.push(url);
                }
            }
        }
        discovered.truncate(self.config.limits.max_candidates);
        let total_candidates = discovered.len();

        let date_window = format!("{date_from} to {date_to}");
        let rerank_config = RerankConfig {
            min_non_aggregator_urls: self.config.search_tuning.min_non_aggregator_urls,
            max_backstop_aggregators: self.config.search_tuning.max_backstop_aggregators,
            max_voyage_docs: self.config.search_tuning.max_voyage_docs,
            top_k: self.config.search_tuning.voyage_top_k,
            ..RerankConfig::default()
        };
        let instruction = build_instruction(industry, params.country.as_deref(), &date_window);
        let (gated, _rerank_metrics) =
            gate(&rerank_config, discovered, params.country.as_deref(), self.reranker.as_deref(), &instruction).await;
        let filtered: Vec<String> = gated.into_iter().filter(|u| !is_non_event_url(u)).collect();
        log_sink.log(Stage::Filter, format!("{} urls survive rerank and filter", filtered.len()));

        let mut prioritiser_config = PrioritiserConfig::new(industry.to_string())
            .threshold(self.config.thresholds.prioritisation)
            .date_window(date_window);
        if let Some(country) = &params.country {
            prioritiser_config = prioritiser_config.country(country.clone());
        }
        if let Some(term) = profile.industry_terms.first() {
            prioritiser_config = prioritiser_config.industry_term(term.clone());
        }
        if let Some(term) = profile.icp_terms.first() {
            prioritiser_config = prioritiser_config.icp_term(term.clone());
        }

        let prioritiser = Prioritiser::new(prioritiser_config, Arc::clone(&self.prioritiser_llm));
        let (mut prioritised, _prioritiser_metrics) = prioritiser.prioritise(&filtered).await;
        let prioritised_candidates = prioritised.len();
        log_sink.log(Stage::Prioritise, format!("{prioritised_candidates} urls prioritised"));

        prioritised.truncate(self.config.limits.max_extractions);

        let extractor = Arc::clone(&self.extractor);
        let original_query = base_query.to_string();
        let country = params.country.clone();
        let source = Source::Firecrawl;

        let extraction_tasks: Vec<Task<PrioritisedUrl>> = prioritised
            .into_iter()
            .enumerate()
            .map(|(i, pu)| {
                let priority = (pu.score * 1000.0).round() as i64;
                Task::new(format!("extract-{i}"), pu, priority, TaskKind::Extraction)
            })
            .collect();

        let extraction_config =
            ExecutorConfig::new(self.config.parallel.max_concurrent_extractions.clamp(1, 4)).min_concurrency(1);
        let extraction_results = execute_all(&extraction_config, extraction_tasks, move |prioritised_url| {
            let extractor = Arc::clone(&extractor);
            let original_query = original_query.clone();
            let country = country.clone();
            async move {
                extractor
                    .extract(&prioritised_url.url, source, &original_query, country.as_deref())
                    .await
                    .map(|candidate| {
                        let quality = candidate.confidence;
                        (candidate, quality)
                    })
                    .map_err(|e| e.to_string())
            }
        })
        .await;

        let mut events: Vec<EventCandidate> =
            extraction_results.into_iter().filter_map(|r| r.result).collect();
        for event in &mut events {
            event.date_range_source = date_range_source;
        }
        log_sink.log(Stage::Extract, format!("{} candidates extracted", events.len()));

        WindowOutcome { events, total_candidates, prioritised_candidates, providers_used }
    }
}
