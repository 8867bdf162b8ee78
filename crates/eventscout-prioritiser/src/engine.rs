//! Chunked LLM scoring with rate-limited calls, JSON repair, normalisation,
//! and per-chunk failure isolation (spec §4.7 / C7).

use crate::client::{classify, FailureCategory, PrioritiserLlm};
use crate::config::{build_instruction, PrioritiserConfig};
use crate::json_repair::parse_scores;
use crate::scoring::{calculate_url_bonus, fallback_score};
use eventscout_core::PrioritisedUrl;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Default)]
pub struct PrioritiserMetrics {
    pub counts: HashMap<&'static str, usize>,
}

impl PrioritiserMetrics {
    fn record(&mut self, category: FailureCategory) {
        *self.counts.entry(category.as_str()).or_insert(0) += 1;
    }
}

pub struct Prioritiser<L: PrioritiserLlm> {
    config: PrioritiserConfig,
    llm: L,
    last_call: Mutex<Option<Instant>>,
}

impl<L: PrioritiserLlm> Prioritiser<L> {
    pub fn new(config: PrioritiserConfig, llm: L) -> Self {
        Self {
            config,
            llm,
            last_call: Mutex::new(None),
        }
    }

    /// Scores every URL, applying the configured threshold and returning
    /// results sorted descending by score.
    pub async fn prioritise(&self, urls: &[String]) -> (Vec<PrioritisedUrl>, PrioritiserMetrics) {
        let instruction = build_instruction(&self.config);
        let mut metrics = PrioritiserMetrics::default();
        let mut results = Vec::with_capacity(urls.len());

        for (chunk_idx, chunk) in urls.chunks(self.config.chunk_size).enumerate() {
            self.respect_call_spacing().await;

            let base_idx = chunk_idx * self.config.chunk_size;
            let chunk_scores = self.score_chunk(chunk, &instruction, base_idx, &mut metrics).await;
            results.extend(chunk_scores);
        }

        for result in &mut results {
            let bonus = calculate_url_bonus(&result.url, self.config.country.as_deref());
            *result = PrioritisedUrl::new(result.url.clone(), result.score + bonus, result.reason.clone());
        }

        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.retain(|r| r.score >= self.config.threshold);

        (results, metrics)
    }

    async fn respect_call_spacing(&self) {
        let wait = {
            let mut guard = self.last_call.lock().unwrap_or_else(|e| e.into_inner());
            let wait = guard.map(|last| self.config.min_call_spacing.saturating_sub(last.elapsed()));
            *guard = Some(Instant::now());
            wait
        };
        if let Some(wait) = wait {
            if !wait.is_zero() {
                tokio::time::sleep(wait).await;
            }
        }
    }

    async fn score_chunk(
        &self,
        chunk: &[String],
        instruction: &str,
        base_idx: usize,
        metrics: &mut PrioritiserMetrics,
    ) -> Vec<PrioritisedUrl> {
        let outcome = tokio::time::timeout(self.config.call_timeout, self.llm.complete(instruction, chunk)).await;

        let raw = match outcome {
            Ok(Ok(text)) => text,
            Ok(Err(err)) => {
                metrics.record(classify(&err));
                return self.fallback_chunk(chunk, base_idx);
            }
            Err(_) => {
                metrics.record(FailureCategory::Timeout);
                return self.fallback_chunk(chunk, base_idx);
            }
        };

        let parsed = parse_scores(&raw);
        if parsed.is_empty() && !chunk.is_empty() {
            metrics.record(FailureCategory::Invalid);
            return self.fallback_chunk(chunk, base_idx);
        }

        metrics.record(FailureCategory::Success);
        parsed
            .into_iter()
            .filter(|raw| chunk.contains(&raw.url))
            .map(|raw| {
                let score = raw
                    .score
                    .as_f64()
                    .map(|s| s.clamp(0.0, 1.0))
                    .unwrap_or_else(|| {
                        let idx = chunk.iter().position(|u| u == &raw.url).unwrap_or(0);
                        fallback_score(&raw.url, base_idx + idx, self.config.country.as_deref())
                    });
                PrioritisedUrl::new(raw.url, score, raw.reason)
            })
            .collect()
    }

    fn fallback_chunk(&self, chunk: &[String], base_idx: usize) -> Vec<PrioritisedUrl> {
        chunk
            .iter()
            .enumerate()
            .map(|(i, url)| {
                let score = fallback_score(url, base_idx + i, self.config.country.as_deref());
                PrioritisedUrl::new(url.clone(), score, "fallback")
            })
            .collect()
    }
}
