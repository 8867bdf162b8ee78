//! The rerank gate algorithm itself (spec §4.6).

use crate::config::RerankConfig;
use crate::reranker::Reranker;
use eventscout_core::CandidateUrl;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RerankMetrics {
    pub kept: usize,
    pub dropped_aggregators: usize,
    pub backstop_used: bool,
    pub bias_hits: usize,
}

const SPEAKER_PATH_KEYWORDS: &[&str] = &[
    "referenten", "speakers", "presenters", "faculty", "agenda", "program", "schedule",
];

fn has_speaker_path_hint(url: &str) -> bool {
    let lower = url.to_lowercase();
    SPEAKER_PATH_KEYWORDS.iter().any(|k| lower.contains(k))
}

fn country_tld(country: &str) -> Option<&'static str> {
    match country.to_uppercase().as_str() {
        "DE" => Some(".de"),
        "AT" => Some(".at"),
        "CH" => Some(".ch"),
        "US" => Some(".com"),
        "UK" | "GB" => Some(".co.uk"),
        "FR" => Some(".fr"),
        _ => None,
    }
}

fn matches_country_tld(url: &str, country: Option<&str>) -> bool {
    match country.and_then(country_tld) {
        Some(tld) => url.to_lowercase().contains(tld),
        None => false,
    }
}

/// Reduces `urls` to a ranked top-K list, applying the aggregator
/// partition/backstop, an optional reranker call, and the micro-bias.
pub async fn gate(
    config: &RerankConfig,
    urls: Vec<String>,
    country: Option<&str>,
    reranker: Option<&dyn Reranker>,
    instruction: &str,
) -> (Vec<String>, RerankMetrics) {
    let mut metrics = RerankMetrics::default();

    let (aggregators, non_aggregators): (Vec<String>, Vec<String>) = urls.into_iter().partition(|u| {
        CandidateUrl::new(u.clone()).is_some_and(|c| c.is_aggregator())
    });

    let mut working = non_aggregators;
    if working.len() >= config.min_non_aggregator_urls {
        metrics.dropped_aggregators = aggregators.len();
    } else {
        let backstop: Vec<String> = aggregators.iter().take(config.max_backstop_aggregators).cloned().collect();
        metrics.backstop_used = !backstop.is_empty();
        metrics.dropped_aggregators = aggregators.len() - backstop.len();
        working.extend(backstop);
    }

    working.truncate(config.max_voyage_docs);

    let base_scores: Vec<f64> = if let Some(reranker) = reranker {
        match reranker.rerank(instruction, &working).await {
            Ok(scores) if scores.len() == working.len() => scores,
            _ => vec![0.0; working.len()],
        }
    } else {
        vec![0.0; working.len()]
    };

    let mut scored: Vec<(String, f64)> = working
        .into_iter()
        .zip(base_scores)
        .map(|(url, base)| {
            let mut bonus = 0.0;
            if matches_country_tld(&url, country) {
                bonus += config.country_tld_bonus;
                metrics.bias_hits += 1;
            }
            if has_speaker_path_hint(&url) {
                bonus += config.speaker_path_bonus;
                metrics.bias_hits += 1;
            }
            (url, base + bonus)
        })
        .collect();

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(config.top_k);

    metrics.kept = scored.len();
    (scored.into_iter().map(|(url, _)| url).collect(), metrics)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(n: usize, prefix: &str) -> Vec<String> {
        (0..n).map(|i| format!("https://{prefix}-{i}.example.de")).collect()
    }

    #[tokio::test]
    async fn aggregators_dropped_when_enough_non_aggregators() {
        let config = RerankConfig::default();
        let mut input = urls(6, "summit");
        input.push("https://eventbrite.com/e/1".to_string());

        let (kept, metrics) = gate(&config, input, None, None, "instr").await;
        assert!(!kept.iter().any(|u| u.contains("eventbrite")));
        assert_eq!(metrics.dropped_aggregators, 1);
        assert!(!metrics.backstop_used);
    }

    #[tokio::test]
    async fn aggregators_kept_as_backstop_when_too_few_non_aggregators() {
        let config = RerankConfig::default();
        let input = vec![
            "https://eventbrite.com/e/1".to_string(),
            "https://10times.com/e/2".to_string(),
            "https://summit-1.example.de".to_string(),
        ];

        let (kept, metrics) = gate(&config, input, None, None, "instr").await;
        assert!(kept.iter().any(|u| u.contains("eventbrite") || u.contains("10times")));
        assert!(metrics.backstop_used);
    }

    #[tokio::test]
    async fn truncates_to_max_voyage_docs() {
        let mut config = RerankConfig::default();
        config.max_voyage_docs = 3;
        config.top_k = 10;
        let input = urls(10, "summit");

        let (kept, _) = gate(&config, input, None, None, "instr").await;
        assert!(kept.len() <= 3);
    }

    #[tokio::test]
    async fn country_tld_and_speaker_path_add_bias() {
        let config = RerankConfig::default();
        let input = vec![
            "https://summit.example.de/speakers".to_string(),
            "https://summit.example.fr".to_string(),
        ];

        let (kept, metrics) = gate(&config, input, Some("DE"), None, "instr").await;
        assert_eq!(kept[0], "https://summit.example.de/speakers");
        assert_eq!(metrics.bias_hits, 2);
    }

    #[tokio::test]
    async fn respects_top_k() {
        let mut config = RerankConfig::default();
        config.top_k = 2;
        let input = urls(6, "summit");

        let (kept, metrics) = gate(&config, input, None, None, "instr").await;
        assert_eq!(kept.len(), 2);
        assert_eq!(metrics.kept, 2);
    }
}
