//! Rolling cache-performance analytics (spec §4.12): a point-in-time
//! snapshot plus a bounded history of past snapshots.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// A point-in-time read on a single cache's performance.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheSnapshot {
    pub hit_rate: f64,
    pub miss_rate: f64,
    pub total_requests: u64,
    pub average_response_time_ms: f64,
    pub cache_size: usize,
    pub memory_usage_bytes: usize,
    pub top_keys: Vec<String>,
}

/// Accumulates hits/misses/latency for one cache between snapshots.
#[derive(Default)]
pub struct AnalyticsCollector {
    hits: AtomicU64,
    misses: AtomicU64,
    total_response_time_micros: AtomicU64,
}

impl AnalyticsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self, elapsed_micros: u64) {
        self.hits.fetch_add(1, Ordering::Relaxed);
        self.total_response_time_micros.fetch_add(elapsed_micros, Ordering::Relaxed);
    }

    pub fn record_miss(&self, elapsed_micros: u64) {
        self.misses.fetch_add(1, Ordering::Relaxed);
        self.total_response_time_micros.fetch_add(elapsed_micros, Ordering::Relaxed);
    }

    /// Builds a snapshot from accumulated counters plus the cache's current
    /// size/memory estimate and most-recently-seen keys, leaving the
    /// counters untouched so multiple callers can read stable rates.
    pub fn snapshot(&self, cache_size: usize, memory_usage_bytes: usize, top_keys: Vec<String>) -> CacheSnapshot {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let (hit_rate, miss_rate) = if total == 0 {
            (0.0, 0.0)
        } else {
            (hits as f64 / total as f64, misses as f64 / total as f64)
        };
        let average_response_time_ms = if total == 0 {
            0.0
        } else {
            (self.total_response_time_micros.load(Ordering::Relaxed) as f64 / total as f64) / 1000.0
        };

        CacheSnapshot {
            hit_rate,
            miss_rate,
            total_requests: total,
            average_response_time_ms,
            cache_size,
            memory_usage_bytes,
            top_keys,
        }
    }
}

/// Bounded ring buffer of past snapshots, one per collector, used to chart
/// trends without unbounded memory growth.
pub struct AnalyticsHistory {
    capacity: usize,
    snapshots: Mutex<VecDeque<CacheSnapshot>>,
}

impl AnalyticsHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            snapshots: Mutex::new(VecDeque::new()),
        }
    }

    pub fn record(&self, snapshot: CacheSnapshot) {
        let mut snapshots = self.snapshots.lock().unwrap_or_else(|e| e.into_inner());
        if snapshots.len() >= self.capacity {
            snapshots.pop_front();
        }
        snapshots.push_back(snapshot);
    }

    /// The `n` most recent snapshots, oldest first.
    pub fn recent(&self, n: usize) -> Vec<CacheSnapshot> {
        let snapshots = self.snapshots.lock().unwrap_or_else(|e| e.into_inner());
        let skip = snapshots.len().saturating_sub(n);
        snapshots.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.snapshots.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collector_computes_hit_and_miss_rates() {
        let collector = AnalyticsCollector::new();
        collector.record_hit(100);
        collector.record_hit(100);
        collector.record_miss(100);

        let snapshot = collector.snapshot(3, 1024, vec!["a".to_string()]);
        assert_eq!(snapshot.total_requests, 3);
        assert!((snapshot.hit_rate - 2.0 / 3.0).abs() < 1e-9);
        assert!((snapshot.miss_rate - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn snapshot_with_no_activity_has_zero_rates() {
        let collector = AnalyticsCollector::new();
        let snapshot = collector.snapshot(0, 0, Vec::new());
        assert_eq!(snapshot.hit_rate, 0.0);
        assert_eq!(snapshot.miss_rate, 0.0);
        assert_eq!(snapshot.average_response_time_ms, 0.0);
    }

    #[test]
    fn history_evicts_oldest_beyond_capacity() {
        let history = AnalyticsHistory::new(2);
        for i in 0..3 {
            history.record(CacheSnapshot {
                hit_rate: i as f64,
                miss_rate: 0.0,
                total_requests: i,
                average_response_time_ms: 0.0,
                cache_size: 0,
                memory_usage_bytes: 0,
                top_keys: Vec::new(),
            });
        }
        assert_eq!(history.len(), 2);
        let recent = history.recent(10);
        assert_eq!(recent[0].total_requests, 1);
        assert_eq!(recent[1].total_requests, 2);
    }

    #[test]
    fn recent_returns_at_most_requested_count() {
        let history = AnalyticsHistory::new(10);
        for i in 0..5 {
            history.record(CacheSnapshot {
                hit_rate: 0.0,
                miss_rate: 0.0,
                total_requests: i,
                average_response_time_ms: 0.0,
                cache_size: 0,
                memory_usage_bytes: 0,
                top_keys: Vec::new(),
            });
        }
        assert_eq!(history.recent(2).len(), 2);
    }
}
