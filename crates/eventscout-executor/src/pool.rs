//! Bounded-concurrency priority task pool (spec §4.8 / C8).
//!
//! Concurrency is bounded with a `tokio::sync::Semaphore`, the same
//! mechanism the bulkhead pattern (`tower-resilience-bulkhead::Bulkhead`)
//! uses to gate concurrent calls through an owned permit. Unlike the
//! bulkhead, which limits one shared call path, the pool spawns every
//! submitted task up front and lets the semaphore's FIFO wait queue gate
//! *entry* in priority order: tasks are queued for a permit in
//! priority-sorted order, so higher-priority tasks acquire first when the
//! pool is saturated. Results are handed back in original submission order
//! regardless of completion order (spec §5), independent of the priority
//! order tasks acquired their permits in.

use crate::config::ExecutorConfig;
use crate::task::{Task, TaskResult};
use std::collections::VecDeque;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio::sync::Semaphore;

const ADAPTIVE_WINDOW: usize = 10;

struct AdaptiveGate {
    semaphore: Semaphore,
    current: AtomicUsize,
    min: usize,
    max: usize,
    recent: Mutex<VecDeque<bool>>,
}

impl AdaptiveGate {
    fn new(config: &ExecutorConfig) -> Self {
        Self {
            semaphore: Semaphore::new(config.min_concurrency),
            current: AtomicUsize::new(config.min_concurrency),
            min: config.min_concurrency,
            max: config.max_concurrency,
            recent: Mutex::new(VecDeque::with_capacity(ADAPTIVE_WINDOW)),
        }
    }

    /// Records a task outcome and grows/shrinks the permit pool in [min,max]
    /// based on the rolling success rate over the last `ADAPTIVE_WINDOW`
    /// tasks.
    fn record_outcome(&self, succeeded: bool) {
        let mut recent = self.recent.lock().unwrap_or_else(|e| e.into_inner());
        recent.push_back(succeeded);
        if recent.len() > ADAPTIVE_WINDOW {
            recent.pop_front();
        }
        if recent.len() < ADAPTIVE_WINDOW {
            return;
        }
        let success_rate = recent.iter().filter(|s| **s).count() as f64 / recent.len() as f64;
        drop(recent);

        let current = self.current.load(Ordering::Acquire);
        if success_rate >= 0.8 && current < self.max {
            self.semaphore.add_permits(1);
            self.current.fetch_add(1, Ordering::AcqRel);
        } else if success_rate < 0.5 && current > self.min {
            if let Ok(permit) = self.semaphore.try_acquire() {
                permit.forget();
                self.current.fetch_sub(1, Ordering::AcqRel);
            }
        }
    }
}

/// Runs every task through `op`, bounding concurrency to
/// `config.max_concurrency` and pulling highest-priority tasks first (ties
/// keep submission order). `op` returns `(value, quality)`, where `quality`
/// feeds the early-termination average.
///
/// When `config.early_termination` is set, once at least `min_results`
/// tasks have completed and the running average quality is at or above
/// `quality_threshold`, tasks that have not yet started are returned as
/// cancelled without ever calling `op`; tasks already running are left to
/// finish.
pub async fn execute_all<T, R, F, Fut>(config: &ExecutorConfig, mut tasks: Vec<Task<T>>, op: F) -> Vec<TaskResult<R>>
where
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(R, f64), String>> + Send,
    T: Send + 'static,
    R: Send + 'static,
{
    // Pair each task with its submission index before the priority sort, so
    // results can be restored to submission order afterwards (spec §5:
    // "task outputs are returned in submission order regardless of
    // completion order").
    let mut indexed: Vec<(usize, Task<T>)> = tasks.drain(..).enumerate().collect();
    indexed.sort_by(|(_, a), (_, b)| b.priority.cmp(&a.priority));

    let gate = Arc::new(AdaptiveGate::new(config));
    let terminate = Arc::new(AtomicBool::new(false));
    let completed = Arc::new(AtomicUsize::new(0));
    let quality_sum = Arc::new(Mutex::new(0.0_f64));
    let op = Arc::new(op);
    let early_termination = config.early_termination;
    let min_results = config.min_results;
    let quality_threshold = config.quality_threshold;

    let mut handles: Vec<Option<tokio::task::JoinHandle<TaskResult<R>>>> = (0..indexed.len()).map(|_| None).collect();
    for (original_index, task) in indexed {
        let gate = Arc::clone(&gate);
        let terminate = Arc::clone(&terminate);
        let completed = Arc::clone(&completed);
        let quality_sum = Arc::clone(&quality_sum);
        let op = Arc::clone(&op);
        let timeout = task.kind.default_timeout();
        let id = task.id.clone();

        let handle = tokio::spawn(async move {
            if terminate.load(Ordering::Acquire) {
                return TaskResult::cancelled(id);
            }

            let permit = match gate.semaphore.acquire().await {
                Ok(permit) => permit,
                Err(_) => return TaskResult::cancelled(id),
            };

            if terminate.load(Ordering::Acquire) {
                drop(permit);
                return TaskResult::cancelled(id);
            }

            let start = Instant::now();
            let outcome = tokio::time::timeout(timeout, op(task.data)).await;
            let duration = start.elapsed();
            drop(permit);

            match outcome {
                Ok(Ok((value, quality))) => {
                    gate.record_outcome(true);
                    let n = completed.fetch_add(1, Ordering::AcqRel) + 1;
                    let avg = {
                        let mut sum = quality_sum.lock().unwrap_or_else(|e| e.into_inner());
                        *sum += quality;
                        *sum / n as f64
                    };
                    if early_termination && n >= min_results && avg >= quality_threshold {
                        terminate.store(true, Ordering::Release);
                    }
                    TaskResult::success(id, value, duration)
                }
                Ok(Err(err)) => {
                    gate.record_outcome(false);
                    TaskResult::failure(id, err, duration)
                }
                Err(_) => {
                    gate.record_outcome(false);
                    TaskResult::failure(id, "timed out", duration)
                }
            }
        });
        handles[original_index] = Some(handle);
    }

    // Awaiting in submission-index order restores the order contract (spec
    // §5) without affecting concurrency: every task above is already
    // running on its own spawned task by the time we start awaiting.
    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        let result = match handle.expect("every submission index is filled exactly once").await {
            Ok(result) => result,
            Err(join_err) => TaskResult::failure("unknown", join_err.to_string(), std::time::Duration::ZERO),
        };
        results.push(result);
    }
    results
}
