//! Concurrent batch orchestrator
//!
//! Fan-out helper for capabilities that act against many targets (company x
//! role pairs, companies). Targets run in fixed-size sequential batches with
//! intra-batch concurrency, so at most `batch_size` external sessions are
//! open at once. One target's failure never aborts the others; failures come
//! back as a side list for logging.

use futures::future::join_all;
use std::collections::HashSet;
use std::future::Future;
use std::hash::Hash;
use tracing::warn;

use crate::error::ToolFailure;

/// Outcome of a batched run: concatenated successful payloads plus the
/// per-target failures, in dispatch order.
#[derive(Debug)]
pub struct BatchReport<K, T> {
    pub items: Vec<T>,
    pub failures: Vec<(K, ToolFailure)>,
}

impl<K, T> BatchReport<K, T> {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Run `op` against every target with bounded concurrency.
///
/// Callers truncate `targets` to their hard caps before dispatch; this
/// function runs whatever it is given.
pub async fn run_batched<K, T, F, Fut>(targets: Vec<K>, batch_size: usize, op: F) -> BatchReport<K, T>
where
    K: Clone,
    F: Fn(K) -> Fut,
    Fut: Future<Output = Result<Vec<T>, ToolFailure>>,
{
    let mut report = BatchReport {
        items: Vec::new(),
        failures: Vec::new(),
    };

    for chunk in targets.chunks(batch_size.max(1)) {
        let in_flight = chunk.iter().cloned().map(|target| {
            let fut = op(target.clone());
            async move { (target, fut.await) }
        });

        for (target, outcome) in join_all(in_flight).await {
            match outcome {
                Ok(mut items) => report.items.append(&mut items),
                Err(failure) => report.failures.push((target, failure)),
            }
        }
    }

    report
}

/// Drop later duplicates by key, preserving first-seen order.
pub fn dedup_by_key<T, K, F>(items: Vec<T>, key: F) -> Vec<T>
where
    K: Hash + Eq,
    F: Fn(&T) -> K,
{
    let mut seen = HashSet::new();
    items.into_iter().filter(|item| seen.insert(key(item))).collect()
}

/// Log a batch's failures without escalating them.
pub fn log_failures<K: std::fmt::Debug, T>(tool: &str, report: &BatchReport<K, T>) {
    for (target, failure) in &report.failures {
        warn!(tool, target = ?target, error = %failure, "batch target failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_one_failure_does_not_abort_siblings() {
        let targets = vec!["A", "B", "C"];
        let report = run_batched(targets, 2, |target| async move {
            if target == "B" {
                Err(ToolFailure::Transient("session hung".to_string()))
            } else {
                Ok(vec![format!("{}-payload", target)])
            }
        })
        .await;

        assert_eq!(report.items, vec!["A-payload", "C-payload"]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0, "B");
        assert!(matches!(report.failures[0].1, ToolFailure::Transient(_)));
    }

    #[tokio::test]
    async fn test_all_targets_run_across_batches() {
        let targets: Vec<u32> = (0..7).collect();
        let report = run_batched(targets, 3, |n| async move { Ok(vec![n * 10]) }).await;
        assert_eq!(report.items.len(), 7);
        assert!(report.failures.is_empty());
    }

    #[tokio::test]
    async fn test_empty_targets_yield_empty_report() {
        let report: BatchReport<&str, String> =
            run_batched(Vec::new(), 3, |_t| async move { Ok(vec![]) }).await;
        assert!(report.is_empty());
        assert!(report.failures.is_empty());
    }

    #[test]
    fn test_dedup_preserves_first_seen_order() {
        let items = vec!["a1", "b1", "a2", "c1", "b2"];
        let unique = dedup_by_key(items, |s| s.chars().next().unwrap());
        assert_eq!(unique, vec!["a1", "b1", "c1"]);
    }
}
