use std::collections::HashMap;
use std::sync::Mutex;

use crate::domain::shared::value_objects::ProductId;

/// Upload progress of one product batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductProgress {
    pub observed: u16,
    pub total: u16,
}

/// Counts stored images per product and reports when a batch is complete.
///
/// `observe` must run its lookup, increment, comparison and removal as one
/// atomic unit per call: for a batch of `total` images exactly one call
/// returns `true`, after which the product has no entry and the next call
/// starts a new batch from one.
pub trait ProgressTracker: Send + Sync {
    /// Credits one stored image to `product_id`. Returns `true` when this
    /// call completed the batch.
    fn observe(&self, product_id: &ProductId, total: u16) -> bool;

    fn progress(&self, product_id: &ProductId) -> Option<ProductProgress>;

    /// Number of batches with at least one stored image that are not complete.
    fn in_flight(&self) -> usize;
}

/// Process-local tracker behind a single mutex.
///
/// State does not survive a restart: batches in flight when the process
/// stops never complete.
#[derive(Debug, Default)]
pub struct InMemoryProgressTracker {
    entries: Mutex<HashMap<ProductId, ProductProgress>>,
}

impl InMemoryProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<ProductId, ProductProgress>> {
        // Every critical section is a plain map mutation, so a panic elsewhere
        // cannot leave the map half-updated.
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ProgressTracker for InMemoryProgressTracker {
    fn observe(&self, product_id: &ProductId, total: u16) -> bool {
        let mut entries = self.entries();

        let entry = entries.entry(*product_id).or_insert(ProductProgress {
            observed: 0,
            total,
        });
        entry.total = total;
        entry.observed = entry.observed.saturating_add(1);

        if entry.observed == entry.total {
            entries.remove(product_id);
            return true;
        }

        false
    }

    fn progress(&self, product_id: &ProductId) -> Option<ProductProgress> {
        self.entries().get(product_id).copied()
    }

    fn in_flight(&self) -> usize {
        self.entries().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::Arc;
    use uuid::Uuid;

    fn product() -> ProductId {
        ProductId::new(Uuid::new_v4())
    }

    #[test]
    fn should_complete_batch_on_last_observation() {
        let tracker = InMemoryProgressTracker::new();
        let p1 = product();

        assert!(!tracker.observe(&p1, 3));
        assert!(!tracker.observe(&p1, 3));
        assert!(tracker.observe(&p1, 3));

        assert!(tracker.progress(&p1).is_none());
    }

    #[test]
    fn should_track_observed_count_while_batch_is_open() {
        let tracker = InMemoryProgressTracker::new();
        let p1 = product();

        tracker.observe(&p1, 4);
        tracker.observe(&p1, 4);

        assert_eq!(
            tracker.progress(&p1),
            Some(ProductProgress {
                observed: 2,
                total: 4
            })
        );
        assert_eq!(tracker.in_flight(), 1);
    }

    #[test]
    fn should_complete_interleaved_batches_independently() {
        let tracker = InMemoryProgressTracker::new();
        let p1 = product();
        let p2 = product();

        assert!(!tracker.observe(&p1, 2));
        assert!(!tracker.observe(&p2, 2));
        assert!(tracker.observe(&p1, 2));
        assert!(tracker.observe(&p2, 2));

        assert_eq!(tracker.in_flight(), 0);
    }

    #[test]
    fn should_complete_single_image_batch_immediately() {
        let tracker = InMemoryProgressTracker::new();
        let p1 = product();

        assert!(tracker.observe(&p1, 1));
        assert!(tracker.progress(&p1).is_none());
    }

    #[test]
    fn should_start_fresh_count_after_batch_completed() {
        let tracker = InMemoryProgressTracker::new();
        let p1 = product();

        tracker.observe(&p1, 2);
        assert!(tracker.observe(&p1, 2));

        assert!(!tracker.observe(&p1, 2));
        assert_eq!(
            tracker.progress(&p1),
            Some(ProductProgress {
                observed: 1,
                total: 2
            })
        );
    }

    #[test]
    fn should_let_last_writer_win_on_total_disagreement() {
        let tracker = InMemoryProgressTracker::new();
        let p1 = product();

        assert!(!tracker.observe(&p1, 3));
        assert!(tracker.observe(&p1, 2));
    }

    #[test]
    fn should_never_complete_when_total_drops_below_observed() {
        let tracker = InMemoryProgressTracker::new();
        let p1 = product();

        tracker.observe(&p1, 5);
        tracker.observe(&p1, 5);
        assert!(!tracker.observe(&p1, 2));
        assert!(!tracker.observe(&p1, 2));
        assert_eq!(tracker.in_flight(), 1);
    }

    #[test]
    fn should_lose_open_batches_when_tracker_is_recreated() {
        let p1 = product();
        let before_restart = InMemoryProgressTracker::new();
        before_restart.observe(&p1, 2);

        let after_restart = InMemoryProgressTracker::new();
        assert!(after_restart.progress(&p1).is_none());
        // The second image now opens a new batch instead of completing the old one.
        assert!(!after_restart.observe(&p1, 2));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn should_report_done_exactly_once_under_concurrent_observers() {
        const TOTAL: u16 = 200;
        let tracker = Arc::new(InMemoryProgressTracker::new());
        let p1 = product();

        let handles: Vec<_> = (0..TOTAL)
            .map(|_| {
                let tracker = tracker.clone();
                tokio::spawn(async move { tracker.observe(&p1, TOTAL) })
            })
            .collect();

        let mut done = 0;
        for handle in handles {
            if handle.await.unwrap() {
                done += 1;
            }
        }

        assert_eq!(done, 1);
        assert!(tracker.progress(&p1).is_none());
    }

    #[test]
    fn should_not_lose_increments_across_threads_and_products() {
        const TOTAL: u16 = 50;
        let tracker = Arc::new(InMemoryProgressTracker::new());
        let products: Vec<ProductId> = (0..4).map(|_| product()).collect();
        let barrier = Arc::new(std::sync::Barrier::new(products.len() * TOTAL as usize));

        let handles: Vec<_> = products
            .iter()
            .flat_map(|p| std::iter::repeat_n(*p, TOTAL as usize))
            .map(|p| {
                let tracker = tracker.clone();
                let barrier = barrier.clone();
                std::thread::spawn(move || {
                    barrier.wait();
                    (p, tracker.observe(&p, TOTAL))
                })
            })
            .collect();

        let mut completions: HashMap<ProductId, usize> = HashMap::new();
        for handle in handles {
            let (p, done) = handle.join().unwrap();
            if done {
                *completions.entry(p).or_default() += 1;
            }
        }

        for p in &products {
            assert_eq!(completions.get(p), Some(&1));
        }
        assert_eq!(tracker.in_flight(), 0);
    }

    fn schedule() -> impl Strategy<Value = (Vec<u16>, Vec<usize>)> {
        prop::collection::vec(1u16..12, 1..5).prop_flat_map(|totals| {
            let order: Vec<usize> = totals
                .iter()
                .enumerate()
                .flat_map(|(i, n)| std::iter::repeat_n(i, *n as usize))
                .collect();
            (Just(totals), Just(order).prop_shuffle())
        })
    }

    proptest! {
        #[test]
        fn should_complete_each_batch_on_its_nth_observation_in_any_order(
            (totals, order) in schedule()
        ) {
            let tracker = InMemoryProgressTracker::new();
            let products: Vec<ProductId> = totals.iter().map(|_| product()).collect();
            let mut seen = vec![0u16; totals.len()];

            for i in order {
                seen[i] += 1;
                let done = tracker.observe(&products[i], totals[i]);
                prop_assert_eq!(done, seen[i] == totals[i]);
            }

            prop_assert_eq!(tracker.in_flight(), 0);
        }
    }
}
