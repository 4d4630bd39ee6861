use crossbeam_queue::ArrayQueue;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::warn;

use crate::metrics::Counter;

/// Fixed-capacity queue that never blocks its producers.
///
/// When full, `set` overwrites the oldest unread entry. Overwrites are counted
/// atomically and reported by the reading side: the next `try_next` logs the
/// number of entries lost since the previous report and adds it to the drop
/// counter, so each overflow episode is reported exactly once.
pub struct RingBuffer<T> {
    queue: ArrayQueue<T>,
    missed: AtomicU64,
    dropped: Arc<dyn Counter>,
    notify: Notify,
}

impl<T> RingBuffer<T> {
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize, dropped: Arc<dyn Counter>) -> Self {
        Self {
            queue: ArrayQueue::new(capacity),
            missed: AtomicU64::new(0),
            dropped,
            notify: Notify::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Wait-free enqueue; overwrites the oldest entry when full.
    pub fn set(&self, item: T) {
        if self.queue.force_push(item).is_some() {
            self.missed.fetch_add(1, Ordering::Relaxed);
        }
        self.notify.notify_one();
    }

    /// Non-blocking dequeue.
    pub fn try_next(&self) -> Option<T> {
        let missed = self.missed.swap(0, Ordering::Relaxed);
        if missed > 0 {
            warn!(dropped = missed, "dropped {} envelopes", missed);
            self.dropped.add(missed);
        }
        self.queue.pop()
    }

    /// Resolves once an entry has been written since the last wakeup.
    /// A write that happened while nobody was waiting is not lost.
    pub async fn wait(&self) {
        self.notify.notified().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{InMemoryMetrics, Metrics};

    fn ring(capacity: usize) -> (RingBuffer<u32>, InMemoryMetrics) {
        let metrics = InMemoryMetrics::new();
        let ring = RingBuffer::new(capacity, metrics.new_counter("Dropped"));
        (ring, metrics)
    }

    #[test]
    fn preserves_fifo_order() {
        let (ring, metrics) = ring(4);
        for i in 0..3 {
            ring.set(i);
        }

        assert_eq!(ring.try_next(), Some(0));
        assert_eq!(ring.try_next(), Some(1));
        assert_eq!(ring.try_next(), Some(2));
        assert_eq!(ring.try_next(), None);
        assert_eq!(metrics.get("Dropped"), 0);
    }

    #[test]
    fn overflow_drops_oldest_and_reports_exact_count() {
        let (ring, metrics) = ring(10);
        for i in 0..25 {
            ring.set(i);
        }
        assert_eq!(ring.len(), 10);

        let drained: Vec<u32> = std::iter::from_fn(|| ring.try_next()).collect();
        assert_eq!(drained, (15..25).collect::<Vec<_>>());
        assert_eq!(metrics.get("Dropped"), 15);
    }

    #[test]
    fn drop_count_is_reported_once_per_overflow() {
        let (ring, metrics) = ring(2);
        for i in 0..5 {
            ring.set(i);
        }
        assert_eq!(ring.try_next(), Some(3));
        assert_eq!(metrics.get("Dropped"), 3);

        // No further overflow: nothing new is reported.
        assert_eq!(ring.try_next(), Some(4));
        assert_eq!(ring.try_next(), None);
        assert_eq!(metrics.get("Dropped"), 3);

        for i in 5..8 {
            ring.set(i);
        }
        assert_eq!(ring.try_next(), Some(6));
        assert_eq!(metrics.get("Dropped"), 4);
    }

    #[tokio::test]
    async fn wait_returns_after_a_write() {
        let (ring, _metrics) = ring(2);
        ring.set(1);
        // The permit stored by `set` makes this resolve immediately.
        ring.wait().await;
        assert_eq!(ring.try_next(), Some(1));
    }
}
