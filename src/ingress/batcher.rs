use std::time::Duration;
use tokio::time::Instant;

/// Groups items into batches bounded by count and by age.
///
/// Owned by a single consumer; no synchronization.
pub struct Batcher<T> {
    size: usize,
    interval: Duration,
    batch: Vec<T>,
    last_flush: Instant,
}

impl<T> Batcher<T> {
    pub fn new(size: usize, interval: Duration) -> Self {
        let size = size.max(1);
        Self {
            size,
            interval,
            batch: Vec::with_capacity(size),
            last_flush: Instant::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.batch.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batch.is_empty()
    }

    /// Appends an item. Returns the batch once it reaches the size threshold
    /// or once the interval since the last flush has elapsed.
    pub fn push(&mut self, item: T) -> Option<Vec<T>> {
        self.batch.push(item);
        if self.batch.len() >= self.size || self.last_flush.elapsed() >= self.interval {
            return self.take();
        }
        None
    }

    /// Returns the pending batch regardless of age. `None` when empty.
    pub fn flush(&mut self) -> Option<Vec<T>> {
        self.take()
    }

    fn take(&mut self) -> Option<Vec<T>> {
        self.last_flush = Instant::now();
        if self.batch.is_empty() {
            return None;
        }
        Some(std::mem::replace(
            &mut self.batch,
            Vec::with_capacity(self.size),
        ))
    }
}
