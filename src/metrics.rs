//! Counter capability consumed by the ingress path. Registry wiring belongs
//! to the embedding process; it only has to hand out counters.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// A monotonic counter.
pub trait Counter: Send + Sync {
    fn add(&self, delta: u64);
}

impl Counter for AtomicU64 {
    fn add(&self, delta: u64) {
        self.fetch_add(delta, Ordering::Relaxed);
    }
}

/// Hands out named counters.
pub trait Metrics {
    fn new_counter(&self, name: &str) -> Arc<dyn Counter>;
}

/// Process-local registry of atomic counters.
#[derive(Clone, Default)]
pub struct InMemoryMetrics {
    counters: Arc<Mutex<HashMap<String, Arc<AtomicU64>>>>,
}

impl InMemoryMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of a counter, `0` if it was never created.
    pub fn get(&self, name: &str) -> u64 {
        self.counters
            .lock()
            .map(|counters| {
                counters
                    .get(name)
                    .map(|c| c.load(Ordering::Relaxed))
                    .unwrap_or(0)
            })
            .unwrap_or(0)
    }
}

impl Metrics for InMemoryMetrics {
    fn new_counter(&self, name: &str) -> Arc<dyn Counter> {
        let mut counters = match self.counters.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        counters
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(AtomicU64::new(0)))
            .clone()
    }
}
