use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use super::batcher::Batcher;
use super::ring::RingBuffer;
use crate::config::IngressConfig;
use crate::metrics::Metrics;
use crate::rpc::{Envelope, IngressClient, RpcError, SendRequest, SendResponse};

/// Name of the counter incremented for every envelope lost to overflow.
pub const DROPPED_COUNTER: &str = "Dropped";

/// Batches envelopes before shipping them to the backing ingress client.
///
/// `send` only enqueues into a ring buffer and returns immediately. A single
/// consumer task drains the buffer, groups envelopes into batches and sends
/// each batch as one `local_only` request bounded by `send_timeout`. Failed
/// batches are logged and discarded.
pub struct BatchedIngressClient {
    buffer: Arc<RingBuffer<Envelope>>,
    shutdown_tx: Mutex<Option<oneshot::Sender<()>>>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl BatchedIngressClient {
    /// Starts the consumer task on the current tokio runtime.
    ///
    /// Fails when `config` has a zero capacity, batch size, flush interval
    /// or send timeout.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn new(
        config: &IngressConfig,
        client: Arc<dyn IngressClient>,
        metrics: &dyn Metrics,
    ) -> anyhow::Result<Self> {
        config.validate()?;

        let dropped = metrics.new_counter(DROPPED_COUNTER);
        let buffer = Arc::new(RingBuffer::new(config.buffer_capacity, dropped));
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let consumer = Consumer {
            buffer: buffer.clone(),
            client,
            batcher: Batcher::new(config.batch_size, config.flush_interval()),
            flush_interval: config.flush_interval(),
            send_timeout: config.send_timeout(),
        };
        let handle = tokio::spawn(consumer.run(shutdown_rx));

        info!(
            capacity = config.buffer_capacity,
            batch_size = config.batch_size,
            flush_interval_ms = config.flush_interval_ms,
            "batched ingress client started"
        );

        Ok(Self {
            buffer,
            shutdown_tx: Mutex::new(Some(shutdown_tx)),
            handle: Mutex::new(Some(handle)),
        })
    }

    /// Enqueues every envelope of the batch. Never blocks and never fails;
    /// on overflow the oldest unread envelopes are dropped.
    pub fn send_batch(&self, envelopes: impl IntoIterator<Item = Envelope>) {
        for envelope in envelopes {
            self.buffer.set(envelope);
        }
    }

    /// Stops the consumer after it has drained the buffer and flushed the
    /// final partial batch. Later calls are no-ops.
    pub async fn close(&self) {
        let shutdown_tx = lock(&self.shutdown_tx).take();
        if let Some(tx) = shutdown_tx {
            let _ = tx.send(());
        }

        let handle = lock(&self.handle).take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                error!(error = %e, "ingress consumer task failed");
            }
        }
    }
}

#[async_trait::async_trait]
impl IngressClient for BatchedIngressClient {
    async fn send(&self, req: SendRequest) -> Result<SendResponse, RpcError> {
        self.send_batch(req.envelopes.batch);
        Ok(SendResponse::default())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

struct Consumer {
    buffer: Arc<RingBuffer<Envelope>>,
    client: Arc<dyn IngressClient>,
    batcher: Batcher<Envelope>,
    flush_interval: Duration,
    send_timeout: Duration,
}

impl Consumer {
    async fn run(mut self, mut shutdown_rx: oneshot::Receiver<()>) {
        let mut ticker = tokio::time::interval(self.flush_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            self.drain().await;

            tokio::select! {
                _ = self.buffer.wait() => {}
                _ = ticker.tick() => {
                    if let Some(batch) = self.batcher.flush() {
                        self.write(batch).await;
                    }
                }
                // Fires on an explicit close and when the client is dropped.
                _ = &mut shutdown_rx => {
                    self.drain().await;
                    if let Some(batch) = self.batcher.flush() {
                        self.write(batch).await;
                    }
                    debug!("ingress consumer stopped");
                    return;
                }
            }
        }
    }

    async fn drain(&mut self) {
        while let Some(envelope) = self.buffer.try_next() {
            if let Some(batch) = self.batcher.push(envelope) {
                self.write(batch).await;
            }
        }
    }

    async fn write(&self, batch: Vec<Envelope>) {
        let count = batch.len();
        let req = SendRequest {
            envelopes: batch.into(),
            local_only: true,
        };

        match tokio::time::timeout(self.send_timeout, self.client.send(req)).await {
            Ok(Ok(_)) => debug!(count, "sent envelopes"),
            Ok(Err(e)) => error!(error = %e, count, "failed to write envelopes"),
            Err(_) => error!(
                count,
                timeout_ms = self.send_timeout.as_millis() as u64,
                "failed to write envelopes: send timed out"
            ),
        }
    }
}
