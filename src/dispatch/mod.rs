//! Change dispatch: bus change events in, metric records out.
//!
//! [`ChangeDispatcher::on_change`] handles a single event and surfaces sink
//! errors to the caller. [`ChangeDispatcher::start`] runs the dispatch loop
//! over a channel of events for the lifetime of the process.
//!
//! With one worker (the default) events are written in arrival order. With
//! more, events are sharded by endpoint name across bounded worker queues:
//! writes for one endpoint keep their order, different endpoints proceed
//! concurrently.

mod stats;

pub use stats::{DispatchStats, DispatchStatsSnapshot};

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use knxbridge_sinks::{MetricSink, SinkError};
use knxbridge_types::MetricRecord;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::bus::ChangeEvent;

const DEFAULT_QUEUE_DEPTH: usize = 64;

/// Converts change events into metric records and writes them to a sink.
#[derive(Debug, Clone)]
pub struct ChangeDispatcher {
    sink: Arc<dyn MetricSink>,
    workers: usize,
    queue_depth: usize,
}

impl ChangeDispatcher {
    /// Create a sequential dispatcher writing to `sink`.
    pub fn new(sink: impl MetricSink + 'static) -> Self {
        Self::builder(sink).build()
    }

    /// Configure a dispatcher writing to `sink`.
    pub fn builder(sink: impl MetricSink + 'static) -> ChangeDispatcherBuilder {
        ChangeDispatcherBuilder::new(Arc::new(sink))
    }

    /// The metric record for a change event.
    ///
    /// # Example
    ///
    /// ```
    /// use knx_bridge::bus::ChangeEvent;
    /// use knx_bridge::ChangeDispatcher;
    ///
    /// let record = ChangeDispatcher::record_for(&ChangeEvent::new("Temp1", 21.5, Some("°C")));
    /// assert_eq!(record.measurement, "knx");
    /// assert_eq!(record.tag("DataType"), Some("float"));
    /// ```
    pub fn record_for(event: &ChangeEvent) -> MetricRecord {
        MetricRecord::builder()
            .group_address_name(event.name.as_str())
            .unit(event.unit.as_deref().unwrap_or_default())
            .value(event.value.clone())
            .build()
    }

    /// Write the record for one change event.
    ///
    /// Sink errors are returned unchanged; nothing is retried.
    pub async fn on_change(&self, event: &ChangeEvent) -> Result<MetricRecord, SinkError> {
        let record = Self::record_for(event);
        info!(
            name = %event.name,
            value = %event.value,
            unit = event.unit.as_deref().unwrap_or_default(),
            "Writing {} to {}",
            MetricRecord::field_key(&event.value),
            self.sink.description()
        );
        self.sink.write(std::slice::from_ref(&record)).await?;
        Ok(record)
    }

    /// Number of workers used by [`start`](Self::start).
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Spawn the dispatch loop over `events`.
    ///
    /// The loop ends when the event channel closes or the returned handle is
    /// shut down.
    pub fn start(self, events: mpsc::Receiver<ChangeEvent>) -> DispatchHandle {
        let (stop_tx, stop_rx) = watch::channel(false);
        let stats = Arc::new(DispatchStats::default());
        let dispatcher = Arc::new(self);

        let task = tokio::spawn(run(dispatcher, events, stop_rx, stats.clone()));

        DispatchHandle {
            stop_tx,
            task,
            stats,
        }
    }

    async fn handle(&self, event: &ChangeEvent, stats: &DispatchStats) {
        match self.on_change(event).await {
            Ok(_) => stats.record_written(),
            Err(e) => {
                error!("Failed to write {} to {}: {}", event.name, self.sink.description(), e);
                stats.record_failed();
            }
        }
    }
}

/// Builder for configuring a [`ChangeDispatcher`].
#[derive(Debug)]
pub struct ChangeDispatcherBuilder {
    sink: Arc<dyn MetricSink>,
    workers: usize,
    queue_depth: usize,
}

impl ChangeDispatcherBuilder {
    fn new(sink: Arc<dyn MetricSink>) -> Self {
        Self {
            sink,
            workers: 1,
            queue_depth: DEFAULT_QUEUE_DEPTH,
        }
    }

    /// Set the number of concurrent writers. Zero is treated as one.
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Set the capacity of each worker queue. Zero is treated as one.
    pub fn queue_depth(mut self, depth: usize) -> Self {
        self.queue_depth = depth.max(1);
        self
    }

    /// Build the dispatcher.
    pub fn build(self) -> ChangeDispatcher {
        ChangeDispatcher {
            sink: self.sink,
            workers: self.workers,
            queue_depth: self.queue_depth,
        }
    }
}

/// Handle for a running dispatch loop.
#[derive(Debug)]
pub struct DispatchHandle {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
    stats: Arc<DispatchStats>,
}

impl DispatchHandle {
    /// Counters so far.
    pub fn stats(&self) -> DispatchStatsSnapshot {
        self.stats.snapshot()
    }

    /// Stop accepting events, finish queued writes and return the final counters.
    pub async fn shutdown(self) -> DispatchStatsSnapshot {
        let _ = self.stop_tx.send(true);
        if let Err(e) = self.task.await {
            error!("Dispatch loop ended abnormally: {}", e);
        }
        self.stats.snapshot()
    }
}

async fn run(
    dispatcher: Arc<ChangeDispatcher>,
    mut events: mpsc::Receiver<ChangeEvent>,
    mut stop_rx: watch::Receiver<bool>,
    stats: Arc<DispatchStats>,
) {
    let mut router = Router::new(&dispatcher, &stats);

    loop {
        tokio::select! {
            biased;
            changed = stop_rx.changed() => {
                if changed.is_err() || *stop_rx.borrow() {
                    break;
                }
            }
            event = events.recv() => {
                match event {
                    Some(event) => router.route(event).await,
                    None => {
                        debug!("Event channel closed");
                        break;
                    }
                }
            }
        }
    }

    // Whatever the bus already delivered still gets written.
    events.close();
    while let Some(event) = events.recv().await {
        router.route(event).await;
    }

    router.finish().await;
}

/// Routes events to the inline writer or to the worker owning the endpoint.
struct Router {
    dispatcher: Arc<ChangeDispatcher>,
    stats: Arc<DispatchStats>,
    queues: Vec<mpsc::Sender<ChangeEvent>>,
    workers: Vec<JoinHandle<()>>,
}

impl Router {
    fn new(dispatcher: &Arc<ChangeDispatcher>, stats: &Arc<DispatchStats>) -> Self {
        let mut queues = Vec::new();
        let mut workers = Vec::new();

        if dispatcher.workers > 1 {
            for _ in 0..dispatcher.workers {
                let (tx, mut rx) = mpsc::channel::<ChangeEvent>(dispatcher.queue_depth);
                let dispatcher = dispatcher.clone();
                let stats = stats.clone();

                workers.push(tokio::spawn(async move {
                    while let Some(event) = rx.recv().await {
                        dispatcher.handle(&event, &stats).await;
                    }
                }));
                queues.push(tx);
            }
        }

        Self {
            dispatcher: dispatcher.clone(),
            stats: stats.clone(),
            queues,
            workers,
        }
    }

    async fn route(&self, event: ChangeEvent) {
        if self.queues.is_empty() {
            self.dispatcher.handle(&event, &self.stats).await;
            return;
        }

        let shard = shard_for(&event.name, self.queues.len());
        if let Err(mpsc::error::SendError(event)) = self.queues[shard].send(event).await {
            // The worker is gone; write inline rather than lose the event.
            error!("Dispatch worker {} stopped, writing {} inline", shard, event.name);
            self.dispatcher.handle(&event, &self.stats).await;
        }
    }

    async fn finish(self) {
        drop(self.queues);
        for worker in self.workers {
            if let Err(e) = worker.await {
                error!("Dispatch worker ended abnormally: {}", e);
            }
        }
    }
}

fn shard_for(name: &str, shards: usize) -> usize {
    let mut hasher = DefaultHasher::new();
    name.hash(&mut hasher);
    (hasher.finish() % shards as u64) as usize
}
