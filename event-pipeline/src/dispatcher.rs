// /////////////////////////////////////////////////////////////////////////////
// Event Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Sharded dispatcher
//!
//! Routes each event to one of `N` dedicated worker threads by
//! `clientId mod N`, giving strict per-key ordering with zero locks on
//! the hot path: a producer enqueues onto its shard's channel and
//! returns, the shard's single worker thread drains it in FIFO order.
//! `spec.md` §4 is explicit that ordering is a per-`clientId` property
//! only - events for distinct clients may complete in any relative
//! order, which is exactly what independent per-shard queues give for
//! free.
//!
//! One `crossbeam_channel` plus one `std::thread` per shard - no shared
//! thread pool, so two clients hashing to different shards never
//! contend for a worker.

use crossbeam::channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use event_pipeline_domain::{Consumer, Event, OverflowPolicy, PipelineError, QueueBound};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::metrics::PipelineMetrics;

const RUNNING: u8 = 0;
const DRAINING: u8 = 1;
const STOPPED: u8 = 2;

const WORKER_POLL: Duration = Duration::from_millis(200);
const DEPTH_SAMPLE_INTERVAL: Duration = Duration::from_millis(250);

struct Shard {
    sender: RwLock<Option<Sender<Event>>>,
    handle: RwLock<Option<JoinHandle<()>>>,
}

/// Routes events to `N` dedicated worker threads, one per shard, by
/// `clientId mod N`.
pub struct ShardedDispatcher {
    shards: Arc<Vec<Shard>>,
    state: AtomicU8,
    overflow_policy: OverflowPolicy,
    depth_sampler: Mutex<Option<JoinHandle<()>>>,
    depth_sampler_stop: Arc<AtomicBool>,
    metrics: Option<Arc<PipelineMetrics>>,
}

impl ShardedDispatcher {
    /// Builds the dispatcher and starts all `worker_count` worker
    /// threads immediately; `downstream` is shared (cloned `Arc`)
    /// across every worker.
    pub fn new(
        worker_count: usize,
        queue_bound: QueueBound,
        overflow_policy: OverflowPolicy,
        downstream: Arc<dyn Consumer>,
        metrics: Option<Arc<PipelineMetrics>>,
    ) -> Self {
        let shards: Arc<Vec<Shard>> = Arc::new(
            (0..worker_count)
                .map(|idx| {
                    let (tx, rx) = match queue_bound {
                        QueueBound::Unbounded => unbounded::<Event>(),
                        QueueBound::Bounded(capacity) => bounded::<Event>(capacity),
                    };
                    let handle = Self::spawn_worker(idx, rx, Arc::clone(&downstream), metrics.clone());
                    Shard {
                        sender: RwLock::new(Some(tx)),
                        handle: RwLock::new(Some(handle)),
                    }
                })
                .collect(),
        );

        let depth_sampler_stop = Arc::new(AtomicBool::new(false));
        let depth_sampler = metrics.clone().map(|m| {
            let shards = Arc::clone(&shards);
            let stop = Arc::clone(&depth_sampler_stop);
            std::thread::Builder::new()
                .name("dispatcher-depth-sampler".to_string())
                .spawn(move || {
                    while !stop.load(Ordering::Acquire) {
                        std::thread::sleep(DEPTH_SAMPLE_INTERVAL);
                        let depths: Vec<usize> = shards
                            .iter()
                            .map(|shard| shard.sender.read().as_ref().map(|s| s.len()).unwrap_or(0))
                            .collect();
                        if depths.is_empty() {
                            continue;
                        }
                        for (idx, depth) in depths.iter().enumerate() {
                            m.dispatcher_queue_depth.with_label_values(&[&idx.to_string()]).set(*depth as f64);
                        }
                        let mean = depths.iter().sum::<usize>() as f64 / depths.len() as f64;
                        m.dispatcher_queue_depth_mean.set(mean);
                    }
                })
                .expect("failed to spawn dispatcher depth sampler thread")
        });

        Self {
            shards,
            state: AtomicU8::new(RUNNING),
            overflow_policy,
            depth_sampler: Mutex::new(depth_sampler),
            depth_sampler_stop,
            metrics,
        }
    }

    fn spawn_worker(
        idx: usize,
        receiver: Receiver<Event>,
        downstream: Arc<dyn Consumer>,
        metrics: Option<Arc<PipelineMetrics>>,
    ) -> JoinHandle<()> {
        std::thread::Builder::new()
            .name(format!("dispatcher-shard-{idx}"))
            .spawn(move || {
                let _span = crate::logging::worker_span(idx).entered();
                loop {
                match receiver.recv_timeout(WORKER_POLL) {
                    Ok(event) => {
                        if let Some(m) = &metrics {
                            m.latency_seconds.observe(event.created_at().elapsed().as_secs_f64());
                        }
                        match downstream.accept(event) {
                            Ok(()) => {
                                if let Some(m) = &metrics {
                                    m.dispatcher_tasks_completed_total.inc();
                                }
                            }
                            Err(err) => {
                                if let Some(m) = &metrics {
                                    m.downstream_errors_total.inc();
                                }
                                tracing::warn!(shard = idx, error = %err, "downstream stage returned an error; continuing");
                            }
                        }
                    }
                    Err(RecvTimeoutError::Timeout) => continue,
                    Err(RecvTimeoutError::Disconnected) => break,
                }
                }
            })
            .expect("failed to spawn dispatcher shard worker")
    }

    fn shard_index(&self, client_id_bits: u64) -> usize {
        (client_id_bits % self.shards.len() as u64) as usize
    }

    /// Current per-shard queue depths, in shard order - backs the
    /// per-shard gauge and the mean gauge.
    pub fn queue_depths(&self) -> Vec<usize> {
        self.shards
            .iter()
            .map(|shard| shard.sender.read().as_ref().map(|s| s.len()).unwrap_or(0))
            .collect()
    }

    pub fn worker_count(&self) -> usize {
        self.shards.len()
    }

    /// Stops accepting new work, drains every shard's queue to
    /// completion, and joins all worker threads. Idempotent.
    pub fn close(&self) {
        if self.state.swap(DRAINING, Ordering::AcqRel) == STOPPED {
            return;
        }
        for shard in self.shards.iter() {
            shard.sender.write().take();
        }
        for shard in self.shards.iter() {
            if let Some(handle) = shard.handle.write().take() {
                let _ = handle.join();
            }
        }
        self.depth_sampler_stop.store(true, Ordering::Release);
        if let Some(handle) = self.depth_sampler.lock().take() {
            let _ = handle.join();
        }
        self.state.store(STOPPED, Ordering::Release);
    }
}

impl Consumer for ShardedDispatcher {
    fn accept(&self, event: Event) -> Result<(), PipelineError> {
        if self.state.load(Ordering::Acquire) != RUNNING {
            return Err(PipelineError::Shutdown);
        }

        let idx = self.shard_index(event.client_id().get());
        let guard = self.shards[idx].sender.read();
        let sender = match guard.as_ref() {
            Some(sender) => sender,
            None => return Err(PipelineError::Shutdown),
        };

        match self.overflow_policy {
            OverflowPolicy::Block => sender.send(event).map_err(|_| PipelineError::Shutdown).map(|()| {
                if let Some(m) = &self.metrics {
                    m.dispatcher_tasks_submitted_total.inc();
                }
            }),
            OverflowPolicy::DropNewest => match sender.try_send(event) {
                Ok(()) => {
                    if let Some(m) = &self.metrics {
                        m.dispatcher_tasks_submitted_total.inc();
                    }
                    Ok(())
                }
                Err(TrySendError::Full(_dropped)) => {
                    if let Some(m) = &self.metrics {
                        m.dispatcher_tasks_dropped_total.inc();
                    }
                    tracing::debug!(shard = idx, "queue full; dropping newest arrival per overflow policy");
                    Ok(())
                }
                Err(TrySendError::Disconnected(_)) => Err(PipelineError::Shutdown),
            },
        }
    }
}

impl Drop for ShardedDispatcher {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use event_pipeline_domain::ClientId;
    use std::sync::Mutex as StdMutex;
    use uuid::Uuid;

    struct RecordingConsumer(StdMutex<Vec<(u64, Uuid)>>);

    impl Consumer for RecordingConsumer {
        fn accept(&self, event: Event) -> Result<(), PipelineError> {
            self.0.lock().unwrap().push((event.client_id().get(), event.uuid()));
            Ok(())
        }
    }

    #[test]
    fn preserves_order_within_a_client() {
        let downstream = Arc::new(RecordingConsumer(StdMutex::new(Vec::new())));
        let dispatcher = ShardedDispatcher::new(
            4,
            QueueBound::Unbounded,
            OverflowPolicy::Block,
            downstream.clone(),
            None,
        );

        let uuids: Vec<Uuid> = (0..50).map(|_| Uuid::new_v4()).collect();
        for uuid in &uuids {
            dispatcher.accept(Event::new(ClientId::new(7), *uuid)).unwrap();
        }
        dispatcher.close();

        let seen = downstream.0.lock().unwrap();
        let seen_uuids: Vec<Uuid> = seen.iter().map(|(_, u)| *u).collect();
        assert_eq!(seen_uuids, uuids);
    }

    #[test]
    fn routes_distinct_clients_to_shards_by_modulus() {
        let downstream = Arc::new(RecordingConsumer(StdMutex::new(Vec::new())));
        let dispatcher = ShardedDispatcher::new(
            4,
            QueueBound::Unbounded,
            OverflowPolicy::Block,
            downstream.clone(),
            None,
        );
        assert_eq!(dispatcher.shard_index(0), 0);
        assert_eq!(dispatcher.shard_index(4), 0);
        assert_eq!(dispatcher.shard_index(5), 1);
        dispatcher.close();
    }

    #[test]
    fn rejects_after_close() {
        let downstream = Arc::new(RecordingConsumer(StdMutex::new(Vec::new())));
        let dispatcher = ShardedDispatcher::new(
            2,
            QueueBound::Unbounded,
            OverflowPolicy::Block,
            downstream,
            None,
        );
        dispatcher.close();
        let result = dispatcher.accept(Event::new(ClientId::new(1), Uuid::new_v4()));
        assert!(matches!(result, Err(PipelineError::Shutdown)));
    }

    #[test]
    fn bounded_drop_newest_never_blocks_producer() {
        let downstream = Arc::new(RecordingConsumer(StdMutex::new(Vec::new())));
        let dispatcher = ShardedDispatcher::new(
            1,
            QueueBound::Bounded(1),
            OverflowPolicy::DropNewest,
            downstream,
            None,
        );
        for _ in 0..10 {
            dispatcher.accept(Event::new(ClientId::new(1), Uuid::new_v4())).unwrap();
        }
        dispatcher.close();
    }

    #[test]
    fn submitted_and_completed_counters_track_accepted_events() {
        let downstream = Arc::new(RecordingConsumer(StdMutex::new(Vec::new())));
        let metrics = Arc::new(PipelineMetrics::new().unwrap());
        let dispatcher = ShardedDispatcher::new(
            4,
            QueueBound::Unbounded,
            OverflowPolicy::Block,
            downstream,
            Some(metrics.clone()),
        );
        for i in 0..25u64 {
            dispatcher.accept(Event::new(ClientId::new(i), Uuid::new_v4())).unwrap();
        }
        dispatcher.close();

        assert_eq!(metrics.dispatcher_tasks_submitted_total.get(), 25);
        assert_eq!(metrics.dispatcher_tasks_completed_total.get(), 25);
    }

    #[test]
    fn dropped_counter_tracks_overflowed_events() {
        let downstream = Arc::new(RecordingConsumer(StdMutex::new(Vec::new())));
        let metrics = Arc::new(PipelineMetrics::new().unwrap());
        let dispatcher = ShardedDispatcher::new(
            1,
            QueueBound::Bounded(1),
            OverflowPolicy::DropNewest,
            downstream,
            Some(metrics.clone()),
        );
        for _ in 0..10 {
            dispatcher.accept(Event::new(ClientId::new(1), Uuid::new_v4())).unwrap();
        }
        dispatcher.close();

        assert!(metrics.dispatcher_tasks_dropped_total.get() > 0);
    }
}
