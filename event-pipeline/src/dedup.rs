// /////////////////////////////////////////////////////////////////////////////
// Event Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Deduplication filter
//!
//! The head of the chain. Drops events whose `uuid` has been seen
//! within the configured sliding window and forwards everything else.
//!
//! `spec.md` §3.1 requires `put_if_absent` to be thread-safe across
//! producer threads, O(1) amortized, and to expire entries on a sliding
//! (non-refreshing) basis - a lookup does not extend an entry's
//! lifetime, only a fresh insertion does. We get there with a
//! sharded `parking_lot::Mutex<ShardState>` table (fixed shard count,
//! `uuid`-hashed) plus a background reaper thread that periodically
//! walks each shard's expiry queue - the same "sharded lock, dedicated
//! background sweep" shape the teacher's resource-cleanup code uses,
//! substituting `uuid`s for file handles.

use event_pipeline_domain::{Consumer, Event, PipelineError};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::metrics::PipelineMetrics;

const SHARD_COUNT: usize = 32;
const REAP_INTERVAL: Duration = Duration::from_millis(250);

struct ShardState {
    /// Current insertion time for every live uuid in this shard.
    live: HashMap<Uuid, Instant>,
    /// FIFO of (uuid, insertion_time) pairs in insertion order. An
    /// entry here is "stale" once `live[uuid]` no longer matches its
    /// timestamp (the uuid expired and was re-seen) - stale entries are
    /// dropped by the reaper without touching `live`.
    order: VecDeque<(Uuid, Instant)>,
}

impl ShardState {
    fn new() -> Self {
        Self {
            live: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    /// Expires anything at the front of `order` older than `ttl`,
    /// removing it from `live` only if the timestamps still agree.
    fn reap(&mut self, ttl: Duration, now: Instant) {
        while let Some((uuid, inserted_at)) = self.order.front().copied() {
            if now.duration_since(inserted_at) < ttl {
                break;
            }
            self.order.pop_front();
            if let Some(current) = self.live.get(&uuid) {
                if *current == inserted_at {
                    self.live.remove(&uuid);
                }
            }
        }
    }

    /// Returns `true` and records the insertion if `uuid` is absent or
    /// its last sighting has aged out of `ttl`; returns `false` (no
    /// change) if it is still live.
    fn put_if_absent(&mut self, uuid: Uuid, now: Instant, ttl: Duration) -> bool {
        self.reap(ttl, now);
        if let Some(last_seen) = self.live.get(&uuid) {
            if now.duration_since(*last_seen) < ttl {
                return false;
            }
        }
        self.live.insert(uuid, now);
        self.order.push_back((uuid, now));
        true
    }

    fn len(&self) -> usize {
        self.live.len()
    }
}

fn shard_for(uuid: &Uuid) -> usize {
    let bytes = uuid.as_bytes();
    let mut acc: u64 = 0;
    for b in bytes.iter().take(8) {
        acc = (acc << 8) | (*b as u64);
    }
    (acc % SHARD_COUNT as u64) as usize
}

/// Sharded, TTL-expiring set of `uuid`s, the storage the
/// [`DeduplicationFilter`] sits on top of.
pub struct TtlUuidSet {
    shards: Arc<Vec<Mutex<ShardState>>>,
    ttl: Duration,
    stop: Arc<AtomicBool>,
    reaper: Option<JoinHandle<()>>,
}

impl TtlUuidSet {
    pub fn new(ttl: Duration) -> Self {
        let shards = Arc::new(
            (0..SHARD_COUNT)
                .map(|_| Mutex::new(ShardState::new()))
                .collect::<Vec<_>>(),
        );
        let stop = Arc::new(AtomicBool::new(false));

        let reaper_shards = Arc::clone(&shards);
        let reaper_stop = Arc::clone(&stop);
        let reaper = std::thread::Builder::new()
            .name("dedup-reaper".to_string())
            .spawn(move || {
                while !reaper_stop.load(Ordering::Acquire) {
                    std::thread::sleep(REAP_INTERVAL);
                    let now = Instant::now();
                    for shard in reaper_shards.iter() {
                        shard.lock().reap(ttl, now);
                    }
                }
            })
            .expect("failed to spawn dedup reaper thread");

        Self {
            shards,
            ttl,
            stop,
            reaper: Some(reaper),
        }
    }

    pub fn put_if_absent(&self, uuid: Uuid, now: Instant) -> bool {
        let idx = shard_for(&uuid);
        self.shards[idx].lock().put_if_absent(uuid, now, self.ttl)
    }

    pub fn len(&self) -> usize {
        self.shards.iter().map(|s| s.lock().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Drop for TtlUuidSet {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.reaper.take() {
            let _ = handle.join();
        }
    }
}

/// The dedup stage: drops events whose `uuid` was accepted within the
/// configured window, forwards everything else.
pub struct DeduplicationFilter {
    seen: TtlUuidSet,
    downstream: Arc<dyn Consumer>,
    metrics: Option<Arc<PipelineMetrics>>,
}

impl DeduplicationFilter {
    pub fn new(window: Duration, downstream: Arc<dyn Consumer>, metrics: Option<Arc<PipelineMetrics>>) -> Self {
        Self {
            seen: TtlUuidSet::new(window),
            downstream,
            metrics,
        }
    }

    /// Current number of live (non-expired) entries being tracked -
    /// backs the `dedup.cache_size` gauge.
    pub fn cache_size(&self) -> usize {
        self.seen.len()
    }
}

impl Consumer for DeduplicationFilter {
    fn accept(&self, event: Event) -> Result<(), PipelineError> {
        let now = Instant::now();
        if self.seen.put_if_absent(event.uuid(), now) {
            if let Some(metrics) = &self.metrics {
                metrics.dedup_cache_size.set(self.cache_size() as i64);
            }
            self.downstream.accept(event)
        } else {
            if let Some(metrics) = &self.metrics {
                metrics.dedup_duplicates_total.inc();
            }
            tracing::debug!(uuid = %event.uuid(), "dropped duplicate event");
            Ok(())
        }
    }
}
