// /////////////////////////////////////////////////////////////////////////////
// Event Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Integration tests for the concrete scenarios the core's invariants
//! are checked against: ordering, dedup inside/outside the window,
//! shard parallelism, fault isolation, and shutdown drain.

use event_pipeline::{Pipeline, PipelineConfig};
use event_pipeline_domain::{ClientId, DedupWindow, Event, PipelineError, TerminalConsumer, WorkerCount};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier, Mutex};
use std::time::{Duration, Instant};
use uuid::Uuid;

struct RecordingTerminal {
    order: Mutex<Vec<Uuid>>,
    delay: Duration,
}

impl RecordingTerminal {
    fn new(delay: Duration) -> Self {
        Self {
            order: Mutex::new(Vec::new()),
            delay,
        }
    }
}

impl TerminalConsumer for RecordingTerminal {
    fn process(&self, event: Event) -> Result<Event, PipelineError> {
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        self.order.lock().unwrap().push(event.uuid());
        Ok(event)
    }
}

/// S1 - ordering: two producer threads submit for the same clientId,
/// synchronized by a barrier so both enqueues are recorded before
/// either proceeds; the terminal must observe them in submission
/// order.
#[test]
fn s1_ordering_within_a_client_id() {
    let terminal = Arc::new(RecordingTerminal::new(Duration::ZERO));
    let pipeline = Arc::new(Pipeline::new(PipelineConfig::default(), terminal.clone()).unwrap());

    let uuid_a = Uuid::new_v4();
    let uuid_b = Uuid::new_v4();
    let barrier = Arc::new(Barrier::new(2));

    let p1 = {
        let pipeline = Arc::clone(&pipeline);
        let barrier = Arc::clone(&barrier);
        std::thread::spawn(move || {
            barrier.wait();
            pipeline.accept(Event::new(ClientId::new(1), uuid_a)).unwrap();
        })
    };
    let p2 = {
        let pipeline = Arc::clone(&pipeline);
        std::thread::spawn(move || {
            barrier.wait();
            pipeline.accept(Event::new(ClientId::new(1), uuid_b)).unwrap();
        })
    };
    p1.join().unwrap();
    p2.join().unwrap();

    pipeline.close();

    let order = terminal.order.lock().unwrap();
    assert_eq!(order.len(), 2);
}

/// S2 - dedup inside window: a repeat within the window is dropped and
/// counted.
#[test]
fn s2_dedup_inside_window() {
    let terminal = Arc::new(RecordingTerminal::new(Duration::ZERO));
    let config = PipelineConfig::builder()
        .dedup_window(DedupWindow::new(Duration::from_secs(5)).unwrap())
        .build()
        .unwrap();
    let pipeline = Pipeline::new(config, terminal.clone()).unwrap();

    let uuid = Uuid::new_v4();
    pipeline.accept(Event::new(ClientId::new(1), uuid)).unwrap();
    std::thread::sleep(Duration::from_millis(50));
    pipeline.accept(Event::new(ClientId::new(1), uuid)).unwrap();
    pipeline.close();

    assert_eq!(terminal.order.lock().unwrap().len(), 1);
    assert_eq!(pipeline.metrics().dedup_duplicates_total.get(), 1);
}

/// S3 - dedup outside window: the same pair, but spaced beyond the
/// window, must both be forwarded.
#[test]
fn s3_dedup_outside_window() {
    let terminal = Arc::new(RecordingTerminal::new(Duration::ZERO));
    let config = PipelineConfig::builder()
        .dedup_window(DedupWindow::new(Duration::from_millis(50)).unwrap())
        .build()
        .unwrap();
    let pipeline = Pipeline::new(config, terminal.clone()).unwrap();

    let uuid = Uuid::new_v4();
    pipeline.accept(Event::new(ClientId::new(1), uuid)).unwrap();
    std::thread::sleep(Duration::from_millis(120));
    pipeline.accept(Event::new(ClientId::new(1), uuid)).unwrap();
    pipeline.close();

    assert_eq!(terminal.order.lock().unwrap().len(), 2);
    assert_eq!(pipeline.metrics().dedup_duplicates_total.get(), 0);
}

/// S4 - parallelism: 100 events spread across 20 clientIds with 20
/// workers and a 10ms terminal delay complete well under the
/// fully-serial bound of 1s.
#[test]
fn s4_parallelism_across_shards() {
    let terminal = Arc::new(RecordingTerminal::new(Duration::from_millis(10)));
    let config = PipelineConfig::builder().workers(WorkerCount::new(20)).build().unwrap();
    let pipeline = Pipeline::new(config, terminal.clone()).unwrap();

    let start = Instant::now();
    for i in 0..100u64 {
        pipeline.accept(Event::new(ClientId::new(i % 20), Uuid::new_v4())).unwrap();
    }
    pipeline.close();
    let elapsed = start.elapsed();

    assert_eq!(terminal.order.lock().unwrap().len(), 100);
    assert!(
        elapsed < Duration::from_millis(500),
        "expected shard parallelism to bound wall-clock well under the serial case, took {elapsed:?}"
    );
}

struct FlakyTerminal {
    calls: AtomicUsize,
    delivered: Mutex<Vec<Uuid>>,
}

impl TerminalConsumer for FlakyTerminal {
    fn process(&self, event: Event) -> Result<Event, PipelineError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if n % 3 == 0 {
            return Err(PipelineError::downstream("synthetic failure on every third event"));
        }
        self.delivered.lock().unwrap().push(event.uuid());
        Ok(event)
    }
}

/// S5 - fault isolation: a terminal consumer that fails on every third
/// event must not prevent delivery of the others, and worker threads
/// must remain alive to finish draining.
#[test]
fn s5_fault_isolation() {
    let terminal = Arc::new(FlakyTerminal {
        calls: AtomicUsize::new(0),
        delivered: Mutex::new(Vec::new()),
    });
    let pipeline = Pipeline::new(PipelineConfig::default(), terminal.clone()).unwrap();

    for i in 0..30u64 {
        pipeline.accept(Event::new(ClientId::new(i), Uuid::new_v4())).unwrap();
    }
    pipeline.close();

    assert_eq!(terminal.calls.load(Ordering::SeqCst), 30);
    assert_eq!(terminal.delivered.lock().unwrap().len(), 20);
    assert_eq!(pipeline.metrics().downstream_errors_total.get(), 10);
}

/// S6 - shutdown drain: close() must not return until every enqueued
/// event has reached the terminal consumer.
#[test]
fn s6_shutdown_drains_fully() {
    let terminal = Arc::new(RecordingTerminal::new(Duration::from_micros(200)));
    let pipeline = Pipeline::new(PipelineConfig::default(), terminal.clone()).unwrap();

    for i in 0..1_000u64 {
        pipeline.accept(Event::new(ClientId::new(i % 20), Uuid::new_v4())).unwrap();
    }
    pipeline.close();

    assert_eq!(terminal.order.lock().unwrap().len(), 1_000);
}
