// /////////////////////////////////////////////////////////////////////////////
// Event Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Throughput benchmark for the sharded dispatcher under the workload
//! `spec.md` §4.3 sizes `WorkerCount::for_workload` against: bursts of
//! events spread across many distinct `clientId`s, processed by a
//! cheap no-op terminal consumer so the benchmark measures dispatch
//! overhead rather than downstream work.

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use event_pipeline::{Pipeline, PipelineConfig};
use event_pipeline_domain::{ClientId, Event, PipelineError, TerminalConsumer, WorkerCount};
use std::sync::Arc;
use uuid::Uuid;

struct NoopTerminal;

impl TerminalConsumer for NoopTerminal {
    fn process(&self, event: Event) -> Result<Event, PipelineError> {
        Ok(event)
    }
}

fn bench_dispatch_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatcher_throughput");

    for workers in [1usize, 10, 20, 50] {
        group.bench_function(format!("{workers}_workers"), |b| {
            b.iter_batched(
                || {
                    let config = PipelineConfig::builder().workers(WorkerCount::new(workers)).build().unwrap();
                    let pipeline = Pipeline::new(config, Arc::new(NoopTerminal)).unwrap();
                    let events: Vec<Event> = (0..10_000)
                        .map(|i| Event::new(ClientId::new(i % 1000), Uuid::new_v4()))
                        .collect();
                    (pipeline, events)
                },
                |(pipeline, events)| {
                    for event in events {
                        pipeline.accept(event).unwrap();
                    }
                    pipeline.close();
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_dispatch_throughput);
criterion_main!(benches);
