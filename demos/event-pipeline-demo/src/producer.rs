// /////////////////////////////////////////////////////////////////////////////
// Event Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Synthetic producer
//!
//! A stand-in for "the event source... described abstractly as a push
//! producer" (`spec.md` §1, explicitly out of scope for the core).
//! Pushes events at roughly the spec's stated workload - ~1,000
//! events/s spread across a fixed pool of `clientId`s - onto the
//! pipeline's head stage from a dedicated thread, occasionally
//! resubmitting a just-sent `uuid` so the dedup filter has something to
//! drop.

use event_pipeline::Pipeline;
use event_pipeline_domain::{ClientId, Event};
use event_pipeline_bootstrap::CancellationToken;
use rand::Rng;
use std::thread::JoinHandle;
use std::time::Duration;
use uuid::Uuid;

const CLIENT_POOL_SIZE: u64 = 64;
const SUBMIT_INTERVAL: Duration = Duration::from_millis(1);
const IMMEDIATE_DUPLICATE_CHANCE: f64 = 0.02;

pub struct SyntheticProducer {
    pipeline: Pipeline,
    stop: CancellationToken,
}

impl SyntheticProducer {
    pub fn new(pipeline: Pipeline, stop: CancellationToken) -> Self {
        Self { pipeline, stop }
    }

    /// Starts feeding the pipeline from a dedicated thread, returning a
    /// handle the caller joins after signalling `stop`.
    pub fn spawn(self) -> JoinHandle<()> {
        std::thread::Builder::new()
            .name("synthetic-producer".to_string())
            .spawn(move || self.run())
            .expect("failed to spawn synthetic producer thread")
    }

    fn run(&self) {
        let mut rng = rand::rng();
        let mut last_uuid: Option<Uuid> = None;

        while !self.stop.is_cancelled() {
            let client_id = ClientId::new(rng.random_range(0..CLIENT_POOL_SIZE));

            let uuid = if let Some(previous) = last_uuid.take() {
                if rng.random_bool(IMMEDIATE_DUPLICATE_CHANCE) {
                    previous
                } else {
                    Uuid::new_v4()
                }
            } else {
                Uuid::new_v4()
            };
            last_uuid = Some(uuid);

            let event = Event::new(client_id, uuid);
            if let Err(err) = self.pipeline.accept(event) {
                tracing::warn!(error = %err, "producer: pipeline rejected event");
                break;
            }

            std::thread::sleep(SUBMIT_INTERVAL);
        }
    }
}
