// /////////////////////////////////////////////////////////////////////////////
// Event Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Toy terminal consumer
//!
//! A stand-in for the application-specific business logic `spec.md`
//! §4.4 describes only by contract (a DB write, an RPC call, ...).
//! Simulates the spec's ~10ms service time and logs one line per
//! event, occasionally failing to exercise the pipeline's fault
//! isolation (`spec.md` §8, scenario S5).

use event_pipeline_domain::{Event, PipelineError, TerminalConsumer};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

const SIMULATED_SERVICE_TIME: Duration = Duration::from_millis(10);
const FAILURE_EVERY_NTH: u64 = 97;

pub struct LoggingTerminal {
    calls: AtomicU64,
}

impl LoggingTerminal {
    pub fn new() -> Self {
        Self {
            calls: AtomicU64::new(0),
        }
    }

    /// Number of times `process` was invoked, successes and synthetic
    /// failures alike.
    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }
}

impl Default for LoggingTerminal {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalConsumer for LoggingTerminal {
    fn process(&self, event: Event) -> Result<Event, PipelineError> {
        std::thread::sleep(SIMULATED_SERVICE_TIME);

        let count = self.calls.fetch_add(1, Ordering::Relaxed) + 1;
        if count % FAILURE_EVERY_NTH == 0 {
            return Err(PipelineError::downstream(format!(
                "synthetic failure processing event for clientId {}",
                event.client_id()
            )));
        }

        tracing::debug!(
            client_id = %event.client_id(),
            uuid = %event.uuid(),
            latency_ms = event.created_at().elapsed().as_millis() as u64,
            "processed event"
        );
        Ok(event)
    }
}
