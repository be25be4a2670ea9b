// /////////////////////////////////////////////////////////////////////////////
// Event Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Pipeline assembly
//!
//! Wires the three stages around a caller-supplied [`TerminalConsumer`]
//! into one `Consumer` entry point: `DeduplicationFilter ->
//! ShardedDispatcher -> [ConcurrencyGuard] -> terminal`. Built through a
//! fallible constructor rather than a process-wide singleton - nothing
//! in `spec.md` calls for exactly-one pipeline per process, and a
//! singleton would make the scenario tests in this crate's `tests/`
//! directory fight each other over global state.

use event_pipeline_domain::{Consumer, Event, PipelineError, TerminalConsumer};
use std::sync::Arc;

use crate::concurrency_guard::ConcurrencyGuard;
use crate::config::PipelineConfig;
use crate::dedup::DeduplicationFilter;
use crate::dispatcher::ShardedDispatcher;
use crate::metrics::PipelineMetrics;

/// Bridges the user-supplied [`TerminalConsumer`] (returns the event,
/// application-facing) onto the stage chain's [`Consumer`] contract
/// (returns nothing - every stage past this point is terminal from the
/// pipeline's point of view).
struct TerminalAdapter {
    terminal: Arc<dyn TerminalConsumer>,
}

impl Consumer for TerminalAdapter {
    fn accept(&self, event: Event) -> Result<(), PipelineError> {
        self.terminal.process(event).map(|_| ())
    }
}

/// The assembled, running pipeline. Cheap to clone (every field is an
/// `Arc`); `accept` is safe to call from any number of producer
/// threads concurrently.
#[derive(Clone)]
pub struct Pipeline {
    head: Arc<dyn Consumer>,
    dispatcher: Arc<ShardedDispatcher>,
    metrics: Arc<PipelineMetrics>,
}

impl Pipeline {
    /// Builds and starts a pipeline from `config`, wrapping `terminal`.
    ///
    /// Starts every dispatcher worker thread before returning -
    /// `accept` can be called immediately.
    pub fn new(config: PipelineConfig, terminal: Arc<dyn TerminalConsumer>) -> Result<Self, PipelineError> {
        Self::with_metrics(config, terminal, Arc::new(PipelineMetrics::new()?))
    }

    /// Same as [`Pipeline::new`], but shares a caller-supplied
    /// `PipelineMetrics` (and its `Registry`) instead of creating a
    /// fresh one - useful when an embedding application serves one
    /// `/metrics` endpoint for several pipelines.
    pub fn with_metrics(
        config: PipelineConfig,
        terminal: Arc<dyn TerminalConsumer>,
        metrics: Arc<PipelineMetrics>,
    ) -> Result<Self, PipelineError> {
        let terminal_adapter: Arc<dyn Consumer> = Arc::new(TerminalAdapter { terminal });

        let guarded: Arc<dyn Consumer> = if config.guard_enabled() {
            Arc::new(ConcurrencyGuard::new(terminal_adapter, Some(Arc::clone(&metrics))))
        } else {
            terminal_adapter
        };

        let dispatcher = Arc::new(ShardedDispatcher::new(
            config.workers().count(),
            config.queue_bound(),
            config.overflow_policy(),
            guarded,
            Some(Arc::clone(&metrics)),
        ));

        let head: Arc<dyn Consumer> = Arc::new(DeduplicationFilter::new(
            config.dedup_window().duration(),
            Arc::clone(&dispatcher) as Arc<dyn Consumer>,
            Some(Arc::clone(&metrics)),
        ));

        Ok(Self {
            head,
            dispatcher,
            metrics,
        })
    }

    /// Accepts one event at the head of the chain (the dedup filter).
    /// Safe to call concurrently from many producer threads.
    pub fn accept(&self, event: Event) -> Result<(), PipelineError> {
        self.head.accept(event)
    }

    /// Stops accepting new work and blocks until every shard has
    /// drained its queue and its worker thread has exited. Idempotent.
    pub fn close(&self) {
        self.dispatcher.close();
    }

    /// The metrics service backing this pipeline's observability hooks.
    pub fn metrics(&self) -> &Arc<PipelineMetrics> {
        &self.metrics
    }

    /// Number of dedicated worker threads (shards) this pipeline runs.
    pub fn worker_count(&self) -> usize {
        self.dispatcher.worker_count()
    }
}
