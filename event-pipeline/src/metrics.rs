// /////////////////////////////////////////////////////////////////////////////
// Event Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Pipeline metrics
//!
//! Prometheus-backed observability hooks. `spec.md` §6 lists these as
//! normative by name/semantics, while the export/wire format (a served
//! `/metrics` endpoint) is explicitly out of scope for the core - this
//! module stops at the typed hook surface; wiring a `prometheus`
//! exporter HTTP server is left to the embedding application, the way
//! `adaptive_pipeline`'s `MetricsService` separates metric collection
//! from the endpoint that serves it.

use event_pipeline_domain::PipelineError;
use prometheus::{Gauge, GaugeVec, Histogram, HistogramOpts, IntCounter, IntGauge, Opts, Registry};

/// Typed handles for every observability hook `spec.md` §6 names.
#[derive(Clone)]
pub struct PipelineMetrics {
    registry: Registry,

    /// `latency` - histogram of `now - event.createdAt`, sampled at the
    /// start of terminal processing.
    pub latency_seconds: Histogram,

    /// `dedup.duplicates` - counter of events dropped as duplicates.
    pub dedup_duplicates_total: IntCounter,

    /// `dedup.cache_size` - gauge of entries currently in the seen-uuid
    /// table.
    pub dedup_cache_size: IntGauge,

    /// `dispatcher.queue_depth.mean` - gauge across shards.
    pub dispatcher_queue_depth_mean: Gauge,

    /// `dispatcher.queue_depth[i]` - gauge per shard, keyed by shard
    /// index.
    pub dispatcher_queue_depth: GaugeVec,

    /// Counters of tasks submitted, completed, and (if bounded) dropped.
    pub dispatcher_tasks_submitted_total: IntCounter,
    pub dispatcher_tasks_completed_total: IntCounter,
    pub dispatcher_tasks_dropped_total: IntCounter,

    /// `guard.violations` - counter, `ConcurrencyGuard` only.
    pub guard_violations_total: IntCounter,

    /// Errors raised by the terminal consumer, caught and counted by
    /// the worker rather than propagated.
    pub downstream_errors_total: IntCounter,
}

impl PipelineMetrics {
    /// Creates a new metrics service with its own registry, namespaced
    /// under `event_pipeline`.
    pub fn new() -> Result<Self, PipelineError> {
        let registry = Registry::new();
        let ns = "event_pipeline";

        let latency_seconds = Histogram::with_opts(
            HistogramOpts::new("latency_seconds", "Event latency from creation to start of terminal processing")
                .namespace(ns)
                .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]),
        )
        .map_err(|e| PipelineError::metrics_error(format!("latency_seconds: {e}")))?;

        let dedup_duplicates_total = IntCounter::with_opts(
            Opts::new("dedup_duplicates_total", "Events dropped as duplicates").namespace(ns),
        )
        .map_err(|e| PipelineError::metrics_error(format!("dedup_duplicates_total: {e}")))?;

        let dedup_cache_size = IntGauge::with_opts(
            Opts::new("dedup_cache_size", "Entries currently in the seen-uuid table").namespace(ns),
        )
        .map_err(|e| PipelineError::metrics_error(format!("dedup_cache_size: {e}")))?;

        let dispatcher_queue_depth_mean = Gauge::with_opts(
            Opts::new("dispatcher_queue_depth_mean", "Mean queue depth across shards").namespace(ns),
        )
        .map_err(|e| PipelineError::metrics_error(format!("dispatcher_queue_depth_mean: {e}")))?;

        let dispatcher_queue_depth = GaugeVec::new(
            Opts::new("dispatcher_queue_depth", "Per-shard queue depth").namespace(ns),
            &["shard"],
        )
        .map_err(|e| PipelineError::metrics_error(format!("dispatcher_queue_depth: {e}")))?;

        let dispatcher_tasks_submitted_total = IntCounter::with_opts(
            Opts::new("dispatcher_tasks_submitted_total", "Tasks submitted to the dispatcher").namespace(ns),
        )
        .map_err(|e| PipelineError::metrics_error(format!("dispatcher_tasks_submitted_total: {e}")))?;

        let dispatcher_tasks_completed_total = IntCounter::with_opts(
            Opts::new("dispatcher_tasks_completed_total", "Tasks completed by shard workers").namespace(ns),
        )
        .map_err(|e| PipelineError::metrics_error(format!("dispatcher_tasks_completed_total: {e}")))?;

        let dispatcher_tasks_dropped_total = IntCounter::with_opts(
            Opts::new(
                "dispatcher_tasks_dropped_total",
                "Tasks dropped by a bounded queue's overflow policy",
            )
            .namespace(ns),
        )
        .map_err(|e| PipelineError::metrics_error(format!("dispatcher_tasks_dropped_total: {e}")))?;

        let guard_violations_total = IntCounter::with_opts(
            Opts::new("guard_violations_total", "Concurrency violations detected by the guard").namespace(ns),
        )
        .map_err(|e| PipelineError::metrics_error(format!("guard_violations_total: {e}")))?;

        let downstream_errors_total = IntCounter::with_opts(
            Opts::new("downstream_errors_total", "Errors raised by the terminal consumer").namespace(ns),
        )
        .map_err(|e| PipelineError::metrics_error(format!("downstream_errors_total: {e}")))?;

        let metrics = Self {
            registry,
            latency_seconds,
            dedup_duplicates_total,
            dedup_cache_size,
            dispatcher_queue_depth_mean,
            dispatcher_queue_depth,
            dispatcher_tasks_submitted_total,
            dispatcher_tasks_completed_total,
            dispatcher_tasks_dropped_total,
            guard_violations_total,
            downstream_errors_total,
        };
        metrics.register_all()?;
        Ok(metrics)
    }

    fn register_all(&self) -> Result<(), PipelineError> {
        macro_rules! register {
            ($collector:expr) => {
                self.registry
                    .register(Box::new($collector.clone()))
                    .map_err(|e| PipelineError::metrics_error(e.to_string()))?;
            };
        }
        register!(self.latency_seconds);
        register!(self.dedup_duplicates_total);
        register!(self.dedup_cache_size);
        register!(self.dispatcher_queue_depth_mean);
        register!(self.dispatcher_queue_depth);
        register!(self.dispatcher_tasks_submitted_total);
        register!(self.dispatcher_tasks_completed_total);
        register!(self.dispatcher_tasks_dropped_total);
        register!(self.guard_violations_total);
        register!(self.downstream_errors_total);
        Ok(())
    }

    /// The underlying registry, for an embedding application that wants
    /// to expose a `/metrics` endpoint itself.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_without_error() {
        let metrics = PipelineMetrics::new().unwrap();
        assert!(!metrics.registry().gather().is_empty());
    }

    #[test]
    fn counters_start_at_zero() {
        let metrics = PipelineMetrics::new().unwrap();
        assert_eq!(metrics.dedup_duplicates_total.get(), 0);
        assert_eq!(metrics.guard_violations_total.get(), 0);
    }
}
