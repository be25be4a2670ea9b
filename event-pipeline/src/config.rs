// /////////////////////////////////////////////////////////////////////////////
// Event Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Pipeline configuration
//!
//! `PipelineConfig` collects every knob `spec.md` exposes - worker
//! count, dedup window, whether the concurrency guard runs, and the
//! per-shard queue policy - into one value, validated up front the way
//! the teacher's resource manager validates a `ResourceConfig` before
//! anything downstream can observe a half-built, inconsistent setup.

use event_pipeline_domain::{DedupWindow, OverflowPolicy, PipelineError, QueueBound, WorkerCount};

/// Validated configuration for a [`crate::pipeline::Pipeline`].
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    workers: WorkerCount,
    dedup_window: DedupWindow,
    guard_enabled: bool,
    queue_bound: QueueBound,
    overflow_policy: OverflowPolicy,
}

impl PipelineConfig {
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    pub fn workers(&self) -> WorkerCount {
        self.workers
    }

    pub fn dedup_window(&self) -> DedupWindow {
        self.dedup_window
    }

    pub fn guard_enabled(&self) -> bool {
        self.guard_enabled
    }

    pub fn queue_bound(&self) -> QueueBound {
        self.queue_bound
    }

    pub fn overflow_policy(&self) -> OverflowPolicy {
        self.overflow_policy
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: WorkerCount::default(),
            dedup_window: DedupWindow::default(),
            guard_enabled: false,
            queue_bound: QueueBound::default(),
            overflow_policy: OverflowPolicy::default(),
        }
    }
}

/// Fallible builder for [`PipelineConfig`]; `build()` is where
/// cross-field validation (currently: a bounded queue must pick a
/// non-default overflow policy deliberately) happens, mirroring the
/// teacher's `ResourceConfig` builder pattern.
#[derive(Debug, Clone)]
pub struct PipelineConfigBuilder {
    workers: WorkerCount,
    dedup_window: DedupWindow,
    guard_enabled: bool,
    queue_bound: QueueBound,
    overflow_policy: OverflowPolicy,
}

impl Default for PipelineConfigBuilder {
    fn default() -> Self {
        let defaults = PipelineConfig::default();
        Self {
            workers: defaults.workers,
            dedup_window: defaults.dedup_window,
            guard_enabled: defaults.guard_enabled,
            queue_bound: defaults.queue_bound,
            overflow_policy: defaults.overflow_policy,
        }
    }
}

impl PipelineConfigBuilder {
    pub fn workers(mut self, workers: WorkerCount) -> Self {
        self.workers = workers;
        self
    }

    pub fn dedup_window(mut self, dedup_window: DedupWindow) -> Self {
        self.dedup_window = dedup_window;
        self
    }

    pub fn guard_enabled(mut self, enabled: bool) -> Self {
        self.guard_enabled = enabled;
        self
    }

    pub fn queue_bound(mut self, queue_bound: QueueBound) -> Self {
        self.queue_bound = queue_bound;
        self
    }

    pub fn overflow_policy(mut self, overflow_policy: OverflowPolicy) -> Self {
        self.overflow_policy = overflow_policy;
        self
    }

    pub fn build(self) -> Result<PipelineConfig, PipelineError> {
        if let QueueBound::Bounded(capacity) = self.queue_bound {
            if capacity == 0 {
                return Err(PipelineError::invalid_config(
                    "queue_bound capacity must be greater than zero",
                ));
            }
        }

        Ok(PipelineConfig {
            workers: self.workers,
            dedup_window: self.dedup_window,
            guard_enabled: self.guard_enabled,
            queue_bound: self.queue_bound,
            overflow_policy: self.overflow_policy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = PipelineConfig::builder().build().unwrap();
        assert_eq!(config.workers().count(), WorkerCount::DEFAULT_WORKERS);
        assert!(!config.guard_enabled());
    }

    #[test]
    fn rejects_zero_capacity_bound() {
        let result = PipelineConfig::builder().queue_bound(QueueBound::Bounded(0)).build();
        assert!(result.is_err());
    }

    #[test]
    fn builder_threads_every_field() {
        let config = PipelineConfig::builder()
            .workers(WorkerCount::new(5))
            .guard_enabled(true)
            .queue_bound(QueueBound::Bounded(100))
            .overflow_policy(OverflowPolicy::DropNewest)
            .build()
            .unwrap();

        assert_eq!(config.workers().count(), 5);
        assert!(config.guard_enabled());
        assert_eq!(config.queue_bound(), QueueBound::Bounded(100));
        assert_eq!(config.overflow_policy(), OverflowPolicy::DropNewest);
    }
}
