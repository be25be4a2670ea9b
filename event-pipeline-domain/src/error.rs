// /////////////////////////////////////////////////////////////////////////////
// Event Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Domain Error System
//!
//! Error taxonomy for the event-dispatch pipeline, organized around the
//! failure kinds a caller actually needs to distinguish: a dropped
//! duplicate is not an error at all, a downstream failure is isolated to
//! one event, a concurrency violation is a detected invariant breach,
//! and a late `accept` after shutdown must fail fast and visibly.
//!
//! ## Propagation
//!
//! `DeduplicationFilter` and `ShardedDispatcher::accept` run on the
//! producer thread; their errors are returned directly to the caller.
//! Once an event has been enqueued, any further failure is handled
//! inside the worker and never surfaces back to the producer - see
//! `Internal` and the worker's own logging.

use thiserror::Error;

/// Errors produced by the event pipeline's core stages.
#[derive(Error, Debug, Clone)]
pub enum PipelineError {
    /// Not actually an error in the Rust sense - `accept` is called after
    /// `close()`. The producer is expected to stop.
    #[error("pipeline is shut down")]
    Shutdown,

    /// Terminal consumer raised an error while processing one event. The
    /// worker logs this, counts it, and continues with the next task.
    #[error("downstream consumer error: {0}")]
    DownstreamError(String),

    /// `ConcurrencyGuard` observed a clientId's mutex already held by
    /// another thread - a wiring bug, since `ShardedDispatcher` upstream
    /// should make this impossible.
    #[error("concurrent modification detected for clientId {0}")]
    ConcurrencyViolation(u64),

    /// Bad `PipelineConfig` - zero workers, a zero-length dedup window,
    /// and so on.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A bug at the worker granularity (e.g. queue corruption). Fatal to
    /// that one shard; the pipeline remains up on the others.
    #[error("internal error: {0}")]
    Internal(String),

    /// Metrics registration/collection failure.
    #[error("metrics error: {0}")]
    MetricsError(String),
}

impl PipelineError {
    /// Creates a new invalid-configuration error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// Creates a new downstream error, capturing the consumer's message.
    pub fn downstream(msg: impl Into<String>) -> Self {
        Self::DownstreamError(msg.into())
    }

    /// Creates a new internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Creates a new metrics error.
    pub fn metrics_error(msg: impl Into<String>) -> Self {
        Self::MetricsError(msg.into())
    }

    /// Whether this error indicates a condition a caller might retry.
    ///
    /// Only `ConcurrencyViolation` under the bounded-wait policy is
    /// retryable in practice; everything else is either not an error
    /// the producer sees (`Duplicate` is silent) or a terminal
    /// condition for that event/shard.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, PipelineError::ConcurrencyViolation(_))
    }

    /// Gets the error category, used for metrics/log grouping.
    pub fn category(&self) -> &'static str {
        match self {
            PipelineError::Shutdown => "shutdown",
            PipelineError::DownstreamError(_) => "downstream",
            PipelineError::ConcurrencyViolation(_) => "concurrency",
            PipelineError::InvalidConfiguration(_) => "configuration",
            PipelineError::Internal(_) => "internal",
            PipelineError::MetricsError(_) => "metrics",
        }
    }
}
