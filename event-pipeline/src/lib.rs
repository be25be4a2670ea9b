// /////////////////////////////////////////////////////////////////////////////
// Event Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Event Pipeline
//!
//! A high-throughput event-dispatch core: a deduplication filter, a
//! sharded ordered dispatcher, and an optional concurrency guard,
//! composed in front of a caller-supplied [`TerminalConsumer`].
//!
//! ```text
//! producer -> DeduplicationFilter -> ShardedDispatcher -> [ConcurrencyGuard] -> terminal
//! ```
//!
//! Each stage implements [`Consumer`] and holds an `Arc` reference to
//! its downstream - a flat chain, not an inheritance hierarchy. Build
//! one with [`Pipeline::new`]:
//!
//! ```no_run
//! use event_pipeline::{Pipeline, PipelineConfig};
//! use event_pipeline_domain::{Event, PipelineError, TerminalConsumer};
//! use std::sync::Arc;
//!
//! struct PrintingTerminal;
//! impl TerminalConsumer for PrintingTerminal {
//!     fn process(&self, event: Event) -> Result<Event, PipelineError> {
//!         println!("handled event for client {}", event.client_id());
//!         Ok(event)
//!     }
//! }
//!
//! # fn main() -> Result<(), PipelineError> {
//! let pipeline = Pipeline::new(PipelineConfig::default(), Arc::new(PrintingTerminal))?;
//! pipeline.accept(Event::new(1.into(), uuid::Uuid::new_v4()))?;
//! pipeline.close();
//! # Ok(())
//! # }
//! ```

pub mod concurrency_guard;
pub mod config;
pub mod dedup;
pub mod dispatcher;
pub mod logging;
pub mod metrics;
pub mod pipeline;

pub use concurrency_guard::ConcurrencyGuard;
pub use config::{PipelineConfig, PipelineConfigBuilder};
pub use dedup::DeduplicationFilter;
pub use dispatcher::ShardedDispatcher;
pub use metrics::PipelineMetrics;
pub use pipeline::Pipeline;

pub use event_pipeline_domain::{
    ClientId, Consumer, DedupWindow, Event, EventTimestamp, OverflowPolicy, PipelineError, QueueBound,
    TerminalConsumer, WorkerCount,
};
