// /////////////////////////////////////////////////////////////////////////////
// Event Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Command-line interface
//!
//! Parses the handful of knobs `spec.md` §6 exposes (`workers`,
//! `dedup_window`, `guard_enabled`, `queue_bound`/`overflow_policy`)
//! with `clap`, then converts them into a validated `PipelineConfig`
//! via its own fallible builder - numeric ranges are enforced exactly
//! once, at `PipelineConfig::builder().build()`, rather than
//! duplicated between the CLI layer and the config layer.

use clap::Parser;
use event_pipeline_domain::{DedupWindow, OverflowPolicy, PipelineError, QueueBound, WorkerCount};
use std::time::Duration;

/// Runs an event pipeline in front of a demo terminal consumer.
#[derive(Debug, Parser)]
#[command(name = "event-pipeline", about = "High-throughput event-dispatch pipeline", version)]
pub struct Cli {
    /// Number of dedicated worker threads (shards). Must sustain
    /// `workers * (1 / service_time) >= arrival_rate`.
    #[arg(long, default_value_t = WorkerCount::DEFAULT_WORKERS)]
    pub workers: usize,

    /// Dedup sliding window, in seconds.
    #[arg(long = "dedup-window-secs", default_value_t = DedupWindow::DEFAULT.as_secs())]
    pub dedup_window_secs: u64,

    /// Enable the concurrency guard (an assertion layer; off by
    /// default in production wiring).
    #[arg(long, default_value_t = false)]
    pub guard_enabled: bool,

    /// Per-shard queue capacity. Omit for unbounded.
    #[arg(long)]
    pub queue_bound: Option<usize>,

    /// Overflow policy for a bounded queue.
    #[arg(long, value_enum, default_value_t = CliOverflowPolicy::Block)]
    pub overflow_policy: CliOverflowPolicy,

    /// Increase log verbosity (can be repeated).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliOverflowPolicy {
    Block,
    DropNewest,
}

impl From<CliOverflowPolicy> for OverflowPolicy {
    fn from(policy: CliOverflowPolicy) -> Self {
        match policy {
            CliOverflowPolicy::Block => OverflowPolicy::Block,
            CliOverflowPolicy::DropNewest => OverflowPolicy::DropNewest,
        }
    }
}

/// CLI arguments after conversion into the domain's own value
/// objects - still unvalidated as a whole; pass to
/// `event_pipeline::PipelineConfig::builder()` to get a validated
/// config.
#[derive(Debug, Clone)]
pub struct ValidatedCli {
    pub workers: WorkerCount,
    pub dedup_window: DedupWindow,
    pub guard_enabled: bool,
    pub queue_bound: QueueBound,
    pub overflow_policy: OverflowPolicy,
    pub verbose: u8,
}

/// Parses `std::env::args()` and converts into domain value objects.
pub fn parse_cli() -> Result<ValidatedCli, PipelineError> {
    validate(Cli::parse())
}

fn validate(cli: Cli) -> Result<ValidatedCli, PipelineError> {
    let dedup_window = DedupWindow::new(Duration::from_secs(cli.dedup_window_secs))
        .map_err(PipelineError::invalid_config)?;

    let queue_bound = match cli.queue_bound {
        Some(capacity) => QueueBound::Bounded(capacity),
        None => QueueBound::Unbounded,
    };

    Ok(ValidatedCli {
        workers: WorkerCount::new(cli.workers),
        dedup_window,
        guard_enabled: cli.guard_enabled,
        queue_bound,
        overflow_policy: cli.overflow_policy.into(),
        verbose: cli.verbose,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_parse_to_a_valid_config() {
        let cli = Cli::parse_from(["event-pipeline"]);
        let validated = validate(cli).unwrap();
        assert_eq!(validated.workers.count(), WorkerCount::DEFAULT_WORKERS);
        assert!(!validated.guard_enabled);
        assert_eq!(validated.queue_bound, QueueBound::Unbounded);
    }

    #[test]
    fn bounded_queue_with_drop_newest_parses() {
        let cli = Cli::parse_from([
            "event-pipeline",
            "--workers",
            "8",
            "--queue-bound",
            "100",
            "--overflow-policy",
            "drop-newest",
        ]);
        let validated = validate(cli).unwrap();
        assert_eq!(validated.workers.count(), 8);
        assert_eq!(validated.queue_bound, QueueBound::Bounded(100));
        assert_eq!(validated.overflow_policy, OverflowPolicy::DropNewest);
    }

    #[test]
    fn rejects_zero_dedup_window() {
        let cli = Cli::parse_from(["event-pipeline", "--dedup-window-secs", "0"]);
        assert!(validate(cli).is_err());
    }
}
