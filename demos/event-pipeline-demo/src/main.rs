// /////////////////////////////////////////////////////////////////////////////
// Event Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Event pipeline demo
//!
//! Wires a synthetic push producer and a toy terminal consumer through
//! `event-pipeline`, the way `adaptive_pipeline/examples/` demonstrates
//! end-to-end usage of that crate's services. Not part of the pipeline's
//! contract surface - the event source is explicitly out of scope for
//! the core (`spec.md` §1), so everything in this binary downstream of
//! `PipelineConfig` is a stand-in a real embedding application would
//! replace with its actual event feed.
//!
//! Run with `cargo run -p event-pipeline-demo -- --workers 20 --duration-secs 5`.

mod producer;
mod terminal;

use anyhow::Context;
use event_pipeline::{Pipeline, PipelineConfig};
use event_pipeline_bootstrap::{parse_cli, ConsoleLogger, ExitCode, ShutdownCoordinator, ValidatedCli};
use std::sync::Arc;
use std::time::Duration;

use producer::SyntheticProducer;
use terminal::LoggingTerminal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    ConsoleLogger::init_global_subscriber();

    let cli = parse_cli().context("failed to parse command line arguments")?;

    match run(cli).await {
        Ok(()) => Ok(()),
        Err(err) => {
            tracing::error!(error = %err, "demo run failed");
            std::process::exit(ExitCode::Software.as_i32());
        }
    }
}

async fn run(cli: ValidatedCli) -> anyhow::Result<()> {
    let config = PipelineConfig::builder()
        .workers(cli.workers)
        .dedup_window(cli.dedup_window)
        .guard_enabled(cli.guard_enabled)
        .queue_bound(cli.queue_bound)
        .overflow_policy(cli.overflow_policy)
        .build()
        .map_err(|e| {
            tracing::error!(error = %e, "invalid pipeline configuration");
            anyhow::anyhow!(e)
        })?;

    tracing::info!(
        workers = cli.workers.count(),
        dedup_window = %cli.dedup_window,
        guard_enabled = cli.guard_enabled,
        "starting event pipeline demo"
    );

    let terminal = Arc::new(LoggingTerminal::new());
    let pipeline = Pipeline::new(config, terminal.clone()).context("failed to build pipeline")?;

    let shutdown = ShutdownCoordinator::new(Duration::from_secs(5));
    let token = shutdown.token();

    let producer = SyntheticProducer::new(pipeline.clone(), token);
    let producer_handle = producer.spawn();

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("received ctrl-c, shutting down");
        }
        _ = tokio::time::sleep(Duration::from_secs(10)) => {
            tracing::info!("demo duration elapsed, shutting down");
        }
    }

    shutdown.initiate_shutdown();
    producer_handle.join().expect("producer thread panicked");
    pipeline.close();

    tracing::info!(
        terminal_calls = terminal.call_count(),
        duplicates_dropped = pipeline.metrics().dedup_duplicates_total.get(),
        downstream_errors = pipeline.metrics().downstream_errors_total.get(),
        "demo finished"
    );

    Ok(())
}
