// /////////////////////////////////////////////////////////////////////////////
// Event Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Event Pipeline Bootstrap
//!
//! Process-level concerns for an application embedding
//! `event-pipeline`: CLI parsing, bootstrap-phase logging, graceful
//! async shutdown, and exit codes.
//!
//! Deliberately separate from `event-pipeline` itself - the core
//! pipeline has no CLI, no signal handling, and no opinion about how
//! its embedding process starts or stops; this crate is where that
//! opinion lives, the same split the teacher workspace draws between
//! its pipeline crates and its `bootstrap` crate.

pub mod cli;
pub mod exit_code;
pub mod logger;
pub mod shutdown;

pub use cli::{parse_cli, Cli, ValidatedCli};
pub use exit_code::ExitCode;
pub use logger::{BootstrapLogger, ConsoleLogger, NoOpLogger};
pub use shutdown::{CancellationToken, ShutdownCoordinator};
