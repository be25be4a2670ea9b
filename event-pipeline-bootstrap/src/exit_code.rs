// /////////////////////////////////////////////////////////////////////////////
// Event Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Exit codes
//!
//! Standardized Unix exit codes following BSD `sysexits.h` conventions,
//! plus a mapping from [`PipelineError`] so a demo binary's `main` can
//! turn a construction-time error into a specific process exit status
//! without hand-rolling the mapping at every call site.

use event_pipeline_domain::PipelineError;
use std::fmt;

/// Exit codes following Unix conventions (BSD `sysexits.h`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i32)]
pub enum ExitCode {
    #[default]
    Success = 0,
    Error = 1,

    /// Command line usage error (64) - invalid or missing arguments.
    UsageError = 64,

    /// Invalid configuration passed to `PipelineConfig::builder()`
    /// (78, repurposed from `sysexits.h`'s `EX_CONFIG`).
    Config = 78,

    /// Internal software error (70) - a bug, not an operator mistake.
    Software = 70,

    /// Interrupted by SIGINT (130).
    Interrupted = 130,

    /// Terminated by SIGTERM (143).
    Terminated = 143,
}

impl ExitCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Maps a [`PipelineError`] raised during pipeline construction or
    /// from a producer's `accept` call to an exit code for a demo
    /// binary's `main`.
    pub fn from_pipeline_error(error: &PipelineError) -> Self {
        match error {
            PipelineError::InvalidConfiguration(_) => ExitCode::Config,
            PipelineError::Internal(_) | PipelineError::MetricsError(_) => ExitCode::Software,
            PipelineError::Shutdown | PipelineError::DownstreamError(_) | PipelineError::ConcurrencyViolation(_) => {
                ExitCode::Error
            }
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ExitCode::Success => "success",
            ExitCode::Error => "general error",
            ExitCode::UsageError => "command line usage error",
            ExitCode::Config => "invalid pipeline configuration",
            ExitCode::Software => "internal software error",
            ExitCode::Interrupted => "interrupted by signal (SIGINT)",
            ExitCode::Terminated => "terminated by signal (SIGTERM)",
        }
    }

    pub fn is_success(self) -> bool {
        matches!(self, ExitCode::Success)
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.description(), self.as_i32())
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code.as_i32()
    }
}
