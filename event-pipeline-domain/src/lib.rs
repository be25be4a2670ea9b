// /////////////////////////////////////////////////////////////////////////////
// Event Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Event Pipeline Domain
//!
//! Pure types shared by every other crate in the workspace: the `Event`
//! value object, its `ClientId` routing key, configuration value
//! objects (`WorkerCount`, `DedupWindow`, `QueueBound`), the
//! `PipelineError` taxonomy, and the two seam traits (`Consumer`,
//! `TerminalConsumer`) that every stage and the user-supplied terminal
//! consumer implement.
//!
//! This crate has no threads, no I/O, and no metrics backend - it is
//! the vocabulary the `event-pipeline` crate's infrastructure is built
//! against, and the only crate a terminal-consumer implementation needs
//! to depend on.

pub mod error;
pub mod event;
pub mod traits;
pub mod value_objects;

pub use error::PipelineError;
pub use event::{ClientId, Event, EventTimestamp};
pub use traits::{Consumer, TerminalConsumer};
pub use value_objects::{DedupWindow, OverflowPolicy, QueueBound, WorkerCount};
