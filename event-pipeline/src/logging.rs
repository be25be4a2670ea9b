// /////////////////////////////////////////////////////////////////////////////
// Event Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Shard workers and the dedup reaper log through `tracing`, the same
//! facade the teacher's `adaptive_pipeline` crates use internally -
//! subscriber selection stays the embedding application's call (see
//! `event-pipeline-bootstrap` for a ready-made console subscriber).
//! Nothing here installs a global subscriber on its own; a library
//! crate that did would fight with whatever the embedding binary
//! chooses.

/// Emits one structured span per worker thread name, so a subscriber
/// that groups by span can separate shard 3's logs from shard 7's
/// without string-parsing the message.
pub fn worker_span(shard_index: usize) -> tracing::Span {
    tracing::info_span!("dispatcher_shard", shard = shard_index)
}
