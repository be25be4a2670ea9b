// /////////////////////////////////////////////////////////////////////////////
// Event Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Event value object
//!
//! `Event` is the unit of work flowing through the pipeline: immutable
//! once produced, carrying the routing/ordering key (`ClientId`), the
//! dedup key (`uuid`), and a monotonic creation timestamp used only for
//! latency measurement.

use std::fmt;
use std::time::Instant;
use uuid::Uuid;

/// Routing and ordering key. Events sharing a `ClientId` are serialized
/// by the `ShardedDispatcher`; events with distinct ids may run in
/// parallel.
///
/// A newtype rather than a bare `u64` so sharding and ordering call
/// sites are type-checked - the same treatment the teacher applies to
/// every domain identifier (`PipelineId`, `StageId`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(u64);

impl ClientId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl From<u64> for ClientId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic creation timestamp, used only for latency sampling (never
/// for dedup expiry - the dedup filter measures its own arrival time).
#[derive(Debug, Clone, Copy)]
pub struct EventTimestamp(Instant);

impl EventTimestamp {
    pub fn now() -> Self {
        Self(Instant::now())
    }

    pub fn into_instant(self) -> Instant {
        self.0
    }

    /// Elapsed time since this timestamp was recorded, i.e. the
    /// end-to-end latency sample the spec's `latency` histogram
    /// observes at the start of terminal processing.
    pub fn elapsed(&self) -> std::time::Duration {
        self.0.elapsed()
    }
}

/// The unit of work dispatched through the pipeline.
///
/// Immutable after leaving the producer: no stage mutates an event, it
/// is only read and forwarded.
#[derive(Debug, Clone)]
pub struct Event {
    created_at: EventTimestamp,
    client_id: ClientId,
    uuid: Uuid,
}

impl Event {
    /// Builds a new event, stamping `created_at` with the current
    /// monotonic time.
    pub fn new(client_id: ClientId, uuid: Uuid) -> Self {
        Self {
            created_at: EventTimestamp::now(),
            client_id,
            uuid,
        }
    }

    /// Builds an event with an explicit timestamp - used by tests that
    /// need to control latency measurements deterministically.
    pub fn with_timestamp(client_id: ClientId, uuid: Uuid, created_at: EventTimestamp) -> Self {
        Self {
            created_at,
            client_id,
            uuid,
        }
    }

    pub fn created_at(&self) -> EventTimestamp {
        self.created_at
    }

    pub fn client_id(&self) -> ClientId {
        self.client_id
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_id_roundtrips_through_u64() {
        let id = ClientId::from(7u64);
        assert_eq!(id.get(), 7);
        assert_eq!(id.to_string(), "7");
    }

    #[test]
    fn event_carries_its_fields_unchanged() {
        let uuid = Uuid::new_v4();
        let event = Event::new(ClientId::new(1), uuid);
        assert_eq!(event.client_id(), ClientId::new(1));
        assert_eq!(event.uuid(), uuid);
    }

    #[test]
    fn event_latency_grows_with_elapsed_time() {
        let event = Event::new(ClientId::new(1), Uuid::new_v4());
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!(event.created_at().elapsed() >= std::time::Duration::from_millis(5));
    }
}
