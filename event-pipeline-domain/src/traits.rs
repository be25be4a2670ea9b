// /////////////////////////////////////////////////////////////////////////////
// Event Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Stage contract
//!
//! Every stage in the chain - `DeduplicationFilter`, `ShardedDispatcher`,
//! `ConcurrencyGuard`, and the terminal consumer itself - conforms to
//! the same one-method contract. There is no inheritance hierarchy: a
//! flat composition of stages, each holding a reference to its
//! downstream, tagged by role rather than by subclassing.

use crate::error::PipelineError;
use crate::event::Event;

/// A stage that accepts an event, does its local work, and (on success)
/// forwards to whatever it wraps.
///
/// `accept` may run on a producer thread (the head of the chain) or a
/// worker thread (everything past the `ShardedDispatcher`); the
/// contract does not care which, only that implementations documented
/// as thread-safe actually are.
pub trait Consumer: Send + Sync {
    /// Accepts one event. Implementations return promptly: the head
    /// stages are called directly from producer threads and must not
    /// perform the event's downstream work themselves.
    fn accept(&self, event: Event) -> Result<(), PipelineError>;
}

/// The user-supplied leaf of the chain - application-specific work such
/// as a database write or an RPC call.
///
/// Must be thread-safe across distinct `clientId`s (workers for
/// different shards call it concurrently) but need not be thread-safe
/// for the same `clientId` - the `ShardedDispatcher` guarantees
/// non-overlap there.
pub trait TerminalConsumer: Send + Sync {
    /// Processes one event, returning it (unchanged, by convention - no
    /// stage in this pipeline mutates events) or an error describing
    /// why processing failed.
    fn process(&self, event: Event) -> Result<Event, PipelineError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::ClientId;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    struct CountingConsumer(AtomicUsize);

    impl TerminalConsumer for CountingConsumer {
        fn process(&self, event: Event) -> Result<Event, PipelineError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(event)
        }
    }

    #[test]
    fn terminal_consumer_can_be_called_directly() {
        let consumer = CountingConsumer(AtomicUsize::new(0));
        let event = Event::new(ClientId::new(1), Uuid::new_v4());
        consumer.process(event).unwrap();
        assert_eq!(consumer.0.load(Ordering::SeqCst), 1);
    }
}
