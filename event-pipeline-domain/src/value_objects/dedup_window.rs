// /////////////////////////////////////////////////////////////////////////////
// Event Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Dedup window value object
//!
//! The sliding interval the `DeduplicationFilter` uses to decide whether
//! a `uuid` has been seen "recently enough" to drop. `spec.md` §6 fixes
//! the default at 10s; this type exists so the value can't accidentally
//! be zero or negative when threaded through configuration.

use std::fmt;
use std::time::Duration;

/// A validated, strictly-positive TTL duration for dedup lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DedupWindow(Duration);

impl DedupWindow {
    /// The spec's required default.
    pub const DEFAULT: Duration = Duration::from_secs(10);

    /// Builds a `DedupWindow`, rejecting a zero-length window - a zero
    /// TTL would defeat the purpose of the filter (every entry expires
    /// immediately, so nothing is ever deduplicated).
    pub fn new(window: Duration) -> Result<Self, String> {
        if window.is_zero() {
            return Err("dedup_window must be greater than zero".to_string());
        }
        Ok(Self(window))
    }

    pub fn duration(&self) -> Duration {
        self.0
    }
}

impl Default for DedupWindow {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl fmt::Display for DedupWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_ten_seconds() {
        assert_eq!(DedupWindow::default().duration(), Duration::from_secs(10));
    }

    #[test]
    fn rejects_zero_duration() {
        assert!(DedupWindow::new(Duration::ZERO).is_err());
    }

    #[test]
    fn accepts_positive_duration() {
        let w = DedupWindow::new(Duration::from_secs(5)).unwrap();
        assert_eq!(w.duration(), Duration::from_secs(5));
    }
}
