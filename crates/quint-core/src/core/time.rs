// crates/quint-core/src/core/time.rs
// ============================================================================
// Module: Quint Time Model
// Description: Canonical timestamp representation for evidence, audit, and FPF state.
// Purpose: Provide a deterministic, totally ordered time value across Quint records.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Quint uses an explicit time value threaded through every tool call; the
//! calculator and store never read wall-clock time directly. Hosts (the
//! dispatcher, ultimately the CLI) supply "now" on each request so that decay
//! and staleness comparisons stay deterministic and replayable.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Time Values
// ============================================================================

/// Canonical timestamp used in Quint records, expressed as Unix epoch
/// milliseconds.
///
/// # Invariants
/// - Values are explicitly provided by callers; the core never reads
///   wall-clock time.
/// - Ordering is total, so decay (`valid_until < now`) and staleness
///   comparisons are unambiguous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Creates a timestamp from Unix epoch milliseconds.
    #[must_use]
    pub const fn from_unix_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Returns the timestamp as Unix epoch milliseconds.
    #[must_use]
    pub const fn as_unix_millis(&self) -> i64 {
        self.0
    }

    /// Returns a timestamp `days` days after this one.
    #[must_use]
    pub const fn plus_days(&self, days: i64) -> Self {
        Self(self.0 + days * 86_400_000)
    }

    /// Formats this timestamp's calendar date as `YYYY-MM-DD`, used for DRR
    /// identifiers and decay-factor messages.
    ///
    /// Falls back to the raw millisecond value if it is outside the range
    /// representable by [`time::OffsetDateTime`].
    #[must_use]
    pub fn to_iso_date(self) -> String {
        time::OffsetDateTime::from_unix_timestamp(self.0 / 1_000).map_or_else(
            |_| format!("invalid-timestamp-{}", self.0),
            |dt| format!("{:04}-{:02}-{:02}", dt.year(), u8::from(dt.month()), dt.day()),
        )
    }
}

/// One day in milliseconds, used by tools computing evidence validity windows.
pub const DAY_MILLIS: i64 = 86_400_000;
