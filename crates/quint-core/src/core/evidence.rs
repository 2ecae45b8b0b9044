// crates/quint-core/src/core/evidence.rs
// ============================================================================
// Module: Quint Evidence Model
// Description: Time-bounded observations attached to a holon.
// Purpose: Define the evidence record and its verdict/type enums.
// Dependencies: crate::core::{identifiers, time}
// ============================================================================

//! ## Overview
//! Evidence is appended by `verify`, `test`, `audit`, and `resolve`; it is
//! never mutated except to flip the staleness flag (set externally when a
//! carrier changes, cleared on successful re-verification or waiver).

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::EvidenceId;
use crate::core::identifiers::HolonId;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Evidence Type / Verdict
// ============================================================================

/// What kind of observation an evidence record represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceType {
    /// Result of a `test` call.
    TestResult,
    /// Result of a `verify` call.
    LogicCheck,
    /// Result of an `audit` call.
    AuditReport,
    /// Produced by `resolve(resolution = implemented)`.
    Implementation,
    /// Produced by `resolve(resolution = abandoned)`.
    Abandonment,
    /// Produced by `resolve(resolution = superseded)`.
    Supersession,
    /// An explicit acceptance of stale/expired evidence.
    Waiver,
    /// Evidence sourced from outside the project (research, external review).
    External,
}

/// Outcome recorded by an evidence item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// The check succeeded outright.
    Pass,
    /// The check failed.
    Fail,
    /// The check succeeded with caveats.
    Degrade,
    /// The check calls for the hypothesis to be refined rather than rejected.
    Refine,
}

// ============================================================================
// SECTION: Staleness
// ============================================================================

/// Marks an evidence item as stale because its carrier changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaleFlag {
    /// Why the evidence was marked stale.
    pub reason: String,
    /// When it was marked stale.
    pub flagged_at: Timestamp,
}

// ============================================================================
// SECTION: Evidence
// ============================================================================

/// A time-bounded observation attached to a holon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evidence {
    /// Opaque identifier.
    pub id: EvidenceId,
    /// Holon this evidence is attached to.
    pub holon_id: HolonId,
    /// Kind of observation.
    pub evidence_type: EvidenceType,
    /// Free-text narrative (checks performed, risks observed, notes).
    pub body: String,
    /// Outcome of the check.
    pub verdict: Verdict,
    /// Human-facing assurance level label (e.g. `"L1"`, `"L2"`).
    pub assurance_level: Option<String>,
    /// External artifact this evidence is "about" (file path, commit, URL).
    pub carrier_ref: Option<String>,
    /// Hash of the carrier at the time evidence was recorded.
    pub carrier_hash: Option<String>,
    /// Commit the carrier was observed at.
    pub carrier_commit: Option<String>,
    /// Set when the carrier has since changed.
    pub stale: Option<StaleFlag>,
    /// When this evidence decays and should no longer count at full weight.
    pub valid_until: Option<Timestamp>,
    /// Creation time.
    pub created_at: Timestamp,
}

impl Evidence {
    /// Returns whether this evidence has decayed past its validity window as
    /// of `now`.
    #[must_use]
    pub fn is_decayed(&self, now: Timestamp) -> bool {
        self.valid_until.is_some_and(|valid_until| valid_until < now)
    }

    /// Returns whether this evidence is currently flagged stale.
    #[must_use]
    pub const fn is_stale(&self) -> bool {
        self.stale.is_some()
    }
}
