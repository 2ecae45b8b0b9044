// crates/quint-core/src/core/waiver.rs
// ============================================================================
// Module: Quint Waiver Model
// Description: Explicit, time-bounded acceptance of stale or expired evidence.
// Purpose: Define the waiver record consulted by the assurance calculator.
// Dependencies: crate::core::identifiers
// ============================================================================

//! ## Overview
//! A waiver overrides decay and staleness for one evidence item until a
//! declared date. Waivers always carry a rationale; the calculator treats
//! waived evidence as a pass at score 1.0 while the waiver is active.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::EvidenceId;
use crate::core::identifiers::WaiverId;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Waiver
// ============================================================================

/// An explicit, justified override allowing stale or expired evidence to
/// count until a declared future date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Waiver {
    /// Opaque identifier.
    pub id: WaiverId,
    /// Evidence item this waiver applies to.
    pub evidence_id: EvidenceId,
    /// The waiver is active while `now <= waived_until`.
    pub waived_until: Timestamp,
    /// Mandatory justification for the waiver.
    pub rationale: String,
    /// Who granted the waiver.
    pub actor: Option<String>,
    /// Creation time.
    pub created_at: Timestamp,
}

impl Waiver {
    /// Returns whether this waiver is active as of `now`.
    #[must_use]
    pub fn is_active(&self, now: Timestamp) -> bool {
        now <= self.waived_until
    }
}
