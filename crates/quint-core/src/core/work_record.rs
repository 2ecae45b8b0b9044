// crates/quint-core/src/core/work_record.rs
// ============================================================================
// Module: Quint Work Record
// Description: Append-only record of work performed against a holon.
// Purpose: Back the `performedBy` relation with a durable performance ledger.
// Dependencies: crate::core::{identifiers, time}
// ============================================================================

//! ## Overview
//! A work record ties a holon to the method and performer that produced it,
//! bounded by a start/end window, with a free-form ledger blob for
//! backend-specific bookkeeping. No tool in the tools layer currently emits
//! one directly; it exists so a `performedBy` edge always has something
//! concrete to point at once work-tracking integrations are wired in.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::HolonId;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Work Record
// ============================================================================

/// An append-only record of work performed against a holon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkRecord {
    /// Holon this work record is attached to.
    pub holon_id: HolonId,
    /// Reference to the method or procedure that performed the work.
    pub method_ref: String,
    /// Reference to the performer (human, agent, or automated job).
    pub performer_ref: String,
    /// When the work started.
    pub started_at: Timestamp,
    /// When the work ended, if it has completed.
    pub ended_at: Option<Timestamp>,
    /// Free-form ledger payload, opaque to the core engine.
    pub ledger: serde_json::Value,
}
