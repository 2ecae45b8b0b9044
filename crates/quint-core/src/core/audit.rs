// crates/quint-core/src/core/audit.rs
// ============================================================================
// Module: Quint Audit Log
// Description: Append-only record of every dispatched tool call.
// Purpose: Define the audit log entry and its result classification.
// Dependencies: crate::core::identifiers
// ============================================================================

//! ## Overview
//! The audit log is append-only: entries are inserted by the dispatcher after
//! every tool invocation and are never updated or deleted. Ordering is
//! monotonic by commit order, not by wall-clock time.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::AuditId;
use crate::core::identifiers::ContextId;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Audit Result
// ============================================================================

/// Outcome of a dispatched tool call, as recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditResult {
    /// The tool body executed and committed successfully.
    Success,
    /// A precondition rejected the call before the tool body ran.
    Blocked,
    /// The tool body raised an error after preconditions passed.
    Error,
}

// ============================================================================
// SECTION: Audit Log Entry
// ============================================================================

/// An append-only audit log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLogEntry {
    /// Opaque identifier.
    pub id: AuditId,
    /// When the entry was committed.
    pub at: Timestamp,
    /// Name of the tool invoked (e.g. `"quint_propose"`).
    pub tool: String,
    /// Logical operation name (e.g. `"propose"`, `"cycle_reset"`).
    pub operation: String,
    /// Actor who invoked the tool, if known.
    pub actor: Option<String>,
    /// Identifier of the primary holon the call affected, if any.
    pub target_id: Option<String>,
    /// Canonical hash of the tool call's arguments.
    pub input_hash: String,
    /// Outcome of the call.
    pub result: AuditResult,
    /// Free-text details (precondition message, error text, or a summary).
    pub details: String,
    /// Context the call was scoped to.
    pub context_id: ContextId,
}
