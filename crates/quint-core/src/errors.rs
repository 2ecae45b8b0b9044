// crates/quint-core/src/errors.rs
// ============================================================================
// Module: Quint Engine Errors
// Description: Error taxonomy shared by the store trait, calculator, and FSM.
// Purpose: Give every tool body a single error type to return.
// Dependencies: crate::core::hashing, crate::store
// ============================================================================

//! ## Overview
//! [`EngineError`] is the error type every tool body in `quint-mcp` returns.
//! The dispatcher maps each variant to an audit [`crate::core::AuditResult`]
//! and a JSON-RPC tool-error response; see the error-kind mapping in the
//! crate's top-level documentation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::hashing::HashError;
use crate::store::StoreError;

// ============================================================================
// SECTION: Engine Error
// ============================================================================

/// Errors raised by store operations, the assurance calculator, the phase
/// state machine, and the tools layer.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A phase or data precondition was not met before the tool body ran.
    #[error("precondition blocked: {0}")]
    PreconditionBlocked(String),
    /// A referenced identifier does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// An argument was malformed or out of the allowed range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// An operation would have created a cycle or a duplicate edge.
    #[error("integrity violation: {0}")]
    IntegrityViolation(String),
    /// The underlying store reported an error.
    #[error(transparent)]
    Storage(#[from] StoreError),
    /// Canonical-hashing of tool arguments failed.
    #[error(transparent)]
    Hash(#[from] HashError),
}

impl EngineError {
    /// Returns the abstract error-kind name used for audit-entry details and
    /// tool-error classification, matching the taxonomy `precondition_blocked`
    /// / `not_found` / `invalid_argument` / `integrity_violation` /
    /// `storage_error`.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::PreconditionBlocked(_) => "precondition_blocked",
            Self::NotFound(_) => "not_found",
            Self::InvalidArgument(_) => "invalid_argument",
            Self::IntegrityViolation(_) => "integrity_violation",
            Self::Storage(_) => "storage_error",
            Self::Hash(_) => "storage_error",
        }
    }
}
