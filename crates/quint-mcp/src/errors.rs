// crates/quint-mcp/src/errors.rs
// ============================================================================
// Module: Quint MCP Errors
// Description: Transport/dispatch-level error taxonomy.
// Purpose: Distinguish protocol-level failures from tool-body EngineErrors.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! [`DispatchError`] covers failures the JSON-RPC layer itself raises before
//! a tool body ever runs: malformed request lines and unreadable stdio.
//! These map to JSON-RPC `protocol_error` responses and are never written to
//! the audit log, per the dispatcher's error taxonomy.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

// ============================================================================
// SECTION: Dispatch Error
// ============================================================================

/// Errors raised by the transport and dispatcher layers, distinct from
/// [`quint_core::EngineError`] raised by tool bodies.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The request line was not valid JSON or not a valid JSON-RPC envelope.
    #[error("parse error: {0}")]
    Parse(String),
    /// Reading or writing the stdio transport failed.
    #[error("transport error: {0}")]
    Transport(String),
}
