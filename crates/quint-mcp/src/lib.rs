// crates/quint-mcp/src/lib.rs
// ============================================================================
// Module: Quint MCP
// Description: JSON-RPC dispatcher and stdio transport for the Quint engine.
// Purpose: Expose the tools layer to an external AI agent over stdio.
// Dependencies: quint-core, quint-store-sqlite, serde, serde_json, serde_jcs
// ============================================================================

//! ## Overview
//! Quint MCP is the thin outermost shell: it frames line-delimited JSON-RPC
//! 2.0 requests off stdin, checks per-tool preconditions against the phase
//! state machine and store, dispatches to the tools layer, appends an audit
//! entry, and frames the textual response back onto stdout. It never reads
//! wall-clock time or owns the data model; both come from `quint-core`.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod catalogue;
pub mod dispatcher;
pub mod errors;
pub mod preconditions;
pub mod protocol;
pub mod tools;
pub mod transport;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use catalogue::tool_definitions;
pub use dispatcher::Dispatcher;
pub use errors::DispatchError;
pub use transport::serve_stdio;
