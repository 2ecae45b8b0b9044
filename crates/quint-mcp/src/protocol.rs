// crates/quint-mcp/src/protocol.rs
// ============================================================================
// Module: Quint JSON-RPC Protocol
// Description: Line-delimited JSON-RPC 2.0 envelope types.
// Purpose: Define the request/response/tool-call shapes the dispatcher speaks.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Quint speaks a deliberately small slice of JSON-RPC 2.0: `initialize`,
//! `tools/list`, `tools/call`, and the no-op `notifications/initialized`.
//! Unlike a framed LSP-style transport, each request and response is exactly
//! one line of JSON on stdin/stdout; there is no header block to parse.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

// ============================================================================
// SECTION: JSON-RPC Codes
// ============================================================================

/// JSON-RPC reserved error code for a request that is not valid JSON.
pub const PARSE_ERROR_CODE: i64 = -32700;
/// JSON-RPC reserved error code for an unrecognised method name.
pub const METHOD_NOT_FOUND_CODE: i64 = -32601;
/// Error code used for tool-level failures surfaced as JSON-RPC errors.
pub const TOOL_ERROR_CODE: i64 = -32000;

// ============================================================================
// SECTION: Request / Response Envelopes
// ============================================================================

/// An incoming JSON-RPC request (or notification, when `id` is absent).
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    /// JSON-RPC protocol version, expected to be `"2.0"`.
    #[serde(default)]
    pub jsonrpc: String,
    /// Request identifier. Absent for notifications.
    #[serde(default)]
    pub id: Option<Value>,
    /// Method name.
    pub method: String,
    /// Optional parameters payload.
    #[serde(default)]
    pub params: Option<Value>,
}

/// An outgoing JSON-RPC response.
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    /// JSON-RPC protocol version, always `"2.0"`.
    pub jsonrpc: &'static str,
    /// Echoes the request identifier.
    pub id: Value,
    /// Successful result payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error payload when the request fails.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    /// Builds a successful response.
    #[must_use]
    pub fn success(id: Value, result: Value) -> Self {
        Self { jsonrpc: "2.0", id, result: Some(result), error: None }
    }

    /// Builds an error response.
    #[must_use]
    pub fn failure(id: Value, code: i64, message: String) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(JsonRpcError { code, message, data: None }),
        }
    }
}

/// JSON-RPC error payload.
#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    /// Error code.
    pub code: i64,
    /// Human-readable error message.
    pub message: String,
    /// Structured error metadata, when available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

// ============================================================================
// SECTION: Tool Call Shapes
// ============================================================================

/// Parameters for a `tools/call` request.
#[derive(Debug, Deserialize)]
pub struct ToolCallParams {
    /// Tool name, e.g. `"quint_propose"`.
    pub name: String,
    /// Raw JSON arguments, validated by the tool itself.
    #[serde(default)]
    pub arguments: Value,
}

/// Result payload for a `tools/list` request.
#[derive(Debug, Serialize)]
pub struct ToolListResult {
    /// The full tool catalogue.
    pub tools: Vec<ToolDefinition>,
}

/// Result payload for a `tools/call` request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallResult {
    /// Tool output content, always a single textual block.
    pub content: Vec<ToolContent>,
    /// Set when the tool call failed; absent on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

/// A single content block returned by a tool call.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolContent {
    /// Plain text tool output.
    Text {
        /// The textual body.
        text: String,
    },
}

/// A single tool's entry in the `tools/list` catalogue.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// MCP tool name, e.g. `"quint_propose"`.
    pub name: &'static str,
    /// Human-facing description shown to the agent.
    pub description: &'static str,
    /// JSON Schema describing the tool's arguments.
    pub input_schema: Value,
}

/// Result payload for `initialize`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    /// Protocol version this server speaks.
    pub protocol_version: &'static str,
    /// Declared server capabilities.
    pub capabilities: InitializeCapabilities,
    /// Server identity.
    pub server_info: ServerInfo,
}

/// Capability flags returned by `initialize`.
#[derive(Debug, Serialize)]
pub struct InitializeCapabilities {
    /// Tools capability, present and empty (no sub-capabilities advertised).
    pub tools: Value,
}

/// Server name/version returned by `initialize`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerInfo {
    /// Server name.
    pub name: &'static str,
    /// Server version.
    pub version: &'static str,
}
