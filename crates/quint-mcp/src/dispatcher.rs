// crates/quint-mcp/src/dispatcher.rs
// ============================================================================
// Module: Quint Dispatcher
// Description: Routes JSON-RPC requests to tool bodies, enforcing
//              preconditions and appending audit entries.
// Purpose: The single place that owns the parse → precondition → execute →
//          audit → respond pipeline described by the protocol.
// Dependencies: quint-core, quint-store-sqlite, serde_json
// ============================================================================

//! ## Overview
//! `Dispatcher` is the only piece of Quint that knows about wall-clock time
//! (via an injected clock closure, defaulting to the system clock) and about
//! the mapping from MCP method names (`"quint_propose"`) to tool bodies
//! (`tools::propose::run`). Everything else — the FSM transition table, the
//! precondition rules, the tool bodies themselves — is pure with respect to
//! time and is exercised here only through their public signatures.

// ============================================================================
// SECTION: Imports
// ============================================================================

use quint_core::AuditId;
use quint_core::AuditLogEntry;
use quint_core::AuditResult;
use quint_core::ContextId;
use quint_core::EngineError;
use quint_core::Store;
use quint_core::Timestamp;
use quint_core::fsm;
use quint_core::hash_canonical_json;
use serde_json::Value;
use uuid::Uuid;

use crate::catalogue::tool_definitions;
use crate::preconditions;
use crate::protocol::InitializeCapabilities;
use crate::protocol::InitializeResult;
use crate::protocol::JsonRpcRequest;
use crate::protocol::JsonRpcResponse;
use crate::protocol::METHOD_NOT_FOUND_CODE;
use crate::protocol::PARSE_ERROR_CODE;
use crate::protocol::ServerInfo;
use crate::protocol::ToolCallParams;
use crate::protocol::ToolCallResult;
use crate::protocol::ToolContent;
use crate::protocol::ToolListResult;
use crate::tools;

// ============================================================================
// SECTION: Dispatcher
// ============================================================================

/// Tools whose phase transition the dispatcher applies generically via
/// [`fsm::next_phase`]. `decide`, `reset`, and `internalize` write their own
/// `FpfState` and are excluded.
const GENERIC_TRANSITION_TOOLS: &[&str] = &["propose", "verify", "test", "audit"];

/// Routes requests for a single store and context, tracking no state of its
/// own beyond the clock and the store it owns.
pub struct Dispatcher<S: Store> {
    /// The backing store this dispatcher mutates.
    store: S,
    /// The single context this dispatcher serves.
    context_id: ContextId,
    /// Supplies "now" for every tool call and audit entry.
    clock: Box<dyn Fn() -> Timestamp>,
}

impl<S: Store> Dispatcher<S> {
    /// Builds a dispatcher using the system wall clock.
    #[must_use]
    pub fn new(store: S, context_id: ContextId) -> Self {
        Self::new_with_clock(store, context_id, system_now)
    }

    /// Builds a dispatcher with an injected clock, for deterministic tests.
    #[must_use]
    pub fn new_with_clock(store: S, context_id: ContextId, clock: impl Fn() -> Timestamp + 'static) -> Self {
        Self { store, context_id, clock: Box::new(clock) }
    }

    /// Returns the current time according to this dispatcher's clock.
    fn now(&self) -> Timestamp {
        (self.clock)()
    }

    /// Handles one line of JSON-RPC input, returning the response line to
    /// write back, or `None` for notifications (requests with no `id`) that
    /// produce no reply.
    pub fn handle_line(&mut self, line: &str) -> Option<JsonRpcResponse> {
        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(request) => request,
            Err(err) => return Some(JsonRpcResponse::failure(Value::Null, PARSE_ERROR_CODE, err.to_string())),
        };
        let id = request.id;
        match request.method.as_str() {
            "notifications/initialized" => None,
            "initialize" => Some(JsonRpcResponse::success(
                id.unwrap_or(Value::Null),
                initialize_result_value(),
            )),
            "tools/list" => Some(JsonRpcResponse::success(id.unwrap_or(Value::Null), tools_list_value())),
            "tools/call" => self.handle_tools_call(id, request.params),
            other => id.map(|id| {
                JsonRpcResponse::failure(id, METHOD_NOT_FOUND_CODE, format!("method not found: {other}"))
            }),
        }
    }

    /// Handles a `tools/call` request end to end: precondition check,
    /// execution, audit append, and response framing.
    fn handle_tools_call(&mut self, id: Option<Value>, params: Option<Value>) -> Option<JsonRpcResponse> {
        let Some(params) = params else {
            return id.map(|id| JsonRpcResponse::failure(id, PARSE_ERROR_CODE, "missing params".to_string()));
        };
        let call: ToolCallParams = match serde_json::from_value(params) {
            Ok(call) => call,
            Err(err) => return id.map(|id| JsonRpcResponse::failure(id, PARSE_ERROR_CODE, err.to_string())),
        };
        let Some(tool) = call.name.strip_prefix("quint_") else {
            return id.map(|id| {
                JsonRpcResponse::failure(id, METHOD_NOT_FOUND_CODE, format!("unknown tool: {}", call.name))
            });
        };

        let input_hash = hash_canonical_json(&call.arguments).unwrap_or_default();
        let target_id = target_id_from_args(tool, &call.arguments);

        if let Err(err) = preconditions::check(&self.store, &self.context_id, tool, &call.arguments) {
            self.record_audit(&call.name, tool, &target_id, &input_hash, AuditResult::Blocked, err.to_string());
            return id.map(|id| JsonRpcResponse::success(id, tool_result_value(err.to_string(), true)));
        }

        match self.execute_tool(tool, &call.arguments) {
            Ok(text) => {
                if GENERIC_TRANSITION_TOOLS.contains(&tool) {
                    self.advance_phase(tool);
                }
                self.record_audit(&call.name, tool, &target_id, &input_hash, AuditResult::Success, text.clone());
                id.map(|id| JsonRpcResponse::success(id, tool_result_value(text, false)))
            }
            Err(err) => {
                self.record_audit(&call.name, tool, &target_id, &input_hash, AuditResult::Error, err.to_string());
                id.map(|id| JsonRpcResponse::success(id, tool_result_value(err.to_string(), true)))
            }
        }
    }

    /// Runs the tool body named `tool` (the method name with its `quint_`
    /// prefix stripped) against this dispatcher's store and clock.
    fn execute_tool(&mut self, tool: &str, args: &Value) -> Result<String, EngineError> {
        let now = self.now();
        match tool {
            "internalize" => tools::internalize::run(&mut self.store, &self.context_id, now, args),
            "propose" => tools::propose::run(&mut self.store, &self.context_id, now, args),
            "verify" => tools::verify::run(&mut self.store, now, args),
            "test" => tools::test_tool::run(&mut self.store, now, args),
            "audit" => tools::audit::run(&mut self.store, now, args),
            "decide" => tools::decide::run(&mut self.store, &self.context_id, now, args),
            "resolve" => tools::resolve::run(&mut self.store, &self.context_id, now, args),
            "implement" => tools::implement::run(&self.store, &self.context_id, args),
            "link" => tools::link::run(&mut self.store, now, args),
            "search" => tools::search::run(&self.store, &self.context_id, args),
            "calculate_r" => tools::calculate::run_calculate_r(&self.store, now, args),
            "audit_tree" => tools::calculate::run_audit_tree(&self.store, now, args),
            "reset" => tools::reset::run(&mut self.store, &self.context_id, now, args),
            other => Err(EngineError::InvalidArgument(format!("unknown tool: {other}"))),
        }
    }

    /// Applies the generic FSM transition for a tool that does not manage
    /// its own `FpfState` (see [`GENERIC_TRANSITION_TOOLS`]).
    fn advance_phase(&mut self, tool: &str) {
        let now = self.now();
        let Ok(existing) = self.store.get_fpf_state(&self.context_id) else {
            return;
        };
        let mut state =
            existing.unwrap_or_else(|| quint_core::FpfState::new(self.context_id.clone(), now));
        state.active_phase = fsm::next_phase(tool, state.active_phase, false);
        state.updated_at = now;
        let _ = self.store.put_fpf_state(&state);
    }

    /// Appends one audit log entry. Failures to write the audit entry itself
    /// are swallowed rather than surfaced to the caller, since the tool call
    /// they describe has already committed (or been blocked).
    fn record_audit(
        &mut self,
        tool_name: &str,
        bare_tool: &str,
        target_id: &Option<String>,
        input_hash: &str,
        result: AuditResult,
        details: String,
    ) {
        let entry = AuditLogEntry {
            id: AuditId::new(Uuid::new_v4().to_string()),
            at: self.now(),
            tool: tool_name.to_string(),
            operation: operation_name(bare_tool).to_string(),
            actor: None,
            target_id: target_id.clone(),
            input_hash: input_hash.to_string(),
            result,
            details,
            context_id: self.context_id.clone(),
        };
        let _ = self.store.append_audit(&entry);
    }
}

// ============================================================================
// SECTION: Response Payload Helpers
// ============================================================================

/// Builds the `initialize` result payload.
fn initialize_result_value() -> Value {
    let result = InitializeResult {
        protocol_version: "2024-11-05",
        capabilities: InitializeCapabilities { tools: serde_json::json!({}) },
        server_info: ServerInfo { name: "quint", version: env!("CARGO_PKG_VERSION") },
    };
    serde_json::to_value(result).unwrap_or(Value::Null)
}

/// Builds the `tools/list` result payload.
fn tools_list_value() -> Value {
    let result = ToolListResult { tools: tool_definitions() };
    serde_json::to_value(result).unwrap_or(Value::Null)
}

/// Builds a `tools/call` result payload wrapping a single text content item.
fn tool_result_value(text: String, is_error: bool) -> Value {
    let result = ToolCallResult {
        content: vec![ToolContent::Text { text }],
        is_error: is_error.then_some(true),
    };
    serde_json::to_value(result).unwrap_or(Value::Null)
}

/// Returns the system wall clock as a [`Timestamp`], truncated to
/// milliseconds.
fn system_now() -> Timestamp {
    let seconds = time::OffsetDateTime::now_utc().unix_timestamp();
    Timestamp::from_unix_millis(seconds.saturating_mul(1000))
}

/// Maps a bare tool name to its audit log `operation` name. Only `reset`
/// diverges from its tool name.
fn operation_name(tool: &str) -> &str {
    if tool == "reset" { "cycle_reset" } else { tool }
}

/// Extracts the primary holon identifier a tool call targets, for the audit
/// log's `target_id` column. Tools that create a brand new holon (`propose`,
/// `decide`) have no pre-existing target and return `None`.
fn target_id_from_args(tool: &str, args: &Value) -> Option<String> {
    let field = match tool {
        "verify" | "test" | "audit" => "hypothesis_id",
        "resolve" | "implement" => "decision_id",
        "link" => "source_id",
        "calculate_r" | "audit_tree" => "holon_id",
        _ => return None,
    };
    args.get(field).and_then(Value::as_str).map(str::to_string)
}
