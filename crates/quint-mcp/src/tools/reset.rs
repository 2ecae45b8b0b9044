// crates/quint-mcp/src/tools/reset.rs
// ============================================================================
// Module: Quint Tool — reset
// Description: Clears the active phase to IDLE without touching the graph.
// Purpose: Implement the `quint_reset` tool body.
// Dependencies: quint-core
// ============================================================================

//! ## Overview
//! `reset` touches only `FpfState`: it never creates a DRR, never appends
//! evidence, and never mutates a holon. Its audit-log operation name is
//! `cycle_reset` rather than `reset`, set by the dispatcher.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write as _;

use quint_core::ContextId;
use quint_core::EngineError;
use quint_core::FpfState;
use quint_core::HolonType;
use quint_core::Layer;
use quint_core::Phase;
use quint_core::Store;
use quint_core::Timestamp;
use serde_json::Value;

use super::common::optional_str;
use super::common::resolution_status;

// ============================================================================
// SECTION: Tool Body
// ============================================================================

/// Executes the `reset` tool.
///
/// # Errors
///
/// Returns [`EngineError::Storage`] on a store failure.
pub fn run<S: Store>(store: &mut S, context_id: &ContextId, now: Timestamp, args: &Value) -> Result<String, EngineError> {
    let reason = optional_str(args, "reason").unwrap_or("user requested reset");

    let mut state = store.get_fpf_state(context_id)?.unwrap_or_else(|| FpfState::new(context_id.clone(), now));
    let previous_phase = state.active_phase;
    state.active_phase = Phase::Idle;
    state.updated_at = now;
    store.put_fpf_state(&state)?;

    let counts = store.count_by_layer(context_id, true)?;
    let mut open_decisions = 0u64;
    for id in store.list_holon_ids(context_id)? {
        let Some(holon) = store.get_holon(&id)? else {
            continue;
        };
        if holon.holon_type == HolonType::Drr && resolution_status(store, &holon)? == "open" {
            open_decisions += 1;
        }
    }

    let mut output = format!("Cycle reset (reason: {reason}).\nPrevious phase: {previous_phase:?}\n");
    output.push_str("Layer counts (active):\n");
    for layer in [Layer::L0, Layer::L1, Layer::L2, Layer::Drr] {
        let count = counts.get(&layer).copied().unwrap_or(0);
        let _ = writeln!(output, "  {}: {count}", layer.as_str());
    }
    let _ = write!(output, "Open decisions: {open_decisions}");
    Ok(output)
}
