// crates/quint-mcp/src/preconditions.rs
// ============================================================================
// Module: Quint Preconditions
// Description: Per-tool precondition checks run before a tool body executes.
// Purpose: Enforce phase/data prerequisites and surface a BLOCKED audit entry.
// Dependencies: quint-core
// ============================================================================

//! ## Overview
//! A precondition failure is distinct from a tool-body error: it is checked
//! against an FSM+store snapshot before any mutation, and on failure the
//! dispatcher records a `BLOCKED` audit entry rather than `ERROR`. Most
//! tools have no precondition beyond "referenced holon exists" (already
//! enforced by the tool body itself via `NotFound`); only the five named in
//! the phase design have one here.

// ============================================================================
// SECTION: Imports
// ============================================================================

use quint_core::ContextId;
use quint_core::EngineError;
use quint_core::HolonId;
use quint_core::HolonType;
use quint_core::Layer;
use quint_core::Store;
use serde_json::Value;

use crate::tools::common::resolve_drr_id;

// ============================================================================
// SECTION: Precondition Checks
// ============================================================================

/// Checks the precondition for `tool`, returning `Err(EngineError::PreconditionBlocked)`
/// with a human-readable message when it fails.
///
/// # Errors
///
/// Returns [`EngineError::PreconditionBlocked`] when the precondition fails,
/// or [`EngineError::Storage`] on a store failure while checking it.
pub fn check<S: Store>(store: &S, context_id: &ContextId, tool: &str, args: &Value) -> Result<(), EngineError> {
    match tool {
        "verify" => require_layer_present(store, context_id, Layer::L0, "no L0 hypotheses to verify"),
        "test" => require_layer_present(store, context_id, Layer::L1, "no L1 hypotheses to test"),
        "decide" => require_winner_eligible(store, args),
        "resolve" => require_drr_target(store, context_id, args, "decision_id"),
        "implement" => require_drr_with_contract(store, context_id, args),
        _ => Ok(()),
    }
}

/// Blocks unless at least one holon in `context_id` sits at `layer`.
fn require_layer_present<S: Store>(
    store: &S,
    context_id: &ContextId,
    layer: Layer,
    message: &str,
) -> Result<(), EngineError> {
    for id in store.list_holon_ids(context_id)? {
        if let Some(holon) = store.get_holon(&id)?
            && holon.layer == layer
        {
            return Ok(());
        }
    }
    Err(EngineError::PreconditionBlocked(message.to_string()))
}

/// Blocks unless `winner_id` references an existing L1 or L2 holon.
fn require_winner_eligible<S: Store>(store: &S, args: &Value) -> Result<(), EngineError> {
    let Some(winner_id) = args.get("winner_id").and_then(Value::as_str) else {
        return Err(EngineError::InvalidArgument("missing required field: winner_id".to_string()));
    };
    let id = HolonId::new(winner_id);
    let holon = store
        .get_holon(&id)?
        .ok_or_else(|| EngineError::NotFound(format!("holon not found: {winner_id}")))?;
    if matches!(holon.layer, Layer::L1 | Layer::L2) {
        Ok(())
    } else {
        Err(EngineError::PreconditionBlocked(format!(
            "winner_id {winner_id} must reference an L1 or L2 holon, found {:?}",
            holon.layer
        )))
    }
}

/// Blocks unless `field` references an existing DRR holon, resolved either
/// literally or via the dated/slug suffix form.
fn require_drr_target<S: Store>(
    store: &S,
    context_id: &ContextId,
    args: &Value,
    field: &str,
) -> Result<(), EngineError> {
    let Some(raw) = args.get(field).and_then(Value::as_str) else {
        return Err(EngineError::InvalidArgument(format!("missing required field: {field}")));
    };
    let id = resolve_drr_id(store, context_id, raw)?;
    let holon = store
        .get_holon(&id)?
        .ok_or_else(|| EngineError::NotFound(format!("holon not found: {raw}")))?;
    if holon.holon_type == HolonType::Drr {
        Ok(())
    } else {
        Err(EngineError::PreconditionBlocked(format!("{raw} is not a DRR")))
    }
}

/// Blocks unless `decision_id` references an existing DRR holon with a
/// non-empty contract.
fn require_drr_with_contract<S: Store>(
    store: &S,
    context_id: &ContextId,
    args: &Value,
) -> Result<(), EngineError> {
    let Some(raw) = args.get("decision_id").and_then(Value::as_str) else {
        return Err(EngineError::InvalidArgument("missing required field: decision_id".to_string()));
    };
    let id = resolve_drr_id(store, context_id, raw)?;
    let holon = store
        .get_holon(&id)?
        .ok_or_else(|| EngineError::NotFound(format!("holon not found: {raw}")))?;
    if holon.holon_type != HolonType::Drr {
        return Err(EngineError::PreconditionBlocked(format!("{raw} is not a DRR")));
    }
    if holon.contract.is_empty() {
        return Err(EngineError::PreconditionBlocked(format!("{raw} has no contract to implement")));
    }
    Ok(())
}
