// crates/quint-mcp/src/tools/link.rs
// ============================================================================
// Module: Quint Tool — link
// Description: Adds a dependency edge between two existing holons.
// Purpose: Implement the `quint_link` tool body.
// Dependencies: quint-core
// ============================================================================

//! ## Overview
//! `link` is the explicit counterpart to `propose`'s auto-wired
//! dependencies: it adds exactly one `componentOf`/`constituentOf` edge, and
//! unlike `propose` it surfaces a missing target or a would-be cycle as a
//! tool-level error rather than a skipped warning, since the caller asked
//! for this specific edge.

// ============================================================================
// SECTION: Imports
// ============================================================================

use quint_core::EngineError;
use quint_core::HolonKind;
use quint_core::Relation;
use quint_core::RelationType;
use quint_core::Store;
use quint_core::Timestamp;
use quint_core::would_create_cycle;
use serde_json::Value;

use super::common::optional_congruence_level;
use super::common::require_existing_holon;
use super::common::require_str;

// ============================================================================
// SECTION: Tool Body
// ============================================================================

/// Executes the `link` tool.
///
/// # Errors
///
/// Returns [`EngineError::NotFound`] when either holon is missing,
/// [`EngineError::IntegrityViolation`] when the edge would create a cycle or
/// already exists, or [`EngineError::Storage`] on a store failure.
pub fn run<S: Store>(store: &mut S, now: Timestamp, args: &Value) -> Result<String, EngineError> {
    let source_id = require_existing_holon(store, require_str(args, "source_id")?)?;
    let target_id = require_existing_holon(store, require_str(args, "target_id")?)?;
    let congruence_level = optional_congruence_level(args, "congruence_level")?;

    let source = store
        .get_holon(&source_id)?
        .ok_or_else(|| EngineError::NotFound(format!("holon not found: {source_id}")))?;

    if would_create_cycle(&*store, &source_id, &target_id)? {
        return Err(EngineError::IntegrityViolation(format!(
            "linking {source_id} -> {target_id} would create a dependency cycle"
        )));
    }

    let relation_type =
        if matches!(source.kind, HolonKind::System) { RelationType::ComponentOf } else { RelationType::ConstituentOf };
    let inserted = store.create_relation(&Relation {
        source_id: source_id.clone(),
        target_id: target_id.clone(),
        relation_type,
        congruence_level,
        created_at: now,
    })?;
    if !inserted {
        return Err(EngineError::IntegrityViolation(format!(
            "edge {source_id} -> {target_id} already exists"
        )));
    }

    Ok(format!(
        "Linked {source_id} -> {target_id} ({relation_type:?}, CL{}). WLNK advisory: {target_id}'s R_eff now \
         caps {source_id}'s score at CL penalty {:.1} x min(self, dependency) <= 1.0.",
        congruence_level.as_u8(),
        congruence_level.penalty()
    ))
}
