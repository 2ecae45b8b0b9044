// crates/quint-mcp/src/tools/resolve.rs
// ============================================================================
// Module: Quint Tool — resolve
// Description: Closes out a DRR as implemented, abandoned, or superseded.
// Purpose: Implement the `quint_resolve` tool body.
// Dependencies: quint-core
// ============================================================================

//! ## Overview
//! `resolve` is the only tool that appends `implementation`/`abandonment`/
//! `supersession` evidence. It enforces per-resolution required fields and,
//! when the DRR carries acceptance criteria and `resolution=implemented`,
//! requires `criteria_verified=true`. A DRR already carrying one of these
//! three evidence types is terminal: a second `resolve` call is rejected so
//! the store never ends up with two competing resolutions for the same
//! decision.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write as _;

use quint_core::CongruenceLevel;
use quint_core::ContextId;
use quint_core::EngineError;
use quint_core::Evidence;
use quint_core::EvidenceId;
use quint_core::EvidenceType;
use quint_core::HolonId;
use quint_core::Relation;
use quint_core::RelationType;
use quint_core::Store;
use quint_core::Timestamp;
use quint_core::Verdict;
use serde_json::Value;
use uuid::Uuid;

use super::common::optional_bool;
use super::common::optional_str;
use super::common::resolve_drr_id;
use super::common::resolution_status;
use super::common::require_str;

// ============================================================================
// SECTION: Tool Body
// ============================================================================

/// Executes the `resolve` tool.
///
/// # Errors
///
/// Returns [`EngineError::NotFound`] when `decision_id` does not resolve to a
/// DRR, [`EngineError::InvalidArgument`] on a missing per-resolution field or
/// unrecognised `resolution`, [`EngineError::PreconditionBlocked`] when the
/// DRR is already resolved or unmet acceptance criteria block an
/// `implemented` resolution, or [`EngineError::Storage`] on a store failure.
pub fn run<S: Store>(
    store: &mut S,
    context_id: &ContextId,
    now: Timestamp,
    args: &Value,
) -> Result<String, EngineError> {
    let decision_id = resolve_drr_id(store, context_id, require_str(args, "decision_id")?)?;
    let resolution = require_str(args, "resolution")?;
    let reference = optional_str(args, "reference");
    let superseded_by = optional_str(args, "superseded_by");
    let notes = optional_str(args, "notes");
    let criteria_verified = optional_bool(args, "criteria_verified");

    let drr = store
        .get_holon(&decision_id)?
        .ok_or_else(|| EngineError::NotFound(format!("holon not found: {decision_id}")))?;

    let status = resolution_status(store, &drr)?;
    if status != "open" {
        return Err(EngineError::PreconditionBlocked(format!(
            "{decision_id} is already resolved (status={status})"
        )));
    }

    let (evidence_type, body) = match resolution {
        "implemented" => {
            let reference = reference.ok_or_else(|| {
                EngineError::InvalidArgument("resolution=implemented requires reference".to_string())
            })?;
            if !drr.contract.acceptance_criteria.is_empty() && !criteria_verified {
                let mut message =
                    "acceptance criteria must be verified before resolving as implemented:\n".to_string();
                for criterion in &drr.contract.acceptance_criteria {
                    let _ = writeln!(message, "  - {criterion}");
                }
                return Err(EngineError::PreconditionBlocked(message));
            }
            (EvidenceType::Implementation, format!("Implemented: {reference}"))
        }
        "abandoned" => {
            let notes = notes.ok_or_else(|| {
                EngineError::InvalidArgument("resolution=abandoned requires notes".to_string())
            })?;
            (EvidenceType::Abandonment, format!("Abandoned: {notes}"))
        }
        "superseded" => {
            let superseded_by = superseded_by.ok_or_else(|| {
                EngineError::InvalidArgument("resolution=superseded requires superseded_by".to_string())
            })?;
            (EvidenceType::Supersession, format!("Superseded by: {superseded_by}"))
        }
        other => {
            return Err(EngineError::InvalidArgument(format!(
                "resolution must be implemented, abandoned, or superseded, got: {other}"
            )));
        }
    };

    let evidence = Evidence {
        id: EvidenceId::new(Uuid::new_v4().to_string()),
        holon_id: decision_id.clone(),
        evidence_type,
        body,
        verdict: Verdict::Pass,
        assurance_level: None,
        carrier_ref: reference.map(str::to_string),
        carrier_hash: None,
        carrier_commit: None,
        stale: None,
        valid_until: None,
        created_at: now,
    };
    store.add_evidence(&evidence)?;

    if resolution == "superseded" {
        if let Some(superseded_by) = superseded_by {
            let new_drr_id = HolonId::new(superseded_by);
            store.create_relation(&Relation {
                source_id: decision_id.clone(),
                target_id: new_drr_id,
                relation_type: RelationType::SupersededBy,
                congruence_level: CongruenceLevel::Cl3,
                created_at: now,
            })?;
        }
    }

    Ok(format!("Resolved {decision_id} as {resolution}."))
}
