// crates/quint-mcp/src/tools/decide.rs
// ============================================================================
// Module: Quint Tool — decide
// Description: Finalises a decision between competing holons into a DRR.
// Purpose: Implement the `quint_decide` tool body.
// Dependencies: quint-core
// ============================================================================

//! ## Overview
//! `decide` is the only tool that creates a `DRR`-layer holon. It binds the
//! DRR to its winner via a `selects` edge and to every alternative via a
//! `rejects` edge, promotes the winner to L2, and stores the caller's
//! structured `contract` for later inheritance by `implement`. Unlike
//! `propose`/`verify`/`test`/`audit`, it writes the phase back to `IDLE`
//! directly rather than through the dispatcher's generic transition, since
//! finalising a decision ends the cycle rather than advancing it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write as _;

use quint_core::Characteristic;
use quint_core::CongruenceLevel;
use quint_core::ContextId;
use quint_core::EngineError;
use quint_core::FpfState;
use quint_core::Holon;
use quint_core::HolonId;
use quint_core::HolonType;
use quint_core::Layer;
use quint_core::Phase;
use quint_core::Relation;
use quint_core::RelationType;
use quint_core::Store;
use quint_core::Timestamp;
use quint_core::resolve_unique_slug;
use quint_core::slugify;
use serde_json::Value;

use super::common::optional_str;
use super::common::optional_str_list;
use super::common::parse_characteristics;
use super::common::parse_contract;
use super::common::require_existing_holon;
use super::common::require_str;

// ============================================================================
// SECTION: Tool Body
// ============================================================================

/// Executes the `decide` tool.
///
/// # Errors
///
/// Returns [`EngineError::NotFound`] when `winner_id` does not exist, or
/// [`EngineError::Storage`] on a store failure.
pub fn run<S: Store>(
    store: &mut S,
    context_id: &ContextId,
    now: Timestamp,
    args: &Value,
) -> Result<String, EngineError> {
    let title = require_str(args, "title")?;
    let winner_id = require_existing_holon(store, require_str(args, "winner_id")?)?;
    let rejected_ids = optional_str_list(args, "rejected_ids")?;
    let context_note = optional_str(args, "context").unwrap_or_default();
    let decision = require_str(args, "decision")?;
    let rationale = require_str(args, "rationale")?;
    let consequences = require_str(args, "consequences")?;
    let contract = parse_contract(args.get("contract"))?;
    let characteristics = parse_characteristics(args.get("characteristics"))?;

    let winner = store
        .get_holon(&winner_id)?
        .ok_or_else(|| EngineError::NotFound(format!("holon not found: {winner_id}")))?;

    let date = now.to_iso_date();
    let slug = slugify(title);
    let base_id = format!("DRR-{date}-{slug}");
    let existing: std::collections::HashSet<String> =
        store.list_holon_ids(context_id)?.into_iter().map(|id| id.to_string()).collect();
    let id = resolve_unique_slug(&base_id, |candidate| existing.contains(candidate));
    let drr_id = HolonId::new(id.clone());

    let body = format!(
        "Decision: {decision}\n\nRationale: {rationale}\n\nConsequences: {consequences}\n\nContext: \
         {context_note}"
    );
    let drr = Holon {
        id: drr_id.clone(),
        holon_type: HolonType::Drr,
        kind: winner.kind,
        layer: Layer::Drr,
        title: title.to_string(),
        body,
        context_id: context_id.clone(),
        claim_scope: context_note.to_string(),
        parent_id: None,
        cached_r_score: 0.0,
        reverification: None,
        contract,
        created_at: now,
        updated_at: now,
    };
    store.create_holon(&drr)?;

    store.create_relation(&Relation {
        source_id: drr_id.clone(),
        target_id: winner_id.clone(),
        relation_type: RelationType::Selects,
        congruence_level: CongruenceLevel::Cl3,
        created_at: now,
    })?;

    let mut warnings = Vec::new();
    for rejected_raw in &rejected_ids {
        let rejected_id = HolonId::new(rejected_raw.as_str());
        if store.get_holon(&rejected_id)?.is_none() {
            warnings.push(format!("skipped rejected_id {rejected_raw}: target does not exist"));
            continue;
        }
        store.create_relation(&Relation {
            source_id: drr_id.clone(),
            target_id: rejected_id,
            relation_type: RelationType::Rejects,
            congruence_level: CongruenceLevel::Cl3,
            created_at: now,
        })?;
    }

    if winner.layer < Layer::L2 {
        store.update_holon_layer(&winner_id, Layer::L2, now)?;
    }

    for input in characteristics {
        store.add_characteristic(&Characteristic {
            holon_id: drr_id.clone(),
            name: input.name,
            scale: input.scale,
            value: input.value,
            unit: input.unit,
        })?;
    }

    let mut state = store.get_fpf_state(context_id)?.unwrap_or_else(|| FpfState::new(context_id.clone(), now));
    state.active_phase = Phase::Idle;
    state.updated_at = now;
    store.put_fpf_state(&state)?;

    let mut output = format!("Decided {id}: selects {winner_id}, rejects {} alternative(s).\n", rejected_ids.len());
    for warning in &warnings {
        let _ = writeln!(output, "WARNING: {warning}");
    }
    output.push_str("Phase reset to IDLE.");
    Ok(output)
}
