// crates/quint-mcp/src/tools/verify.rs
// ============================================================================
// Module: Quint Tool — verify
// Description: Logic-checks a hypothesis and promotes or invalidates it.
// Purpose: Implement the `quint_verify` tool body.
// Dependencies: quint-core
// ============================================================================

//! ## Overview
//! `verify` appends a `logic_check` evidence item and moves the hypothesis
//! from L0 to L1 on a PASS verdict, or to `invalid` on FAIL/REFINE. A PASS
//! also clears staleness on every other evidence item already attached to
//! the holon, since a fresh logic check supersedes prior concerns about the
//! holon's carriers.

// ============================================================================
// SECTION: Imports
// ============================================================================

use quint_core::EngineError;
use quint_core::Evidence;
use quint_core::EvidenceId;
use quint_core::EvidenceType;
use quint_core::Layer;
use quint_core::Store;
use quint_core::Timestamp;
use quint_core::Verdict;
use serde_json::Value;
use uuid::Uuid;

use super::common::join_carrier_files;
use super::common::optional_str_list;
use super::common::require_existing_holon;
use super::common::require_str;
use super::common::require_verdict;

// ============================================================================
// SECTION: Tool Body
// ============================================================================

/// Executes the `verify` tool.
///
/// # Errors
///
/// Returns [`EngineError::NotFound`] when `hypothesis_id` does not exist, or
/// [`EngineError::Storage`] on a store failure.
pub fn run<S: Store>(store: &mut S, now: Timestamp, args: &Value) -> Result<String, EngineError> {
    let hypothesis_id = require_existing_holon(store, require_str(args, "hypothesis_id")?)?;
    let checks = require_str(args, "checks_json")?;
    let verdict = require_verdict(args)?;
    let carrier_files = optional_str_list(args, "carrier_files")?;

    let evidence = Evidence {
        id: EvidenceId::new(Uuid::new_v4().to_string()),
        holon_id: hypothesis_id.clone(),
        evidence_type: EvidenceType::LogicCheck,
        body: checks.to_string(),
        verdict,
        assurance_level: None,
        carrier_ref: join_carrier_files(&carrier_files),
        carrier_hash: None,
        carrier_commit: None,
        stale: None,
        valid_until: None,
        created_at: now,
    };
    store.add_evidence(&evidence)?;

    let outcome = match verdict {
        Verdict::Pass => {
            store.update_holon_layer(&hypothesis_id, Layer::L1, now)?;
            store.clear_stale_for_holon(&hypothesis_id)?;
            "promoted to L1"
        }
        Verdict::Fail | Verdict::Refine => {
            store.update_holon_layer(&hypothesis_id, Layer::Invalid, now)?;
            "moved to invalid"
        }
        Verdict::Degrade => "layer unchanged (degrade)",
    };

    Ok(format!("Logic check recorded for {hypothesis_id}: verdict={verdict:?}, {outcome}."))
}
