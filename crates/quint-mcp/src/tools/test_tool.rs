// crates/quint-mcp/src/tools/test_tool.rs
// ============================================================================
// Module: Quint Tool — test
// Description: Empirically tests a hypothesis and promotes or invalidates it.
// Purpose: Implement the `quint_test` tool body.
// Dependencies: quint-core
// ============================================================================

//! ## Overview
//! `test` appends a `test_result` evidence item with a validity window keyed
//! to whether the test was run internally (90 days) or externally
//! (60 days). A PASS verdict promotes the holon to L2 and clears staleness;
//! FAIL/REFINE invalidates the holon while deliberately preserving any
//! existing staleness flags, since an empirical failure does not resolve a
//! carrier-change concern raised earlier.

// ============================================================================
// SECTION: Imports
// ============================================================================

use quint_core::DAY_MILLIS;
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

/// Executes the `test` tool.
///
/// # Errors
///
/// Returns [`EngineError::InvalidArgument`] when `test_type` is not
/// `internal`/`external`, [`EngineError::NotFound`] when `hypothesis_id`
/// does not exist, or [`EngineError::Storage`] on a store failure.
pub fn run<S: Store>(store: &mut S, now: Timestamp, args: &Value) -> Result<String, EngineError> {
    let hypothesis_id = require_existing_holon(store, require_str(args, "hypothesis_id")?)?;
    let test_type = require_str(args, "test_type")?;
    let result = require_str(args, "result")?;
    let verdict = require_verdict(args)?;
    let carrier_files = optional_str_list(args, "carrier_files")?;

    let validity_days = match test_type {
        "internal" => 90,
        "external" => 60,
        other => {
            return Err(EngineError::InvalidArgument(format!(
                "test_type must be internal or external, got: {other}"
            )));
        }
    };
    let valid_until = Timestamp::from_unix_millis(now.as_unix_millis() + validity_days * DAY_MILLIS);
    let assurance_level = if matches!(verdict, Verdict::Pass) { "L2" } else { "L1" };

    let evidence = Evidence {
        id: EvidenceId::new(Uuid::new_v4().to_string()),
        holon_id: hypothesis_id.clone(),
        evidence_type: EvidenceType::TestResult,
        body: result.to_string(),
        verdict,
        assurance_level: Some(assurance_level.to_string()),
        carrier_ref: join_carrier_files(&carrier_files),
        carrier_hash: None,
        carrier_commit: None,
        stale: None,
        valid_until: Some(valid_until),
        created_at: now,
    };
    store.add_evidence(&evidence)?;

    let outcome = match verdict {
        Verdict::Pass => {
            store.update_holon_layer(&hypothesis_id, Layer::L2, now)?;
            store.clear_stale_for_holon(&hypothesis_id)?;
            "promoted to L2"
        }
        Verdict::Fail | Verdict::Refine => {
            store.update_holon_layer(&hypothesis_id, Layer::Invalid, now)?;
            "moved to invalid (staleness preserved)"
        }
        Verdict::Degrade => "layer unchanged (degrade)",
    };

    Ok(format!(
        "Test recorded for {hypothesis_id}: type={test_type}, verdict={verdict:?}, {outcome}, \
         valid until {}.",
        valid_until.to_iso_date()
    ))
}
