// crates/quint-mcp/src/tools/audit.rs
// ============================================================================
// Module: Quint Tool — audit
// Description: Records a risk audit against a holon without changing layer.
// Purpose: Implement the `quint_audit` tool body.
// Dependencies: quint-core
// ============================================================================

//! ## Overview
//! `audit` appends an `audit_report` evidence item capturing risks observed
//! against a holon. Unlike `verify`/`test`, an audit never changes the
//! holon's layer: it is a standing record, not a promotion gate.

// ============================================================================
// SECTION: Imports
// ============================================================================

use quint_core::EngineError;
use quint_core::Evidence;
use quint_core::EvidenceId;
use quint_core::EvidenceType;
use quint_core::Store;
use quint_core::Timestamp;
use quint_core::Verdict;
use serde_json::Value;
use uuid::Uuid;

use super::common::join_carrier_files;
use super::common::optional_str_list;
use super::common::require_existing_holon;
use super::common::require_str;

// ============================================================================
// SECTION: Tool Body
// ============================================================================

/// Executes the `audit` tool.
///
/// # Errors
///
/// Returns [`EngineError::NotFound`] when `holon_id` does not exist, or
/// [`EngineError::Storage`] on a store failure.
pub fn run<S: Store>(store: &mut S, now: Timestamp, args: &Value) -> Result<String, EngineError> {
    let holon_id = require_existing_holon(store, require_str(args, "hypothesis_id")?)?;
    let risks = require_str(args, "risks")?;
    let carrier_files = optional_str_list(args, "carrier_files")?;

    let verdict = if risks.trim().is_empty() { Verdict::Pass } else { Verdict::Degrade };

    let evidence = Evidence {
        id: EvidenceId::new(Uuid::new_v4().to_string()),
        holon_id: holon_id.clone(),
        evidence_type: EvidenceType::AuditReport,
        body: risks.to_string(),
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

    Ok(format!(
        "Audit recorded for {holon_id}: verdict={verdict:?}. Layer unchanged; risks are a standing \
         record, not a promotion gate."
    ))
}
