// crates/quint-mcp/src/tools/internalize.rs
// ============================================================================
// Module: Quint Tool — internalize
// Description: Idempotent session-entry point and status report.
// Purpose: Implement the `quint_internalize` tool body.
// Dependencies: quint-core
// ============================================================================

//! ## Overview
//! `internalize` is the only tool a fresh context's first call is routed
//! through unconditionally: it transitions `IDLE` to `ABDUCTION` on the
//! first call for a context and reports `INITIALIZED`; subsequent calls
//! leave the phase untouched and report `READY`, or `UPDATED` when the
//! caller's `commit` argument differs from the stored `last_commit`. It
//! writes its own `FpfState` rather than going through the dispatcher's
//! generic transition, since first-call detection requires reading the
//! state before deciding what the new phase should be.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write as _;

use quint_core::ContextId;
use quint_core::EngineError;
use quint_core::EvidenceType;
use quint_core::FpfState;
use quint_core::HolonType;
use quint_core::Layer;
use quint_core::Phase;
use quint_core::Store;
use quint_core::Timestamp;
use serde_json::Value;
use uuid::Uuid;

use super::common::optional_str;
use super::common::resolution_status;

// ============================================================================
// SECTION: Tool Body
// ============================================================================

/// Executes the `internalize` tool.
///
/// # Errors
///
/// Returns [`EngineError::Storage`] on a store failure.
pub fn run<S: Store>(store: &mut S, context_id: &ContextId, now: Timestamp, args: &Value) -> Result<String, EngineError> {
    let commit = optional_str(args, "commit");

    let existing = store.get_fpf_state(context_id)?;
    let (status, mut state) = match existing {
        None => {
            let mut state = FpfState::new(context_id.clone(), now);
            state.active_phase = Phase::Abduction;
            state.active_session_id = Some(Uuid::new_v4().to_string());
            ("INITIALIZED", state)
        }
        Some(state) => {
            let updated = commit.is_some_and(|commit| state.last_commit.as_deref() != Some(commit));
            (if updated { "UPDATED" } else { "READY" }, state)
        }
    };

    if let Some(commit) = commit {
        state.last_commit = Some(commit.to_string());
        state.last_commit_at = Some(now);
    }
    state.updated_at = now;
    store.put_fpf_state(&state)?;

    let active_counts = store.count_by_layer(context_id, true)?;
    let mut output = format!(
        "{status}\nPhase: {:?} ({})\n",
        state.active_phase,
        state.active_phase.role_label()
    );
    output.push_str("Active holons by layer:\n");
    for layer in [Layer::L0, Layer::L1, Layer::L2, Layer::Drr] {
        let count = active_counts.get(&layer).copied().unwrap_or(0);
        let _ = writeln!(output, "  {}: {count}", layer.as_str());
    }

    let recent_ids = store.list_holon_ids(context_id)?;
    if !recent_ids.is_empty() {
        output.push_str("Recent holons:\n");
        for id in recent_ids.iter().rev().take(5) {
            if let Some(holon) = store.get_holon(id)? {
                let _ = writeln!(
                    output,
                    "  - {} [{}] R_eff={:.3}",
                    holon.id,
                    holon.layer.as_str(),
                    holon.cached_r_score
                );
            }
        }
    }

    let mut open_decisions = Vec::new();
    let mut recent_resolutions = Vec::new();
    for id in &recent_ids {
        let Some(holon) = store.get_holon(id)? else {
            continue;
        };
        if holon.holon_type != HolonType::Drr {
            continue;
        }
        let status = resolution_status(store, &holon)?;
        if status == "open" {
            open_decisions.push(holon.title.clone());
        } else {
            let evidence = store.list_evidence_by_holon(&holon.id)?;
            if evidence.iter().any(|item| {
                matches!(
                    item.evidence_type,
                    EvidenceType::Implementation | EvidenceType::Abandonment | EvidenceType::Supersession
                )
            }) {
                recent_resolutions.push(format!("{} ({status})", holon.title));
            }
        }
    }
    if !open_decisions.is_empty() {
        output.push_str("Open decisions:\n");
        for title in &open_decisions {
            let _ = writeln!(output, "  - {title}");
        }
    }
    if !recent_resolutions.is_empty() {
        output.push_str("Recent resolutions:\n");
        for entry in recent_resolutions.iter().rev().take(5) {
            let _ = writeln!(output, "  - {entry}");
        }
    }

    let decaying = store.list_all_stale(context_id)?;
    if !decaying.is_empty() {
        let _ = writeln!(output, "Decaying evidence: {} item(s) flagged stale.", decaying.len());
    }

    let hint = match state.active_phase {
        Phase::Idle => "Next: propose a hypothesis to begin a new cycle.",
        Phase::Abduction => "Next: propose hypotheses, or verify an existing L0 claim.",
        Phase::Deduction => "Next: verify outstanding L0 hypotheses with a logic check.",
        Phase::Induction => "Next: test verified L1 hypotheses empirically.",
        Phase::Audit => "Next: audit risks, or proceed to decide.",
        Phase::Decision => "Next: decide between competing hypotheses.",
    };
    output.push_str(hint);

    Ok(output)
}
