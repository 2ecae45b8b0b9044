// crates/quint-mcp/src/tools/calculate.rs
// ============================================================================
// Module: Quint Tool — calculate_r / audit_tree
// Description: Formats an assurance-calculator report as text or a tree.
// Purpose: Implement the `quint_calculate_r` and `quint_audit_tree` tool bodies.
// Dependencies: quint-core
// ============================================================================

//! ## Overview
//! Both tools run the same pure calculator and differ only in rendering:
//! `calculate_r` prints the top-level report, `audit_tree` additionally
//! walks `dependency_reports` alongside the underlying `componentOf`/
//! `constituentOf` relations (in the same ascending-target-id order the
//! calculator uses) so each line can carry the edge's congruence-level
//! marker.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write as _;

use quint_core::AssuranceReport;
use quint_core::EngineError;
use quint_core::Relation;
use quint_core::Store;
use quint_core::Timestamp;
use quint_core::calculate_r_eff;
use serde_json::Value;

use super::common::require_existing_holon;
use super::common::require_str;

// ============================================================================
// SECTION: calculate_r
// ============================================================================

/// Executes the `calculate_r` tool.
///
/// # Errors
///
/// Returns [`EngineError::NotFound`] when `holon_id` does not exist, or
/// [`EngineError::Storage`] on a store failure.
pub fn run_calculate_r<S: Store>(store: &S, now: Timestamp, args: &Value) -> Result<String, EngineError> {
    let holon_id = require_existing_holon(store, require_str(args, "holon_id")?)?;
    let report = calculate_r_eff(store, &holon_id, now)?;

    let mut output = format!(
        "R_eff({}) = {:.3} (self={:.3}, weakest_link={})\n",
        report.holon_id, report.final_score, report.self_score, report.weakest_link
    );
    if !report.factors.is_empty() {
        output.push_str("Factors:\n");
        for factor in &report.factors {
            let _ = writeln!(output, "  - {factor}");
        }
    }
    if !report.stale_evidence_ids.is_empty() {
        let _ = writeln!(output, "Stale evidence: {}", report.stale_evidence_ids.len());
    }
    Ok(output)
}

// ============================================================================
// SECTION: audit_tree
// ============================================================================

/// Executes the `audit_tree` tool.
///
/// # Errors
///
/// Returns [`EngineError::NotFound`] when `holon_id` does not exist, or
/// [`EngineError::Storage`] on a store failure.
pub fn run_audit_tree<S: Store>(store: &S, now: Timestamp, args: &Value) -> Result<String, EngineError> {
    let holon_id = require_existing_holon(store, require_str(args, "holon_id")?)?;
    let report = calculate_r_eff(store, &holon_id, now)?;
    let mut output = format!("Audit tree for {}:\n", report.holon_id);
    render_node(store, &report, None, 0, &mut output)?;
    Ok(output)
}

/// Recursively renders `report` and its dependency reports as an indented
/// tree, annotating each edge with its congruence-level penalty.
fn render_node<S: Store>(
    store: &S,
    report: &AssuranceReport,
    incoming: Option<&Relation>,
    depth: usize,
    output: &mut String,
) -> Result<(), EngineError> {
    let indent = "  ".repeat(depth);
    let edge_note = incoming
        .map(|relation| format!(" [CL{} x{:.1}]", relation.congruence_level.as_u8(), relation.congruence_level.penalty()))
        .unwrap_or_default();
    let _ = writeln!(
        output,
        "{indent}- {} R:{:.3}{edge_note}",
        report.holon_id, report.final_score
    );

    let dependencies = store.list_dependencies_of(&report.holon_id)?;
    for dependency_report in &report.dependency_reports {
        let relation = dependencies.iter().find(|relation| relation.target_id == dependency_report.holon_id);
        render_node(store, dependency_report, relation, depth + 1, output)?;
    }
    Ok(())
}
