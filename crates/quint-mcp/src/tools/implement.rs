// crates/quint-mcp/src/tools/implement.rs
// ============================================================================
// Module: Quint Tool — implement
// Description: Emits an implementation directive inheriting upstream DRR rules.
// Purpose: Implement the `quint_implement` tool body.
// Dependencies: quint-core
// ============================================================================

//! ## Overview
//! `implement` never mutates the store; it renders a DRR's own contract plus
//! any invariants/anti-patterns inherited from upstream DRRs that selected a
//! holon somewhere in the winner's `componentOf`/`constituentOf` dependency
//! subtree. Traversal carries a visited set so a dependency cycle cannot
//! cause unbounded recursion or duplicate inheritance.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashSet;
use std::fmt::Write as _;

use quint_core::ContextId;
use quint_core::EngineError;
use quint_core::HolonId;
use quint_core::RelationType;
use quint_core::Store;
use serde_json::Value;

use super::common::resolve_drr_id;
use super::common::require_str;

/// One invariant or anti-pattern inherited from an upstream DRR.
struct Inherited {
    /// The DRR that governs the dependency this rule came from.
    source_drr: HolonId,
    /// `"invariant"` or `"anti_pattern"`.
    kind: &'static str,
    /// The rule text.
    text: String,
}

// ============================================================================
// SECTION: Tool Body
// ============================================================================

/// Executes the `implement` tool.
///
/// # Errors
///
/// Returns [`EngineError::NotFound`] when `decision_id` does not resolve to a
/// DRR, [`EngineError::PreconditionBlocked`] when the DRR's contract is
/// empty, or [`EngineError::Storage`] on a store failure.
pub fn run<S: Store>(store: &S, context_id: &ContextId, args: &Value) -> Result<String, EngineError> {
    let decision_id = resolve_drr_id(store, context_id, require_str(args, "decision_id")?)?;
    let drr = store
        .get_holon(&decision_id)?
        .ok_or_else(|| EngineError::NotFound(format!("holon not found: {decision_id}")))?;

    if drr.contract.is_empty() {
        return Err(EngineError::PreconditionBlocked(format!(
            "{decision_id} has no contract to implement"
        )));
    }

    let selects = store.list_relations_from(&decision_id, &[RelationType::Selects])?;
    let mut inherited = Vec::new();
    if let Some(selects_winner) = selects.first() {
        let mut visited = HashSet::new();
        collect_inherited(store, &selects_winner.target_id, &mut visited, &mut inherited)?;
    }

    let mut seen = HashSet::new();
    inherited.retain(|item| seen.insert((item.source_drr.clone(), item.kind, item.text.clone())));

    let mut output = format!("Implementation directive: {}\n", drr.title);
    let _ = writeln!(output, "\nOwn invariants:");
    if drr.contract.invariants.is_empty() {
        output.push_str("  (none)\n");
    } else {
        for item in &drr.contract.invariants {
            let _ = writeln!(output, "  - {item}");
        }
    }
    let _ = writeln!(output, "\nOwn anti-patterns:");
    if drr.contract.anti_patterns.is_empty() {
        output.push_str("  (none)\n");
    } else {
        for item in &drr.contract.anti_patterns {
            let _ = writeln!(output, "  - {item}");
        }
    }
    let _ = writeln!(output, "\nAcceptance criteria:");
    if drr.contract.acceptance_criteria.is_empty() {
        output.push_str("  (none)\n");
    } else {
        for item in &drr.contract.acceptance_criteria {
            let _ = writeln!(output, "  - {item}");
        }
    }
    let _ = writeln!(output, "\nAffected scope:");
    if drr.contract.affected_scope.is_empty() {
        output.push_str("  (none)\n");
    } else {
        for item in &drr.contract.affected_scope {
            let _ = writeln!(output, "  - {item}");
        }
    }

    let _ = writeln!(output, "\nInherited constraints:");
    if inherited.is_empty() {
        output.push_str("  (none)\n");
    } else {
        let mut by_drr: Vec<&HolonId> = Vec::new();
        for item in &inherited {
            if !by_drr.contains(&&item.source_drr) {
                by_drr.push(&item.source_drr);
            }
        }
        for source_drr in by_drr {
            let _ = writeln!(output, "  From {source_drr}:");
            for item in inherited.iter().filter(|item| &item.source_drr == source_drr) {
                let _ = writeln!(output, "    - [{}] {}", item.kind, item.text);
            }
        }
    }

    output.push_str(
        "\nWhen implementation is complete, call quint_resolve with resolution=implemented and, if \
         acceptance criteria are listed above, criteria_verified=true.",
    );
    Ok(output)
}

/// Walks the `componentOf`/`constituentOf` dependency subtree rooted at
/// `holon_id`, collecting invariants/anti-patterns from any DRR that
/// `selects` a holon encountered along the way.
fn collect_inherited<S: Store>(
    store: &S,
    holon_id: &HolonId,
    visited: &mut HashSet<HolonId>,
    out: &mut Vec<Inherited>,
) -> Result<(), EngineError> {
    if !visited.insert(holon_id.clone()) {
        return Ok(());
    }

    let governing = store.list_relations_to(holon_id, &[RelationType::Selects])?;
    for relation in governing {
        let Some(source_drr) = store.get_holon(&relation.source_id)? else {
            continue;
        };
        for invariant in &source_drr.contract.invariants {
            out.push(Inherited {
                source_drr: source_drr.id.clone(),
                kind: "invariant",
                text: invariant.clone(),
            });
        }
        for anti_pattern in &source_drr.contract.anti_patterns {
            out.push(Inherited {
                source_drr: source_drr.id.clone(),
                kind: "anti_pattern",
                text: anti_pattern.clone(),
            });
        }
    }

    for relation in store.list_dependencies_of(holon_id)? {
        collect_inherited(store, &relation.target_id, visited, out)?;
    }
    Ok(())
}
