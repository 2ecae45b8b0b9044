// crates/quint-mcp/src/tools/propose.rs
// ============================================================================
// Module: Quint Tool — propose
// Description: Creates an L0 hypothesis holon and its declared dependencies.
// Purpose: Implement the `quint_propose` tool body.
// Dependencies: quint-core
// ============================================================================

//! ## Overview
//! `propose` is the only tool that creates a fresh hypothesis holon. It
//! resolves a unique slug for the holon id, wires up `componentOf`/
//! `constituentOf` dependency edges (skipping, never failing, on a missing
//! target or a would-be cycle), and advises on likely-duplicate existing
//! holons when the caller supplied no dependencies of its own.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashSet;
use std::fmt::Write as _;

use quint_core::Contract;
use quint_core::ContextId;
use quint_core::EngineError;
use quint_core::Holon;
use quint_core::HolonId;
use quint_core::HolonKind;
use quint_core::HolonType;
use quint_core::Layer;
use quint_core::Relation;
use quint_core::RelationType;
use quint_core::SearchScope;
use quint_core::Store;
use quint_core::Timestamp;
use quint_core::resolve_unique_slug;
use quint_core::slugify;
use quint_core::would_create_cycle;
use serde_json::Value;

use super::common::optional_congruence_level;
use super::common::optional_str;
use super::common::optional_str_list;
use super::common::require_kind;
use super::common::require_str;

// ============================================================================
// SECTION: Tool Body
// ============================================================================

/// Executes the `propose` tool.
///
/// # Errors
///
/// Returns [`EngineError::InvalidArgument`] on malformed input, or
/// [`EngineError::Storage`] on a store failure.
pub fn run<S: Store>(
    store: &mut S,
    context_id: &ContextId,
    now: Timestamp,
    args: &Value,
) -> Result<String, EngineError> {
    let title = require_str(args, "title")?;
    let content = require_str(args, "content")?;
    let scope = require_str(args, "scope")?;
    let kind = require_kind(args)?;
    let rationale = require_str(args, "rationale")?;
    let decision_context = optional_str(args, "decision_context");
    let depends_on = optional_str_list(args, "depends_on")?;
    let dependency_cl = optional_congruence_level(args, "dependency_cl")?;

    let existing: HashSet<String> =
        store.list_holon_ids(context_id)?.into_iter().map(|id| id.to_string()).collect();
    let slug_base = slugify(title);
    let id = resolve_unique_slug(&slug_base, |candidate| existing.contains(candidate));
    let holon_id = HolonId::new(id.clone());

    let body = format!("{content}\n\nRationale: {rationale}");
    let holon = Holon {
        id: holon_id.clone(),
        holon_type: HolonType::Hypothesis,
        kind,
        layer: Layer::L0,
        title: title.to_string(),
        body,
        context_id: context_id.clone(),
        claim_scope: scope.to_string(),
        parent_id: None,
        cached_r_score: 0.0,
        reverification: None,
        contract: Contract::default(),
        created_at: now,
        updated_at: now,
    };
    store.create_holon(&holon)?;

    let mut output = format!("Proposed hypothesis {id} (L0, {kind:?}).\n");
    let mut warnings = Vec::new();
    let relation_type =
        if matches!(kind, HolonKind::System) { RelationType::ComponentOf } else { RelationType::ConstituentOf };

    for dep_raw in &depends_on {
        let target_id = HolonId::new(dep_raw.as_str());
        if store.get_holon(&target_id)?.is_none() {
            warnings.push(format!("skipped dependency {dep_raw}: target does not exist"));
            continue;
        }
        if would_create_cycle(&*store, &holon_id, &target_id)? {
            warnings.push(format!("skipped dependency {dep_raw}: would create a cycle"));
            continue;
        }
        store.create_relation(&Relation {
            source_id: holon_id.clone(),
            target_id,
            relation_type,
            congruence_level: dependency_cl,
            created_at: now,
        })?;
    }

    if let Some(context_name) = decision_context {
        let context_holon = HolonId::new(context_name);
        if store.get_holon(&context_holon)?.is_some() {
            store.create_relation(&Relation {
                source_id: holon_id.clone(),
                target_id: context_holon,
                relation_type: RelationType::MemberOf,
                congruence_level: dependency_cl,
                created_at: now,
            })?;
        } else {
            warnings.push(format!("decision_context {context_name} does not exist; memberOf edge skipped"));
        }
    }

    for warning in &warnings {
        let _ = writeln!(output, "WARNING: {warning}");
    }

    if depends_on.is_empty() {
        let query = format!("{title} {content}");
        let hits = store.search(&query, context_id, SearchScope::Holons, None, 5)?;
        let candidates: Vec<_> = hits.into_iter().filter(|hit| hit.holon_id != holon_id).collect();
        if !candidates.is_empty() {
            output.push_str("\nPOTENTIAL DEPENDENCIES DETECTED:\n");
            for hit in candidates {
                let _ = writeln!(
                    output,
                    "  - {} (\"{}\") — consider quint_link(source_id=\"{id}\", target_id=\"{}\")",
                    hit.holon_id, hit.snippet, hit.holon_id
                );
            }
        }
    }

    Ok(output)
}
