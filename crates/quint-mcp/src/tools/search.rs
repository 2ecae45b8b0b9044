// crates/quint-mcp/src/tools/search.rs
// ============================================================================
// Module: Quint Tool — search
// Description: Full-text search over holons and evidence with post-filters.
// Purpose: Implement the `quint_search` tool body.
// Dependencies: quint-core
// ============================================================================

//! ## Overview
//! `search` delegates tokenisation and ranking to the store's full-text
//! index; everything this tool adds on top — layer filter, DRR resolution
//! status filter, affected-scope pattern filter — is a post-filter over the
//! store's hits, since those predicates are cheap relative to a repeat of
//! the index query.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write as _;

use quint_core::ContextId;
use quint_core::EngineError;
use quint_core::Layer;
use quint_core::SearchScope;
use quint_core::Store;
use serde_json::Value;

use super::common::optional_str;
use super::common::optional_u64_range;
use super::common::resolution_status;
use super::common::require_str;

// ============================================================================
// SECTION: Tool Body
// ============================================================================

/// Executes the `search` tool.
///
/// # Errors
///
/// Returns [`EngineError::InvalidArgument`] on an empty query, an
/// unrecognised `scope`/`layer_filter`, or [`EngineError::Storage`] on a
/// store failure.
pub fn run<S: Store>(store: &S, context_id: &ContextId, args: &Value) -> Result<String, EngineError> {
    let query = require_str(args, "query")?;
    let scope = match optional_str(args, "scope").unwrap_or("all") {
        "holons" => SearchScope::Holons,
        "evidence" => SearchScope::Evidence,
        "all" => SearchScope::All,
        other => {
            return Err(EngineError::InvalidArgument(format!(
                "scope must be holons, evidence, or all, got: {other}"
            )));
        }
    };
    let layer_filter = match optional_str(args, "layer_filter") {
        None => None,
        Some("L0") => Some(Layer::L0),
        Some("L1") => Some(Layer::L1),
        Some("L2") => Some(Layer::L2),
        Some("DRR") => Some(Layer::Drr),
        Some("invalid") => Some(Layer::Invalid),
        Some(other) => {
            return Err(EngineError::InvalidArgument(format!(
                "layer_filter must be L0, L1, L2, DRR, or invalid, got: {other}"
            )));
        }
    };
    let status_filter = optional_str(args, "status_filter");
    let affected_scope_filter = optional_str(args, "affected_scope_filter");
    let limit = usize::try_from(optional_u64_range(args, "limit", 10, 1, 50)?).unwrap_or(50);

    let hits = store.search(query, context_id, scope, layer_filter, limit * 4)?;

    let mut output = format!("Search results for \"{query}\" ({} raw hits):\n", hits.len());
    let mut shown = 0usize;
    for hit in hits {
        if shown >= limit {
            break;
        }
        let Some(holon) = store.get_holon(&hit.holon_id)? else {
            continue;
        };
        if let Some(status_filter) = status_filter {
            if resolution_status(store, &holon)? != status_filter {
                continue;
            }
        }
        if let Some(pattern) = affected_scope_filter {
            if !holon.contract.affected_scope.iter().any(|scope| scope_matches(scope, pattern)) {
                continue;
            }
        }
        let _ = writeln!(
            output,
            "  - {} [{}] \"{}\" (rank {:.3}): {}",
            hit.holon_id,
            holon.layer.as_str(),
            holon.title,
            hit.rank,
            hit.snippet
        );
        shown += 1;
    }
    if shown == 0 {
        output.push_str("  (no matches)\n");
    }
    Ok(output)
}

/// Matches `pattern` against `scope` by substring, or by glob when `pattern`
/// contains a `*` wildcard.
fn scope_matches(scope: &str, pattern: &str) -> bool {
    if let Some((prefix, suffix)) = pattern.split_once('*') {
        scope.starts_with(prefix) && scope.ends_with(suffix)
    } else {
        scope.contains(pattern)
    }
}
