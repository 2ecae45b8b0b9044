// crates/quint-mcp/src/catalogue.rs
// ============================================================================
// Module: Quint Tool Catalogue
// Description: Static JSON Schema metadata for every `quint_*` tool.
// Purpose: Back the `tools/list` response.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! The catalogue is pure data: it never touches the store and carries no
//! dependency on the tools layer, so `tools/list` can be served before a
//! store is even opened.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use serde_json::json;

use crate::protocol::ToolDefinition;

// ============================================================================
// SECTION: Catalogue
// ============================================================================

/// Returns the full `quint_*` tool catalogue, in the order the protocol
/// enumerates them.
#[must_use]
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: "quint_internalize",
            description: "Idempotent session entry point: initialises the project on first call, \
                          reports phase/status/counts on every call.",
            input_schema: schema(&[("commit", "string", false)]),
        },
        ToolDefinition {
            name: "quint_propose",
            description: "Creates an L0 hypothesis holon and wires its declared dependencies.",
            input_schema: schema_with(
                &[
                    ("title", "string", true),
                    ("content", "string", true),
                    ("scope", "string", true),
                    ("kind", "string", true),
                    ("rationale", "string", true),
                    ("decision_context", "string", false),
                ],
                &[("depends_on", array_of("string")), ("dependency_cl", integer_enum(&[1, 2, 3]))],
            ),
        },
        ToolDefinition {
            name: "quint_verify",
            description: "Logic-checks a hypothesis; PASS promotes to L1, FAIL/REFINE invalidates it.",
            input_schema: schema_with(
                &[
                    ("hypothesis_id", "string", true),
                    ("checks_json", "string", true),
                    ("verdict", "string", true),
                ],
                &[("carrier_files", array_of("string"))],
            ),
        },
        ToolDefinition {
            name: "quint_test",
            description: "Empirically tests a hypothesis; PASS promotes to L2, FAIL/REFINE invalidates it.",
            input_schema: schema_with(
                &[
                    ("hypothesis_id", "string", true),
                    ("test_type", "string", true),
                    ("result", "string", true),
                    ("verdict", "string", true),
                ],
                &[("carrier_files", array_of("string"))],
            ),
        },
        ToolDefinition {
            name: "quint_audit",
            description: "Records a standing risk audit against a holon without changing its layer.",
            input_schema: schema(&[("hypothesis_id", "string", true), ("risks", "string", true)]),
        },
        ToolDefinition {
            name: "quint_decide",
            description: "Finalises a decision between competing hypotheses into a DRR holon.",
            input_schema: schema_with(
                &[
                    ("title", "string", true),
                    ("winner_id", "string", true),
                    ("context", "string", false),
                    ("decision", "string", true),
                    ("rationale", "string", true),
                    ("consequences", "string", true),
                ],
                &[
                    ("rejected_ids", array_of("string")),
                    ("characteristics", Value::Object(serde_json::Map::new())),
                    ("contract", Value::Object(serde_json::Map::new())),
                ],
            ),
        },
        ToolDefinition {
            name: "quint_resolve",
            description: "Closes out a DRR as implemented, abandoned, or superseded.",
            input_schema: schema_with(
                &[("decision_id", "string", true), ("resolution", "string", true)],
                &[
                    ("reference", Value::String("string".to_string())),
                    ("superseded_by", Value::String("string".to_string())),
                    ("notes", Value::String("string".to_string())),
                    ("valid_until", Value::String("string".to_string())),
                    ("criteria_verified", Value::String("boolean".to_string())),
                ],
            ),
        },
        ToolDefinition {
            name: "quint_implement",
            description: "Emits an implementation directive for a DRR, inheriting upstream constraints.",
            input_schema: schema(&[("decision_id", "string", true)]),
        },
        ToolDefinition {
            name: "quint_link",
            description: "Adds a dependency edge between two existing holons.",
            input_schema: schema_with(
                &[("source_id", "string", true), ("target_id", "string", true)],
                &[("congruence_level", integer_enum(&[1, 2, 3]))],
            ),
        },
        ToolDefinition {
            name: "quint_search",
            description: "Full-text search over holons and/or evidence with layer/status/scope filters.",
            input_schema: schema_with(
                &[("query", "string", true)],
                &[
                    ("scope", Value::String("string".to_string())),
                    ("layer_filter", Value::String("string".to_string())),
                    ("status_filter", Value::String("string".to_string())),
                    ("affected_scope_filter", Value::String("string".to_string())),
                    ("limit", Value::String("integer".to_string())),
                ],
            ),
        },
        ToolDefinition {
            name: "quint_calculate_r",
            description: "Computes the effective reliability (R_eff) of a holon and returns a report.",
            input_schema: schema(&[("holon_id", "string", true)]),
        },
        ToolDefinition {
            name: "quint_audit_tree",
            description: "Computes R_eff and renders the dependency subtree as an indented tree.",
            input_schema: schema(&[("holon_id", "string", true)]),
        },
        ToolDefinition {
            name: "quint_reset",
            description: "Clears the active phase to IDLE without touching holons or evidence.",
            input_schema: schema(&[("reason", "string", false)]),
        },
    ]
}

/// Builds a minimal object schema from `(name, json_type, required)` triples.
fn schema(fields: &[(&str, &str, bool)]) -> Value {
    schema_with(fields, &[])
}

/// Builds an object schema from required `(name, json_type, required)`
/// triples plus already-built `(name, schema)` pairs for optional fields
/// whose shape is not a bare scalar (arrays, nested objects).
fn schema_with(fields: &[(&str, &str, bool)], extra: &[(&str, Value)]) -> Value {
    let mut properties = serde_json::Map::new();
    let mut required = Vec::new();
    for (name, json_type, is_required) in fields {
        properties.insert((*name).to_string(), json!({ "type": json_type }));
        if *is_required {
            required.push((*name).to_string());
        }
    }
    for (name, value) in extra {
        let entry = if value.is_string() {
            json!({ "type": value.as_str().unwrap_or("string") })
        } else {
            value.clone()
        };
        properties.insert((*name).to_string(), entry);
    }
    json!({ "type": "object", "properties": properties, "required": required })
}

/// Builds an `{"type": "array", "items": {"type": item_type}}` schema.
fn array_of(item_type: &str) -> Value {
    json!({ "type": "array", "items": { "type": item_type } })
}

/// Builds an `{"type": "integer", "enum": values}` schema.
fn integer_enum(values: &[i64]) -> Value {
    json!({ "type": "integer", "enum": values })
}
