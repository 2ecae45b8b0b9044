// crates/quint-mcp/tests/dispatcher_flow.rs
// ============================================================================
// Module: Dispatcher Flow Tests
// Description: End-to-end JSON-RPC scenarios against an in-memory store.
// Purpose: Exercise the precondition -> tool -> audit -> response pipeline.
// Dependencies: quint-core, quint-mcp, quint-store-sqlite, serde_json
// ============================================================================

//! End-to-end dispatcher scenarios, black-box over the JSON-RPC interface.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only assertions are permitted to unwrap/expect."
)]

use quint_core::ContextId;
use quint_core::Timestamp;
use quint_core::slugify;
use quint_mcp::Dispatcher;
use quint_store_sqlite::SqliteStore;
use serde_json::Value;
use serde_json::json;

/// Builds a dispatcher over a fresh in-memory store with a fixed clock.
fn test_dispatcher() -> Dispatcher<SqliteStore> {
    let store = SqliteStore::open_in_memory().expect("open in-memory store");
    Dispatcher::new_with_clock(store, ContextId::new("ctx"), || Timestamp::from_unix_millis(0))
}

/// Sends one `tools/call` request and returns `(text, is_error)`.
fn call(dispatcher: &mut Dispatcher<SqliteStore>, id: i64, tool: &str, arguments: Value) -> (String, bool) {
    let request = json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": { "name": tool, "arguments": arguments },
    });
    let response = dispatcher.handle_line(&request.to_string()).expect("response for id'd request");
    let result = response.result.expect("tools/call always succeeds at the JSON-RPC layer");
    let text = result["content"][0]["text"].as_str().unwrap_or_default().to_string();
    let is_error = result.get("isError").and_then(Value::as_bool).unwrap_or(false);
    (text, is_error)
}

#[test]
fn full_cycle_propose_through_resolve() {
    let mut dispatcher = test_dispatcher();

    let (propose_text, propose_error) = call(
        &mut dispatcher,
        1,
        "quint_propose",
        json!({
            "title": "Use SQLite for storage",
            "content": "Embed SQLite rather than a client-server database.",
            "scope": "storage layer",
            "kind": "system",
            "rationale": "single-writer, embeddable, well understood",
        }),
    );
    assert!(!propose_error, "propose failed: {propose_text}");
    let hypothesis_id = slugify("Use SQLite for storage");
    assert!(propose_text.contains(&hypothesis_id));

    let (verify_text, verify_error) = call(
        &mut dispatcher,
        2,
        "quint_verify",
        json!({
            "hypothesis_id": hypothesis_id,
            "checks_json": "{\"checked\":true}",
            "verdict": "pass",
        }),
    );
    assert!(!verify_error, "verify failed: {verify_text}");
    assert!(verify_text.contains("promoted to L1"));

    let (test_text, test_error) = call(
        &mut dispatcher,
        3,
        "quint_test",
        json!({
            "hypothesis_id": hypothesis_id,
            "test_type": "internal",
            "result": "benchmarks passed",
            "verdict": "pass",
        }),
    );
    assert!(!test_error, "test failed: {test_text}");
    assert!(test_text.contains("promoted to L2"));

    let (decide_text, decide_error) = call(
        &mut dispatcher,
        4,
        "quint_decide",
        json!({
            "title": "Storage backend decision",
            "winner_id": hypothesis_id,
            "decision": "Use SQLite",
            "rationale": "see hypothesis",
            "consequences": "single-writer constraint",
        }),
    );
    assert!(!decide_error, "decide failed: {decide_text}");
    assert!(decide_text.contains("Phase reset to IDLE"));
    let decision_id = format!("DRR-{}-{}", Timestamp::from_unix_millis(0).to_iso_date(), slugify("Storage backend decision"));
    assert!(decide_text.contains(&decision_id));

    let (resolve_text, resolve_error) = call(
        &mut dispatcher,
        5,
        "quint_resolve",
        json!({
            "decision_id": decision_id,
            "resolution": "implemented",
            "reference": "commit abc123",
        }),
    );
    assert!(!resolve_error, "resolve failed: {resolve_text}");
    assert!(resolve_text.contains("implemented"));

    let (second_resolve_text, second_resolve_error) = call(
        &mut dispatcher,
        6,
        "quint_resolve",
        json!({
            "decision_id": decision_id,
            "resolution": "abandoned",
            "notes": "changed our minds",
        }),
    );
    assert!(second_resolve_error, "a second resolve on a closed DRR must be blocked");
    assert!(second_resolve_text.contains("already resolved"));
}

#[test]
fn verify_without_any_l0_hypothesis_is_blocked() {
    let mut dispatcher = test_dispatcher();
    let (text, is_error) = call(
        &mut dispatcher,
        1,
        "quint_verify",
        json!({ "hypothesis_id": "nonexistent", "checks_json": "{}", "verdict": "pass" }),
    );
    assert!(is_error);
    assert!(text.contains("no L0 hypotheses to verify"));
}

#[test]
fn reset_is_idempotent_and_never_touches_holons() {
    let mut dispatcher = test_dispatcher();
    call(
        &mut dispatcher,
        1,
        "quint_propose",
        json!({
            "title": "Reset target",
            "content": "content",
            "scope": "scope",
            "kind": "episteme",
            "rationale": "rationale",
        }),
    );

    let (first_text, first_error) = call(&mut dispatcher, 2, "quint_reset", json!({ "reason": "checkpoint" }));
    assert!(!first_error);
    assert!(first_text.contains("checkpoint"));

    let (second_text, second_error) = call(&mut dispatcher, 3, "quint_reset", json!({}));
    assert!(!second_error);
    assert!(second_text.contains("Previous phase: Idle"));

    let (search_text, search_error) =
        call(&mut dispatcher, 4, "quint_search", json!({ "query": "Reset target" }));
    assert!(!search_error);
    assert!(search_text.contains("Reset target"));
}

#[test]
fn malformed_json_is_a_parse_error() {
    let mut dispatcher = test_dispatcher();
    let response = dispatcher.handle_line("{not valid json").expect("parse errors always respond");
    let error = response.error.expect("malformed input is a JSON-RPC error");
    assert_eq!(error.code, -32700);
}

#[test]
fn unknown_method_is_method_not_found_only_when_an_id_is_present() {
    let mut dispatcher = test_dispatcher();

    let response = dispatcher
        .handle_line(r#"{"jsonrpc":"2.0","id":1,"method":"unknown/thing"}"#)
        .expect("requests with an id always get a response");
    let error = response.error.expect("unknown method is a JSON-RPC error");
    assert_eq!(error.code, -32601);

    let notification = dispatcher.handle_line(r#"{"jsonrpc":"2.0","method":"unknown/thing"}"#);
    assert!(notification.is_none(), "notifications to unknown methods produce no response");
}
