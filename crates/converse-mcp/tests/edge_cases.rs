//! Edge case integration tests for converse-mcp.
//!
//! Drives the protocol handler end to end across routing, parameter
//! validation, concurrency, and the built-in capabilities.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};

use converse_mcp::builtin;
use converse_mcp::protocol::ProtocolHandler;
use converse_mcp::registry::ServerBuilder;
use converse_mcp::transport::framing;
use converse_mcp::types::*;
use converse_mcp::RequestContext;

// ─────────────────────── helpers ───────────────────────

/// Handler serving the built-in capabilities, with file resources from `root`.
fn builtin_handler(root: Option<&std::path::Path>) -> ProtocolHandler {
    let builder = ServerBuilder::new("test-server", "9.9.9");
    let dispatcher = builtin::register(builder, root).unwrap().build().unwrap();
    ProtocolHandler::new(dispatcher)
}

/// Build an MCP JSON-RPC request.
fn mcp_request(id: i64, method: &str, params: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": method,
        "params": params
    })
}

/// Build a request with no params member at all.
fn bare_request(id: i64, method: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": method
    })
}

/// Send a JSON-RPC message through the handler and return the response.
async fn send(handler: &ProtocolHandler, msg: Value) -> Option<Value> {
    let parsed: JsonRpcMessage = serde_json::from_value(msg).unwrap();
    handler.handle_message(parsed).await
}

/// Send and unwrap the response.
async fn send_unwrap(handler: &ProtocolHandler, msg: Value) -> Value {
    send(handler, msg).await.expect("expected response")
}

/// Decode the JSON text a tool returned in its first content block.
fn tool_text_json(resp: &Value) -> Value {
    let text = resp["result"]["content"][0]["text"].as_str().unwrap();
    serde_json::from_str(text).unwrap()
}

// ═══════════════════════════════════════════════════════
// ROUTING TESTS
// ═══════════════════════════════════════════════════════

/// Test 1: Echo scenario — list, call, and miss.
#[tokio::test]
async fn test_01_echo_scenario() {
    let handler = builtin_handler(None);

    let list = send_unwrap(&handler, bare_request(1, "tools/list")).await;
    let tools = list["result"]["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 1);
    assert_eq!(tools[0]["name"], "echo");
    assert!(tools[0]["inputSchema"].is_object());

    let call = send_unwrap(
        &handler,
        mcp_request(2, "tools/call", json!({ "name": "echo", "arguments": { "x": 1 } })),
    )
    .await;
    assert_eq!(call["id"], 2);
    assert_eq!(tool_text_json(&call), json!({ "x": 1 }));

    let missing = send_unwrap(
        &handler,
        mcp_request(3, "tools/call", json!({ "name": "missing" })),
    )
    .await;
    assert_eq!(missing["error"]["code"], -32803);
    assert!(missing["error"]["message"]
        .as_str()
        .unwrap()
        .contains("missing"));

    println!("TEST 01 — Echo Scenario: PASS");
}

/// Test 2: Unknown method surfaces METHOD_NOT_FOUND.
#[tokio::test]
async fn test_02_unknown_method() {
    let handler = builtin_handler(None);
    let resp = send_unwrap(&handler, bare_request(1, "tools/delete")).await;
    assert_eq!(resp["error"]["code"], -32601);
    assert_eq!(resp["id"], 1);

    println!("TEST 02 — Unknown Method: PASS");
}

/// Test 3: Lookup is exact and case-sensitive.
#[tokio::test]
async fn test_03_case_sensitive_lookup() {
    let handler = builtin_handler(None);
    for name in ["Echo", "ECHO", "ech", "echo "] {
        let resp = send_unwrap(
            &handler,
            mcp_request(1, "tools/call", json!({ "name": name })),
        )
        .await;
        assert_eq!(resp["error"]["code"], -32803, "'{name}' must not match echo");
    }

    println!("TEST 03 — Case-Sensitive Lookup: PASS");
}

/// Test 4: Initialize is idempotent and reports the declared version.
#[tokio::test]
async fn test_04_initialize_idempotent() {
    let handler = builtin_handler(None);
    let first = send_unwrap(
        &handler,
        mcp_request(
            1,
            "initialize",
            json!({
                "protocolVersion": "2099-01-01",
                "capabilities": {},
                "clientInfo": { "name": "future-client", "version": "99.0" }
            }),
        ),
    )
    .await;
    let second = send_unwrap(&handler, bare_request(2, "initialize")).await;

    assert_eq!(first["result"], second["result"]);
    assert_eq!(first["result"]["protocolVersion"], MCP_VERSION);
    assert_eq!(first["result"]["serverInfo"]["name"], "test-server");
    assert_eq!(first["result"]["serverInfo"]["version"], "9.9.9");
    assert!(first["result"]["capabilities"]["tools"].is_object());
    assert!(first["result"]["capabilities"]["prompts"].is_object());
    assert!(first["result"]["capabilities"].get("resources").is_none());
    assert!(first["result"]["instructions"].is_string());

    println!("TEST 04 — Initialize Idempotent: PASS");
}

/// Test 5: Ping answers with an empty object.
#[tokio::test]
async fn test_05_ping() {
    let handler = builtin_handler(None);
    let resp = send_unwrap(&handler, bare_request(1, "ping")).await;
    assert_eq!(resp["result"], json!({}));

    println!("TEST 05 — Ping: PASS");
}

// ═══════════════════════════════════════════════════════
// PARAMETER VALIDATION TESTS
// ═══════════════════════════════════════════════════════

/// Test 6: Missing name on every get/read/call method.
#[tokio::test]
async fn test_06_missing_key_is_invalid_params() {
    let handler = builtin_handler(None);
    for method in ["tools/call", "prompts/get", "resources/read"] {
        let resp = send_unwrap(&handler, mcp_request(1, method, json!({}))).await;
        assert_eq!(resp["error"]["code"], -32602, "{method} should reject {{}}");
        assert!(resp["error"]["message"].as_str().unwrap().contains(method));

        let resp = send_unwrap(&handler, bare_request(2, method)).await;
        assert_eq!(resp["error"]["code"], -32602, "{method} should reject no params");
    }

    println!("TEST 06 — Missing Key: PASS");
}

/// Test 7: Handler-level errors are passed through as the handler raised them.
#[tokio::test]
async fn test_07_prompt_argument_error_passthrough() {
    let handler = builtin_handler(None);
    let resp = send_unwrap(
        &handler,
        mcp_request(1, "prompts/get", json!({ "name": "greet", "arguments": {} })),
    )
    .await;
    assert_eq!(resp["error"]["code"], -32602);
    assert_eq!(
        resp["error"]["message"],
        "Invalid params: 'name' argument is required"
    );

    let ok = send_unwrap(
        &handler,
        mcp_request(
            2,
            "prompts/get",
            json!({ "name": "greet", "arguments": { "name": "Ada", "style": "formal" } }),
        ),
    )
    .await;
    let text = ok["result"]["messages"][0]["content"]["text"]
        .as_str()
        .unwrap();
    assert!(text.contains("Ada"));
    assert!(text.contains("formal"));
    assert_eq!(ok["result"]["messages"][0]["role"], "user");

    println!("TEST 07 — Handler Error Passthrough: PASS");
}

/// Test 8: Malformed envelopes never reach the dispatcher.
#[tokio::test]
async fn test_08_invalid_envelope() {
    let handler = builtin_handler(None);
    let resp = send_unwrap(
        &handler,
        json!({ "jsonrpc": "1.0", "id": 1, "method": "tools/list" }),
    )
    .await;
    assert_eq!(resp["error"]["code"], -32600);

    let malformed = framing::parse_message(r#"{"broken":"#);
    assert_eq!(malformed.unwrap_err().code(), -32700);

    println!("TEST 08 — Invalid Envelope: PASS");
}

// ═══════════════════════════════════════════════════════
// RESOURCE TESTS
// ═══════════════════════════════════════════════════════

/// Test 9: File resources are listed in name order and read from disk.
#[tokio::test]
async fn test_09_file_resources() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("b.md"), "# Bee").unwrap();
    std::fs::write(dir.path().join("a.txt"), "ay").unwrap();
    let handler = builtin_handler(Some(dir.path()));

    let list = send_unwrap(&handler, bare_request(1, "resources/list")).await;
    let resources = list["result"]["resources"].as_array().unwrap();
    assert_eq!(resources.len(), 2);
    assert_eq!(resources[0]["name"], "a.txt");
    assert_eq!(resources[1]["name"], "b.md");
    assert_eq!(resources[1]["mimeType"], "text/markdown");

    let uri = resources[1]["uri"].as_str().unwrap().to_string();
    let read = send_unwrap(&handler, mcp_request(2, "resources/read", json!({ "uri": uri }))).await;
    assert_eq!(read["result"]["contents"][0]["text"], "# Bee");
    assert_eq!(read["result"]["contents"][0]["uri"], uri.as_str());

    // Content changes on disk are visible on the next read.
    std::fs::write(dir.path().join("b.md"), "# Bee v2").unwrap();
    let reread =
        send_unwrap(&handler, mcp_request(3, "resources/read", json!({ "uri": uri }))).await;
    assert_eq!(reread["result"]["contents"][0]["text"], "# Bee v2");

    println!("TEST 09 — File Resources: PASS");
}

/// Test 10: Unregistered resource URI and a file deleted after startup.
#[tokio::test]
async fn test_10_resource_failures() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("gone.txt"), "soon").unwrap();
    let handler = builtin_handler(Some(dir.path()));

    let resp = send_unwrap(
        &handler,
        mcp_request(1, "resources/read", json!({ "uri": "file:///definitely/not/here" })),
    )
    .await;
    assert_eq!(resp["error"]["code"], -32802);
    assert!(resp["error"]["message"]
        .as_str()
        .unwrap()
        .contains("file:///definitely/not/here"));

    let list = send_unwrap(&handler, bare_request(2, "resources/list")).await;
    let uri = list["result"]["resources"][0]["uri"].as_str().unwrap().to_string();
    std::fs::remove_file(dir.path().join("gone.txt")).unwrap();
    let resp = send_unwrap(&handler, mcp_request(3, "resources/read", json!({ "uri": uri }))).await;
    assert_eq!(resp["error"]["code"], -32603);

    println!("TEST 10 — Resource Failures: PASS");
}

// ═══════════════════════════════════════════════════════
// CONCURRENCY TESTS
// ═══════════════════════════════════════════════════════

/// Test 11: Many concurrent calls each reach their own handler exactly once.
#[tokio::test]
async fn test_11_concurrent_calls() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let dispatcher = ServerBuilder::new("test", "0")
        .tool(
            ToolDefinition::new("count", "counts calls", json!({ "type": "object" })),
            move |_ctx: RequestContext, params: ToolCallParams| {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    tokio::task::yield_now().await;
                    Ok::<_, McpError>(ToolCallResult::json(&params.arguments))
                }
            },
        )
        .build()
        .unwrap();
    let handler = Arc::new(ProtocolHandler::new(dispatcher));

    let mut tasks = Vec::new();
    for i in 0..32 {
        let handler = handler.clone();
        tasks.push(tokio::spawn(async move {
            let params = json!({ "name": "count", "arguments": { "i": i } });
            let msg = mcp_request(i, "tools/call", params);
            let resp = send_unwrap(&handler, msg).await;
            assert_eq!(resp["id"], i);
            assert_eq!(tool_text_json(&resp), json!({ "i": i }));
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }
    assert_eq!(calls.load(Ordering::SeqCst), 32);

    println!("TEST 11 — Concurrent Calls: PASS");
}

/// Test 12: notifications/cancelled reaches the running handler; no response is sent.
#[tokio::test]
async fn test_12_cancellation() {
    let dispatcher = ServerBuilder::new("test", "0")
        .tool(
            ToolDefinition::new("slow", "waits until cancelled", json!({})),
            |ctx: RequestContext, _params: ToolCallParams| async move {
                tokio::select! {
                    _ = ctx.cancellation().cancelled() => Err(McpError::RequestCancelled),
                    _ = tokio::time::sleep(Duration::from_secs(30)) => {
                        Ok(ToolCallResult::text("finished".to_string()))
                    }
                }
            },
        )
        .build()
        .unwrap();
    let handler = ProtocolHandler::new(dispatcher);

    let request: JsonRpcMessage =
        serde_json::from_value(mcp_request(7, "tools/call", json!({ "name": "slow" }))).unwrap();
    let accepted = handler.accept(request);
    assert_eq!(handler.in_flight(), 1);

    let cancel = json!({
        "jsonrpc": "2.0",
        "method": "notifications/cancelled",
        "params": { "requestId": 7, "reason": "user aborted" }
    });
    assert!(send(&handler, cancel).await.is_none());

    let outcome = tokio::time::timeout(Duration::from_secs(5), handler.process(accepted)).await;
    assert!(outcome.is_ok(), "cancellation should stop the slow tool");
    assert!(outcome.unwrap().is_none(), "cancelled request gets no response");
    assert_eq!(handler.in_flight(), 0);

    println!("TEST 12 — Cancellation: PASS");
}

/// Test 13: A failing request does not affect later requests.
#[tokio::test]
async fn test_13_failure_isolation() {
    let handler = builtin_handler(None);
    let bad = send_unwrap(&handler, mcp_request(1, "tools/call", json!("not an object"))).await;
    assert_eq!(bad["error"]["code"], -32602);

    let good = send_unwrap(
        &handler,
        mcp_request(2, "tools/call", json!({ "name": "echo", "arguments": { "ok": true } })),
    )
    .await;
    assert_eq!(tool_text_json(&good), json!({ "ok": true }));

    println!("TEST 13 — Failure Isolation: PASS");
}

// ═══════════════════════════════════════════════════════
// LIFECYCLE TESTS
// ═══════════════════════════════════════════════════════

/// Test 14: Notifications never produce a response.
#[tokio::test]
async fn test_14_notifications() {
    let handler = builtin_handler(None);
    assert!(!handler.is_initialized());

    let initialized = json!({ "jsonrpc": "2.0", "method": "notifications/initialized" });
    assert!(send(&handler, initialized).await.is_none());
    assert!(handler.is_initialized());

    let unknown = json!({ "jsonrpc": "2.0", "method": "notifications/whatever" });
    assert!(send(&handler, unknown).await.is_none());

    let stray_cancel = json!({
        "jsonrpc": "2.0",
        "method": "notifications/cancelled",
        "params": { "requestId": "never-sent" }
    });
    assert!(send(&handler, stray_cancel).await.is_none());

    println!("TEST 14 — Notifications: PASS");
}

/// Test 15: Duplicate registration is rejected at build time.
#[tokio::test]
async fn test_15_duplicate_registration() {
    let result = builtin::register(ServerBuilder::new("test", "0"), None)
        .unwrap()
        .tool_binding(converse_mcp::tools::echo::binding())
        .build();
    match result {
        Err(McpError::DuplicateCapability { kind, name }) => {
            assert_eq!(kind, CapabilityKind::Tool);
            assert_eq!(name, "echo");
        }
        Err(other) => panic!("expected duplicate error, got {other}"),
        Ok(_) => panic!("duplicate echo tool should be rejected"),
    }

    println!("TEST 15 — Duplicate Registration: PASS");
}
