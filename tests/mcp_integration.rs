//! Integration tests for MCP protocol handling.
//!
//! These tests verify JSON-RPC 2.0 message parsing and drive a full server
//! session over in-memory buffers against a mock Moonraker.

mod common;

use common::MockMoonraker;
use klipper_mcp::mcp::protocol::{parse_message, ErrorCode, IncomingMessage, RequestId};
use klipper_mcp::mcp::server::{McpServer, ServerState};
use klipper_mcp::mcp::transport::LineTransport;
use serde_json::{json, Value};

// =============================================================================
// Protocol Parsing Tests
// =============================================================================

#[test]
fn test_parse_initialize_request() {
    let json = r#"{
        "jsonrpc": "2.0",
        "id": 1,
        "method": "initialize",
        "params": {
            "protocolVersion": "2024-11-05",
            "capabilities": {},
            "clientInfo": {
                "name": "test-client",
                "version": "1.0.0"
            }
        }
    }"#;

    let result = parse_message(json);
    assert!(result.is_ok());

    if let IncomingMessage::Request(req) = result.unwrap() {
        assert_eq!(req.method, "initialize");
        assert_eq!(req.id, RequestId::Number(1));
    } else {
        panic!("Expected Request");
    }
}

#[test]
fn test_parse_tools_call_request() {
    let json = r#"{
        "jsonrpc": "2.0",
        "id": "abc",
        "method": "tools/call",
        "params": {"name": "validate_config", "arguments": {"filename": "printer.cfg"}}
    }"#;

    let IncomingMessage::Request(req) = parse_message(json).unwrap() else {
        panic!("Expected Request");
    };
    assert_eq!(req.id, RequestId::String("abc".to_string()));
    assert_eq!(req.params.unwrap()["arguments"]["filename"], "printer.cfg");
}

#[test]
fn test_parse_notification() {
    let json = r#"{"jsonrpc": "2.0", "method": "notifications/initialized"}"#;

    let result = parse_message(json);
    assert!(matches!(result, Ok(IncomingMessage::Notification(_))));
}

#[test]
fn test_parse_invalid_json() {
    let err = parse_message("{ not valid json }").unwrap_err();
    assert_eq!(err.error.code, ErrorCode::ParseError.code());
}

#[test]
fn test_parse_missing_jsonrpc_version() {
    let err = parse_message(r#"{"id": 1, "method": "test"}"#).unwrap_err();
    assert_eq!(err.error.code, ErrorCode::InvalidRequest.code());
}

// =============================================================================
// Session Tests
// =============================================================================

fn session_input(calls: &[Value]) -> String {
    let mut lines = vec![
        json!({
            "jsonrpc": "2.0",
            "id": 0,
            "method": "initialize",
            "params": {
                "protocolVersion": "2025-03-26",
                "capabilities": {},
                "clientInfo": {"name": "test-client", "version": "1.0.0"}
            }
        })
        .to_string(),
        json!({"jsonrpc": "2.0", "method": "notifications/initialized"}).to_string(),
    ];
    for (i, call) in calls.iter().enumerate() {
        lines.push(
            json!({
                "jsonrpc": "2.0",
                "id": i + 1,
                "method": "tools/call",
                "params": call
            })
            .to_string(),
        );
    }
    lines.join("\n") + "\n"
}

async fn run_session(mock: &MockMoonraker, calls: &[Value]) -> Vec<Value> {
    let input = session_input(calls);
    let mut server = McpServer::with_transport(
        LineTransport::new(input.as_bytes(), Vec::new()),
        mock.handler(),
    );
    server.run_until_eof().await.unwrap();
    assert_eq!(server.state(), ServerState::ShuttingDown);

    String::from_utf8(server.into_writer())
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[tokio::test]
async fn test_session_parse_and_validate() {
    let mock = MockMoonraker::builder()
        .config_file(
            "printer.cfg",
            "[include fan.cfg]\n[extruder]\nnozzle_diameter: 0.4\nmax_temp: 600\n",
        )
        .start()
        .await;

    let replies = run_session(
        &mock,
        &[
            json!({"name": "validate_config", "arguments": {"filename": "printer.cfg"}}),
            json!({
                "name": "get_config_value",
                "arguments": {
                    "filename": "printer.cfg",
                    "section": "extruder",
                    "key": "nozzle_diameter"
                }
            }),
            json!({"name": "read_config_file", "arguments": {"filename": "other.cfg"}}),
        ],
    )
    .await;

    assert_eq!(replies.len(), 4);
    assert_eq!(replies[0]["result"]["protocolVersion"], "2025-03-26");

    let validate = &replies[1]["result"];
    assert!(validate.get("isError").is_none());
    let text = validate["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("1 problem(s) found"));
    assert!(text.contains("Line 4: max_temp must be a number between 0 and 500"));

    assert_eq!(
        replies[2]["result"]["content"][0]["text"],
        "[extruder] nozzle_diameter: 0.4 (number)"
    );

    assert_eq!(replies[3]["id"], 3);
    assert_eq!(replies[3]["result"]["isError"], true);
}

#[tokio::test]
async fn test_session_bad_tool_params() {
    let mock = MockMoonraker::builder().start().await;

    let replies = run_session(&mock, &[json!({"arguments": {}})]).await;

    assert_eq!(replies[1]["error"]["code"], ErrorCode::InvalidParams.code());
    assert!(mock.requests().is_empty());
}
