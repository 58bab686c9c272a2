//! JSON-RPC dispatch and normalization boundary tests

use std::sync::Arc;

use serde_json::{json, Value};

use rds_control_mcp::config::Config;
use rds_control_mcp::connection::RDS_SERVICE;
use rds_control_mcp::protocol::{JsonRpcRequest, RequestId};
use rds_control_mcp::server::handle_request;
use rds_control_mcp::testing::{FakeBackend, FakeFactory};
use rds_control_mcp::tools::ServerContext;

fn request(method: &str, params: Option<Value>) -> JsonRpcRequest {
    JsonRpcRequest {
        jsonrpc: "2.0".to_string(),
        id: Some(RequestId::Number(1)),
        method: method.to_string(),
        params,
    }
}

fn context(backend: &Arc<FakeBackend>, readonly: bool) -> Arc<ServerContext> {
    let factory = Arc::new(FakeFactory::default());
    factory.insert(RDS_SERVICE, Arc::clone(backend));
    let config = Config {
        readonly,
        ..Config::default()
    };
    Arc::new(ServerContext::new(config, factory))
}

/// Parse the JSON payload out of a tool-call result
fn tool_payload(result: &Value) -> Value {
    let text = result["content"][0]["text"].as_str().expect("text content");
    serde_json::from_str(text).expect("payload is JSON")
}

#[tokio::test]
async fn initialize_reports_protocol_and_server_info() {
    let backend = Arc::new(FakeBackend::new(RDS_SERVICE));
    let ctx = context(&backend, true);

    let response = handle_request(&ctx, request("initialize", None))
        .await
        .unwrap();
    let result = response.result.unwrap();
    assert_eq!(result["protocolVersion"], "2024-11-05");
    assert_eq!(result["serverInfo"]["name"], "rds-control-mcp");
}

#[tokio::test]
async fn notifications_get_no_response() {
    let backend = Arc::new(FakeBackend::new(RDS_SERVICE));
    let ctx = context(&backend, true);

    let notification = JsonRpcRequest {
        jsonrpc: "2.0".to_string(),
        id: None,
        method: "notifications/initialized".to_string(),
        params: None,
    };
    assert!(handle_request(&ctx, notification).await.is_none());
}

#[tokio::test]
async fn tools_list_exposes_the_full_surface() {
    let backend = Arc::new(FakeBackend::new(RDS_SERVICE));
    let ctx = context(&backend, true);

    let response = handle_request(&ctx, request("tools/list", None))
        .await
        .unwrap();
    let tools = response.result.unwrap()["tools"].as_array().unwrap().len();
    assert_eq!(tools, 14);
}

#[tokio::test]
async fn unknown_method_is_method_not_found() {
    let backend = Arc::new(FakeBackend::new(RDS_SERVICE));
    let ctx = context(&backend, true);

    let response = handle_request(&ctx, request("resources/list", None))
        .await
        .unwrap();
    assert_eq!(response.error.unwrap().code, -32601);
}

#[tokio::test]
async fn unknown_tool_is_invalid_params() {
    let backend = Arc::new(FakeBackend::new(RDS_SERVICE));
    let ctx = context(&backend, true);

    let response = handle_request(
        &ctx,
        request("tools/call", Some(json!({"name": "drop_everything"}))),
    )
    .await
    .unwrap();
    assert_eq!(response.error.unwrap().code, -32602);
    assert_eq!(backend.total_calls(), 0);
}

#[tokio::test]
async fn challenge_is_a_successful_result_with_resubmission_instructions() {
    let backend = Arc::new(FakeBackend::new(RDS_SERVICE));
    let ctx = context(&backend, false);

    let response = handle_request(
        &ctx,
        request(
            "tools/call",
            Some(json!({
                "name": "change_db_instance_status",
                "arguments": {"db_instance_identifier": "db-1", "action": "stop"},
            })),
        ),
    )
    .await
    .unwrap();

    let result = response.result.unwrap();
    assert_eq!(result["isError"], false);
    let payload = tool_payload(&result);
    assert_eq!(payload["requires_confirmation"], true);
    assert_eq!(payload["required_confirmation"], "CONFIRM_STOP");
    assert_eq!(payload["kind"], "missing_confirmation");
    assert_eq!(payload["risk_level"], "high");
    assert_eq!(backend.total_calls(), 0);
}

#[tokio::test]
async fn backend_not_found_normalizes_to_structured_error() {
    let backend = Arc::new(FakeBackend::new(RDS_SERVICE));
    backend.fail_after_scripted_pages(
        "DescribeDBInstances",
        "DBInstanceNotFoundFault",
        "DBInstance db-9 not found",
    );
    let ctx = context(&backend, true);

    let response = handle_request(
        &ctx,
        request(
            "tools/call",
            Some(json!({
                "name": "describe_db_instance",
                "arguments": {"db_instance_identifier": "db-9"},
            })),
        ),
    )
    .await
    .unwrap();

    let result = response.result.unwrap();
    assert_eq!(result["isError"], true);
    let payload = tool_payload(&result);
    assert_eq!(payload["kind"], "resource_not_found");
    assert!(payload["message"].as_str().unwrap().contains("db-9"));
    assert_eq!(payload["error_code"], "DBInstanceNotFoundFault");
}

#[tokio::test]
async fn readonly_rejection_normalizes_to_readonly_kind() {
    let backend = Arc::new(FakeBackend::new(RDS_SERVICE));
    let ctx = context(&backend, true);

    let response = handle_request(
        &ctx,
        request(
            "tools/call",
            Some(json!({
                "name": "delete_db_instance",
                "arguments": {"db_instance_identifier": "db-1", "skip_final_snapshot": true},
            })),
        ),
    )
    .await
    .unwrap();

    let result = response.result.unwrap();
    assert_eq!(result["isError"], true);
    let payload = tool_payload(&result);
    assert_eq!(payload["kind"], "read_only_mode");
    assert_eq!(backend.total_calls(), 0);
}

#[tokio::test]
async fn successful_call_returns_domain_payload() {
    let backend = Arc::new(FakeBackend::new(RDS_SERVICE));
    backend.script_response(
        "DescribeDBInstances",
        json!({
            "DBInstances": [{
                "DBInstanceIdentifier": "db-1",
                "DBInstanceStatus": "available",
                "Engine": "postgres",
            }],
        }),
    );
    let ctx = context(&backend, true);

    let response = handle_request(
        &ctx,
        request(
            "tools/call",
            Some(json!({
                "name": "describe_db_instance",
                "arguments": {"db_instance_identifier": "db-1"},
            })),
        ),
    )
    .await
    .unwrap();

    let result = response.result.unwrap();
    assert_eq!(result["isError"], false);
    let payload = tool_payload(&result);
    assert_eq!(payload["instance"]["instance_id"], "db-1");
    assert_eq!(payload["instance"]["engine"], "postgres");
}
