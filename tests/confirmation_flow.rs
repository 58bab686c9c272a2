//! End-to-end confirmation gating through the tool surface
//!
//! Destructive tools must never issue a backend mutation without an exact
//! matching confirmation, and must issue exactly one when approved.

use std::sync::Arc;

use serde_json::json;

use rds_control_mcp::config::Config;
use rds_control_mcp::confirmation::{CONFIRM_FAILOVER, CONFIRM_STOP};
use rds_control_mcp::connection::RDS_SERVICE;
use rds_control_mcp::error::Error;
use rds_control_mcp::testing::{FakeBackend, FakeFactory};
use rds_control_mcp::tools::{self, ServerContext};

fn writable_context(backend: &Arc<FakeBackend>) -> ServerContext {
    let factory = Arc::new(FakeFactory::default());
    factory.insert(RDS_SERVICE, Arc::clone(backend));
    let config = Config {
        readonly: false,
        ..Config::default()
    };
    ServerContext::new(config, factory)
}

fn readonly_context(backend: &Arc<FakeBackend>) -> ServerContext {
    let factory = Arc::new(FakeFactory::default());
    factory.insert(RDS_SERVICE, Arc::clone(backend));
    ServerContext::new(Config::default(), factory)
}

#[tokio::test]
async fn stop_without_confirmation_is_challenged_and_issues_no_mutation() {
    let backend = Arc::new(FakeBackend::new(RDS_SERVICE));
    let ctx = writable_context(&backend);

    let err = tools::dispatch(
        &ctx,
        "change_db_instance_status",
        &json!({"db_instance_identifier": "db-1", "action": "stop"}),
    )
    .await
    .unwrap_err();

    let Error::ConfirmationRequired(challenge) = err else {
        panic!("expected confirmation challenge");
    };
    assert_eq!(challenge.required_confirmation, CONFIRM_STOP);
    assert_eq!(challenge.identifier, "db-1");
    assert_eq!(backend.total_calls(), 0);
}

#[tokio::test]
async fn stop_with_wrong_confirmation_is_challenged_and_issues_no_mutation() {
    let backend = Arc::new(FakeBackend::new(RDS_SERVICE));
    let ctx = writable_context(&backend);

    let err = tools::dispatch(
        &ctx,
        "change_db_instance_status",
        &json!({
            "db_instance_identifier": "db-1",
            "action": "stop",
            "confirmation": "CONFIRM_START",
        }),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, Error::ConfirmationRequired(_)));
    assert_eq!(backend.total_calls(), 0);
}

#[tokio::test]
async fn stop_with_exact_confirmation_issues_one_mutation() {
    let backend = Arc::new(FakeBackend::new(RDS_SERVICE));
    backend.script_response(
        "StopDBInstance",
        json!({"DBInstance": {"DBInstanceIdentifier": "db-1", "DBInstanceStatus": "stopping"}}),
    );
    let ctx = writable_context(&backend);

    let result = tools::dispatch(
        &ctx,
        "change_db_instance_status",
        &json!({
            "db_instance_identifier": "db-1",
            "action": "stop",
            "confirmation": CONFIRM_STOP,
        }),
    )
    .await
    .unwrap();

    assert_eq!(backend.call_count("StopDBInstance"), 1);
    assert_eq!(
        backend.calls("StopDBInstance")[0]["DBInstanceIdentifier"],
        "db-1"
    );
    assert_eq!(
        result["message"],
        "DB instance db-1 has been stopped successfully."
    );
}

#[tokio::test]
async fn delete_confirmation_for_wrong_identifier_is_rejected() {
    let backend = Arc::new(FakeBackend::new(RDS_SERVICE));
    let ctx = writable_context(&backend);

    // Confirmation sentence copied from db-3's challenge, replayed at db-2.
    let err = tools::dispatch(
        &ctx,
        "delete_db_instance",
        &json!({
            "db_instance_identifier": "db-2",
            "skip_final_snapshot": true,
            "confirmation": "You are about to delete DB instance db-3. This operation cannot be undone.",
        }),
    )
    .await
    .unwrap_err();

    let Error::ConfirmationRequired(challenge) = err else {
        panic!("expected confirmation challenge");
    };
    assert!(challenge.required_confirmation.contains("db-2"));
    assert_eq!(backend.total_calls(), 0);
}

#[tokio::test]
async fn delete_with_exact_identifier_confirmation_issues_one_mutation() {
    let backend = Arc::new(FakeBackend::new(RDS_SERVICE));
    backend.script_response(
        "DeleteDBInstance",
        json!({"DBInstance": {"DBInstanceIdentifier": "db-2", "DBInstanceStatus": "deleting"}}),
    );
    let ctx = writable_context(&backend);

    tools::dispatch(
        &ctx,
        "delete_db_instance",
        &json!({
            "db_instance_identifier": "db-2",
            "skip_final_snapshot": true,
            "confirmation": "You are about to delete DB instance db-2. This operation cannot be undone.",
        }),
    )
    .await
    .unwrap();

    assert_eq!(backend.call_count("DeleteDBInstance"), 1);
    let params = &backend.calls("DeleteDBInstance")[0];
    assert_eq!(params["DBInstanceIdentifier"], "db-2");
    assert_eq!(params["SkipFinalSnapshot"], true);
}

#[tokio::test]
async fn delete_without_snapshot_choice_is_invalid_parameters() {
    let backend = Arc::new(FakeBackend::new(RDS_SERVICE));
    let ctx = writable_context(&backend);

    let err = tools::dispatch(
        &ctx,
        "delete_db_instance",
        &json!({"db_instance_identifier": "db-2"}),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, Error::InvalidParameters(_)));
    assert_eq!(backend.total_calls(), 0);
}

#[tokio::test]
async fn cluster_failover_requires_and_honors_confirmation() {
    let backend = Arc::new(FakeBackend::new(RDS_SERVICE));
    backend.script_response(
        "FailoverDBCluster",
        json!({"DBCluster": {"DBClusterIdentifier": "aurora-1", "Status": "failing-over"}}),
    );
    let ctx = writable_context(&backend);

    let err = tools::dispatch(
        &ctx,
        "failover_db_cluster",
        &json!({"db_cluster_identifier": "aurora-1"}),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Error::ConfirmationRequired(_)));
    assert_eq!(backend.total_calls(), 0);

    tools::dispatch(
        &ctx,
        "failover_db_cluster",
        &json!({
            "db_cluster_identifier": "aurora-1",
            "confirmation": CONFIRM_FAILOVER,
        }),
    )
    .await
    .unwrap();
    assert_eq!(backend.call_count("FailoverDBCluster"), 1);
}

#[tokio::test]
async fn readonly_mode_blocks_writes_before_the_gate() {
    let backend = Arc::new(FakeBackend::new(RDS_SERVICE));
    let ctx = readonly_context(&backend);

    let err = tools::dispatch(
        &ctx,
        "delete_db_instance",
        &json!({
            "db_instance_identifier": "db-1",
            "skip_final_snapshot": true,
            "confirmation": "You are about to delete DB instance db-1. This operation cannot be undone.",
        }),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, Error::ReadOnly { .. }));
    assert_eq!(backend.total_calls(), 0);
}

#[tokio::test]
async fn readonly_mode_still_allows_reads() {
    let backend = Arc::new(FakeBackend::new(RDS_SERVICE));
    backend.script_response("DescribeDBInstances", json!({"DBInstances": []}));
    let ctx = readonly_context(&backend);

    let result = tools::dispatch(&ctx, "list_db_instances", &json!({}))
        .await
        .unwrap();
    assert_eq!(result["count"], 0);
}

#[tokio::test]
async fn modify_without_changes_is_invalid_parameters() {
    let backend = Arc::new(FakeBackend::new(RDS_SERVICE));
    let ctx = writable_context(&backend);

    let err = tools::dispatch(
        &ctx,
        "modify_db_instance",
        &json!({"db_instance_identifier": "db-1"}),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, Error::InvalidParameters(_)));
    assert_eq!(backend.total_calls(), 0);
}
