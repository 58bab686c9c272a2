//! DB cluster lifecycle tools

use serde_json::{json, Value};

use super::{opt_bool, opt_str, required_str, ServerContext};
use crate::confirmation::{
    ConfirmationRequest, ConfirmationSpec, DELETE_CLUSTER, FAILOVER_CLUSTER, REBOOT_CLUSTER,
    START_CLUSTER, STOP_CLUSTER,
};
use crate::connection::RDS_SERVICE;
use crate::error::{Error, Result};
use crate::pagination::fetch_all;
use crate::records::ClusterSummary;

/// Resource type used in confirmation challenges and messages
const RESOURCE_TYPE: &str = "DB cluster";

pub(super) async fn list_clusters(ctx: &ServerContext) -> Result<Value> {
    let client = ctx.connections.get(RDS_SERVICE).await?;
    let mut params = json!({});
    if let Some(max) = ctx.config.max_records {
        params["MaxRecords"] = max.into();
    }
    let clusters = fetch_all(
        client.as_ref(),
        "DescribeDBClusters",
        params,
        "DBClusters",
        ClusterSummary::from_api,
    )
    .await?;
    Ok(json!({"count": clusters.len(), "clusters": clusters}))
}

pub(super) async fn describe_cluster(ctx: &ServerContext, args: &Value) -> Result<Value> {
    let identifier = required_str(args, "db_cluster_identifier")?;
    let client = ctx.connections.get(RDS_SERVICE).await?;
    let response = client
        .call(
            "DescribeDBClusters",
            &json!({"DBClusterIdentifier": identifier}),
        )
        .await?;
    let cluster = response
        .get("DBClusters")
        .and_then(Value::as_array)
        .and_then(|clusters| clusters.first())
        .ok_or_else(|| Error::ResourceNotFound(identifier.to_string()))?;
    Ok(json!({"cluster": ClusterSummary::from_api(cluster)}))
}

pub(super) async fn change_status(ctx: &ServerContext, args: &Value) -> Result<Value> {
    let identifier = required_str(args, "db_cluster_identifier")?;
    let action = required_str(args, "action")?;

    let (spec, operation, past_tense) = match action {
        "start" => (&START_CLUSTER, "StartDBCluster", "started"),
        "stop" => (&STOP_CLUSTER, "StopDBCluster", "stopped"),
        "reboot" => (&REBOOT_CLUSTER, "RebootDBCluster", "rebooted"),
        other => {
            return Err(Error::InvalidParameter(format!(
                "action must be one of start, stop, reboot (got '{other}')"
            )));
        }
    };

    gate(spec, identifier, args)?;

    let client = ctx.connections.get(RDS_SERVICE).await?;
    let response = client
        .call(operation, &json!({"DBClusterIdentifier": identifier}))
        .await?;
    Ok(json!({
        "message": format!("DB cluster {identifier} has been {past_tense} successfully."),
        "cluster": cluster_from_response(&response),
    }))
}

pub(super) async fn failover_cluster(ctx: &ServerContext, args: &Value) -> Result<Value> {
    let identifier = required_str(args, "db_cluster_identifier")?;

    gate(&FAILOVER_CLUSTER, identifier, args)?;

    let mut params = json!({"DBClusterIdentifier": identifier});
    if let Some(target) = opt_str(args, "target_db_instance_identifier") {
        params["TargetDBInstanceIdentifier"] = target.into();
    }

    let client = ctx.connections.get(RDS_SERVICE).await?;
    let response = client.call("FailoverDBCluster", &params).await?;
    Ok(json!({
        "message": format!("DB cluster {identifier} has been failed over successfully."),
        "cluster": cluster_from_response(&response),
    }))
}

pub(super) async fn delete_cluster(ctx: &ServerContext, args: &Value) -> Result<Value> {
    let identifier = required_str(args, "db_cluster_identifier")?;
    let skip_final_snapshot = opt_bool(args, "skip_final_snapshot").unwrap_or(false);
    let final_snapshot = opt_str(args, "final_db_snapshot_identifier");

    if !skip_final_snapshot && final_snapshot.is_none() {
        return Err(Error::InvalidParameters(
            "final_db_snapshot_identifier is required unless skip_final_snapshot is true"
                .to_string(),
        ));
    }

    gate(&DELETE_CLUSTER, identifier, args)?;

    let mut params = json!({
        "DBClusterIdentifier": identifier,
        "SkipFinalSnapshot": skip_final_snapshot,
    });
    if let Some(snapshot) = final_snapshot {
        params["FinalDBSnapshotIdentifier"] = snapshot.into();
    }

    let client = ctx.connections.get(RDS_SERVICE).await?;
    let response = client.call("DeleteDBCluster", &params).await?;
    Ok(json!({
        "message": format!("DB cluster {identifier} has been deleted successfully."),
        "cluster": cluster_from_response(&response),
    }))
}

/// Run the confirmation gate for one cluster mutation
fn gate(spec: &ConfirmationSpec, identifier: &str, args: &Value) -> Result<()> {
    spec.evaluate(&ConfirmationRequest {
        resource_type: RESOURCE_TYPE,
        identifier,
        confirmation: opt_str(args, "confirmation"),
    })
}

/// Summarize the `DBCluster` object mutation responses carry
fn cluster_from_response(response: &Value) -> Value {
    response
        .get("DBCluster")
        .map(|cluster| serde_json::to_value(ClusterSummary::from_api(cluster)).unwrap_or_default())
        .unwrap_or_default()
}
