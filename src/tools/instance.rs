//! DB instance lifecycle tools

use serde_json::{json, Value};

use super::{opt_bool, opt_str, opt_u64, required_str, ServerContext};
use crate::confirmation::{
    ConfirmationRequest, ConfirmationSpec, DELETE_INSTANCE, MODIFY_INSTANCE, REBOOT_INSTANCE,
    START_INSTANCE, STOP_INSTANCE,
};
use crate::connection::RDS_SERVICE;
use crate::error::{Error, Result};
use crate::pagination::fetch_all;
use crate::records::InstanceSummary;

/// Resource type used in confirmation challenges and messages
const RESOURCE_TYPE: &str = "DB instance";

pub(super) async fn list_instances(ctx: &ServerContext) -> Result<Value> {
    let client = ctx.connections.get(RDS_SERVICE).await?;
    let mut params = json!({});
    if let Some(max) = ctx.config.max_records {
        params["MaxRecords"] = max.into();
    }
    let instances = fetch_all(
        client.as_ref(),
        "DescribeDBInstances",
        params,
        "DBInstances",
        InstanceSummary::from_api,
    )
    .await?;
    Ok(json!({"count": instances.len(), "instances": instances}))
}

pub(super) async fn describe_instance(ctx: &ServerContext, args: &Value) -> Result<Value> {
    let identifier = required_str(args, "db_instance_identifier")?;
    let client = ctx.connections.get(RDS_SERVICE).await?;
    let response = client
        .call(
            "DescribeDBInstances",
            &json!({"DBInstanceIdentifier": identifier}),
        )
        .await?;
    let instance = response
        .get("DBInstances")
        .and_then(Value::as_array)
        .and_then(|instances| instances.first())
        .ok_or_else(|| Error::ResourceNotFound(identifier.to_string()))?;
    Ok(json!({"instance": InstanceSummary::from_api(instance)}))
}

pub(super) async fn create_instance(ctx: &ServerContext, args: &Value) -> Result<Value> {
    let identifier = required_str(args, "db_instance_identifier")?;
    let instance_class = required_str(args, "db_instance_class")?;
    let engine = required_str(args, "engine")?;

    let mut params = json!({
        "DBInstanceIdentifier": identifier,
        "DBInstanceClass": instance_class,
        "Engine": engine,
        "Tags": [
            {"Key": "created_by", "Value": "rds-control-mcp"},
            {"Key": "mcp_server_version", "Value": crate::SERVER_VERSION},
        ],
    });
    if let Some(storage) = opt_u64(args, "allocated_storage") {
        params["AllocatedStorage"] = storage.into();
    }
    if let Some(username) = opt_str(args, "master_username") {
        params["MasterUsername"] = username.into();
    }
    if let Some(multi_az) = opt_bool(args, "multi_az") {
        params["MultiAZ"] = multi_az.into();
    }

    let client = ctx.connections.get(RDS_SERVICE).await?;
    let response = client.call("CreateDBInstance", &params).await?;
    Ok(json!({
        "message": format!("DB instance {identifier} has been created successfully."),
        "instance": instance_from_response(&response),
    }))
}

pub(super) async fn modify_instance(ctx: &ServerContext, args: &Value) -> Result<Value> {
    let identifier = required_str(args, "db_instance_identifier")?;

    let mut params = json!({"DBInstanceIdentifier": identifier});
    let mut changed = false;
    if let Some(class) = opt_str(args, "db_instance_class") {
        params["DBInstanceClass"] = class.into();
        changed = true;
    }
    if let Some(storage) = opt_u64(args, "allocated_storage") {
        params["AllocatedStorage"] = storage.into();
        changed = true;
    }
    if let Some(retention) = opt_u64(args, "backup_retention_period") {
        params["BackupRetentionPeriod"] = retention.into();
        changed = true;
    }
    if !changed {
        return Err(Error::InvalidParameters(
            "no modifications specified".to_string(),
        ));
    }
    if let Some(apply) = opt_bool(args, "apply_immediately") {
        params["ApplyImmediately"] = apply.into();
    }

    gate(&MODIFY_INSTANCE, identifier, args)?;

    let client = ctx.connections.get(RDS_SERVICE).await?;
    let response = client.call("ModifyDBInstance", &params).await?;
    Ok(json!({
        "message": format!("DB instance {identifier} has been modified successfully."),
        "instance": instance_from_response(&response),
    }))
}

pub(super) async fn change_status(ctx: &ServerContext, args: &Value) -> Result<Value> {
    let identifier = required_str(args, "db_instance_identifier")?;
    let action = required_str(args, "action")?;

    let (spec, operation, past_tense) = match action {
        "start" => (&START_INSTANCE, "StartDBInstance", "started"),
        "stop" => (&STOP_INSTANCE, "StopDBInstance", "stopped"),
        "reboot" => (&REBOOT_INSTANCE, "RebootDBInstance", "rebooted"),
        other => {
            return Err(Error::InvalidParameter(format!(
                "action must be one of start, stop, reboot (got '{other}')"
            )));
        }
    };

    gate(spec, identifier, args)?;

    let client = ctx.connections.get(RDS_SERVICE).await?;
    let response = client
        .call(operation, &json!({"DBInstanceIdentifier": identifier}))
        .await?;
    Ok(json!({
        "message": format!("DB instance {identifier} has been {past_tense} successfully."),
        "instance": instance_from_response(&response),
    }))
}

pub(super) async fn delete_instance(ctx: &ServerContext, args: &Value) -> Result<Value> {
    let identifier = required_str(args, "db_instance_identifier")?;
    let skip_final_snapshot = opt_bool(args, "skip_final_snapshot").unwrap_or(false);
    let final_snapshot = opt_str(args, "final_db_snapshot_identifier");

    if !skip_final_snapshot && final_snapshot.is_none() {
        return Err(Error::InvalidParameters(
            "final_db_snapshot_identifier is required unless skip_final_snapshot is true"
                .to_string(),
        ));
    }

    gate(&DELETE_INSTANCE, identifier, args)?;

    let mut params = json!({
        "DBInstanceIdentifier": identifier,
        "SkipFinalSnapshot": skip_final_snapshot,
    });
    if let Some(snapshot) = final_snapshot {
        params["FinalDBSnapshotIdentifier"] = snapshot.into();
    }

    let client = ctx.connections.get(RDS_SERVICE).await?;
    let response = client.call("DeleteDBInstance", &params).await?;
    Ok(json!({
        "message": format!("DB instance {identifier} has been deleted successfully."),
        "instance": instance_from_response(&response),
    }))
}

/// Run the confirmation gate for one instance mutation
fn gate(spec: &ConfirmationSpec, identifier: &str, args: &Value) -> Result<()> {
    spec.evaluate(&ConfirmationRequest {
        resource_type: RESOURCE_TYPE,
        identifier,
        confirmation: opt_str(args, "confirmation"),
    })
}

/// Summarize the `DBInstance` object mutation responses carry
fn instance_from_response(response: &Value) -> Value {
    response
        .get("DBInstance")
        .map(|instance| serde_json::to_value(InstanceSummary::from_api(instance)).unwrap_or_default())
        .unwrap_or_default()
}
