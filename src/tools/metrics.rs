//! Metrics discovery tools

use serde_json::{json, Value};

use super::{required_str, ServerContext};
use crate::connection::METRICS_SERVICE;
use crate::error::{Error, Result};
use crate::pagination::fetch_all;
use crate::records::MetricEntry;

/// Metric namespace for managed database resources
const NAMESPACE: &str = "AWS/RDS";

pub(super) async fn list_metrics(ctx: &ServerContext, args: &Value) -> Result<Value> {
    let resource_type = required_str(args, "resource_type")?;
    let identifier = required_str(args, "resource_identifier")?;

    let dimension_name = match resource_type {
        "db-instance" => "DBInstanceIdentifier",
        "db-cluster" => "DBClusterIdentifier",
        other => {
            return Err(Error::InvalidParameter(format!(
                "resource_type must be 'db-instance' or 'db-cluster' (got '{other}')"
            )));
        }
    };

    let params = json!({
        "Namespace": NAMESPACE,
        "Dimensions": [{"Name": dimension_name, "Value": identifier}],
    });

    let client = ctx.connections.get(METRICS_SERVICE).await?;
    let metrics = fetch_all(
        client.as_ref(),
        "ListMetrics",
        params,
        "Metrics",
        MetricEntry::from_api,
    )
    .await?;
    Ok(json!({
        "resource_type": resource_type,
        "resource_identifier": identifier,
        "count": metrics.len(),
        "metrics": metrics,
    }))
}
