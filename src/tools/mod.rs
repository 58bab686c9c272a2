//! Tool surface: thin per-resource call sites over the core
//!
//! Each tool obtains a cached connection, runs the confirmation gate when it
//! mutates, and uses the paginated fetcher for listings. Failures are
//! normalized at the server boundary, not here.

mod cluster;
mod instance;
mod logs;
mod metrics;

use std::sync::Arc;

use serde_json::{json, Value};

use crate::config::Config;
use crate::connection::{ConnectionCache, ConnectionFactory};
use crate::error::{Error, Result};
use crate::protocol::{Tool, ToolAnnotations};

/// Shared state for all tool invocations
pub struct ServerContext {
    /// Server configuration
    pub config: Config,
    /// Process-wide backend connection cache
    pub connections: ConnectionCache,
}

impl ServerContext {
    /// Create the context over a backend connection factory
    pub fn new(config: Config, factory: Arc<dyn ConnectionFactory>) -> Self {
        Self {
            config,
            connections: ConnectionCache::new(factory),
        }
    }
}

/// All tool names exposed by this server
const TOOL_NAMES: &[&str] = &[
    "list_db_instances",
    "describe_db_instance",
    "create_db_instance",
    "modify_db_instance",
    "change_db_instance_status",
    "delete_db_instance",
    "list_db_clusters",
    "describe_db_cluster",
    "change_db_cluster_status",
    "failover_db_cluster",
    "delete_db_cluster",
    "list_db_log_files",
    "read_db_log_file",
    "list_metrics",
];

/// Whether a tool with this name exists
pub fn exists(name: &str) -> bool {
    TOOL_NAMES.contains(&name)
}

/// Whether a tool only reads control-plane state
///
/// Determined from the name prefix; everything else is a write and is
/// rejected up front in read-only mode.
pub fn is_read_only(name: &str) -> bool {
    ["list", "describe", "get", "read"]
        .iter()
        .any(|prefix| name.starts_with(prefix))
}

/// Dispatch one tool invocation
pub async fn dispatch(ctx: &ServerContext, name: &str, args: &Value) -> Result<Value> {
    if !is_read_only(name) && ctx.config.readonly {
        return Err(Error::ReadOnly {
            operation: name.to_string(),
        });
    }

    match name {
        "list_db_instances" => instance::list_instances(ctx).await,
        "describe_db_instance" => instance::describe_instance(ctx, args).await,
        "create_db_instance" => instance::create_instance(ctx, args).await,
        "modify_db_instance" => instance::modify_instance(ctx, args).await,
        "change_db_instance_status" => instance::change_status(ctx, args).await,
        "delete_db_instance" => instance::delete_instance(ctx, args).await,
        "list_db_clusters" => cluster::list_clusters(ctx).await,
        "describe_db_cluster" => cluster::describe_cluster(ctx, args).await,
        "change_db_cluster_status" => cluster::change_status(ctx, args).await,
        "failover_db_cluster" => cluster::failover_cluster(ctx, args).await,
        "delete_db_cluster" => cluster::delete_cluster(ctx, args).await,
        "list_db_log_files" => logs::list_log_files(ctx, args).await,
        "read_db_log_file" => logs::read_log_file(ctx, args).await,
        "list_metrics" => metrics::list_metrics(ctx, args).await,
        other => Err(Error::Internal(format!("Unknown tool: {other}"))),
    }
}

/// Tool definitions for `tools/list`
pub fn definitions() -> Vec<Tool> {
    vec![
        read_tool(
            "list_db_instances",
            "List all DB instances with their status, engine and endpoint.",
            json!({"type": "object", "properties": {}}),
        ),
        read_tool(
            "describe_db_instance",
            "Get detailed information about one DB instance.",
            json!({
                "type": "object",
                "properties": {
                    "db_instance_identifier": {"type": "string", "description": "The DB instance identifier"}
                },
                "required": ["db_instance_identifier"]
            }),
        ),
        write_tool(
            "create_db_instance",
            "Create a new DB instance.",
            false,
            json!({
                "type": "object",
                "properties": {
                    "db_instance_identifier": {"type": "string"},
                    "db_instance_class": {"type": "string"},
                    "engine": {"type": "string"},
                    "allocated_storage": {"type": "integer"},
                    "master_username": {"type": "string"},
                    "multi_az": {"type": "boolean"}
                },
                "required": ["db_instance_identifier", "db_instance_class", "engine"]
            }),
        ),
        write_tool(
            "modify_db_instance",
            "Modify a DB instance. Requires confirmation CONFIRM_MODIFY.",
            false,
            json!({
                "type": "object",
                "properties": {
                    "db_instance_identifier": {"type": "string"},
                    "db_instance_class": {"type": "string"},
                    "allocated_storage": {"type": "integer"},
                    "backup_retention_period": {"type": "integer"},
                    "apply_immediately": {"type": "boolean"},
                    "confirmation": {"type": "string", "description": "Confirmation value from a previous challenge"}
                },
                "required": ["db_instance_identifier"]
            }),
        ),
        write_tool(
            "change_db_instance_status",
            "Start, stop, or reboot a DB instance. Requires confirmation.",
            true,
            json!({
                "type": "object",
                "properties": {
                    "db_instance_identifier": {"type": "string"},
                    "action": {"type": "string", "enum": ["start", "stop", "reboot"]},
                    "confirmation": {"type": "string", "description": "Confirmation value from a previous challenge"}
                },
                "required": ["db_instance_identifier", "action"]
            }),
        ),
        write_tool(
            "delete_db_instance",
            "Delete a DB instance. Irreversible; the confirmation must name the exact instance.",
            true,
            json!({
                "type": "object",
                "properties": {
                    "db_instance_identifier": {"type": "string"},
                    "skip_final_snapshot": {"type": "boolean", "default": false},
                    "final_db_snapshot_identifier": {"type": "string"},
                    "confirmation": {"type": "string", "description": "Confirmation value from a previous challenge"}
                },
                "required": ["db_instance_identifier"]
            }),
        ),
        read_tool(
            "list_db_clusters",
            "List all DB clusters with their status, engine and endpoints.",
            json!({"type": "object", "properties": {}}),
        ),
        read_tool(
            "describe_db_cluster",
            "Get detailed information about one DB cluster.",
            json!({
                "type": "object",
                "properties": {
                    "db_cluster_identifier": {"type": "string", "description": "The DB cluster identifier"}
                },
                "required": ["db_cluster_identifier"]
            }),
        ),
        write_tool(
            "change_db_cluster_status",
            "Start, stop, or reboot a DB cluster. Requires confirmation.",
            true,
            json!({
                "type": "object",
                "properties": {
                    "db_cluster_identifier": {"type": "string"},
                    "action": {"type": "string", "enum": ["start", "stop", "reboot"]},
                    "confirmation": {"type": "string", "description": "Confirmation value from a previous challenge"}
                },
                "required": ["db_cluster_identifier", "action"]
            }),
        ),
        write_tool(
            "failover_db_cluster",
            "Fail over a DB cluster to a reader instance. Requires confirmation CONFIRM_FAILOVER.",
            true,
            json!({
                "type": "object",
                "properties": {
                    "db_cluster_identifier": {"type": "string"},
                    "target_db_instance_identifier": {"type": "string"},
                    "confirmation": {"type": "string", "description": "Confirmation value from a previous challenge"}
                },
                "required": ["db_cluster_identifier"]
            }),
        ),
        write_tool(
            "delete_db_cluster",
            "Delete a DB cluster. Irreversible; the confirmation must name the exact cluster.",
            true,
            json!({
                "type": "object",
                "properties": {
                    "db_cluster_identifier": {"type": "string"},
                    "skip_final_snapshot": {"type": "boolean", "default": false},
                    "final_db_snapshot_identifier": {"type": "string"},
                    "confirmation": {"type": "string", "description": "Confirmation value from a previous challenge"}
                },
                "required": ["db_cluster_identifier"]
            }),
        ),
        read_tool(
            "list_db_log_files",
            "List database log files available on a DB instance.",
            json!({
                "type": "object",
                "properties": {
                    "db_instance_identifier": {"type": "string"},
                    "filename_contains": {"type": "string", "description": "Only list files whose name contains this string"}
                },
                "required": ["db_instance_identifier"]
            }),
        ),
        read_tool(
            "read_db_log_file",
            "Read a portion of a database log file, with optional pattern filtering.",
            json!({
                "type": "object",
                "properties": {
                    "db_instance_identifier": {"type": "string"},
                    "log_file_name": {"type": "string", "description": "e.g. \"error/postgresql.log\""},
                    "marker": {"type": "string", "description": "Pagination marker from a previous call; \"0\" reads the first page"},
                    "number_of_lines": {"type": "integer", "minimum": 1, "maximum": 9999},
                    "pattern": {"type": "string", "description": "Only return lines containing this string"}
                },
                "required": ["db_instance_identifier", "log_file_name"]
            }),
        ),
        read_tool(
            "list_metrics",
            "List available metrics for a DB instance or cluster.",
            json!({
                "type": "object",
                "properties": {
                    "resource_type": {"type": "string", "enum": ["db-instance", "db-cluster"]},
                    "resource_identifier": {"type": "string"}
                },
                "required": ["resource_type", "resource_identifier"]
            }),
        ),
    ]
}

fn read_tool(name: &str, description: &str, schema: Value) -> Tool {
    Tool {
        name: name.to_string(),
        description: Some(description.to_string()),
        input_schema: schema,
        annotations: Some(ToolAnnotations {
            title: None,
            read_only_hint: Some(true),
            destructive_hint: None,
        }),
    }
}

fn write_tool(name: &str, description: &str, destructive: bool, schema: Value) -> Tool {
    Tool {
        name: name.to_string(),
        description: Some(description.to_string()),
        input_schema: schema,
        annotations: Some(ToolAnnotations {
            title: None,
            read_only_hint: Some(false),
            destructive_hint: Some(destructive),
        }),
    }
}

/// Extract a required string argument
pub(crate) fn required_str<'a>(args: &'a Value, key: &str) -> Result<&'a str> {
    args.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::InvalidParameter(format!("{key} is required")))
}

/// Extract an optional string argument
pub(crate) fn opt_str<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args.get(key).and_then(Value::as_str)
}

/// Extract an optional boolean argument
pub(crate) fn opt_bool(args: &Value, key: &str) -> Option<bool> {
    args.get(key).and_then(Value::as_bool)
}

/// Extract an optional unsigned integer argument
pub(crate) fn opt_u64(args: &Value, key: &str) -> Option<u64> {
    args.get(key).and_then(Value::as_u64)
}
