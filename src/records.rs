//! Domain records built from raw control-plane page items
//!
//! Each transform is pure and total: well-formed or partially-formed items
//! always map to a record, with absent fields left as `None` or defaults.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// DB instance connection endpoint
#[derive(Debug, Clone, Serialize)]
pub struct InstanceEndpoint {
    /// DNS address
    pub address: Option<String>,
    /// Listener port
    pub port: Option<i64>,
}

/// DB instance storage configuration
#[derive(Debug, Clone, Serialize)]
pub struct InstanceStorage {
    /// Storage type
    #[serde(rename = "type")]
    pub storage_type: Option<String>,
    /// Allocated size in gibibytes
    pub allocated: Option<i64>,
    /// Whether storage is encrypted
    pub encrypted: Option<bool>,
}

/// Summary of one DB instance
#[derive(Debug, Clone, Serialize)]
pub struct InstanceSummary {
    /// Instance identifier
    pub instance_id: Option<String>,
    /// Current status
    pub status: Option<String>,
    /// Database engine
    pub engine: Option<String>,
    /// Engine version
    pub engine_version: Option<String>,
    /// Compute/memory class
    pub instance_class: Option<String>,
    /// Connection endpoint
    pub endpoint: InstanceEndpoint,
    /// Availability zone
    pub availability_zone: Option<String>,
    /// Whether the instance is a Multi-AZ deployment
    pub multi_az: bool,
    /// Storage configuration
    pub storage: InstanceStorage,
    /// Whether the instance is publicly accessible
    pub publicly_accessible: bool,
    /// Owning cluster identifier, if any
    pub db_cluster: Option<String>,
}

impl InstanceSummary {
    /// Build a summary from one raw `DBInstance` item
    pub fn from_api(item: &Value) -> Self {
        Self {
            instance_id: str_field(item, "DBInstanceIdentifier"),
            status: str_field(item, "DBInstanceStatus"),
            engine: str_field(item, "Engine"),
            engine_version: str_field(item, "EngineVersion"),
            instance_class: str_field(item, "DBInstanceClass"),
            endpoint: InstanceEndpoint {
                address: item
                    .get("Endpoint")
                    .and_then(|e| str_field(e, "Address")),
                port: item
                    .get("Endpoint")
                    .and_then(|e| e.get("Port"))
                    .and_then(Value::as_i64),
            },
            availability_zone: str_field(item, "AvailabilityZone"),
            multi_az: bool_field(item, "MultiAZ"),
            storage: InstanceStorage {
                storage_type: str_field(item, "StorageType"),
                allocated: item.get("AllocatedStorage").and_then(Value::as_i64),
                encrypted: item.get("StorageEncrypted").and_then(Value::as_bool),
            },
            publicly_accessible: bool_field(item, "PubliclyAccessible"),
            db_cluster: str_field(item, "DBClusterIdentifier"),
        }
    }
}

/// A member instance of a DB cluster
#[derive(Debug, Clone, Serialize)]
pub struct ClusterMember {
    /// Member instance identifier
    pub instance_id: Option<String>,
    /// Whether this member is the writer
    pub is_writer: bool,
}

/// Summary of one DB cluster
#[derive(Debug, Clone, Serialize)]
pub struct ClusterSummary {
    /// Cluster identifier
    pub cluster_id: Option<String>,
    /// Current status
    pub status: Option<String>,
    /// Database engine
    pub engine: Option<String>,
    /// Engine version
    pub engine_version: Option<String>,
    /// Writer endpoint
    pub endpoint: Option<String>,
    /// Reader endpoint
    pub reader_endpoint: Option<String>,
    /// Whether the cluster spans availability zones
    pub multi_az: bool,
    /// Backup retention period in days
    pub backup_retention: Option<i64>,
    /// Member instances
    pub members: Vec<ClusterMember>,
}

impl ClusterSummary {
    /// Build a summary from one raw `DBCluster` item
    pub fn from_api(item: &Value) -> Self {
        let members = item
            .get("DBClusterMembers")
            .and_then(Value::as_array)
            .map(|members| {
                members
                    .iter()
                    .map(|m| ClusterMember {
                        instance_id: str_field(m, "DBInstanceIdentifier"),
                        is_writer: bool_field(m, "IsClusterWriter"),
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self {
            cluster_id: str_field(item, "DBClusterIdentifier"),
            status: str_field(item, "Status"),
            engine: str_field(item, "Engine"),
            engine_version: str_field(item, "EngineVersion"),
            endpoint: str_field(item, "Endpoint"),
            reader_endpoint: str_field(item, "ReaderEndpoint"),
            multi_az: bool_field(item, "MultiAZ"),
            backup_retention: item.get("BackupRetentionPeriod").and_then(Value::as_i64),
            members,
        }
    }
}

/// One database log file
#[derive(Debug, Clone, Serialize)]
pub struct LogFileEntry {
    /// Log file name
    pub name: Option<String>,
    /// Last-written time
    pub last_written: Option<DateTime<Utc>>,
    /// File size in bytes
    pub size: Option<i64>,
}

impl LogFileEntry {
    /// Build an entry from one raw `DescribeDBLogFiles` item
    pub fn from_api(item: &Value) -> Self {
        Self {
            name: str_field(item, "LogFileName"),
            // The API reports LastWritten as milliseconds since the epoch.
            last_written: item
                .get("LastWritten")
                .and_then(Value::as_i64)
                .and_then(DateTime::from_timestamp_millis),
            size: item.get("Size").and_then(Value::as_i64),
        }
    }
}

/// One available metric
#[derive(Debug, Clone, Serialize)]
pub struct MetricEntry {
    /// Metric namespace
    pub namespace: String,
    /// Metric name
    pub metric_name: Option<String>,
}

impl MetricEntry {
    /// Build an entry from one raw `ListMetrics` item
    pub fn from_api(item: &Value) -> Self {
        Self {
            namespace: str_field(item, "Namespace").unwrap_or_else(|| "AWS/RDS".to_string()),
            metric_name: str_field(item, "MetricName"),
        }
    }
}

fn str_field(item: &Value, key: &str) -> Option<String> {
    item.get(key).and_then(Value::as_str).map(str::to_string)
}

fn bool_field(item: &Value, key: &str) -> bool {
    item.get(key).and_then(Value::as_bool).unwrap_or(false)
}
