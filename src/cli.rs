//! Command-line interface

use std::path::PathBuf;

use clap::Parser;

/// RDS control-plane MCP server - confirmation-gated managed-database tools
#[derive(Parser, Debug)]
#[command(name = "rds-control-mcp")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (YAML)
    #[arg(short, long, env = "RDS_MCP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Control-plane region
    #[arg(long, env = "RDS_MCP_REGION")]
    pub region: Option<String>,

    /// Allow write operations (the server is read-only by default)
    #[arg(long)]
    pub no_readonly: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RDS_MCP_LOG_LEVEL")]
    pub log_level: String,

    /// Log format (text, json)
    #[arg(long, env = "RDS_MCP_LOG_FORMAT")]
    pub log_format: Option<String>,
}
