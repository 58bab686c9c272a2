//! RDS control-plane MCP server binary

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};

use rds_control_mcp::{
    backend::HttpConnectionFactory,
    cli::Cli,
    config::Config,
    server::McpServer,
    setup_tracing,
    tools::ServerContext,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = setup_tracing(&cli.log_level, cli.log_format.as_deref()) {
        eprintln!("Failed to setup tracing: {e}");
        return ExitCode::FAILURE;
    }

    let mut config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "failed to load configuration");
            return ExitCode::FAILURE;
        }
    };
    if let Some(region) = cli.region {
        config.region = region;
    }
    if cli.no_readonly {
        config.readonly = false;
    }

    info!(
        region = %config.region,
        readonly = config.readonly,
        "starting rds-control-mcp"
    );

    let factory = match HttpConnectionFactory::new(config.clone()) {
        Ok(factory) => Arc::new(factory),
        Err(e) => {
            error!(error = %e, "failed to create connection factory");
            return ExitCode::FAILURE;
        }
    };

    let ctx = Arc::new(ServerContext::new(config, factory));
    let server = McpServer::new(ctx);

    match server.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "server failed");
            ExitCode::FAILURE
        }
    }
}
