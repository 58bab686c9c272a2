//! RDS control-plane MCP server
//!
//! Exposes managed-database control-plane operations (instance and cluster
//! lifecycle, metrics discovery, log retrieval) as MCP tools, as a
//! safety-aware façade over the remote control API.
//!
//! # Safety model
//!
//! - **Confirmation gate**: destructive operations never execute on a single
//!   call. The first call returns a challenge naming the operation, resource,
//!   and risk level; the caller must resubmit with the exact confirmation
//!   value. Delete confirmations embed the resource identifier so a value
//!   copied from another resource's challenge never matches.
//! - **Read-only by default**: write operations are rejected unless the
//!   server is started with `--no-readonly`.
//! - **Normalized failures**: every failure is remapped to a closed taxonomy
//!   with stable kinds and templated messages; raw backend diagnostics never
//!   reach the caller.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod backend;
pub mod cli;
pub mod config;
pub mod confirmation;
pub mod connection;
pub mod error;
pub mod normalize;
pub mod pagination;
pub mod protocol;
pub mod records;
pub mod server;
#[doc(hidden)]
pub mod testing;
pub mod tools;

pub use error::{Error, Result};

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Server version, stamped into resource tags and the initialize response
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Setup tracing/logging
///
/// Log output goes to stderr; stdout carries the MCP protocol.
pub fn setup_tracing(level: &str, format: Option<&str>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::registry().with(filter);

    match format {
        Some("json") => {
            subscriber
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            subscriber
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    Ok(())
}
