//! MCP protocol types (server side)

mod messages;
mod types;

pub use messages::*;
pub use types::*;

/// MCP protocol version supported by this server
pub const PROTOCOL_VERSION: &str = "2024-11-05";
