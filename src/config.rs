//! Configuration management

use std::collections::HashMap;
use std::path::Path;

use figment::{
    providers::{Env, Format, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::connection::{METRICS_SERVICE, RDS_SERVICE};
use crate::error::{Error, Result};

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Reject write operations when true (the default)
    pub readonly: bool,
    /// Control-plane region, used for default service endpoints
    pub region: String,
    /// Per-page record cap passed to listing operations
    pub max_records: Option<u32>,
    /// Backend service endpoints, keyed by service name
    pub services: HashMap<String, ServiceConfig>,
}

/// One backend service endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Endpoint URL
    pub endpoint: String,
    /// Name of the environment variable holding the auth token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_token_env: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            readonly: true,
            region: "us-east-1".to_string(),
            max_records: Some(100),
            services: HashMap::new(),
        }
    }
}

impl Config {
    /// Load configuration from an optional YAML file plus `RDS_MCP_` env vars
    ///
    /// Environment variables override file values; missing keys fall back to
    /// defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new();
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        figment
            .merge(Env::prefixed("RDS_MCP_").split("__"))
            .extract()
            .map_err(|e| Error::Config(format!("Failed to load configuration: {e}")))
    }

    /// Resolve the endpoint configuration for a service
    ///
    /// Explicitly configured services win; known services fall back to the
    /// regional default endpoint.
    pub fn service(&self, name: &str) -> Result<ServiceConfig> {
        if let Some(service) = self.services.get(name) {
            return Ok(service.clone());
        }
        let endpoint = match name {
            RDS_SERVICE => format!("https://rds.{}.amazonaws.com", self.region),
            METRICS_SERVICE => format!("https://monitoring.{}.amazonaws.com", self.region),
            other => {
                return Err(Error::Config(format!("Unknown backend service: {other}")));
            }
        };
        Ok(ServiceConfig {
            endpoint,
            auth_token_env: None,
        })
    }
}
