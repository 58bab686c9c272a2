//! HTTP control-plane backend
//!
//! Concrete [`BackendClient`] speaking a JSON request/response protocol
//! against a configured per-service endpoint. Authentication is a bearer
//! token read from an environment variable named in the service config; the
//! token is injected at request time and never logged.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::config::Config;
use crate::connection::{BackendClient, ConnectionFactory};
use crate::error::{Error, Result};

/// Header carrying the `service.Operation` target, AWS JSON-protocol style
const TARGET_HEADER: &str = "x-rds-mcp-target";

/// HTTP client handle bound to one control-plane service
pub struct HttpBackend {
    service: String,
    endpoint: String,
    auth_token: Option<String>,
    client: Client,
}

impl HttpBackend {
    /// Bind a handle to a service endpoint
    ///
    /// Resolves the auth token from the configured environment variable up
    /// front; no network traffic happens until the first `call`.
    pub fn new(
        service: &str,
        endpoint: String,
        auth_token_env: Option<&str>,
        client: Client,
    ) -> Result<Self> {
        let auth_token = match auth_token_env {
            Some(var) => Some(std::env::var(var).map_err(|_| {
                Error::Config(format!(
                    "Auth token environment variable '{var}' is not set for service '{service}'"
                ))
            })?),
            None => None,
        };
        Ok(Self {
            service: service.to_string(),
            endpoint,
            auth_token,
            client,
        })
    }
}

#[async_trait]
impl BackendClient for HttpBackend {
    fn service(&self) -> &str {
        &self.service
    }

    async fn call(&self, operation: &str, params: &Value) -> Result<Value> {
        debug!(service = %self.service, operation, "control-plane call");

        let mut request = self
            .client
            .post(&self.endpoint)
            .header(TARGET_HEADER, format!("{}.{operation}", self.service))
            .json(params);
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        let body: Value = response.json().await.map_err(|e| {
            Error::Transport(format!(
                "Invalid response from '{}' for {operation}: {e}",
                self.service
            ))
        })?;

        if status.is_success() {
            return Ok(body);
        }

        // Error bodies carry `__type` (AWS JSON protocol) or `code`.
        let code = body
            .get("__type")
            .or_else(|| body.get("code"))
            .and_then(Value::as_str)
            .map_or_else(
                || format!("HTTP{}", status.as_u16()),
                |t| t.rsplit('#').next().unwrap_or(t).to_string(),
            );
        let message = body
            .get("message")
            .or_else(|| body.get("Message"))
            .and_then(Value::as_str)
            .unwrap_or("no error message provided")
            .to_string();
        Err(Error::Api { code, message })
    }
}

/// Factory producing [`HttpBackend`] handles from the server configuration
pub struct HttpConnectionFactory {
    config: Config,
    client: Client,
}

impl HttpConnectionFactory {
    /// Create a factory sharing one HTTP connection pool across services
    pub fn new(config: Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl ConnectionFactory for HttpConnectionFactory {
    async fn connect(&self, service: &str) -> Result<Arc<dyn BackendClient>> {
        let service_config = self.config.service(service)?;
        let backend = HttpBackend::new(
            service,
            service_config.endpoint,
            service_config.auth_token_env.as_deref(),
            self.client.clone(),
        )?;
        Ok(Arc::new(backend))
    }
}
