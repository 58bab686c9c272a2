//! Backend connection handles and the process-wide connection cache
//!
//! One client handle is constructed per backend service name for the lifetime
//! of the process; repeated requests return the same shared handle. The cache
//! is an explicit component (not an ambient global) so tests can substitute a
//! fake factory and assert single-construction behavior under concurrency.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::Result;

/// Service name of the database control-plane backend
pub const RDS_SERVICE: &str = "rds-control";
/// Service name of the metrics backend
pub const METRICS_SERVICE: &str = "metrics";

/// Client handle to one backend service
///
/// A page-oriented call surface: `call` issues one named operation with JSON
/// parameters and returns the raw JSON response. Handles are shared and never
/// mutated after construction.
#[async_trait]
pub trait BackendClient: Send + Sync {
    /// The service name this handle is bound to
    fn service(&self) -> &str;

    /// Issue one control-plane operation
    async fn call(&self, operation: &str, params: &Value) -> Result<Value>;
}

/// Constructs backend handles by service name
///
/// Supplied externally; construction may resolve configuration but must not
/// itself issue a backend call.
#[async_trait]
pub trait ConnectionFactory: Send + Sync {
    /// Construct a new handle for the named service
    async fn connect(&self, service: &str) -> Result<Arc<dyn BackendClient>>;
}

/// Lazily-constructed, process-wide table of backend handles
pub struct ConnectionCache {
    factory: Arc<dyn ConnectionFactory>,
    handles: Mutex<HashMap<String, Arc<dyn BackendClient>>>,
}

impl ConnectionCache {
    /// Create an empty cache over the given factory
    pub fn new(factory: Arc<dyn ConnectionFactory>) -> Self {
        Self {
            factory,
            handles: Mutex::new(HashMap::new()),
        }
    }

    /// Get the handle for a service, constructing it on first use
    ///
    /// The table lock is held across construction so concurrent first-time
    /// callers for the same service are serialized and at most one handle is
    /// built per name. Construction failures are not cached; a later call
    /// retries.
    pub async fn get(&self, service: &str) -> Result<Arc<dyn BackendClient>> {
        let mut handles = self.handles.lock().await;
        if let Some(handle) = handles.get(service) {
            return Ok(Arc::clone(handle));
        }
        debug!(service, "constructing backend connection");
        let handle = self.factory.connect(service).await?;
        handles.insert(service.to_string(), Arc::clone(&handle));
        Ok(handle)
    }
}
