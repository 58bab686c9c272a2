//! In-memory fakes for exercising the core without a real control plane
//!
//! `FakeBackend` serves scripted pages per operation and records every call,
//! so tests can assert mutation counts and pagination behavior. `FakeFactory`
//! hands out fakes through the [`ConnectionFactory`] seam and counts
//! constructions.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::connection::{BackendClient, ConnectionFactory};
use crate::error::{Error, Result};

/// Scripted backend handle recording all calls
pub struct FakeBackend {
    service: String,
    pages: Mutex<HashMap<String, VecDeque<Value>>>,
    errors: Mutex<HashMap<String, (String, String)>>,
    calls: Mutex<Vec<(String, Value)>>,
}

impl FakeBackend {
    /// Create a fake handle for the named service
    pub fn new(service: &str) -> Self {
        Self {
            service: service.to_string(),
            pages: Mutex::new(HashMap::new()),
            errors: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queue responses for an operation, served one per call in order
    pub fn script_pages(&self, operation: &str, pages: Vec<Value>) {
        self.pages
            .lock()
            .unwrap()
            .entry(operation.to_string())
            .or_default()
            .extend(pages);
    }

    /// Queue a single response for an operation
    pub fn script_response(&self, operation: &str, response: Value) {
        self.script_pages(operation, vec![response]);
    }

    /// Make an operation fail once its scripted pages are exhausted
    pub fn fail_after_scripted_pages(&self, operation: &str, code: &str, message: &str) {
        self.errors.lock().unwrap().insert(
            operation.to_string(),
            (code.to_string(), message.to_string()),
        );
    }

    /// Number of calls recorded for an operation
    pub fn call_count(&self, operation: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(op, _)| op == operation)
            .count()
    }

    /// Parameters of every recorded call for an operation, in order
    pub fn calls(&self, operation: &str) -> Vec<Value> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(op, _)| op == operation)
            .map(|(_, params)| params.clone())
            .collect()
    }

    /// Total number of recorded calls, across all operations
    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl BackendClient for FakeBackend {
    fn service(&self) -> &str {
        &self.service
    }

    async fn call(&self, operation: &str, params: &Value) -> Result<Value> {
        self.calls
            .lock()
            .unwrap()
            .push((operation.to_string(), params.clone()));

        if let Some(page) = self
            .pages
            .lock()
            .unwrap()
            .get_mut(operation)
            .and_then(VecDeque::pop_front)
        {
            return Ok(page);
        }
        if let Some((code, message)) = self.errors.lock().unwrap().get(operation) {
            return Err(Error::api(code.clone(), message.clone()));
        }
        Ok(json!({}))
    }
}

/// Connection factory serving pre-registered fakes and counting constructions
#[derive(Default)]
pub struct FakeFactory {
    prepared: Mutex<HashMap<String, Arc<FakeBackend>>>,
    constructed: Mutex<HashMap<String, usize>>,
    fail_next: AtomicBool,
}

impl FakeFactory {
    /// Register the fake to hand out for a service
    pub fn insert(&self, service: &str, backend: Arc<FakeBackend>) {
        self.prepared
            .lock()
            .unwrap()
            .insert(service.to_string(), backend);
    }

    /// How many handles have been constructed for a service
    pub fn constructions(&self, service: &str) -> usize {
        self.constructed
            .lock()
            .unwrap()
            .get(service)
            .copied()
            .unwrap_or(0)
    }

    /// Make the next `connect` fail (once)
    pub fn fail_next_connect(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl ConnectionFactory for FakeFactory {
    async fn connect(&self, service: &str) -> Result<Arc<dyn BackendClient>> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(Error::Transport(
                "injected construction failure".to_string(),
            ));
        }
        let backend = self
            .prepared
            .lock()
            .unwrap()
            .get(service)
            .cloned()
            .unwrap_or_else(|| Arc::new(FakeBackend::new(service)));
        *self
            .constructed
            .lock()
            .unwrap()
            .entry(service.to_string())
            .or_insert(0) += 1;
        Ok(backend)
    }
}
