//! Canned transport for exercising pipelines without the network.

use std::cell::RefCell;
use std::collections::HashMap;

use serde_json::Value;

use super::request::{FetchError, RequestSpec, Transport};

/// Answers each request by its label; unknown labels fail as transport errors.
#[derive(Default)]
pub struct CannedTransport {
    responses: HashMap<String, Result<Value, FetchError>>,
    calls: RefCell<Vec<String>>,
    specs: RefCell<Vec<RequestSpec>>,
}

impl CannedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, label: &str, response: Result<Value, FetchError>) -> Self {
        self.responses.insert(label.to_string(), response);
        self
    }

    /// Labels of every executed request, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn specs(&self) -> Vec<RequestSpec> {
        self.specs.borrow().clone()
    }
}

impl Transport for CannedTransport {
    fn execute(&self, spec: &RequestSpec) -> Result<Value, FetchError> {
        self.calls.borrow_mut().push(spec.label.clone());
        self.specs.borrow_mut().push(spec.clone());
        self.responses
            .get(&spec.label)
            .cloned()
            .unwrap_or_else(|| Err(FetchError::Transport(format!("no canned response for {}", spec.label))))
    }
}
