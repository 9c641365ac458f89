//! Test doubles for code that dispatches through a [`Client`](crate::Client).
//!
//! Available in this crate's own tests and, for downstream crates, with the
//! `testing` feature:
//!
//! ```toml
//! [dev-dependencies]
//! stream-chat = { path = "../stream-chat", features = ["testing"] }
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::Method;
use serde_json::{json, Value};

use crate::error::TransportError;
use crate::transport::{RequestContext, Transport};

/// Arguments captured from one `make_request` call
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

/// Records every request and replays queued results in order. When the
/// queue is empty it answers `{"duration": "0.00ms"}`.
#[derive(Default)]
pub struct MockTransport {
    responses: Arc<Mutex<VecDeque<Result<Value, TransportError>>>>,
    calls: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response body
    pub fn push_response(&self, body: Value) {
        self.responses.lock().unwrap().push_back(Ok(body));
    }

    /// Queue a transport failure
    pub fn push_error(&self, error: TransportError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn calls(&self) -> Vec<RecordedRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_call(&self) -> Option<RecordedRequest> {
        self.calls.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn make_request(
        &self,
        ctx: &RequestContext,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<Value>,
    ) -> Result<Value, TransportError> {
        self.calls.lock().unwrap().push(RecordedRequest {
            method,
            path: path.to_string(),
            query: query.to_vec(),
            body,
        });

        let next = self.responses.lock().unwrap().pop_front();
        ctx.run(async move { next.unwrap_or_else(|| Ok(json!({ "duration": "0.00ms" }))) })
            .await
    }
}
