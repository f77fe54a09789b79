//! In-memory [`Transport`] for tests and offline tooling.
//!
//! Responses are served in the order they were pushed; every request is
//! recorded. Clones share the same script, so a test can keep a handle while
//! the store owns another.

use serde_json::Value;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::http::{JSON_CONTENT_TYPE, RawResponse, Request, Transport, TransportError};

#[derive(Debug, Default)]
struct Script {
    responses: VecDeque<Result<RawResponse, TransportError>>,
    requests: Vec<Request>,
}

#[derive(Debug, Clone, Default)]
pub struct ScriptedTransport {
    script: Rc<RefCell<Script>>,
}

impl ScriptedTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_raw(&self, response: RawResponse) {
        self.script.borrow_mut().responses.push_back(Ok(response));
    }

    pub fn push_json(&self, status: u16, body: Value) {
        self.push_raw(RawResponse {
            status,
            content_type: Some(JSON_CONTENT_TYPE.to_string()),
            body: body.to_string(),
        });
    }

    pub fn push_text(&self, status: u16, body: &str) {
        self.push_raw(RawResponse {
            status,
            content_type: Some("text/plain; charset=utf-8".to_string()),
            body: body.to_string(),
        });
    }

    pub fn push_network_error(&self, message: &str) {
        self.script
            .borrow_mut()
            .responses
            .push_back(Err(TransportError::Network(message.to_string())));
    }

    /// Every request sent so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<Request> {
        self.script.borrow().requests.clone()
    }

    #[must_use]
    pub fn request_count(&self) -> usize {
        self.script.borrow().requests.len()
    }

    #[must_use]
    pub fn last_request(&self) -> Option<Request> {
        self.script.borrow().requests.last().cloned()
    }

    /// Responses pushed but not yet consumed.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.script.borrow().responses.len()
    }
}

impl Transport for ScriptedTransport {
    fn send(&self, request: &Request) -> Result<RawResponse, TransportError> {
        let mut script = self.script.borrow_mut();
        script.requests.push(request.clone());
        script.responses.pop_front().unwrap_or_else(|| {
            Err(TransportError::Network(format!(
                "no scripted response for {} {}",
                request.method, request.url
            )))
        })
    }
}
