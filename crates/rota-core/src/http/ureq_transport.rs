use super::{RawResponse, Request, Transport, TransportError};

/// Blocking [`Transport`] backed by a `ureq` agent.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    #[must_use]
    pub fn new() -> Self {
        Self {
            agent: ureq::AgentBuilder::new().build(),
        }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: &Request) -> Result<RawResponse, TransportError> {
        let mut call = self.agent.request(request.method.as_str(), &request.url);
        for (name, value) in &request.headers {
            call = call.set(name, value);
        }

        let result = match &request.body {
            Some(body) => call.send_string(body),
            None => call.call(),
        };

        // ureq reports 4xx/5xx as errors; they are ordinary responses here.
        let response = match result {
            Ok(response) | Err(ureq::Error::Status(_, response)) => response,
            Err(ureq::Error::Transport(err)) => {
                return Err(TransportError::Network(err.to_string()));
            }
        };

        let status = response.status();
        let content_type = response.header("content-type").map(str::to_string);
        let body = response
            .into_string()
            .map_err(|e| TransportError::Network(format!("failed to read response body: {e}")))?;

        Ok(RawResponse {
            status,
            content_type,
            body,
        })
    }
}
