//! Generic request/response wrapper over an HTTP call.
//!
//! [`HttpClient`] normalizes every exchange into a [`Response`] that is
//! either `Ok` (2xx) or `Err` (any other status), with the body decoded as
//! JSON when the server declares a JSON content type and kept as text
//! otherwise. Connection-level failures surface as [`TransportError`].
//! The wire itself sits behind the [`Transport`] trait; [`UreqTransport`]
//! is the blocking production implementation.

mod query;
mod ureq_transport;

pub use query::{MAX_RANGE_DAYS, ShiftQuery};
pub use ureq_transport::UreqTransport;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use tracing::debug;

use crate::error::ErrorCode;

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Default path prefix the server mounts its routes under.
pub const DEFAULT_API_PREFIX: &str = "/api";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
}

impl Method {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully prepared outgoing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl Request {
    /// Case-insensitive header lookup.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// What a [`Transport`] hands back: status, declared content type, and the
/// undecoded body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

/// Errors below the HTTP status level.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The request never produced a response (DNS, refused, reset, ...).
    #[error("network request failed: {0}")]
    Network(String),

    /// The server declared JSON but the body did not parse.
    #[error("response body is not valid JSON: {0}")]
    Decode(String),

    /// The payload could not be serialized.
    #[error("request payload could not be encoded: {0}")]
    Encode(String),
}

impl TransportError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Network(_) => ErrorCode::TransportFailed,
            Self::Decode(_) => ErrorCode::ResponseDecodeFailed,
            Self::Encode(_) => ErrorCode::InternalUnexpected,
        }
    }
}

/// Sends one request and returns the raw response.
///
/// Implementations must return non-2xx responses as `Ok(RawResponse)`;
/// `Err` is reserved for failures where no response exists.
pub trait Transport {
    fn send(&self, request: &Request) -> Result<RawResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: &Request) -> Result<RawResponse, TransportError> {
        (**self).send(request)
    }
}

/// Decoded response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    Json(Value),
    Text(String),
}

impl Body {
    fn from_raw(raw: RawResponse) -> Result<Self, TransportError> {
        let is_json = raw
            .content_type
            .as_deref()
            .is_some_and(|ct| ct.contains(JSON_CONTENT_TYPE));
        if is_json {
            serde_json::from_str(&raw.body)
                .map(Self::Json)
                .map_err(|e| TransportError::Decode(e.to_string()))
        } else {
            Ok(Self::Text(raw.body))
        }
    }

    /// Deserialize a JSON body into `T`. Text bodies are an error.
    pub fn into_json<T: DeserializeOwned>(self) -> Result<T, String> {
        match self {
            Self::Json(value) => serde_json::from_value(value).map_err(|e| e.to_string()),
            Self::Text(text) => Err(format!("expected a JSON body, got text: {text:?}")),
        }
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(value) => write!(f, "{value}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// Normalized result of an HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Ok { status_code: u16, data: Body },
    Err { status_code: u16, error: Body },
}

impl Response {
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Ok { status_code, .. } | Self::Err { status_code, .. } => *status_code,
        }
    }

    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Ok { .. })
    }
}

/// Request helper bound to a server base URL.
#[derive(Debug, Clone)]
pub struct HttpClient<T> {
    transport: T,
    base_url: String,
    api_prefix: String,
}

impl<T: Transport> HttpClient<T> {
    #[must_use]
    pub fn new(transport: T, base_url: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
        }
    }

    /// Replace the route prefix (`/api` by default). An empty prefix mounts
    /// routes at the server root.
    #[must_use]
    pub fn with_api_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let trimmed = prefix.trim_matches('/');
        self.api_prefix = if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{trimmed}")
        };
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an API path such as `/schedules/1`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, self.api_prefix, path)
    }

    /// Send a request. A payload is encoded as a JSON body with a matching
    /// content type; without one no body is sent.
    pub fn request<P: Serialize + ?Sized>(
        &self,
        path: &str,
        method: Method,
        payload: Option<&P>,
    ) -> Result<Response, TransportError> {
        let mut headers = vec![("Accept".to_string(), JSON_CONTENT_TYPE.to_string())];
        let body = match payload {
            Some(payload) => {
                headers.push(("Content-Type".to_string(), JSON_CONTENT_TYPE.to_string()));
                Some(
                    serde_json::to_string(payload)
                        .map_err(|e| TransportError::Encode(e.to_string()))?,
                )
            }
            None => None,
        };

        let request = Request {
            method,
            url: self.url(path),
            headers,
            body,
        };
        debug!(method = %request.method, url = %request.url, "sending request");

        let raw = self.transport.send(&request)?;
        let status_code = raw.status;
        debug!(method = %request.method, url = %request.url, status_code, "received response");

        let body = Body::from_raw(raw)?;
        if (200..300).contains(&status_code) {
            Ok(Response::Ok {
                status_code,
                data: body,
            })
        } else {
            Ok(Response::Err {
                status_code,
                error: body,
            })
        }
    }

    pub fn get(&self, path: &str) -> Result<Response, TransportError> {
        self.request(path, Method::Get, None::<&()>)
    }

    pub fn post<P: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &P,
    ) -> Result<Response, TransportError> {
        self.request(path, Method::Post, Some(payload))
    }

    pub fn put<P: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &P,
    ) -> Result<Response, TransportError> {
        self.request(path, Method::Put, Some(payload))
    }

    pub fn patch<P: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &P,
    ) -> Result<Response, TransportError> {
        self.request(path, Method::Patch, Some(payload))
    }
}
