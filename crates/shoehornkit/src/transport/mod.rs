//! HTTP transport abstraction.
//!
//! The [`Transport`] trait executes exactly one HTTP exchange. Retry,
//! authentication headers and status routing live in [`Client`](crate::Client),
//! so a transport only has to move bytes.
//!
//! # Testing
//!
//! Use [`MockTransport`] to script responses without network access:
//!
//! ```
//! use shoehornkit::transport::{MockReply, MockTransport};
//! use shoehornkit::{Client, ClientConfig};
//!
//! let mock = MockTransport::new();
//! mock.push(MockReply::json(200, &serde_json::json!({"flags": []})));
//!
//! let client = Client::with_transport(
//!     ClientConfig::new("https://portal.example.com", "test-key"),
//!     Box::new(mock.clone()),
//! ).unwrap();
//!
//! assert!(client.list_feature_flags().unwrap().is_empty());
//! assert_eq!(mock.request_count(), 1);
//! ```

pub mod http;
pub mod mock;

pub use http::UreqTransport;
pub use mock::{MockReply, MockTransport};

use crate::error::Result;
use std::fmt;

/// HTTP verbs used by the Shoehorn API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    /// Upper-case verb as sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully-built request, ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// Value of the first header with this name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Body decoded as JSON, if present and valid.
    pub fn json_body(&self) -> Option<serde_json::Value> {
        self.body
            .as_deref()
            .and_then(|b| serde_json::from_slice(b).ok())
    }

    /// Path and query of the URL, without scheme and host.
    pub fn path(&self) -> &str {
        let after_scheme = self
            .url
            .split_once("://")
            .map_or(self.url.as_str(), |(_, rest)| rest);
        after_scheme
            .find('/')
            .map_or("/", |idx| &after_scheme[idx..])
    }
}

/// A raw response: status code and body bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Executes a single HTTP exchange.
///
/// Implementations must return every status code as a response rather than
/// an error; only failures that produce no response are errors.
pub trait Transport: Send + Sync {
    /// Send the request and return the response.
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(url: &str) -> HttpRequest {
        HttpRequest {
            method: Method::Get,
            url: url.to_string(),
            headers: vec![("Accept".to_string(), "application/json".to_string())],
            body: None,
        }
    }

    #[test]
    fn test_path_strips_host() {
        let req = request("https://portal.example.com/api/v1/entities?limit=100");
        assert_eq!(req.path(), "/api/v1/entities?limit=100");
    }

    #[test]
    fn test_path_without_path_component() {
        assert_eq!(request("https://portal.example.com").path(), "/");
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let req = request("https://h/x");
        assert_eq!(req.header("accept"), Some("application/json"));
        assert_eq!(req.header("Authorization"), None);
    }

    #[test]
    fn test_response_success_range() {
        let ok = HttpResponse { status: 204, body: vec![] };
        let redirect = HttpResponse { status: 304, body: vec![] };
        assert!(ok.is_success());
        assert!(!redirect.is_success());
    }

    #[test]
    fn test_method_display() {
        assert_eq!(Method::Delete.to_string(), "DELETE");
    }
}
