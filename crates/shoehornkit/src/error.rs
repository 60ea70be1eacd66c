//! Error types for Shoehorn API operations.
//!
//! Every failure, whether it came from the network, from the server or from
//! a local lookup, surfaces as one [`Error`]. Errors are categorized so the
//! transport can decide what to retry and callers can decide what to show.

use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// Result type alias for Shoehorn API operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Message fragments that mark a transport failure as transient.
///
/// Matched case-insensitively against the rendered transport error.
const TRANSIENT_SIGNATURES: &[&str] = &[
    "eof",
    "end of file",
    "connection reset",
    "connection refused",
    "broken pipe",
    "deadline exceeded",
    "timed out",
    "timeout",
];

/// Categories of API errors for retry logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Transient network failure (reset, refused, EOF, timeout).
    Network,
    /// Server-side failure (HTTP 5xx).
    Server,
    /// Request rejected by the server (HTTP 4xx other than 404).
    Client,
    /// The requested object does not exist.
    NotFound,
    /// The caller cancelled the operation.
    Cancelled,
    /// A payload could not be encoded or decoded.
    Format,
    /// Client configuration is incomplete or invalid.
    Config,
    /// Other/unknown errors.
    Other,
}

impl ErrorCategory {
    /// Whether this error category is typically transient and worth retrying.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network | Self::Server)
    }

    /// Get a user-friendly description of this error category.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Network => "Network connectivity issue",
            Self::Server => "Shoehorn server error",
            Self::Client => "Request rejected",
            Self::NotFound => "Object not found",
            Self::Cancelled => "Operation cancelled",
            Self::Format => "Unexpected payload",
            Self::Config => "Invalid client configuration",
            Self::Other => "Unexpected error",
        }
    }

    /// Get actionable advice for resolving this error category.
    #[must_use]
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Network => "Check connectivity to the Shoehorn host and try again",
            Self::Server => "The server may be degraded; retry later",
            Self::Client => "Check the request attributes and the API key scopes",
            Self::NotFound => "Verify the identifier, or remove the object from state",
            Self::Cancelled => "No action needed",
            Self::Format => "Check that the client and server versions match",
            Self::Config => "Set SHOEHORN_HOST and SHOEHORN_API_KEY",
            Self::Other => "Check the error details for more information",
        }
    }
}

/// Application-level error returned by the Shoehorn API.
///
/// Built from the `{code, message}` error body when the server sends one,
/// otherwise from the raw body or the canonical reason phrase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// HTTP status code of the response.
    pub status: u16,
    /// Machine-readable error code, when the body carried one.
    pub code: Option<String>,
    /// Human-readable message.
    pub message: String,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

impl ApiError {
    /// Build an error from a non-success response.
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        let raw = String::from_utf8_lossy(body).into_owned();
        let parsed: ErrorBody = serde_json::from_slice(body).unwrap_or_default();

        // Bodies in other shapes (e.g. an `errors` array) parse to empty fields
        let message = if parsed.code.is_empty() && parsed.message.is_empty() {
            if raw.is_empty() {
                status_text(status).to_string()
            } else {
                raw
            }
        } else {
            parsed.message
        };

        Self {
            status,
            code: (!parsed.code.is_empty()).then_some(parsed.code),
            message,
        }
    }

    /// Whether the status is a server error.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status >= 500
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(
                f,
                "API error (HTTP {}): {} - {}",
                self.status, code, self.message
            ),
            None => write!(f, "API error (HTTP {}): {}", self.status, self.message),
        }
    }
}

impl std::error::Error for ApiError {}

/// Canonical reason phrase for a status code.
pub fn status_text(status: u16) -> &'static str {
    ureq::http::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown Status")
}

/// Whether a transport error message matches a known transient failure.
pub fn is_transient_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    TRANSIENT_SIGNATURES.iter().any(|sig| lower.contains(sig))
}

/// Errors that can occur while talking to the Shoehorn API.
#[derive(Debug, Error)]
pub enum Error {
    /// Non-success status returned by the server.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The request never produced a response.
    #[error("executing request: {message}")]
    Transport {
        /// Rendered transport failure
        message: String,
    },

    /// Every attempt failed with a retryable error.
    #[error("request failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        /// Number of attempts made
        attempts: u32,
        /// The failure of the final attempt
        source: Box<Error>,
    },

    /// The caller's cancellation signal fired.
    #[error("operation cancelled")]
    Cancelled,

    /// A lookup over a full listing found no match.
    #[error("{kind} {key:?} not found")]
    NotFound {
        /// Kind of object looked up
        kind: &'static str,
        /// Key used for the lookup
        key: String,
    },

    /// The request body could not be serialized.
    #[error("marshaling request body: {0}")]
    Encode(#[source] serde_json::Error),

    /// A response body did not match the expected shape.
    #[error("unmarshal {context}: {source}")]
    Decode {
        /// What was being decoded
        context: &'static str,
        /// Underlying parse failure
        source: serde_json::Error,
    },

    /// Client configuration rejected at construction time.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Construct a transport error from any displayable failure.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Construct a local not-found error for a lookup key.
    pub fn not_found(kind: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            key: key.into(),
        }
    }

    /// Get the error category for retry logic.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Api(api) if api.status == 404 => ErrorCategory::NotFound,
            Error::Api(api) if api.is_server_error() => ErrorCategory::Server,
            Error::Api(_) => ErrorCategory::Client,
            Error::Transport { message } if is_transient_message(message) => {
                ErrorCategory::Network
            }
            Error::Transport { .. } => ErrorCategory::Other,
            Error::RetriesExhausted { source, .. } => source.category(),
            Error::Cancelled => ErrorCategory::Cancelled,
            Error::NotFound { .. } => ErrorCategory::NotFound,
            Error::Encode(_) | Error::Decode { .. } => ErrorCategory::Format,
            Error::Config(_) => ErrorCategory::Config,
        }
    }

    /// Whether another attempt could succeed.
    ///
    /// An exhausted retry loop is final even though its cause was transient.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Error::RetriesExhausted { .. }) && self.category().is_retryable()
    }

    /// Whether the object addressed by the request does not exist.
    pub fn is_not_found(&self) -> bool {
        self.category() == ErrorCategory::NotFound
    }

    /// HTTP status behind this error, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api(api) => Some(api.status),
            Error::RetriesExhausted { source, .. } => source.status(),
            _ => None,
        }
    }

    /// Build a decode error for the named payload.
    pub(crate) fn decode(context: &'static str, source: serde_json::Error) -> Self {
        Self::Decode { context, source }
    }
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(code) => Self::Api(ApiError {
                status: code,
                code: None,
                message: status_text(code).to_string(),
            }),
            other => Self::transport(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_parses_code_and_message() {
        let err = ApiError::from_response(409, br#"{"code":"CONFLICT","message":"slug taken"}"#);
        assert_eq!(err.status, 409);
        assert_eq!(err.code.as_deref(), Some("CONFLICT"));
        assert_eq!(err.message, "slug taken");
        assert_eq!(
            err.to_string(),
            "API error (HTTP 409): CONFLICT - slug taken"
        );
    }

    #[test]
    fn test_api_error_without_code() {
        let err = ApiError::from_response(400, br#"{"message":"name is required"}"#);
        assert!(err.code.is_none());
        assert_eq!(err.to_string(), "API error (HTTP 400): name is required");
    }

    #[test]
    fn test_api_error_falls_back_to_raw_body() {
        let body = br#"{"errors":[{"field":"slug","reason":"invalid"}]}"#;
        let err = ApiError::from_response(422, body);
        assert!(err.code.is_none());
        assert_eq!(err.message, String::from_utf8_lossy(body));
    }

    #[test]
    fn test_api_error_non_json_body() {
        let err = ApiError::from_response(403, b"forbidden by policy");
        assert_eq!(err.message, "forbidden by policy");
    }

    #[test]
    fn test_api_error_empty_body_uses_status_text() {
        let err = ApiError::from_response(404, b"");
        assert_eq!(err.message, "Not Found");
        let err = ApiError::from_response(503, b"");
        assert_eq!(err.message, "Service Unavailable");
    }

    #[test]
    fn test_transient_signatures() {
        assert!(is_transient_message("unexpected EOF"));
        assert!(is_transient_message("Connection reset by peer (os error 104)"));
        assert!(is_transient_message("Connection refused (os error 111)"));
        assert!(is_transient_message("Broken pipe (os error 32)"));
        assert!(is_transient_message("context deadline exceeded"));
        assert!(is_transient_message("timeout: global"));
        assert!(!is_transient_message("invalid certificate"));
        assert!(!is_transient_message("dns lookup failed"));
    }

    #[test]
    fn test_category_routing_by_status() {
        for status in 500..600 {
            let err = Error::Api(ApiError::from_response(status, b""));
            assert_eq!(err.category(), ErrorCategory::Server);
            assert!(err.is_retryable(), "status {status} should retry");
        }
        for status in 400..500 {
            let err = Error::Api(ApiError::from_response(status, b""));
            assert!(!err.is_retryable(), "status {status} should not retry");
        }
        assert!(Error::Api(ApiError::from_response(404, b"")).is_not_found());
    }

    #[test]
    fn test_transport_category() {
        assert!(Error::transport("connection reset by peer").is_retryable());
        assert!(!Error::transport("invalid header value").is_retryable());
    }

    #[test]
    fn test_exhausted_is_final() {
        let err = Error::RetriesExhausted {
            attempts: 3,
            source: Box::new(Error::transport("EOF")),
        };
        assert_eq!(err.category(), ErrorCategory::Network);
        assert!(!err.is_retryable());
        assert_eq!(
            err.to_string(),
            "request failed after 3 attempts: executing request: EOF"
        );
    }

    #[test]
    fn test_exhausted_keeps_status() {
        let err = Error::RetriesExhausted {
            attempts: 3,
            source: Box::new(Error::Api(ApiError::from_response(502, b"bad gateway"))),
        };
        assert_eq!(err.status(), Some(502));
    }

    #[test]
    fn test_not_found_message_carries_key() {
        let err = Error::not_found("feature flag", "new-nav");
        assert_eq!(err.to_string(), r#"feature flag "new-nav" not found"#);
        assert!(err.is_not_found());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_cancelled_is_distinct() {
        assert_eq!(Error::Cancelled.category(), ErrorCategory::Cancelled);
        assert!(!Error::Cancelled.is_retryable());
    }

    #[test]
    fn test_category_descriptions() {
        assert_eq!(ErrorCategory::Network.description(), "Network connectivity issue");
        assert!(ErrorCategory::Config.advice().contains("SHOEHORN_API_KEY"));
    }
}
