//! # shoehornkit
//!
//! Blocking Rust client for the Shoehorn developer-portal REST API.
//!
//! This crate provides:
//! - An authenticated transport with bounded, cancellable retry
//! - A single typed [`Error`] for network, server and lookup failures
//! - Typed request/response models for every endpoint family
//!   (entities, teams, feature flags, API keys, policies, settings,
//!   integrations, k8s agents, roles, groups, users)
//!
//! ## Example
//!
//! ```no_run
//! use shoehornkit::{Client, ClientConfig};
//!
//! let client = Client::new(ClientConfig::new("https://portal.example.com", "shp_xxx"))
//!     .expect("invalid configuration");
//!
//! for team in client.list_teams().expect("list failed") {
//!     println!("{} ({})", team.name, team.slug);
//! }
//! ```
//!
//! ## Retry Logic
//!
//! Each call makes up to [`RetryConfig::max_attempts`] attempts. Transient
//! transport failures and 5xx responses are retried with linear backoff;
//! 4xx responses are returned immediately. Bind a [`CancelToken`] with
//! [`Client::with_cancel`] to abort a sleeping retry loop.

#![warn(clippy::all)]

pub mod api;
pub mod cancel;
pub mod error;
pub mod retry;
pub mod transport;
pub mod types;

pub use api::*;
pub use cancel::CancelToken;
pub use error::{ApiError, Error, ErrorCategory, Result};
pub use types::{ClientConfig, DEFAULT_TIMEOUT, JsonMap, RetryConfig};

use retry::{LogCallback, RetryCallback};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;
use transport::{HttpRequest, HttpResponse, Method, Transport, UreqTransport};

struct Inner {
    base_url: String,
    api_key: String,
    user_agent: String,
    retry: RetryConfig,
    transport: Box<dyn Transport>,
    callback: Box<dyn RetryCallback>,
}

/// High-level client for the Shoehorn API.
///
/// Configuration is fixed at construction. Clones share the transport and
/// are cheap; [`Client::with_cancel`] yields a clone bound to another
/// cancellation token.
#[derive(Clone)]
pub struct Client {
    inner: Arc<Inner>,
    cancel: CancelToken,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.inner.base_url)
            .field("retry", &self.inner.retry)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Create a client that talks to the network.
    ///
    /// Returns [`Error::Config`] if the host or API key is empty.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = UreqTransport::new(config.timeout);
        Self::with_transport(config, Box::new(transport))
    }

    /// Create a client with a custom transport (useful for testing).
    pub fn with_transport(config: ClientConfig, transport: Box<dyn Transport>) -> Result<Self> {
        validate(&config)?;
        Ok(Self {
            inner: Arc::new(Inner {
                base_url: config.base_url().to_string(),
                api_key: config.api_key,
                user_agent: config.user_agent,
                retry: config.retry,
                transport,
                callback: Box::new(LogCallback),
            }),
            cancel: CancelToken::new(),
        })
    }

    /// A clone of this client whose calls observe `token`.
    pub fn with_cancel(&self, token: CancelToken) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            cancel: token,
        }
    }

    /// The cancellation token bound to this client.
    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Base URL with trailing slashes removed.
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    // =========================================================================
    // Request primitives
    // =========================================================================

    /// GET `path` and return the response body.
    pub fn get(&self, path: &str) -> Result<Vec<u8>> {
        Ok(self.execute(Method::Get, path, None)?.body)
    }

    /// POST a JSON body to `path`.
    pub fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Vec<u8>> {
        let payload = encode(body)?;
        Ok(self.execute(Method::Post, path, Some(payload))?.body)
    }

    /// POST to `path` with no body.
    pub fn post_empty(&self, path: &str) -> Result<Vec<u8>> {
        Ok(self.execute(Method::Post, path, None)?.body)
    }

    /// PUT a JSON body to `path`.
    pub fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Vec<u8>> {
        let payload = encode(body)?;
        Ok(self.execute(Method::Put, path, Some(payload))?.body)
    }

    /// DELETE `path`.
    pub fn delete(&self, path: &str) -> Result<()> {
        self.execute(Method::Delete, path, None).map(|_| ())
    }

    /// DELETE `path` with a JSON body.
    pub fn delete_with_body<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<()> {
        let payload = encode(body)?;
        self.execute(Method::Delete, path, Some(payload)).map(|_| ())
    }

    /// Execute one logical request with retry.
    ///
    /// Only 2xx responses succeed. 5xx responses and transient transport
    /// failures are retried; anything else is returned at once.
    pub fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<HttpResponse> {
        let url = format!("{}{}", self.inner.base_url, path);
        let max_attempts = self.inner.retry.max_attempts.max(1);

        retry::with_retry(
            &self.inner.retry,
            self.inner.callback.as_ref(),
            &self.cancel,
            |attempt| {
                log::debug!("{} {} (attempt {}/{})", method, path, attempt + 1, max_attempts);
                let request = self.build_request(method, &url, body.clone());
                let response = self.inner.transport.execute(&request)?;

                if response.is_success() {
                    return Ok(response);
                }
                log::debug!("{} {} returned HTTP {}", method, path, response.status);
                Err(Error::Api(ApiError::from_response(
                    response.status,
                    &response.body,
                )))
            },
        )
    }

    fn build_request(&self, method: Method, url: &str, body: Option<Vec<u8>>) -> HttpRequest {
        HttpRequest {
            method,
            url: url.to_string(),
            headers: vec![
                (
                    "Authorization".to_string(),
                    format!("Bearer {}", self.inner.api_key),
                ),
                ("Content-Type".to_string(), "application/json".to_string()),
                ("Accept".to_string(), "application/json".to_string()),
                ("User-Agent".to_string(), self.inner.user_agent.clone()),
            ],
            body,
        }
    }
}

fn validate(config: &ClientConfig) -> Result<()> {
    if config.base_url().trim().is_empty() {
        return Err(Error::Config("host is required".to_string()));
    }
    if config.api_key.trim().is_empty() {
        return Err(Error::Config("API key is required".to_string()));
    }
    Ok(())
}

fn encode<B: Serialize + ?Sized>(body: &B) -> Result<Vec<u8>> {
    serde_json::to_vec(body).map_err(Error::Encode)
}

/// Decode a JSON response body.
pub(crate) fn decode<T: DeserializeOwned>(body: &[u8], context: &'static str) -> Result<T> {
    serde_json::from_slice(body).map_err(|e| Error::decode(context, e))
}
