//! Blocking transport backed by a `ureq` agent.

use crate::error::Result;
use crate::transport::{HttpRequest, HttpResponse, Method, Transport};
use std::time::Duration;

/// Maximum response size accepted from the API.
const MAX_BODY_SIZE: u64 = 32 * 1024 * 1024;

/// Transport that sends requests over the network.
///
/// The agent is configured to hand every status code back as a response,
/// leaving status routing to the client.
pub struct UreqTransport {
    /// HTTP agent for requests.
    agent: ureq::Agent,
}

impl UreqTransport {
    /// Create a transport whose requests time out after `timeout`.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build();
        Self {
            agent: config.into(),
        }
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    request: &HttpRequest,
) -> ureq::RequestBuilder<B> {
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn send_with_body(
    builder: ureq::RequestBuilder<ureq::typestate::WithBody>,
    request: &HttpRequest,
) -> std::result::Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    let builder = with_headers(builder, request);
    match &request.body {
        Some(body) => builder.send(body.as_slice()),
        None => builder.send_empty(),
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let url = request.url.as_str();
        let mut response = match (request.method, &request.body) {
            (Method::Get, _) => with_headers(self.agent.get(url), request).call()?,
            (Method::Post, _) => send_with_body(self.agent.post(url), request)?,
            (Method::Put, _) => send_with_body(self.agent.put(url), request)?,
            (Method::Delete, None) => with_headers(self.agent.delete(url), request).call()?,
            (Method::Delete, Some(_)) => {
                send_with_body(self.agent.delete(url).force_send_body(), request)?
            }
        };

        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .with_config()
            .limit(MAX_BODY_SIZE)
            .read_to_vec()?;

        Ok(HttpResponse { status, body })
    }
}
