//! In-memory transport for tests.

use crate::error::{Error, Result};
use crate::transport::{HttpRequest, HttpResponse, Transport};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A scripted outcome for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockReply {
    /// Answer with a status and body.
    Respond(HttpResponse),
    /// Fail without a response, with this transport message.
    Fail(String),
}

impl MockReply {
    /// Respond with a JSON body.
    pub fn json<T: Serialize + ?Sized>(status: u16, body: &T) -> Self {
        Self::Respond(HttpResponse {
            status,
            body: serde_json::to_vec(body).unwrap_or_default(),
        })
    }

    /// Respond with a plain-text body (may be empty).
    pub fn status(status: u16, body: &str) -> Self {
        Self::Respond(HttpResponse {
            status,
            body: body.as_bytes().to_vec(),
        })
    }

    /// Fail at the transport level.
    pub fn fail(message: impl Into<String>) -> Self {
        Self::Fail(message.into())
    }
}

type Handler = Box<dyn FnMut(&HttpRequest) -> MockReply + Send>;

#[derive(Default)]
struct MockState {
    queue: VecDeque<MockReply>,
    handler: Option<Handler>,
    requests: Vec<HttpRequest>,
}

/// Mock transport for testing without network access.
///
/// Scripted replies are served first, in order. Once the script is empty,
/// the handler (if any) answers, which lets a closure act as a small
/// stateful server. Every request is recorded for later assertions.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    /// Create a new mock with no script and no handler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock answered entirely by `handler`.
    pub fn with_handler<F>(handler: F) -> Self
    where
        F: FnMut(&HttpRequest) -> MockReply + Send + 'static,
    {
        let mock = Self::new();
        mock.lock().handler = Some(Box::new(handler));
        mock
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue a reply.
    pub fn push(&self, reply: MockReply) {
        self.lock().queue.push_back(reply);
    }

    /// All requests seen so far.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.lock().requests.clone()
    }

    /// Number of requests seen so far.
    pub fn request_count(&self) -> usize {
        self.lock().requests.len()
    }

    /// The most recent request, if any.
    pub fn last_request(&self) -> Option<HttpRequest> {
        self.lock().requests.last().cloned()
    }
}

impl Transport for MockTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let mut state = self.lock();
        state.requests.push(request.clone());

        let reply = match state.queue.pop_front() {
            Some(reply) => reply,
            None => match state.handler.as_mut() {
                Some(handler) => handler(request),
                None => {
                    return Err(Error::transport(format!(
                        "no mock reply for {} {}",
                        request.method,
                        request.path()
                    )));
                }
            },
        };

        match reply {
            MockReply::Respond(response) => Ok(response),
            MockReply::Fail(message) => Err(Error::transport(message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::Method;

    fn get(path: &str) -> HttpRequest {
        HttpRequest {
            method: Method::Get,
            url: format!("https://h{path}"),
            headers: vec![],
            body: None,
        }
    }

    #[test]
    fn test_script_served_in_order() {
        let mock = MockTransport::new();
        mock.push(MockReply::status(500, "boom"));
        mock.push(MockReply::status(200, "ok"));

        assert_eq!(mock.execute(&get("/a")).unwrap().status, 500);
        assert_eq!(mock.execute(&get("/b")).unwrap().status, 200);
        assert_eq!(mock.request_count(), 2);
        assert_eq!(mock.last_request().unwrap().path(), "/b");
    }

    #[test]
    fn test_handler_answers_after_script() {
        let mock = MockTransport::with_handler(|req| MockReply::status(200, req.path()));
        mock.push(MockReply::fail("connection reset"));

        assert!(mock.execute(&get("/x")).is_err());
        let resp = mock.execute(&get("/y")).unwrap();
        assert_eq!(resp.body, b"/y");
    }

    #[test]
    fn test_unscripted_request_is_terminal_error() {
        let mock = MockTransport::new();
        let err = mock.execute(&get("/nothing")).unwrap_err();
        assert!(!err.is_retryable());
    }
}
