//! A scripted [`Transport`] for tests.
//!
//! Responses are queued up front and handed out in FIFO order; every request
//! is recorded so tests can assert on what was sent (and how often).

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::{HttpRequest, HttpResponse, Transport, TransportError};

/// Replays queued responses and records every request it sees.
///
/// When the queue is empty, `send` fails with
/// [`TransportError::ConnectionFailed`], which looks like an unreachable
/// server to the caller.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    /// Creates a transport with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a response.
    pub fn push_response(&self, response: HttpResponse) {
        lock(&self.replies).push_back(Ok(response));
    }

    /// Queues a transport failure (no response at all).
    pub fn push_error(&self, error: TransportError) {
        lock(&self.replies).push_back(Err(error));
    }

    /// Returns a copy of every request sent so far, oldest first.
    pub fn requests(&self) -> Vec<HttpRequest> {
        lock(&self.requests).clone()
    }

    /// Number of requests sent so far.
    pub fn request_count(&self) -> usize {
        lock(&self.requests).len()
    }

    /// Number of scripted replies not yet consumed.
    pub fn pending(&self) -> usize {
        lock(&self.replies).len()
    }
}

impl Transport for ScriptedTransport {
    async fn send(
        &self,
        request: HttpRequest,
    ) -> Result<HttpResponse, TransportError> {
        lock(&self.requests).push(request);
        lock(&self.replies).pop_front().unwrap_or_else(|| {
            Err(TransportError::ConnectionFailed(
                "no scripted response".into(),
            ))
        })
    }
}

// A panic while holding one of these locks only happens inside a failing
// test, so a poisoned lock still holds usable data.
fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}
