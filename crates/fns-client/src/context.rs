//! # Request Context
//!
//! Per-call cancellation and deadline, supplied by the caller.
//!
//! ```text
//!        caller
//!          │  RequestContext { timeout: 5s, cancel: token }
//!          ▼
//!   ┌──────────────────────────────────────────┐
//!   │ select!                                  │
//!   │   token.cancelled()  → Transport("request cancelled")
//!   │   timeout elapsed    → Transport("request timed out after 5s")
//!   │   transport.send()   → response / error  │
//!   └──────────────────────────────────────────┘
//! ```
//!
//! Losing the race drops the in-flight transport future, which aborts the
//! HTTP call and releases its connection.

use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::error::{FnsError, FnsResult};

/// Cancellation and timeout for a single remote operation.
#[derive(Debug, Clone)]
pub struct RequestContext {
    timeout: Option<Duration>,
    cancel: CancellationToken,
}

impl RequestContext {
    /// A context with no deadline and a fresh, never-cancelled token.
    pub fn new() -> Self {
        RequestContext {
            timeout: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Sets a deadline for the whole round trip.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Ties the call to a caller-owned cancellation token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Drives `call` until it finishes, the deadline passes, or the token fires.
    ///
    /// An already-cancelled token wins without polling `call`.
    pub async fn run<F, T>(&self, call: F) -> FnsResult<T>
    where
        F: Future<Output = FnsResult<T>>,
    {
        let bounded = async {
            match self.timeout {
                Some(limit) => tokio::time::timeout(limit, call)
                    .await
                    .map_err(|_| {
                        FnsError::Transport(format!("request timed out after {:?}", limit))
                    })
                    .and_then(|result| result),
                None => call.await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                Err(FnsError::Transport("request cancelled".to_string()))
            }
            result = bounded => result,
        }
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}
