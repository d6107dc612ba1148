//! Per-request context handed to every handler invocation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;
use tracing::Span;

use crate::types::RequestId;

/// Cooperative cancellation signal shared between the protocol layer and a
/// running handler. Clones observe the same signal.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    inner: Arc<CancellationState>,
}

#[derive(Debug, Default)]
struct CancellationState {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trip the signal. Idempotent.
    pub fn cancel(&self) {
        if !self.inner.cancelled.swap(true, Ordering::SeqCst) {
            self.inner.notify.notify_waiters();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves once [`cancel`](Self::cancel) has been called.
    pub async fn cancelled(&self) {
        loop {
            let notified = self.inner.notify.notified();
            tokio::pin!(notified);
            // Register before checking the flag so a concurrent cancel is not missed.
            notified.as_mut().enable();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

/// Explicit capability bundle for one request: its id, its cancellation
/// signal, and the tracing span handlers should log under.
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: Option<RequestId>,
    cancellation: CancellationToken,
    span: Span,
}

impl RequestContext {
    pub fn new(request_id: RequestId) -> Self {
        let span = tracing::debug_span!("request", id = %request_id);
        Self {
            request_id: Some(request_id),
            cancellation: CancellationToken::new(),
            span,
        }
    }

    /// A context not tied to any client request, e.g. for local introspection.
    pub fn detached() -> Self {
        Self {
            request_id: None,
            cancellation: CancellationToken::new(),
            span: Span::current(),
        }
    }

    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    pub fn span(&self) -> &Span {
        &self.span
    }
}
