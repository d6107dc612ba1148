//! JSON-RPC front end — turns messages into dispatcher calls and responses.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;

use crate::context::{CancellationToken, RequestContext};
use crate::types::*;

use super::dispatcher::Dispatcher;
use super::validator::validate_request;

type InFlightMap = HashMap<RequestId, CancellationToken>;

/// Wraps a [`Dispatcher`] with envelope validation, response mapping, and
/// cancellation bookkeeping for in-flight requests.
pub struct ProtocolHandler {
    dispatcher: Dispatcher,
    in_flight: Arc<Mutex<InFlightMap>>,
    initialized: AtomicBool,
}

/// A message that has passed [`ProtocolHandler::accept`]. Requests are
/// already registered as in flight; notifications have already been applied.
pub struct Accepted(Stage);

enum Stage {
    Request {
        request: JsonRpcRequest,
        guard: InFlightGuard,
    },
    Reply(Value),
    Done,
}

/// Removes its request from the in-flight map when dropped, including when
/// the task running the handler unwinds.
struct InFlightGuard {
    id: RequestId,
    token: CancellationToken,
    in_flight: Arc<Mutex<InFlightMap>>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        lock(&self.in_flight).remove(&self.id);
    }
}

fn lock(map: &Mutex<InFlightMap>) -> MutexGuard<'_, InFlightMap> {
    map.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ProtocolHandler {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
            initialized: AtomicBool::new(false),
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Whether the client has sent `notifications/initialized`.
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Number of requests currently registered as in flight.
    pub fn in_flight(&self) -> usize {
        lock(&self.in_flight).len()
    }

    /// Handle one message. Returns the response to send, if any.
    pub async fn handle_message(&self, msg: JsonRpcMessage) -> Option<Value> {
        let accepted = self.accept(msg);
        self.process(accepted).await
    }

    /// Synchronous first half of [`handle_message`](Self::handle_message).
    ///
    /// Transports call this in wire order so that a cancellation read after
    /// a request always finds that request registered.
    pub fn accept(&self, msg: JsonRpcMessage) -> Accepted {
        match msg {
            JsonRpcMessage::Request(request) => self.accept_request(request),
            JsonRpcMessage::Notification(notif) => {
                self.handle_notification(notif);
                Accepted(Stage::Done)
            }
            _ => {
                tracing::warn!("Received unexpected message type from client");
                Accepted(Stage::Done)
            }
        }
    }

    /// Run an accepted message to completion.
    pub async fn process(&self, accepted: Accepted) -> Option<Value> {
        match accepted.0 {
            Stage::Request { request, guard } => self.handle_request(request, guard).await,
            Stage::Reply(value) => Some(value),
            Stage::Done => None,
        }
    }

    fn accept_request(&self, request: JsonRpcRequest) -> Accepted {
        if let Err(e) = validate_request(&request) {
            return Accepted(Stage::Reply(error_value(&e, request.id)));
        }

        let token = CancellationToken::new();
        {
            let mut in_flight = lock(&self.in_flight);
            if in_flight.contains_key(&request.id) {
                let e = McpError::InvalidRequest(format!(
                    "request id {} is already in flight",
                    request.id
                ));
                return Accepted(Stage::Reply(error_value(&e, request.id)));
            }
            in_flight.insert(request.id.clone(), token.clone());
        }

        let guard = InFlightGuard {
            id: request.id.clone(),
            token,
            in_flight: Arc::clone(&self.in_flight),
        };
        Accepted(Stage::Request { request, guard })
    }

    async fn handle_request(
        &self,
        request: JsonRpcRequest,
        guard: InFlightGuard,
    ) -> Option<Value> {
        let id = request.id;
        let ctx = RequestContext::new(id.clone()).with_cancellation(guard.token.clone());
        let result = self
            .dispatcher
            .dispatch(&request.method, request.params, ctx)
            .await;

        let cancelled = guard.token.is_cancelled();
        drop(guard);

        if cancelled {
            tracing::debug!("Request {id} was cancelled, dropping response");
            return None;
        }

        let response = match result {
            Ok(value) => serde_json::to_value(JsonRpcResponse::new(id, value)),
            Err(e) => {
                tracing::debug!("Request {id} ({}) failed: {e}", request.method);
                serde_json::to_value(e.to_json_rpc_error(id))
            }
        };
        Some(response.unwrap_or_default())
    }

    fn handle_notification(&self, notification: JsonRpcNotification) {
        match notification.method.as_str() {
            "notifications/initialized" | "initialized" => {
                self.initialized.store(true, Ordering::SeqCst);
                tracing::info!("MCP handshake complete");
            }
            "notifications/cancelled" | "$/cancelRequest" => {
                self.handle_cancelled(notification.params);
            }
            _ => {
                tracing::debug!("Unknown notification: {}", notification.method);
            }
        }
    }

    fn handle_cancelled(&self, params: Option<Value>) {
        let params: CancelledParams = match params.map(serde_json::from_value).transpose() {
            Ok(Some(params)) => params,
            Ok(None) => {
                tracing::warn!("Cancellation notification without params");
                return;
            }
            Err(e) => {
                tracing::warn!("Malformed cancellation notification: {e}");
                return;
            }
        };

        match lock(&self.in_flight).get(&params.request_id) {
            Some(token) => {
                tracing::info!(
                    "Cancelling request {}{}",
                    params.request_id,
                    params
                        .reason
                        .as_deref()
                        .map(|r| format!(": {r}"))
                        .unwrap_or_default()
                );
                token.cancel();
            }
            None => {
                tracing::debug!("Cancellation for unknown request {}", params.request_id);
            }
        }
    }
}

fn error_value(error: &McpError, id: RequestId) -> Value {
    serde_json::to_value(error.to_json_rpc_error(id)).unwrap_or_default()
}
