//! The JSON-RPC dispatch engine
//!
//! [`JsonRpcServer`] binds a [`Channel`] and drives the read, decode,
//! dispatch, reply cycle. It owns the outgoing id counter and the pending
//! response table, so it acts as both server (answering requests) and client
//! (issuing requests and correlating their responses) on the same channel.
//!
//! # Message loop
//!
//! [`run`](JsonRpcServer::run) repeatedly receives a value and:
//!
//! 1. on malformed JSON, answers `ParseError` with a null id and keeps going
//! 2. on end of input, returns
//! 3. for an array (batch), processes each element in order
//! 4. for an object, decodes a [`Message`] and dispatches it
//! 5. ignores any other top-level value
//!
//! A decoded message goes to the handler with a [`Context`]. Requests get a
//! reply capability; responses first go to the callback registered for their
//! id, which is then removed whether or not it succeeded.
//!
//! # Failures
//!
//! No single message can stop the loop. Each failure turns into one error
//! response:
//!
//! | Failure                           | Error code       | Response id     |
//! |-----------------------------------|------------------|-----------------|
//! | JSON text does not parse          | `-32700`         | `null`          |
//! | JSON is not a valid message       | `-32600`         | `null`          |
//! | Handler returns `Error::Protocol` | the object's own | message id      |
//! | Handler returns any other error   | `-32603`         | message id      |
//!
//! Notifications have no id, so their failures are answered with a null id
//! unless [`NotificationErrorPolicy::Suppress`] is configured.
//!
//! Only channel failures (other than parse errors) end the loop with an error.
//!
//! # Examples
//!
//! ```rust
//! use jrpc_core::Message;
//! use jrpc_server::{from_fn, JsonRpcServer, MemoryChannel};
//! use serde_json::json;
//!
//! # #[tokio::main]
//! # async fn main() -> jrpc_core::Result<()> {
//! let (channel, mut peer) = MemoryChannel::pair();
//! peer.send_text(r#"{"jsonrpc":"2.0","method":"echo","id":1,"params":["hi"]}"#)?;
//! peer.close_sender();
//!
//! let mut server = JsonRpcServer::new(channel);
//! server
//!     .run(from_fn(|message, ctx| match message {
//!         Message::Request(request) => {
//!             let params = request.params.map(|p| p.into_value()).unwrap_or_default();
//!             ctx.respond(params)
//!         }
//!         _ => Ok(()),
//!     }))
//!     .await?;
//! server.close().await?;
//!
//! assert_eq!(
//!     peer.receive_text().await.as_deref(),
//!     Some(r#"{"jsonrpc":"2.0","id":1,"result":["hi"]}"#)
//! );
//! # Ok(())
//! # }
//! ```

use crate::builder::{NotificationErrorPolicy, ServerBuilder};
use crate::channel::Channel;
use crate::context::Context;
use crate::handler::MessageHandler;
use crate::metrics::{ErrorCategory, ServerMetrics};
use crate::pending::{
    issue_request, typed_callback, PendingResponses, RequestIdGenerator, ResponseCallback,
    TypedResponse,
};
use jrpc_core::adapter::JsonAdapter;
use jrpc_core::{
    codec, ArrayOrObject, Error, ErrorObject, IntOrString, Message, Notification, ResponseObject,
    Result,
};
use serde_json::Value;
use std::sync::Arc;

/// JSON-RPC engine bound to one channel
pub struct JsonRpcServer<C> {
    channel: C,
    ids: RequestIdGenerator,
    pending: PendingResponses,
    notification_errors: NotificationErrorPolicy,
    metrics: Option<Arc<ServerMetrics>>,
}

impl<C: Channel> JsonRpcServer<C> {
    /// Engine with default settings
    pub fn new(channel: C) -> Self {
        Self::builder(channel).build()
    }

    /// Start configuring an engine
    pub fn builder(channel: C) -> ServerBuilder<C> {
        ServerBuilder::new(channel)
    }

    pub(crate) fn from_parts(
        channel: C,
        ids: RequestIdGenerator,
        notification_errors: NotificationErrorPolicy,
        metrics: Option<Arc<ServerMetrics>>,
    ) -> Self {
        Self {
            channel,
            ids,
            pending: PendingResponses::new(),
            notification_errors,
            metrics,
        }
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    /// Give the channel back, dropping pending callbacks
    pub fn into_channel(self) -> C {
        self.channel
    }

    pub fn notification_errors(&self) -> NotificationErrorPolicy {
        self.notification_errors
    }

    /// Send a raw JSON value
    pub async fn send(&mut self, value: Value) -> Result<()> {
        self.channel.send(value).await
    }

    /// Send a message
    pub async fn send_message(&mut self, message: impl Into<Message>) -> Result<()> {
        let message = message.into();
        if let (Message::Response(response), Some(metrics)) = (&message, &self.metrics) {
            metrics.record_response(response.is_success());
        }
        self.channel.send(message.to_json()).await
    }

    /// Receive the next raw value from the channel
    pub async fn receive(&mut self) -> Result<Option<Value>> {
        self.channel.receive().await
    }

    /// Close the channel; idempotent
    pub async fn close(&mut self) -> Result<()> {
        self.channel.close().await
    }

    /// Read and advance the outgoing id counter
    pub fn next_id(&mut self) -> IntOrString {
        self.ids.next_id()
    }

    /// Park `callback` for the response with `id`
    pub fn register_response_handler<F>(&mut self, id: IntOrString, callback: F)
    where
        F: FnOnce(ResponseObject) -> Result<()> + Send + 'static,
    {
        self.pending.register(id, Box::new(callback));
        self.update_pending_gauge();
    }

    /// Park a callback that sees the response through adapters
    ///
    /// A response that does not fit the adapters fails like a handler error.
    pub fn register_typed_response_handler<RA, EA, F>(&mut self, id: IntOrString, callback: F)
    where
        RA: JsonAdapter + 'static,
        EA: JsonAdapter + 'static,
        F: FnOnce(TypedResponse<RA::Target, EA::Target>) -> Result<()> + Send + 'static,
    {
        self.pending.register(id, typed_callback::<RA, EA, F>(callback));
        self.update_pending_gauge();
    }

    pub fn has_pending(&self, id: &IntOrString) -> bool {
        self.pending.contains(id)
    }

    /// Number of outgoing requests still waiting for a response
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Send a notification
    pub async fn notify(
        &mut self,
        method: impl Into<String>,
        params: Option<ArrayOrObject>,
    ) -> Result<()> {
        self.send_message(Notification::new(method, params)).await
    }

    /// Send a request without tracking its response; returns the assigned id
    pub async fn request(
        &mut self,
        method: impl Into<String>,
        params: Option<ArrayOrObject>,
    ) -> Result<IntOrString> {
        self.issue(method.into(), params, None).await
    }

    /// Send a request and park `callback` for its response
    pub async fn request_with_handler<F>(
        &mut self,
        method: impl Into<String>,
        params: Option<ArrayOrObject>,
        callback: F,
    ) -> Result<IntOrString>
    where
        F: FnOnce(ResponseObject) -> Result<()> + Send + 'static,
    {
        self.issue(method.into(), params, Some(Box::new(callback))).await
    }

    /// Send a request whose response is converted with adapters first
    pub async fn request_typed<RA, EA, F>(
        &mut self,
        method: impl Into<String>,
        params: Option<ArrayOrObject>,
        callback: F,
    ) -> Result<IntOrString>
    where
        RA: JsonAdapter + 'static,
        EA: JsonAdapter + 'static,
        F: FnOnce(TypedResponse<RA::Target, EA::Target>) -> Result<()> + Send + 'static,
    {
        let callback = typed_callback::<RA, EA, F>(callback);
        self.issue(method.into(), params, Some(callback)).await
    }

    async fn issue(
        &mut self,
        method: String,
        params: Option<ArrayOrObject>,
        callback: Option<ResponseCallback>,
    ) -> Result<IntOrString> {
        let request = issue_request(&mut self.ids, &mut self.pending, method, params, callback);
        let id = request.id.clone();
        self.update_pending_gauge();
        self.send_message(request).await?;
        Ok(id)
    }

    /// Run the message loop until the channel reports end of input
    ///
    /// # Errors
    ///
    /// Only channel failures are returned; message and handler failures are
    /// answered on the channel and the loop continues.
    #[tracing::instrument(skip_all)]
    pub async fn run<H: MessageHandler>(&mut self, mut handler: H) -> Result<()> {
        tracing::debug!("Message loop started");
        loop {
            match self.channel.receive().await {
                Ok(Some(value)) => self.process(value, &mut handler).await?,
                Ok(None) => break,
                Err(Error::Parse(message)) => {
                    tracing::warn!(error = %message, "Received malformed JSON");
                    self.record_error(ErrorCategory::Parse);
                    let error = ErrorObject::parse_error(codec::first_line(&message));
                    self.send_message(ResponseObject::failure(None, error)).await?;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Channel receive failed");
                    return Err(e);
                }
            }
        }
        tracing::debug!(pending = self.pending.len(), "Message loop finished");
        Ok(())
    }

    /// Run the message loop, then close the channel on every exit path
    pub async fn serve<H: MessageHandler>(mut self, handler: H) -> Result<()> {
        let result = self.run(handler).await;
        let closed = self.close().await;
        result.and(closed)
    }

    /// Process one received value: a batch, a single message, or anything else
    pub async fn process<H: MessageHandler>(
        &mut self,
        value: Value,
        handler: &mut H,
    ) -> Result<()> {
        match value {
            Value::Array(items) => {
                tracing::debug!(size = items.len(), "Processing batch");
                if let Some(metrics) = &self.metrics {
                    metrics.record_batch(items.len());
                }
                for item in items {
                    self.process_message(item, handler).await?;
                }
                Ok(())
            }
            value @ Value::Object(_) => self.process_message(value, handler).await,
            other => {
                let kind = jrpc_core::KindType::of(&other);
                tracing::debug!(kind = %kind, "Ignoring non-message value");
                Ok(())
            }
        }
    }

    async fn process_message<H: MessageHandler>(
        &mut self,
        value: Value,
        handler: &mut H,
    ) -> Result<()> {
        let message = match Message::from_json(&value) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(error = %e, "Invalid request");
                self.record_error(ErrorCategory::InvalidRequest);
                let error = ErrorObject::invalid_request(e.to_string());
                return self.send_message(ResponseObject::failure(None, error)).await;
            }
        };

        let kind = kind_name(&message);
        let reply_id = message.id().cloned();
        let is_notification = message.is_notification();
        if let Some(metrics) = &self.metrics {
            metrics.record_message(kind);
        }
        tracing::debug!(kind, id = ?reply_id, method = message.method(), "Dispatching message");

        let mut outbox = Vec::new();
        let outcome = self.dispatch(message, handler, &mut outbox);

        for value in outbox {
            self.track_outgoing(&value);
            self.channel.send(value).await?;
        }

        let error = match outcome {
            Ok(()) => return Ok(()),
            Err(Error::Protocol(error)) => {
                self.record_error(ErrorCategory::Protocol);
                error
            }
            Err(e) => {
                self.record_error(ErrorCategory::Internal);
                ErrorObject::internal_error(e.to_string())
            }
        };

        if is_notification && self.notification_errors == NotificationErrorPolicy::Suppress {
            tracing::warn!(error = %error, "Notification handler failed; not replying");
            return Ok(());
        }

        tracing::warn!(error = %error, id = ?reply_id, "Handler failed");
        self.send_message(ResponseObject::failure(reply_id, error)).await
    }

    /// Hand a message to the pending callback and the handler
    fn dispatch<H: MessageHandler>(
        &mut self,
        message: Message,
        handler: &mut H,
        outbox: &mut Vec<Value>,
    ) -> Result<()> {
        let reply_to = match &message {
            Message::Request(request) => Some(request.id.clone()),
            _ => None,
        };

        let response = match message {
            Message::Response(response) => response,
            other => {
                let mut ctx = Context::new(reply_to, &mut self.ids, &mut self.pending, outbox);
                return handler.handle(other, &mut ctx);
            }
        };

        let id = response.id.clone();
        let callback = id.as_ref().and_then(|id| self.pending.take(id));
        let result = match callback {
            Some(callback) => callback(response.clone()),
            None => Ok(()),
        };
        let result = result.and_then(|()| {
            let mut ctx = Context::new(None, &mut self.ids, &mut self.pending, outbox);
            handler.handle(Message::Response(response), &mut ctx)
        });

        if let Some(id) = &id {
            self.pending.remove(id);
        }
        self.update_pending_gauge();
        result
    }

    fn track_outgoing(&self, value: &Value) {
        if let Some(metrics) = &self.metrics {
            if value.get("method").is_none() {
                metrics.record_response(value.get("error").is_none());
            }
            metrics.update_pending(self.pending.len());
        }
    }

    fn record_error(&self, category: ErrorCategory) {
        if let Some(metrics) = &self.metrics {
            metrics.record_error(category);
        }
    }

    fn update_pending_gauge(&self) {
        if let Some(metrics) = &self.metrics {
            metrics.update_pending(self.pending.len());
        }
    }
}

fn kind_name(message: &Message) -> &'static str {
    match message {
        Message::Request(_) => "request",
        Message::Notification(_) => "notification",
        Message::Response(_) => "response",
    }
}
