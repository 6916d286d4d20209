//! Per-message handler context
//!
//! A [`Context`] is handed to the message handler together with each decoded
//! message. It is the handler's only way to talk back to the peer:
//!
//! - for a **request** it carries the reply capability, so the handler can
//!   [`respond`](Context::respond) exactly once
//! - for every message it can send new requests and notifications, which
//!   share the engine's id counter and pending response table
//!
//! Outgoing messages are queued and written to the channel, in order, as
//! soon as the handler returns.

use crate::pending::{
    issue_request, typed_callback, PendingResponses, RequestIdGenerator, ResponseCallback,
    TypedResponse,
};
use jrpc_core::adapter::JsonAdapter;
use jrpc_core::{
    ArrayOrObject, Error, ErrorObject, IntOrString, Message, Notification, ResponseObject, Result,
};
use serde_json::Value;

/// Reply capability and outbound queue for one handler invocation
pub struct Context<'a> {
    reply_to: Option<IntOrString>,
    ids: &'a mut RequestIdGenerator,
    pending: &'a mut PendingResponses,
    outbox: &'a mut Vec<Value>,
}

impl<'a> Context<'a> {
    pub(crate) fn new(
        reply_to: Option<IntOrString>,
        ids: &'a mut RequestIdGenerator,
        pending: &'a mut PendingResponses,
        outbox: &'a mut Vec<Value>,
    ) -> Self {
        Self {
            reply_to,
            ids,
            pending,
            outbox,
        }
    }

    /// Id of the request awaiting an answer, if any
    pub fn reply_to(&self) -> Option<&IntOrString> {
        self.reply_to.as_ref()
    }

    /// Whether [`respond`](Self::respond) is still possible
    pub fn can_respond(&self) -> bool {
        self.reply_to.is_some()
    }

    /// Answer the current request with a result
    ///
    /// # Errors
    ///
    /// `Error::NotReplyable` for notifications and responses, and for a
    /// request that was already answered.
    pub fn respond(&mut self, result: Value) -> Result<()> {
        let id = self.reply_to.take().ok_or(Error::NotReplyable)?;
        self.queue(ResponseObject::success(Some(id), result).into());
        Ok(())
    }

    /// Answer the current request with an error
    pub fn respond_error(&mut self, error: ErrorObject) -> Result<()> {
        let id = self.reply_to.take().ok_or(Error::NotReplyable)?;
        self.queue(ResponseObject::failure(Some(id), error).into());
        Ok(())
    }

    /// Queue any message for sending
    pub fn send(&mut self, message: impl Into<Message>) {
        self.queue(message.into());
    }

    /// Queue a notification
    pub fn notify(&mut self, method: impl Into<String>, params: Option<ArrayOrObject>) {
        self.queue(Notification::new(method, params).into());
    }

    /// Queue a request without tracking its response; returns the assigned id
    pub fn request(
        &mut self,
        method: impl Into<String>,
        params: Option<ArrayOrObject>,
    ) -> IntOrString {
        self.issue(method.into(), params, None)
    }

    /// Queue a request and park `callback` for its response
    pub fn request_with_handler<F>(
        &mut self,
        method: impl Into<String>,
        params: Option<ArrayOrObject>,
        callback: F,
    ) -> IntOrString
    where
        F: FnOnce(ResponseObject) -> Result<()> + Send + 'static,
    {
        self.issue(method.into(), params, Some(Box::new(callback)))
    }

    /// Queue a request whose response is converted with adapters first
    pub fn request_typed<RA, EA, F>(
        &mut self,
        method: impl Into<String>,
        params: Option<ArrayOrObject>,
        callback: F,
    ) -> IntOrString
    where
        RA: JsonAdapter + 'static,
        EA: JsonAdapter + 'static,
        F: FnOnce(TypedResponse<RA::Target, EA::Target>) -> Result<()> + Send + 'static,
    {
        self.issue(method.into(), params, Some(typed_callback::<RA, EA, F>(callback)))
    }

    /// Number of requests still waiting for a response
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    fn issue(
        &mut self,
        method: String,
        params: Option<ArrayOrObject>,
        callback: Option<ResponseCallback>,
    ) -> IntOrString {
        let request = issue_request(self.ids, self.pending, method, params, callback);
        let id = request.id.clone();
        self.queue(request.into());
        id
    }

    fn queue(&mut self, message: Message) {
        self.outbox.push(message.to_json());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Parts {
        ids: RequestIdGenerator,
        pending: PendingResponses,
        outbox: Vec<Value>,
    }

    impl Parts {
        fn new() -> Self {
            Self {
                ids: RequestIdGenerator::new(),
                pending: PendingResponses::new(),
                outbox: Vec::new(),
            }
        }

        fn context(&mut self, reply_to: Option<IntOrString>) -> Context<'_> {
            Context::new(reply_to, &mut self.ids, &mut self.pending, &mut self.outbox)
        }
    }

    #[test]
    fn test_respond_once() {
        let mut parts = Parts::new();
        let mut ctx = parts.context(Some(1.into()));

        assert!(ctx.can_respond());
        ctx.respond(json!("lorem")).unwrap();
        assert!(!ctx.can_respond());
        assert!(matches!(ctx.respond(json!(2)), Err(Error::NotReplyable)));

        assert_eq!(
            parts.outbox,
            vec![json!({"jsonrpc": "2.0", "id": 1, "result": "lorem"})]
        );
    }

    #[test]
    fn test_no_reply_without_request() {
        let mut parts = Parts::new();
        let mut ctx = parts.context(None);

        assert!(matches!(ctx.respond(json!(1)), Err(Error::NotReplyable)));
        assert!(matches!(
            ctx.respond_error(ErrorObject::internal_error("x")),
            Err(Error::NotReplyable)
        ));
        assert!(parts.outbox.is_empty());
    }

    #[test]
    fn test_outgoing_requests_share_counter() {
        let mut parts = Parts::new();
        let mut ctx = parts.context(None);

        let first = ctx.request("a", None);
        let second = ctx.request_with_handler("b", None, |_| Ok(()));
        ctx.notify("c", Some(ArrayOrObject::Array(vec![json!(1)])));

        assert_eq!(first, IntOrString::Integer(0));
        assert_eq!(second, IntOrString::Integer(1));
        assert_eq!(ctx.pending_count(), 1);

        assert_eq!(
            parts.outbox,
            vec![
                json!({"jsonrpc": "2.0", "method": "a", "id": 0}),
                json!({"jsonrpc": "2.0", "method": "b", "id": 1}),
                json!({"jsonrpc": "2.0", "method": "c", "params": [1]}),
            ]
        );
        assert_eq!(parts.ids.peek(), 2);
    }
}
