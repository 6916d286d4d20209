//! Outgoing request ids and response correlation
//!
//! When the engine sends a request it picks the next id from a
//! [`RequestIdGenerator`] and may park a one-shot callback under that id in
//! [`PendingResponses`]. The callback fires when a response with the same id
//! arrives and is removed right after, whatever its outcome, so each id is
//! answered at most once.
//!
//! Entries for requests that never get a reply stay in the table for the
//! lifetime of the engine; there is no timeout.

use jrpc_core::adapter::JsonAdapter;
use jrpc_core::{
    ArrayOrObject, ErrorCode, IntOrString, RequestObject, ResponseObject, ResponseOutcome, Result,
};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// One-shot callback consuming the response to an outgoing request
pub type ResponseCallback = Box<dyn FnOnce(ResponseObject) -> Result<()> + Send>;

/// Monotonic source of outgoing request ids
///
/// Starts at 0 and wraps around at `i32::MAX`.
#[derive(Debug, Clone, Default)]
pub struct RequestIdGenerator {
    next: i32,
}

impl RequestIdGenerator {
    /// Start counting at 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Start counting at `first`
    pub fn starting_at(first: i32) -> Self {
        Self { next: first }
    }

    /// Read and advance the counter
    pub fn next_id(&mut self) -> IntOrString {
        let id = self.next;
        self.next = self.next.wrapping_add(1);
        IntOrString::Integer(id)
    }

    /// The id the next call to [`next_id`](Self::next_id) returns
    pub fn peek(&self) -> i32 {
        self.next
    }
}

/// Table of callbacks awaiting a response, keyed by request id
#[derive(Default)]
pub struct PendingResponses {
    handlers: HashMap<IntOrString, ResponseCallback>,
}

impl PendingResponses {
    pub fn new() -> Self {
        Self::default()
    }

    /// Park a callback under `id`, replacing any previous one
    pub fn register(&mut self, id: IntOrString, callback: ResponseCallback) {
        if self.handlers.insert(id.clone(), callback).is_some() {
            tracing::warn!(id = %id, "Replaced pending response handler");
        }
    }

    /// Take the callback for `id` out of the table
    pub fn take(&mut self, id: &IntOrString) -> Option<ResponseCallback> {
        self.handlers.remove(id)
    }

    /// Drop the entry for `id`; returns whether one existed
    pub fn remove(&mut self, id: &IntOrString) -> bool {
        self.handlers.remove(id).is_some()
    }

    pub fn contains(&self, id: &IntOrString) -> bool {
        self.handlers.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for PendingResponses {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingResponses")
            .field("ids", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Build a request with a fresh id, registering `callback` under it if given
pub(crate) fn issue_request(
    ids: &mut RequestIdGenerator,
    pending: &mut PendingResponses,
    method: String,
    params: Option<ArrayOrObject>,
    callback: Option<ResponseCallback>,
) -> RequestObject {
    let id = ids.next_id();
    if let Some(callback) = callback {
        pending.register(id.clone(), callback);
    }
    RequestObject {
        method,
        id,
        params,
    }
}

/// Error part of a [`TypedResponse`], with `data` converted
#[derive(Debug, Clone, PartialEq)]
pub struct TypedError<E> {
    pub code: ErrorCode,
    pub message: String,
    pub data: Option<E>,
}

/// A response whose result and error data went through adapters
///
/// # Examples
///
/// ```rust
/// use jrpc_core::adapter::{IntAdapter, StringAdapter};
/// use jrpc_core::ResponseObject;
/// use jrpc_server::TypedResponse;
/// use serde_json::json;
///
/// let response = ResponseObject::success(Some(5.into()), json!(42));
/// let typed = TypedResponse::<i32, String>::convert::<IntAdapter, StringAdapter>(response)
///     .unwrap();
/// assert_eq!(typed.outcome, Ok(42));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TypedResponse<R, E = Value> {
    pub id: Option<IntOrString>,
    pub outcome: std::result::Result<R, TypedError<E>>,
}

impl<R, E> TypedResponse<R, E> {
    /// Convert a raw response
    ///
    /// Fails if the result, or the error data when present, does not fit its
    /// adapter.
    pub fn convert<RA, EA>(response: ResponseObject) -> Result<Self>
    where
        RA: JsonAdapter<Target = R>,
        EA: JsonAdapter<Target = E>,
    {
        let id = response.id.clone();
        let outcome = match response.into_outcome() {
            ResponseOutcome::Result(result) => Ok(RA::deserialize(&result)?),
            ResponseOutcome::Error(error) => Err(TypedError {
                code: error.code,
                message: error.message,
                data: error.data.as_ref().map(EA::deserialize).transpose()?,
            }),
        };
        Ok(Self { id, outcome })
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Wrap a typed callback into a raw one that converts first
pub(crate) fn typed_callback<RA, EA, F>(callback: F) -> ResponseCallback
where
    RA: JsonAdapter + 'static,
    EA: JsonAdapter + 'static,
    F: FnOnce(TypedResponse<RA::Target, EA::Target>) -> Result<()> + Send + 'static,
{
    Box::new(move |response| callback(TypedResponse::convert::<RA, EA>(response)?))
}
