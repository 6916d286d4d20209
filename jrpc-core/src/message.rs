//! JSON-RPC 2.0 message model
//!
//! A message on the wire is one of three shapes, told apart by which keys are
//! present rather than by an explicit tag:
//!
//! 1. **Request**: has `method` and `id`, expects a response
//! 2. **Notification**: has `method` but no `id`, must never be answered
//! 3. **Response**: has no `method`; carries exactly one of `result` / `error`
//!
//! [`Message::from_json`] is the single place where that decision is made.
//! Each variant then reads its own fields with the adapters from
//! [`crate::adapter`], so a malformed field reports *which* kind was found.
//!
//! # Serialization
//!
//! Fields are written in a fixed order (`jsonrpc` first) and optional fields
//! that are absent are omitted. A response id is the exception: when the
//! request id could not be determined it is written as `null`, as JSON-RPC
//! requires.
//!
//! # Examples
//!
//! ```rust
//! use jrpc_core::{Message, RequestObject};
//! use serde_json::json;
//!
//! let json = json!({"jsonrpc": "2.0", "method": "sum", "id": 1, "params": [1, 2]});
//! let message = Message::from_json(&json).unwrap();
//!
//! match &message {
//!     Message::Request(request) => assert_eq!(request.method, "sum"),
//!     _ => panic!("expected a request"),
//! }
//! assert_eq!(message.to_json(), json);
//! ```

use crate::adapter::{
    ArrayOrObjectAdapter, IntAdapter, IntOrStringAdapter, JsonAdapter, NullableIntOrStringAdapter,
    StringAdapter,
};
use crate::error::{DeserializationError, ErrorObject};
use crate::kind::KindType;
use crate::types::{ArrayOrObject, IntOrString};
use serde_json::{Map, Value};

/// Protocol version marker carried by every message
pub const JSONRPC_VERSION: &str = "2.0";

/// Implements serde traits by going through `to_json` / `from_json`
macro_rules! serde_via_json {
    ($ty:ty) => {
        impl serde::Serialize for $ty {
            fn serialize<S: serde::Serializer>(
                &self,
                serializer: S,
            ) -> std::result::Result<S::Ok, S::Error> {
                serde::Serialize::serialize(&self.to_json(), serializer)
            }
        }

        impl<'de> serde::Deserialize<'de> for $ty {
            fn deserialize<D: serde::Deserializer<'de>>(
                deserializer: D,
            ) -> std::result::Result<Self, D::Error> {
                let value = <Value as serde::Deserialize>::deserialize(deserializer)?;
                Self::from_json(&value).map_err(serde::de::Error::custom)
            }
        }
    };
}

/// JSON-RPC 2.0 request
#[derive(Debug, Clone, PartialEq)]
pub struct RequestObject {
    /// Name of the method to invoke
    pub method: String,
    /// Identifier echoed back in the response
    pub id: IntOrString,
    /// Optional structured parameters
    pub params: Option<ArrayOrObject>,
}

impl RequestObject {
    /// Create a new request
    ///
    /// ```rust
    /// use jrpc_core::{IntOrString, RequestObject};
    ///
    /// let request = RequestObject::new("ping", 1, None);
    /// assert_eq!(request.id, IntOrString::Integer(1));
    /// ```
    pub fn new(
        method: impl Into<String>,
        id: impl Into<IntOrString>,
        params: Option<ArrayOrObject>,
    ) -> Self {
        Self {
            method: method.into(),
            id: id.into(),
            params,
        }
    }

    /// Read a request from a JSON object
    pub fn from_json(json: &Value) -> Result<Self, DeserializationError> {
        let map = object(json)?;
        check_version(map)?;
        Ok(Self {
            method: required::<StringAdapter>(map, "method")?,
            id: required::<IntOrStringAdapter>(map, "id")?,
            params: optional::<ArrayOrObjectAdapter>(map, "params")?,
        })
    }

    /// Write the request as `jsonrpc`, `method`, `id`, `params`
    pub fn to_json(&self) -> Value {
        let mut map = versioned();
        map.insert("method".into(), Value::String(self.method.clone()));
        map.insert("id".into(), IntOrStringAdapter::serialize(&self.id));
        if let Some(params) = &self.params {
            map.insert("params".into(), ArrayOrObjectAdapter::serialize(params));
        }
        Value::Object(map)
    }
}

/// JSON-RPC 2.0 notification
///
/// Like a request without an id. The receiver must not answer it.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    /// Name of the method or event
    pub method: String,
    /// Optional structured parameters
    pub params: Option<ArrayOrObject>,
}

impl Notification {
    /// Create a new notification
    pub fn new(method: impl Into<String>, params: Option<ArrayOrObject>) -> Self {
        Self {
            method: method.into(),
            params,
        }
    }

    /// Read a notification from a JSON object
    pub fn from_json(json: &Value) -> Result<Self, DeserializationError> {
        let map = object(json)?;
        check_version(map)?;
        Ok(Self {
            method: required::<StringAdapter>(map, "method")?,
            params: optional::<ArrayOrObjectAdapter>(map, "params")?,
        })
    }

    /// Write the notification as `jsonrpc`, `method`, `params`
    pub fn to_json(&self) -> Value {
        let mut map = versioned();
        map.insert("method".into(), Value::String(self.method.clone()));
        if let Some(params) = &self.params {
            map.insert("params".into(), ArrayOrObjectAdapter::serialize(params));
        }
        Value::Object(map)
    }
}

/// Payload of a response: a result or an error, never both
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseOutcome {
    Result(Value),
    Error(ErrorObject),
}

/// JSON-RPC 2.0 response
///
/// The "exactly one of result / error" rule is enforced by construction:
/// [`ResponseObject::new`] rejects both and neither, the other constructors
/// cannot express them.
///
/// # Examples
///
/// ```rust
/// use jrpc_core::{DeserializationError, ErrorObject, ResponseObject};
/// use serde_json::json;
///
/// let ok = ResponseObject::success(Some(1.into()), json!("lorem"));
/// assert_eq!(ok.result(), Some(&json!("lorem")));
///
/// let both = ResponseObject::new(
///     Some(1.into()),
///     Some(json!(1)),
///     Some(ErrorObject::internal_error("x")),
/// );
/// assert_eq!(
///     both.unwrap_err(),
///     DeserializationError::conflicting_keys(&["result", "error"])
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseObject {
    /// Id of the request being answered; `None` when it could not be determined
    pub id: Option<IntOrString>,
    outcome: ResponseOutcome,
}

impl ResponseObject {
    /// Create a response from optional parts
    ///
    /// Fails with `ConflictingKey("result", "error")` when both are given and
    /// with `MissingKey("result", "error")` when neither is.
    pub fn new(
        id: Option<IntOrString>,
        result: Option<Value>,
        error: Option<ErrorObject>,
    ) -> Result<Self, DeserializationError> {
        let outcome = match (result, error) {
            (Some(result), None) => ResponseOutcome::Result(result),
            (None, Some(error)) => ResponseOutcome::Error(error),
            (Some(_), Some(_)) => {
                return Err(DeserializationError::conflicting_keys(&["result", "error"]))
            }
            (None, None) => return Err(DeserializationError::missing_keys(&["result", "error"])),
        };
        Ok(Self { id, outcome })
    }

    /// Successful response
    pub fn success(id: Option<IntOrString>, result: Value) -> Self {
        Self {
            id,
            outcome: ResponseOutcome::Result(result),
        }
    }

    /// Error response
    pub fn failure(id: Option<IntOrString>, error: ErrorObject) -> Self {
        Self {
            id,
            outcome: ResponseOutcome::Error(error),
        }
    }

    pub fn outcome(&self) -> &ResponseOutcome {
        &self.outcome
    }

    pub fn into_outcome(self) -> ResponseOutcome {
        self.outcome
    }

    /// The result, if this is a success response
    pub fn result(&self) -> Option<&Value> {
        match &self.outcome {
            ResponseOutcome::Result(result) => Some(result),
            ResponseOutcome::Error(_) => None,
        }
    }

    /// The error, if this is an error response
    pub fn error(&self) -> Option<&ErrorObject> {
        match &self.outcome {
            ResponseOutcome::Result(_) => None,
            ResponseOutcome::Error(error) => Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, ResponseOutcome::Result(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self.outcome, ResponseOutcome::Error(_))
    }

    /// Read a response from a JSON object
    ///
    /// `"error": null` counts as an absent error.
    pub fn from_json(json: &Value) -> Result<Self, DeserializationError> {
        let map = object(json)?;
        check_version(map)?;
        let id = required::<NullableIntOrStringAdapter>(map, "id")?;
        let result = map.get("result").cloned();
        let error = match map.get("error") {
            None | Some(Value::Null) => None,
            Some(error) => Some(ErrorObject::from_json(error)?),
        };
        Self::new(id, result, error)
    }

    /// Write the response as `jsonrpc`, `id`, then `result` or `error`
    pub fn to_json(&self) -> Value {
        let mut map = versioned();
        map.insert("id".into(), NullableIntOrStringAdapter::serialize(&self.id));
        match &self.outcome {
            ResponseOutcome::Result(result) => {
                map.insert("result".into(), result.clone());
            }
            ResponseOutcome::Error(error) => {
                map.insert("error".into(), error.to_json());
            }
        }
        Value::Object(map)
    }
}

impl ErrorObject {
    /// Read an error object (`code`, `message`, optional `data`)
    pub fn from_json(json: &Value) -> Result<Self, DeserializationError> {
        let map = object(json)?;
        Ok(Self {
            code: required::<IntAdapter>(map, "code")?.into(),
            message: required::<StringAdapter>(map, "message")?,
            data: map.get("data").cloned(),
        })
    }

    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        map.insert("code".into(), IntAdapter::serialize(self.code.value()));
        map.insert("message".into(), Value::String(self.message.clone()));
        if let Some(data) = &self.data {
            map.insert("data".into(), data.clone());
        }
        Value::Object(map)
    }
}

/// Any JSON-RPC 2.0 message
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Request(RequestObject),
    Notification(Notification),
    Response(ResponseObject),
}

impl Message {
    /// Decide the message shape from its keys and read it
    ///
    /// - not an object: `UnsupportedKindType(kind)`
    /// - no `method`: response
    /// - `method` and `id`: request
    /// - `method` only: notification
    pub fn from_json(json: &Value) -> Result<Self, DeserializationError> {
        let map = object(json)?;
        if !map.contains_key("method") {
            ResponseObject::from_json(json).map(Message::Response)
        } else if map.contains_key("id") {
            RequestObject::from_json(json).map(Message::Request)
        } else {
            Notification::from_json(json).map(Message::Notification)
        }
    }

    /// Write the message with its variant's own field order
    pub fn to_json(&self) -> Value {
        match self {
            Message::Request(request) => request.to_json(),
            Message::Notification(notification) => notification.to_json(),
            Message::Response(response) => response.to_json(),
        }
    }

    pub fn is_request(&self) -> bool {
        matches!(self, Message::Request(_))
    }

    pub fn is_notification(&self) -> bool {
        matches!(self, Message::Notification(_))
    }

    pub fn is_response(&self) -> bool {
        matches!(self, Message::Response(_))
    }

    /// Id of a request or response; `None` for notifications and null-id responses
    pub fn id(&self) -> Option<&IntOrString> {
        match self {
            Message::Request(request) => Some(&request.id),
            Message::Notification(_) => None,
            Message::Response(response) => response.id.as_ref(),
        }
    }

    /// Method of a request or notification
    pub fn method(&self) -> Option<&str> {
        match self {
            Message::Request(request) => Some(&request.method),
            Message::Notification(notification) => Some(&notification.method),
            Message::Response(_) => None,
        }
    }
}

impl From<RequestObject> for Message {
    fn from(request: RequestObject) -> Self {
        Message::Request(request)
    }
}

impl From<Notification> for Message {
    fn from(notification: Notification) -> Self {
        Message::Notification(notification)
    }
}

impl From<ResponseObject> for Message {
    fn from(response: ResponseObject) -> Self {
        Message::Response(response)
    }
}

serde_via_json!(RequestObject);
serde_via_json!(Notification);
serde_via_json!(ResponseObject);
serde_via_json!(ErrorObject);
serde_via_json!(Message);

fn object(json: &Value) -> Result<&Map<String, Value>, DeserializationError> {
    json.as_object()
        .ok_or_else(|| DeserializationError::unsupported_kind(json))
}

fn versioned() -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("jsonrpc".into(), Value::String(JSONRPC_VERSION.into()));
    map
}

fn check_version(map: &Map<String, Value>) -> Result<(), DeserializationError> {
    let version = required::<StringAdapter>(map, "jsonrpc")?;
    if version != JSONRPC_VERSION {
        return Err(DeserializationError::UnsupportedKindValue {
            kind: KindType::String,
            value: version,
        });
    }
    Ok(())
}

fn required<A: JsonAdapter>(
    map: &Map<String, Value>,
    key: &str,
) -> Result<A::Target, DeserializationError> {
    match map.get(key) {
        Some(value) => A::deserialize(value),
        None => Err(DeserializationError::missing_key(key)),
    }
}

fn optional<A: JsonAdapter>(
    map: &Map<String, Value>,
    key: &str,
) -> Result<Option<A::Target>, DeserializationError> {
    map.get(key).map(A::deserialize).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use serde_json::json;

    #[test]
    fn test_request_round_trip() {
        let params: Map<String, Value> = json!({"a": 1}).as_object().unwrap().clone();
        let request = RequestObject::new("sum", "req-1", Some(ArrayOrObject::Object(params)));
        let decoded = RequestObject::from_json(&request.to_json()).unwrap();
        assert_eq!(decoded, request);
    }

    #[test]
    fn test_notification_round_trip() {
        let notification = Notification::new("log", Some(ArrayOrObject::Array(vec![json!("hi")])));
        let decoded = Notification::from_json(&notification.to_json()).unwrap();
        assert_eq!(decoded, notification);
    }

    #[test]
    fn test_response_round_trip() {
        let success = ResponseObject::success(Some(IntOrString::Integer(3)), json!(null));
        assert_eq!(ResponseObject::from_json(&success.to_json()).unwrap(), success);

        let failure = ResponseObject::failure(
            None,
            ErrorObject::with_data(-32000, "busy", json!({"retry": true})),
        );
        assert_eq!(ResponseObject::from_json(&failure.to_json()).unwrap(), failure);
    }

    #[test]
    fn test_field_order() {
        let request = RequestObject::new("m", 1, Some(ArrayOrObject::Array(vec![])));
        assert_eq!(
            serde_json::to_string(&request).unwrap(),
            r#"{"jsonrpc":"2.0","method":"m","id":1,"params":[]}"#
        );

        let response = ResponseObject::success(Some(1.into()), json!("lorem"));
        assert_eq!(
            serde_json::to_string(&response).unwrap(),
            r#"{"jsonrpc":"2.0","id":1,"result":"lorem"}"#
        );
    }

    #[test]
    fn test_absent_params_are_omitted() {
        let notification = Notification::new("ping", None);
        assert_eq!(notification.to_json(), json!({"jsonrpc": "2.0", "method": "ping"}));
    }

    #[test]
    fn test_null_response_id_is_written() {
        let response = ResponseObject::failure(None, ErrorObject::parse_error("bad"));
        assert_eq!(
            response.to_json(),
            json!({"jsonrpc": "2.0", "id": null, "error": {"code": -32700, "message": "bad"}})
        );
    }

    #[test]
    fn test_discrimination_by_keys() {
        let request = json!({"jsonrpc": "2.0", "method": "a", "id": 1});
        let notification = json!({"jsonrpc": "2.0", "method": "a"});
        let response = json!({"jsonrpc": "2.0", "id": 1, "result": 0});

        assert!(Message::from_json(&request).unwrap().is_request());
        assert!(Message::from_json(&notification).unwrap().is_notification());
        assert!(Message::from_json(&response).unwrap().is_response());
    }

    #[test]
    fn test_non_object_kinds_are_rejected() {
        let cases = vec![
            (json!([1]), "array"),
            (json!(true), "boolean"),
            (json!(1.5), "decimal"),
            (json!(1), "integer"),
            (json!("x"), "string"),
            (json!(null), "null"),
        ];

        for (value, kind) in cases {
            match Message::from_json(&value) {
                Err(DeserializationError::UnsupportedKindType(found)) => {
                    assert_eq!(found.name(), kind)
                }
                other => panic!("unexpected result for {}: {:?}", value, other),
            }
        }
    }

    #[test]
    fn test_response_requires_result_or_error() {
        let err = Message::from_json(&json!({"jsonrpc": "2.0", "id": 1})).unwrap_err();
        assert_eq!(err, DeserializationError::missing_keys(&["result", "error"]));

        let err = Message::from_json(&json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": 1,
            "error": {"code": 1, "message": "x"}
        }))
        .unwrap_err();
        assert_eq!(err, DeserializationError::conflicting_keys(&["result", "error"]));
    }

    #[test]
    fn test_response_construction_rules() {
        assert_eq!(
            ResponseObject::new(None, None, None).unwrap_err(),
            DeserializationError::MissingKey(vec!["result".into(), "error".into()])
        );
        assert_eq!(
            ResponseObject::new(None, Some(json!(1)), Some(ErrorObject::internal_error("e")))
                .unwrap_err(),
            DeserializationError::ConflictingKey(vec!["result".into(), "error".into()])
        );
        assert!(ResponseObject::new(None, Some(json!(1)), None).unwrap().is_success());
    }

    #[test]
    fn test_null_error_counts_as_absent() {
        let json = json!({"jsonrpc": "2.0", "id": 1, "result": 5, "error": null});
        let response = ResponseObject::from_json(&json).unwrap();
        assert_eq!(response.result(), Some(&json!(5)));
    }

    #[test]
    fn test_missing_keys() {
        let err = Message::from_json(&json!({"method": "a", "id": 1})).unwrap_err();
        assert_eq!(err, DeserializationError::missing_key("jsonrpc"));

        let err = Message::from_json(&json!({"jsonrpc": "2.0", "result": 1})).unwrap_err();
        assert_eq!(err, DeserializationError::missing_key("id"));

        let err = ErrorObject::from_json(&json!({"message": "x"})).unwrap_err();
        assert_eq!(err, DeserializationError::missing_key("code"));
    }

    #[test]
    fn test_wrong_version() {
        let err = Message::from_json(&json!({"jsonrpc": "1.0", "method": "a"})).unwrap_err();
        assert_eq!(
            err,
            DeserializationError::UnsupportedKindValue {
                kind: KindType::String,
                value: "1.0".into()
            }
        );
    }

    #[test]
    fn test_invalid_params_kind() {
        let err = Message::from_json(&json!({"jsonrpc": "2.0", "method": "a", "params": 3}))
            .unwrap_err();
        assert_eq!(err, DeserializationError::UnsupportedKindType(KindType::Integer));

        let err = Message::from_json(&json!({"jsonrpc": "2.0", "method": "a", "params": null}))
            .unwrap_err();
        assert_eq!(err, DeserializationError::UnsupportedKindType(KindType::Null));
    }

    #[test]
    fn test_error_object_keeps_unknown_code() {
        let error = ErrorObject::from_json(&json!({"code": 12, "message": "custom"})).unwrap();
        assert_eq!(error.code, ErrorCode::new(12));
        assert!(!error.code.is_known());
    }

    #[test]
    fn test_serde_entry_points() {
        let message: Message =
            serde_json::from_str(r#"{"jsonrpc":"2.0","method":"a","id":"x"}"#).unwrap();
        assert_eq!(message.id(), Some(&IntOrString::from("x")));
        assert_eq!(message.method(), Some("a"));

        let err = serde_json::from_str::<Message>(r#"{"jsonrpc":"2.0","id":1}"#).unwrap_err();
        assert!(err.to_string().contains("Missing key: result, error"));
    }
}
