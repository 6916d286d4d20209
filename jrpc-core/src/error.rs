//! Error types for jrpc
//!
//! Three layers of errors live here:
//!
//! - **DeserializationError**: structural failures of well-formed JSON that does
//!   not fit the expected shape (missing keys, wrong kinds, out-of-range numbers)
//! - **ErrorObject**: the JSON-RPC 2.0 wire error, with its open [`ErrorCode`]
//! - **Error**: the crate-wide error used by channels, handlers and the engine
//!
//! # Failure categories
//!
//! The dispatch engine answers each category differently:
//!
//! | Category           | Variant                      | Reply code |
//! |--------------------|------------------------------|------------|
//! | Malformed JSON     | `Error::Parse`               | `-32700`   |
//! | Structural error   | `DeserializationError`       | `-32600`   |
//! | Protocol error     | `Error::Protocol`            | verbatim   |
//! | Unexpected failure | any other `Error`            | `-32603`   |
//!
//! # Examples
//!
//! ```rust
//! use jrpc_core::{Error, ErrorCode, ErrorObject};
//!
//! fn lookup(name: &str) -> jrpc_core::Result<u32> {
//!     if name.is_empty() {
//!         // `?` turns an ErrorObject into Error::Protocol
//!         Err(ErrorObject::invalid_params("name must not be empty"))?;
//!     }
//!     Ok(7)
//! }
//!
//! match lookup("") {
//!     Err(Error::Protocol(obj)) => assert_eq!(obj.code, ErrorCode::INVALID_PARAMS),
//!     other => panic!("unexpected: {:?}", other),
//! }
//! ```

use crate::adapter::IntAdapter;
use crate::enumeration::{Enumeration, EnumerationDomain};
use crate::kind::KindType;
use serde_json::Value;
use thiserror::Error;

/// Result type for jrpc operations
pub type Result<T> = std::result::Result<T, Error>;

/// Crate-wide error type
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Malformed JSON text received from a channel
    #[error("Parse error: {0}")]
    Parse(String),

    /// Well-formed JSON that does not fit the expected shape
    #[error("Invalid message: {0}")]
    Deserialization(#[from] DeserializationError),

    /// A JSON-RPC error raised on purpose by handler code
    ///
    /// The engine forwards the object to the peer as-is.
    #[error("JSON-RPC error: {0}")]
    Protocol(#[from] ErrorObject),

    /// Any other failure inside handler code
    #[error("{0}")]
    Handler(String),

    /// A reply was attempted for a message that carries no reply channel
    #[error("Message cannot be replied to")]
    NotReplyable,

    /// A value could not be turned into JSON
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Transport level I/O error
    #[error("IO error: {0}")]
    Io(String),

    /// The channel is closed
    #[error("Channel closed")]
    ChannelClosed,
}

impl Error {
    /// Wrap an arbitrary failure raised by handler code
    pub fn handler(message: impl std::fmt::Display) -> Self {
        Error::Handler(message.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

/// Structural failure while reading a JSON value into a typed one
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeserializationError {
    /// A required key is absent (or none of a set of alternatives is present)
    #[error("Missing key: {}", .0.join(", "))]
    MissingKey(Vec<String>),

    /// Keys that exclude each other are present together
    #[error("Conflicting keys: {}", .0.join(", "))]
    ConflictingKey(Vec<String>),

    /// The value has the wrong structural kind
    #[error("Unsupported kind type: {0}")]
    UnsupportedKindType(KindType),

    /// The value has the right kind but an unacceptable content
    #[error("Unsupported {kind} value: {value}")]
    UnsupportedKindValue { kind: KindType, value: String },

    /// A number does not fit the target width
    #[error("Value {value} is out of range for {target}")]
    ValueOutOfRange { value: String, target: &'static str },

    /// An array that must have elements is empty
    #[error("Array must not be empty")]
    EmptyArray,

    /// Failure reported by a serde-backed adapter
    #[error("{0}")]
    Custom(String),
}

impl DeserializationError {
    /// A single missing key
    pub fn missing_key(key: &str) -> Self {
        DeserializationError::MissingKey(vec![key.to_string()])
    }

    /// None of the listed alternative keys is present
    pub fn missing_keys(keys: &[&str]) -> Self {
        DeserializationError::MissingKey(keys.iter().map(|k| k.to_string()).collect())
    }

    /// The listed keys are present together
    pub fn conflicting_keys(keys: &[&str]) -> Self {
        DeserializationError::ConflictingKey(keys.iter().map(|k| k.to_string()).collect())
    }

    /// Wrong kind for the given value
    pub fn unsupported_kind(value: &Value) -> Self {
        DeserializationError::UnsupportedKindType(KindType::of(value))
    }

    pub(crate) fn out_of_range(value: impl std::fmt::Display, target: &'static str) -> Self {
        DeserializationError::ValueOutOfRange {
            value: value.to_string(),
            target,
        }
    }
}

/// Domain of JSON-RPC error codes
pub struct ErrorCodes;

impl EnumerationDomain for ErrorCodes {
    type Primitive = i32;
    type Adapter = IntAdapter;
    const NAME: &'static str = "ErrorCode";

    fn entries() -> &'static [(&'static str, i32)] {
        &[
            ("ParseError", -32700),
            ("InvalidRequest", -32600),
            ("MethodNotFound", -32601),
            ("InvalidParams", -32602),
            ("InternalError", -32603),
            ("ServerErrorRangeStart", -32099),
            ("ServerErrorRangeEnd", -32000),
        ]
    }
}

/// JSON-RPC error code
///
/// Any 32-bit value is a valid code; the reserved ones have names.
pub type ErrorCode = Enumeration<ErrorCodes>;

impl ErrorCode {
    /// Invalid JSON was received
    pub const PARSE_ERROR: ErrorCode = ErrorCode::new(-32700);
    /// The JSON sent is not a valid Request object
    pub const INVALID_REQUEST: ErrorCode = ErrorCode::new(-32600);
    /// The method does not exist / is not available
    pub const METHOD_NOT_FOUND: ErrorCode = ErrorCode::new(-32601);
    /// Invalid method parameter(s)
    pub const INVALID_PARAMS: ErrorCode = ErrorCode::new(-32602);
    /// Internal JSON-RPC error
    pub const INTERNAL_ERROR: ErrorCode = ErrorCode::new(-32603);
    /// Lowest code of the implementation-defined server error range
    pub const SERVER_ERROR_RANGE_START: ErrorCode = ErrorCode::new(-32099);
    /// Highest code of the implementation-defined server error range
    pub const SERVER_ERROR_RANGE_END: ErrorCode = ErrorCode::new(-32000);

    /// Whether the code lies in the reserved server error range
    pub fn is_server_error(&self) -> bool {
        (-32099..=-32000).contains(self.value())
    }
}

impl From<i32> for ErrorCode {
    fn from(code: i32) -> Self {
        ErrorCode::new(code)
    }
}

/// JSON-RPC 2.0 error object
///
/// Carried as the `error` member of a response. It is also what handler code
/// raises to report an application error to the peer; the engine sends it
/// back unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorObject {
    /// Numeric error code
    pub code: ErrorCode,
    /// Short description of the error
    pub message: String,
    /// Optional additional information
    pub data: Option<Value>,
}

impl ErrorObject {
    /// Create an error with code and message
    pub fn new(code: impl Into<ErrorCode>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            data: None,
        }
    }

    /// Create an error carrying additional data
    pub fn with_data(code: impl Into<ErrorCode>, message: impl Into<String>, data: Value) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            data: Some(data),
        }
    }

    /// Parse error (-32700)
    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::PARSE_ERROR, message)
    }

    /// Invalid request error (-32600)
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::INVALID_REQUEST, message)
    }

    /// Method not found error (-32601)
    ///
    /// ```rust
    /// use jrpc_core::ErrorObject;
    ///
    /// let error = ErrorObject::method_not_found("calculate");
    /// assert_eq!(error.message, "Method not found: calculate");
    /// ```
    pub fn method_not_found(method: impl AsRef<str>) -> Self {
        Self::new(
            ErrorCode::METHOD_NOT_FOUND,
            format!("Method not found: {}", method.as_ref()),
        )
    }

    /// Invalid params error (-32602)
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::INVALID_PARAMS, message)
    }

    /// Internal error (-32603)
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::INTERNAL_ERROR, message)
    }
}

impl std::fmt::Display for ErrorObject {
    /// Formats as "[code] message"
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ErrorObject {}
