//! Union types used by the message model
//!
//! - [`IntOrString`]: the request/response identifier
//! - [`ArrayOrObject`]: structured request/notification parameters
//!
//! Both are plain Rust enums; putting them on the wire and reading them back
//! is the job of their adapters in [`crate::adapter`].

use serde_json::{Map, Value};
use std::fmt;

/// Either a 32-bit signed integer or a string
///
/// This is the type of JSON-RPC request ids. When read from JSON, numeric
/// content that does not fit an `i32` (a decimal, or an oversized integer)
/// collapses to its string form instead of failing, so the id can always be
/// echoed back to the peer.
///
/// # Examples
///
/// ```rust
/// use jrpc_core::IntOrString;
///
/// let id: IntOrString = 7.into();
/// assert_eq!(id.as_integer(), Some(7));
///
/// let id: IntOrString = "req-7".into();
/// assert_eq!(id.as_integer(), None);
/// assert_eq!(id.as_str(), Some("req-7"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IntOrString {
    Integer(i32),
    String(String),
}

impl IntOrString {
    /// Integer view; `None` for string-backed values
    pub fn as_integer(&self) -> Option<i32> {
        match self {
            IntOrString::Integer(n) => Some(*n),
            IntOrString::String(_) => None,
        }
    }

    /// String view; `None` for integer-backed values
    pub fn as_str(&self) -> Option<&str> {
        match self {
            IntOrString::Integer(_) => None,
            IntOrString::String(s) => Some(s),
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, IntOrString::Integer(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, IntOrString::String(_))
    }
}

impl fmt::Display for IntOrString {
    /// Strings are quoted so `1` and `"1"` stay distinguishable in logs
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntOrString::Integer(n) => write!(f, "{}", n),
            IntOrString::String(s) => write!(f, "\"{}\"", s),
        }
    }
}

impl From<i32> for IntOrString {
    fn from(n: i32) -> Self {
        IntOrString::Integer(n)
    }
}

impl From<String> for IntOrString {
    fn from(s: String) -> Self {
        IntOrString::String(s)
    }
}

impl From<&str> for IntOrString {
    fn from(s: &str) -> Self {
        IntOrString::String(s.to_string())
    }
}

/// Structured parameters: a positional array or a named object
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayOrObject {
    Array(Vec<Value>),
    Object(Map<String, Value>),
}

impl ArrayOrObject {
    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            ArrayOrObject::Array(items) => Some(items),
            ArrayOrObject::Object(_) => None,
        }
    }

    pub fn as_object(&self) -> Option<&Map<String, Value>> {
        match self {
            ArrayOrObject::Array(_) => None,
            ArrayOrObject::Object(map) => Some(map),
        }
    }

    /// Convert into a plain JSON value
    pub fn into_value(self) -> Value {
        match self {
            ArrayOrObject::Array(items) => Value::Array(items),
            ArrayOrObject::Object(map) => Value::Object(map),
        }
    }
}

impl From<Vec<Value>> for ArrayOrObject {
    fn from(items: Vec<Value>) -> Self {
        ArrayOrObject::Array(items)
    }
}

impl From<Map<String, Value>> for ArrayOrObject {
    fn from(map: Map<String, Value>) -> Self {
        ArrayOrObject::Object(map)
    }
}
