//! Structural classification of JSON values
//!
//! Every validation failure raised by the adapters names the *kind* of value
//! that was found instead of the expected one. `KindType` is that coarse
//! classification. It is used for diagnostics only; dispatch decisions are
//! made on the decoded message types, never on kinds.
//!
//! Numbers are split into `Integer` and `Decimal`: a number that serde_json
//! holds as a signed or unsigned 64-bit integer is an `Integer`, anything held
//! as a float (a decimal point or an exponent in the source text) is a
//! `Decimal`.

use serde_json::Value;
use std::fmt;

/// Coarse structural kind of a JSON value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KindType {
    Array,
    Boolean,
    Decimal,
    Integer,
    Null,
    Object,
    String,
}

impl KindType {
    /// Classify a JSON value
    ///
    /// # Examples
    ///
    /// ```rust
    /// use jrpc_core::KindType;
    /// use serde_json::json;
    ///
    /// assert_eq!(KindType::of(&json!(12)), KindType::Integer);
    /// assert_eq!(KindType::of(&json!(1.5)), KindType::Decimal);
    /// assert_eq!(KindType::of(&json!({"a": 1})), KindType::Object);
    /// ```
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => KindType::Null,
            Value::Bool(_) => KindType::Boolean,
            Value::Number(n) if n.is_i64() || n.is_u64() => KindType::Integer,
            Value::Number(_) => KindType::Decimal,
            Value::String(_) => KindType::String,
            Value::Array(_) => KindType::Array,
            Value::Object(_) => KindType::Object,
        }
    }

    /// Lower-case name used in diagnostic messages
    pub fn name(&self) -> &'static str {
        match self {
            KindType::Array => "array",
            KindType::Boolean => "boolean",
            KindType::Decimal => "decimal",
            KindType::Integer => "integer",
            KindType::Null => "null",
            KindType::Object => "object",
            KindType::String => "string",
        }
    }
}

impl fmt::Display for KindType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<&Value> for KindType {
    fn from(value: &Value) -> Self {
        KindType::of(value)
    }
}
