//! Typed serialization adapters
//!
//! An adapter converts between a JSON value and a native Rust type in both
//! directions. Adapters are zero-sized marker types implementing
//! [`JsonAdapter`]; generic adapters (arrays, maps, nullable values) take the
//! element adapter as a type parameter and recurse into it.
//!
//! # Failure modes
//!
//! - `UnsupportedKindType` when the JSON kind does not match (a string where
//!   an integer was expected, a decimal where an integer was expected, ...)
//! - `ValueOutOfRange` when a number does not fit the target width
//! - `EmptyArray` from [`NonEmptyArrayAdapter`]
//!
//! Adapters never recover from a failure; the caller decides what to do.
//!
//! # Examples
//!
//! ```rust
//! use jrpc_core::adapter::{ArrayAdapter, IntAdapter, JsonAdapter, NullableAdapter};
//! use serde_json::json;
//!
//! let values = ArrayAdapter::<NullableAdapter<IntAdapter>>::deserialize(&json!([1, null, 3]))
//!     .unwrap();
//! assert_eq!(values, vec![Some(1), None, Some(3)]);
//!
//! let json = ArrayAdapter::<NullableAdapter<IntAdapter>>::serialize(&values);
//! assert_eq!(json, json!([1, null, 3]));
//! ```

use crate::error::DeserializationError;
use crate::kind::KindType;
use crate::types::{ArrayOrObject, IntOrString};
use serde_json::{Map, Number, Value};
use std::marker::PhantomData;

/// Bidirectional conversion between JSON and a native type
pub trait JsonAdapter {
    /// Native type produced by this adapter
    type Target;

    /// Convert a native value to JSON
    fn serialize(value: &Self::Target) -> Value;

    /// Read a native value from JSON
    fn deserialize(json: &Value) -> Result<Self::Target, DeserializationError>;
}

/// `bool` <-> JSON boolean
pub struct BoolAdapter;

impl JsonAdapter for BoolAdapter {
    type Target = bool;

    fn serialize(value: &bool) -> Value {
        Value::Bool(*value)
    }

    fn deserialize(json: &Value) -> Result<bool, DeserializationError> {
        json.as_bool()
            .ok_or_else(|| DeserializationError::unsupported_kind(json))
    }
}

/// `i32` <-> JSON integer
pub struct IntAdapter;

impl JsonAdapter for IntAdapter {
    type Target = i32;

    fn serialize(value: &i32) -> Value {
        Value::from(*value)
    }

    fn deserialize(json: &Value) -> Result<i32, DeserializationError> {
        let number = integer(json)?;
        match number.as_i64() {
            Some(n) => i32::try_from(n).map_err(|_| DeserializationError::out_of_range(n, "i32")),
            None => Err(DeserializationError::out_of_range(number, "i32")),
        }
    }
}

/// `u32` <-> JSON non-negative integer
pub struct UIntAdapter;

impl JsonAdapter for UIntAdapter {
    type Target = u32;

    fn serialize(value: &u32) -> Value {
        Value::from(*value)
    }

    fn deserialize(json: &Value) -> Result<u32, DeserializationError> {
        let number = integer(json)?;
        match number.as_u64() {
            Some(n) => u32::try_from(n).map_err(|_| DeserializationError::out_of_range(n, "u32")),
            None => Err(DeserializationError::out_of_range(number, "u32")),
        }
    }
}

/// `f64` <-> JSON number (integer or decimal)
///
/// Non-finite values have no JSON representation and serialize as `null`.
pub struct DoubleAdapter;

impl JsonAdapter for DoubleAdapter {
    type Target = f64;

    fn serialize(value: &f64) -> Value {
        Number::from_f64(*value).map_or(Value::Null, Value::Number)
    }

    fn deserialize(json: &Value) -> Result<f64, DeserializationError> {
        match json {
            Value::Number(n) => n
                .as_f64()
                .ok_or_else(|| DeserializationError::out_of_range(n, "f64")),
            other => Err(DeserializationError::unsupported_kind(other)),
        }
    }
}

/// `String` <-> JSON string
pub struct StringAdapter;

impl JsonAdapter for StringAdapter {
    type Target = String;

    fn serialize(value: &String) -> Value {
        Value::String(value.clone())
    }

    fn deserialize(json: &Value) -> Result<String, DeserializationError> {
        json.as_str()
            .map(str::to_string)
            .ok_or_else(|| DeserializationError::unsupported_kind(json))
    }
}

/// Any JSON value, unchanged
pub struct ValueAdapter;

impl JsonAdapter for ValueAdapter {
    type Target = Value;

    fn serialize(value: &Value) -> Value {
        value.clone()
    }

    fn deserialize(json: &Value) -> Result<Value, DeserializationError> {
        Ok(json.clone())
    }
}

/// `Option<T>` <-> JSON null or the element's JSON form
pub struct NullableAdapter<A>(PhantomData<fn() -> A>);

impl<A: JsonAdapter> JsonAdapter for NullableAdapter<A> {
    type Target = Option<A::Target>;

    fn serialize(value: &Self::Target) -> Value {
        value.as_ref().map_or(Value::Null, A::serialize)
    }

    fn deserialize(json: &Value) -> Result<Self::Target, DeserializationError> {
        match json {
            Value::Null => Ok(None),
            other => A::deserialize(other).map(Some),
        }
    }
}

/// `Vec<T>` <-> JSON array
pub struct ArrayAdapter<A>(PhantomData<fn() -> A>);

impl<A: JsonAdapter> JsonAdapter for ArrayAdapter<A> {
    type Target = Vec<A::Target>;

    fn serialize(value: &Self::Target) -> Value {
        Value::Array(value.iter().map(A::serialize).collect())
    }

    fn deserialize(json: &Value) -> Result<Self::Target, DeserializationError> {
        match json {
            Value::Array(items) => items.iter().map(A::deserialize).collect(),
            other => Err(DeserializationError::unsupported_kind(other)),
        }
    }
}

/// Like [`ArrayAdapter`], but an empty array fails with `EmptyArray`
pub struct NonEmptyArrayAdapter<A>(PhantomData<fn() -> A>);

impl<A: JsonAdapter> JsonAdapter for NonEmptyArrayAdapter<A> {
    type Target = Vec<A::Target>;

    fn serialize(value: &Self::Target) -> Value {
        ArrayAdapter::<A>::serialize(value)
    }

    fn deserialize(json: &Value) -> Result<Self::Target, DeserializationError> {
        let items = ArrayAdapter::<A>::deserialize(json)?;
        if items.is_empty() {
            return Err(DeserializationError::EmptyArray);
        }
        Ok(items)
    }
}

/// String-keyed JSON object <-> ordered key/value pairs
///
/// Each value is adapted independently. Serialization rebuilds the object in
/// the iteration order of the pairs.
pub struct MapAdapter<A>(PhantomData<fn() -> A>);

impl<A: JsonAdapter> JsonAdapter for MapAdapter<A> {
    type Target = Vec<(String, A::Target)>;

    fn serialize(value: &Self::Target) -> Value {
        let map: Map<String, Value> = value
            .iter()
            .map(|(key, item)| (key.clone(), A::serialize(item)))
            .collect();
        Value::Object(map)
    }

    fn deserialize(json: &Value) -> Result<Self::Target, DeserializationError> {
        match json {
            Value::Object(map) => map
                .iter()
                .map(|(key, item)| A::deserialize(item).map(|v| (key.clone(), v)))
                .collect(),
            other => Err(DeserializationError::unsupported_kind(other)),
        }
    }
}

/// [`IntOrString`] <-> JSON integer or string
///
/// Numbers that do not fit an `i32` become string-backed ids holding the
/// number's text.
pub struct IntOrStringAdapter;

impl JsonAdapter for IntOrStringAdapter {
    type Target = IntOrString;

    fn serialize(value: &IntOrString) -> Value {
        match value {
            IntOrString::Integer(n) => Value::from(*n),
            IntOrString::String(s) => Value::String(s.clone()),
        }
    }

    fn deserialize(json: &Value) -> Result<IntOrString, DeserializationError> {
        match json {
            Value::String(s) => Ok(IntOrString::String(s.clone())),
            Value::Number(n) => Ok(n
                .as_i64()
                .and_then(|v| i32::try_from(v).ok())
                .map(IntOrString::Integer)
                .unwrap_or_else(|| IntOrString::String(n.to_string()))),
            other => Err(DeserializationError::unsupported_kind(other)),
        }
    }
}

/// `Option<IntOrString>` with JSON null as absence
pub type NullableIntOrStringAdapter = NullableAdapter<IntOrStringAdapter>;

/// [`ArrayOrObject`] <-> JSON array or object
pub struct ArrayOrObjectAdapter;

impl JsonAdapter for ArrayOrObjectAdapter {
    type Target = ArrayOrObject;

    fn serialize(value: &ArrayOrObject) -> Value {
        value.clone().into_value()
    }

    fn deserialize(json: &Value) -> Result<ArrayOrObject, DeserializationError> {
        match json {
            Value::Array(items) => Ok(ArrayOrObject::Array(items.clone())),
            Value::Object(map) => Ok(ArrayOrObject::Object(map.clone())),
            other => Err(DeserializationError::unsupported_kind(other)),
        }
    }
}

/// Bridge to any serde type
///
/// Lets application structs take part in typed response views without
/// writing a dedicated adapter.
pub struct Serde<T>(PhantomData<fn() -> T>);

impl<T> JsonAdapter for Serde<T>
where
    T: serde::Serialize + serde::de::DeserializeOwned,
{
    type Target = T;

    fn serialize(value: &T) -> Value {
        serde_json::to_value(value).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Value has no JSON representation, using null");
            Value::Null
        })
    }

    fn deserialize(json: &Value) -> Result<T, DeserializationError> {
        serde_json::from_value(json.clone())
            .map_err(|e| DeserializationError::Custom(e.to_string()))
    }
}

/// Require an integer number, reporting decimals and non-numbers by kind
fn integer(json: &Value) -> Result<&Number, DeserializationError> {
    match json {
        Value::Number(n) if n.is_i64() || n.is_u64() => Ok(n),
        Value::Number(_) => Err(DeserializationError::UnsupportedKindType(KindType::Decimal)),
        other => Err(DeserializationError::unsupported_kind(other)),
    }
}
