//! Open enumerations backed by a JSON primitive
//!
//! Several protocol values are "named constants" over a primitive: error codes
//! are integers with a handful of reserved names, URI schemes are strings with
//! a few well-known ones. The set is open: a peer may send any value of the
//! underlying primitive and it must survive decoding and re-encoding.
//!
//! Instead of one wrapper type per domain, a single generic [`Enumeration`]
//! is parameterized by an [`EnumerationDomain`] that names the primitive, the
//! adapter used to put it on the wire, and the table of known constants.
//! Named constants are declared as associated consts of the concrete alias:
//!
//! ```rust
//! use jrpc_core::ErrorCode;
//!
//! let code = ErrorCode::METHOD_NOT_FOUND;
//! assert_eq!(code.value(), &-32601);
//! assert_eq!(code.name(), Some("MethodNotFound"));
//!
//! // Unknown values are still valid members of the enumeration
//! let custom = ErrorCode::new(42);
//! assert_eq!(custom.name(), None);
//! ```

use crate::adapter::JsonAdapter;
use crate::error::DeserializationError;
use serde_json::Value;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Describes one family of named constants
pub trait EnumerationDomain: 'static {
    /// Underlying primitive carried on the wire
    type Primitive: Clone + PartialEq + fmt::Debug + fmt::Display + 'static;

    /// Adapter for the primitive
    type Adapter: JsonAdapter<Target = Self::Primitive>;

    /// Domain name used in `Debug` output
    const NAME: &'static str;

    /// Known constants, as `(name, value)` pairs
    fn entries() -> &'static [(&'static str, Self::Primitive)];
}

/// A value of an open enumeration
pub struct Enumeration<D: EnumerationDomain> {
    value: D::Primitive,
    _domain: PhantomData<fn() -> D>,
}

impl<D: EnumerationDomain> Enumeration<D> {
    /// Wrap a raw primitive
    pub const fn new(value: D::Primitive) -> Self {
        Self {
            value,
            _domain: PhantomData,
        }
    }

    /// The underlying primitive
    pub fn value(&self) -> &D::Primitive {
        &self.value
    }

    /// Consume the wrapper and return the primitive
    pub fn into_value(self) -> D::Primitive {
        self.value
    }

    /// Name of the constant, if the value is one of the known ones
    pub fn name(&self) -> Option<&'static str> {
        D::entries()
            .iter()
            .find(|(_, value)| *value == self.value)
            .map(|(name, _)| *name)
    }

    /// Whether the value is one of the known constants
    pub fn is_known(&self) -> bool {
        self.name().is_some()
    }

    /// Look a constant up by name
    pub fn from_name(name: &str) -> Option<Self> {
        D::entries()
            .iter()
            .find(|(known, _)| *known == name)
            .map(|(_, value)| Self::new(value.clone()))
    }

    /// All known constants of the domain
    pub fn known() -> impl Iterator<Item = Self> {
        D::entries().iter().map(|(_, value)| Self::new(value.clone()))
    }
}

impl<D: EnumerationDomain> Clone for Enumeration<D> {
    fn clone(&self) -> Self {
        Self::new(self.value.clone())
    }
}

impl<D: EnumerationDomain> Copy for Enumeration<D> where D::Primitive: Copy {}

impl<D: EnumerationDomain> PartialEq for Enumeration<D> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<D: EnumerationDomain> Eq for Enumeration<D> where D::Primitive: Eq {}

impl<D: EnumerationDomain> Hash for Enumeration<D>
where
    D::Primitive: Hash,
{
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<D: EnumerationDomain> fmt::Debug for Enumeration<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{}::{}({:?})", D::NAME, name, self.value),
            None => write!(f, "{}({:?})", D::NAME, self.value),
        }
    }
}

impl<D: EnumerationDomain> fmt::Display for Enumeration<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.value, f)
    }
}

/// Adapter for any open enumeration
///
/// Deserialization never fails on an unknown value; it only fails when the
/// JSON does not fit the underlying primitive.
pub struct EnumerationAdapter<D>(PhantomData<fn() -> D>);

impl<D: EnumerationDomain> JsonAdapter for EnumerationAdapter<D> {
    type Target = Enumeration<D>;

    fn serialize(value: &Self::Target) -> Value {
        D::Adapter::serialize(value.value())
    }

    fn deserialize(json: &Value) -> Result<Self::Target, DeserializationError> {
        D::Adapter::deserialize(json).map(Enumeration::new)
    }
}
