//! Core JSON-RPC 2.0 types for jrpc
//!
//! This crate holds everything about JSON-RPC that does not depend on a
//! transport or a runtime:
//!
//! - **Kinds**: coarse classification of JSON values ([`KindType`])
//! - **Adapters**: typed, bidirectional JSON conversions ([`adapter`])
//! - **Enumerations**: open sets of named constants over a primitive
//!   ([`ErrorCode`], [`uri::UriScheme`])
//! - **Messages**: requests, notifications and responses ([`Message`])
//! - **Codec**: JSON text in and out ([`codec`])
//! - **URIs**: an RFC 3986 parser for protocol extensions ([`uri`])
//! - **Observability**: tracing subscriber and OpenTelemetry bootstrap
//!
//! The dispatch engine and the channels that move messages live in
//! `jrpc-server`.
//!
//! # Example
//!
//! ```rust
//! use jrpc_core::{codec, ErrorObject, Message, ResponseObject};
//!
//! let message = codec::decode_message(r#"{"jsonrpc":"2.0","method":"add","id":1}"#).unwrap();
//! let Message::Request(request) = message else { panic!("expected a request") };
//!
//! let reply = ResponseObject::failure(
//!     Some(request.id.clone()),
//!     ErrorObject::method_not_found(&request.method),
//! );
//! assert_eq!(
//!     codec::encode(&reply).unwrap(),
//!     r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32601,"message":"Method not found: add"}}"#
//! );
//! ```

pub mod adapter;
pub mod codec;
pub mod enumeration;
pub mod error;
pub mod kind;
pub mod message;
pub mod observability;
pub mod types;
pub mod uri;

pub use adapter::JsonAdapter;
pub use enumeration::{Enumeration, EnumerationAdapter, EnumerationDomain};
pub use error::{DeserializationError, Error, ErrorCode, ErrorObject, Result};
pub use kind::KindType;
pub use message::{
    Message, Notification, RequestObject, ResponseObject, ResponseOutcome, JSONRPC_VERSION,
};
pub use observability::{init_observability, ObservabilityConfig, ObservabilityGuard};
pub use types::{ArrayOrObject, IntOrString};
pub use uri::{Uri, UriError, UriScheme};
