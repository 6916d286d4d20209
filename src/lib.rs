//! jrpc - transport independent JSON-RPC 2.0
//!
//! This is the convenience crate that re-exports the jrpc sub-crates.
//!
//! # Architecture
//!
//! - **jrpc-core**: message model, typed JSON adapters, open enumerations,
//!   codec, URI parser, error types, observability
//! - **jrpc-server**: dispatch engine, channels, response correlation
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use jrpc::{from_fn, ErrorObject, JsonRpcServer, LineChannel, Message};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> jrpc::Result<()> {
//!     JsonRpcServer::new(LineChannel::stdio())
//!         .serve(from_fn(|message, ctx| match message {
//!             Message::Request(request) if request.method == "ping" => ctx.respond(json!("pong")),
//!             Message::Request(request) => {
//!                 Err(ErrorObject::method_not_found(&request.method).into())
//!             }
//!             _ => Ok(()),
//!         }))
//!         .await
//! }
//! ```
//!
//! See `demos/stdio_echo.rs` for a complete program.

pub use jrpc_core as core;
pub use jrpc_server as server;

pub use jrpc_core::{
    codec, init_observability, ArrayOrObject, DeserializationError, Error, ErrorCode, ErrorObject,
    IntOrString, JsonAdapter, KindType, Message, Notification, ObservabilityConfig, RequestObject,
    ResponseObject, Result, Uri,
};
pub use jrpc_server::{
    from_fn, run_simple, Channel, Context, JsonRpcServer, LineChannel, LineEnding, MemoryChannel,
    MessageHandler, NotificationErrorPolicy, ServerBuilder,
};
