//! JSON-RPC 2.0 dispatch engine and channels
//!
//! This crate turns a stream of JSON values into handled JSON-RPC messages
//! and back. It is transport independent: everything runs on top of the
//! [`Channel`] trait.
//!
//! # Core Features
//!
//! - **Engine**: [`JsonRpcServer`] runs the receive, decode, dispatch, reply
//!   loop with batch support and the standard error translation
//! - **Correlation**: outgoing requests get ids from a per-engine counter;
//!   their responses are routed to one-shot callbacks
//! - **Reply capability**: handlers answer through a [`Context`] instead of
//!   holding on to the channel
//! - **Channels**: in-memory pairs and newline-delimited JSON over any tokio
//!   byte stream, stdio included
//! - **Minimal loop**: [`run_simple`] for plain one-request-one-response use
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use jrpc_core::{ErrorObject, Message};
//! use jrpc_server::{from_fn, JsonRpcServer, LineChannel};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> jrpc_core::Result<()> {
//!     let server = JsonRpcServer::new(LineChannel::stdio());
//!
//!     server
//!         .serve(from_fn(|message, ctx| match message {
//!             Message::Request(request) => match request.method.as_str() {
//!                 "ping" => ctx.respond(json!("pong")),
//!                 other => Err(ErrorObject::method_not_found(other).into()),
//!             },
//!             _ => Ok(()),
//!         }))
//!         .await
//! }
//! ```
//!
//! # Concurrency
//!
//! One engine owns its channel, id counter and pending table and processes
//! one message at a time. Run one engine per connection; independent engines
//! can live on separate tasks.

mod builder;
mod channel;
mod context;
mod handler;
mod memory;
mod metrics;
mod pending;
mod server;
mod simple;
mod stream;

pub use builder::{NotificationErrorPolicy, ServerBuilder};
pub use channel::Channel;
pub use context::Context;
pub use handler::{from_fn, FnHandler, MessageHandler};
pub use memory::MemoryChannel;
pub use metrics::{ErrorCategory, ServerMetrics};
pub use pending::{
    PendingResponses, RequestIdGenerator, ResponseCallback, TypedError, TypedResponse,
};
pub use server::JsonRpcServer;
pub use simple::run_simple;
pub use stream::{LineChannel, LineEnding, WriteLineExt};
