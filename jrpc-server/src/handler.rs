//! Message handlers
//!
//! The engine hands every decoded message to a single [`MessageHandler`].
//! Handlers are synchronous: the loop's only suspension point is reading from
//! the channel, and anything the handler wants to send is queued on the
//! [`Context`] and written after it returns.
//!
//! A handler reports failure through its `Result`:
//!
//! - `Err(Error::Protocol(obj))` (or `Err(obj.into())`, or `?` on an
//!   `ErrorObject`) sends `obj` to the peer unchanged
//! - any other error is reported as an internal error carrying its message
//!
//! # Examples
//!
//! ```rust
//! use jrpc_core::{ErrorObject, Message};
//! use jrpc_server::from_fn;
//! use serde_json::json;
//!
//! let handler = from_fn(|message, ctx| {
//!     match message {
//!         Message::Request(request) if request.method == "ping" => ctx.respond(json!("pong")),
//!         Message::Request(request) => Err(ErrorObject::method_not_found(&request.method).into()),
//!         _ => Ok(()),
//!     }
//! });
//! # let _ = handler;
//! ```

use crate::context::Context;
use jrpc_core::{Message, Result};

/// Receives every message the engine decodes
pub trait MessageHandler: Send {
    fn handle(&mut self, message: Message, ctx: &mut Context<'_>) -> Result<()>;
}

impl<H: MessageHandler + ?Sized> MessageHandler for &mut H {
    fn handle(&mut self, message: Message, ctx: &mut Context<'_>) -> Result<()> {
        (**self).handle(message, ctx)
    }
}

impl<H: MessageHandler + ?Sized> MessageHandler for Box<H> {
    fn handle(&mut self, message: Message, ctx: &mut Context<'_>) -> Result<()> {
        (**self).handle(message, ctx)
    }
}

/// Handler built from a closure, see [`from_fn`]
pub struct FnHandler<F> {
    f: F,
}

impl<F> MessageHandler for FnHandler<F>
where
    F: FnMut(Message, &mut Context<'_>) -> Result<()> + Send,
{
    fn handle(&mut self, message: Message, ctx: &mut Context<'_>) -> Result<()> {
        (self.f)(message, ctx)
    }
}

/// Create a handler from a closure
pub fn from_fn<F>(f: F) -> FnHandler<F>
where
    F: FnMut(Message, &mut Context<'_>) -> Result<()> + Send,
{
    FnHandler { f }
}
