//! Transport abstraction
//!
//! A [`Channel`] moves whole JSON values between two peers. The engine never
//! touches bytes; framing, encoding and the underlying medium are the
//! channel's business.
//!
//! # Contract
//!
//! - `send` writes one value
//! - `receive` returns the next value, `Ok(None)` when no more input will
//!   arrive, and `Err(Error::Parse(_))` when the peer sent text that is not
//!   JSON. A parse error does not poison the channel: the next call reads the
//!   next message.
//! - `close` releases the channel and may be called any number of times
//!
//! Implementations in this crate: [`MemoryChannel`](crate::MemoryChannel)
//! and [`LineChannel`](crate::LineChannel).

use async_trait::async_trait;
use jrpc_core::Result;
use serde_json::Value;

/// Bidirectional stream of JSON values
#[async_trait]
pub trait Channel: Send {
    /// Send one value to the peer
    async fn send(&mut self, message: Value) -> Result<()>;

    /// Receive the next value from the peer
    async fn receive(&mut self) -> Result<Option<Value>>;

    /// Close the channel; idempotent
    async fn close(&mut self) -> Result<()>;
}

#[async_trait]
impl<C: Channel + ?Sized> Channel for Box<C> {
    async fn send(&mut self, message: Value) -> Result<()> {
        (**self).send(message).await
    }

    async fn receive(&mut self) -> Result<Option<Value>> {
        (**self).receive().await
    }

    async fn close(&mut self) -> Result<()> {
        (**self).close().await
    }
}
