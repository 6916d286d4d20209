//! In-process channel pair
//!
//! [`MemoryChannel::pair`] returns two connected ends. Values travel as JSON
//! text, so an end can also inject arbitrary (even malformed) text with
//! [`MemoryChannel::send_text`]; the other end reports it as a parse error.
//! Useful for tests and for wiring two engines inside one process.
//!
//! ```rust
//! use jrpc_server::{Channel, MemoryChannel};
//! use serde_json::json;
//!
//! # #[tokio::main]
//! # async fn main() -> jrpc_core::Result<()> {
//! let (mut left, mut right) = MemoryChannel::pair();
//! left.send(json!({"jsonrpc": "2.0", "method": "ping"})).await?;
//! left.close().await?;
//!
//! assert_eq!(right.receive().await?, Some(json!({"jsonrpc": "2.0", "method": "ping"})));
//! assert_eq!(right.receive().await?, None);
//! # Ok(())
//! # }
//! ```

use crate::channel::Channel;
use async_trait::async_trait;
use jrpc_core::{codec, Error, Result};
use serde_json::Value;
use tokio::sync::mpsc;

/// One end of an in-memory channel
#[derive(Debug)]
pub struct MemoryChannel {
    tx: Option<mpsc::UnboundedSender<String>>,
    rx: mpsc::UnboundedReceiver<String>,
}

impl MemoryChannel {
    /// Create two connected ends
    pub fn pair() -> (MemoryChannel, MemoryChannel) {
        let (left_tx, right_rx) = mpsc::unbounded_channel();
        let (right_tx, left_rx) = mpsc::unbounded_channel();
        (
            MemoryChannel {
                tx: Some(left_tx),
                rx: left_rx,
            },
            MemoryChannel {
                tx: Some(right_tx),
                rx: right_rx,
            },
        )
    }

    /// Send raw text to the peer
    pub fn send_text(&mut self, text: impl Into<String>) -> Result<()> {
        let tx = self.tx.as_ref().ok_or(Error::ChannelClosed)?;
        tx.send(text.into()).map_err(|_| Error::ChannelClosed)
    }

    /// Receive the next raw text from the peer
    pub async fn receive_text(&mut self) -> Option<String> {
        self.rx.recv().await
    }

    /// Stop sending; the peer sees end of input once it drained the queue
    ///
    /// The receiving direction stays open.
    pub fn close_sender(&mut self) {
        self.tx = None;
    }
}

#[async_trait]
impl Channel for MemoryChannel {
    async fn send(&mut self, message: Value) -> Result<()> {
        let text = codec::encode(&message)?;
        self.send_text(text)
    }

    async fn receive(&mut self) -> Result<Option<Value>> {
        match self.rx.recv().await {
            Some(text) => codec::parse(&text).map(Some),
            None => Ok(None),
        }
    }

    async fn close(&mut self) -> Result<()> {
        self.tx = None;
        self.rx.close();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_values_cross_both_ways() {
        let (mut a, mut b) = MemoryChannel::pair();
        a.send(json!([1, 2])).await.unwrap();
        b.send(json!({"k": "v"})).await.unwrap();

        assert_eq!(b.receive().await.unwrap(), Some(json!([1, 2])));
        assert_eq!(a.receive().await.unwrap(), Some(json!({"k": "v"})));
    }

    #[tokio::test]
    async fn test_malformed_text_is_a_parse_error() {
        let (mut a, mut b) = MemoryChannel::pair();
        a.send_text("{oops").unwrap();
        a.send_text("true").unwrap();

        assert!(matches!(b.receive().await, Err(Error::Parse(_))));
        assert_eq!(b.receive().await.unwrap(), Some(json!(true)));
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let (mut a, mut b) = MemoryChannel::pair();
        a.close().await.unwrap();
        a.close().await.unwrap();

        assert!(matches!(a.send(json!(1)).await, Err(Error::ChannelClosed)));
        assert_eq!(b.receive().await.unwrap(), None);
        assert!(matches!(b.send(json!(1)).await, Err(Error::ChannelClosed)));
    }

    #[tokio::test]
    async fn test_close_sender_keeps_receiving() {
        let (mut a, mut b) = MemoryChannel::pair();
        a.close_sender();
        b.send(json!("late")).await.unwrap();

        assert_eq!(a.receive().await.unwrap(), Some(json!("late")));
        assert_eq!(b.receive().await.unwrap(), None);
    }
}
