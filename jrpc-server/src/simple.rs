//! Minimal request/response loop
//!
//! [`run_simple`] is the bare form of the message loop: one message at a
//! time, no batches, no pending response table, and no error translation.
//! The handler may return a response, which is sent as-is. Any failure
//! (malformed JSON, an invalid message, a handler error, a channel error)
//! ends the loop and is returned to the caller.
//!
//! ```rust
//! use jrpc_core::{Message, ResponseObject};
//! use jrpc_server::{run_simple, MemoryChannel};
//! use serde_json::json;
//!
//! # #[tokio::main]
//! # async fn main() -> jrpc_core::Result<()> {
//! let (mut channel, mut peer) = MemoryChannel::pair();
//! peer.send_text(r#"{"jsonrpc":"2.0","method":"ping","id":"a"}"#)?;
//! peer.close_sender();
//!
//! run_simple(&mut channel, |message| {
//!     Ok(match message {
//!         Message::Request(request) => {
//!             Some(ResponseObject::success(Some(request.id), json!("pong")))
//!         }
//!         _ => None,
//!     })
//! })
//! .await?;
//!
//! assert_eq!(
//!     peer.receive_text().await.as_deref(),
//!     Some(r#"{"jsonrpc":"2.0","id":"a","result":"pong"}"#)
//! );
//! # Ok(())
//! # }
//! ```

use crate::channel::Channel;
use jrpc_core::{Message, ResponseObject, Result};

/// Read, decode, handle and answer messages until end of input
pub async fn run_simple<C, F>(channel: &mut C, mut handler: F) -> Result<()>
where
    C: Channel + ?Sized,
    F: FnMut(Message) -> Result<Option<ResponseObject>> + Send,
{
    while let Some(value) = channel.receive().await? {
        let message = Message::from_json(&value)?;
        tracing::debug!(id = ?message.id(), method = message.method(), "Handling message");
        if let Some(response) = handler(message)? {
            channel.send(response.to_json()).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryChannel;
    use jrpc_core::{DeserializationError, Error, ErrorObject};
    use serde_json::json;

    #[tokio::test]
    async fn test_responses_in_order() {
        let (mut channel, mut peer) = MemoryChannel::pair();
        peer.send_text(r#"{"jsonrpc":"2.0","method":"a","id":1}"#)
            .unwrap();
        peer.send_text(r#"{"jsonrpc":"2.0","method":"log"}"#)
            .unwrap();
        peer.send_text(r#"{"jsonrpc":"2.0","method":"b","id":2}"#)
            .unwrap();
        peer.close_sender();

        run_simple(&mut channel, |message| {
            Ok(match message {
                Message::Request(request) => {
                    Some(ResponseObject::success(Some(request.id), json!(request.method)))
                }
                _ => None,
            })
        })
        .await
        .unwrap();
        channel.close().await.unwrap();

        assert_eq!(
            peer.receive().await.unwrap(),
            Some(json!({"jsonrpc": "2.0", "id": 1, "result": "a"}))
        );
        assert_eq!(
            peer.receive().await.unwrap(),
            Some(json!({"jsonrpc": "2.0", "id": 2, "result": "b"}))
        );
        assert_eq!(peer.receive().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_failures_end_the_loop() {
        let (mut channel, mut peer) = MemoryChannel::pair();
        peer.send_text("{bad").unwrap();
        let result = run_simple(&mut channel, |_| Ok(None)).await;
        assert!(matches!(result, Err(Error::Parse(_))));

        peer.send_text("[1]").unwrap();
        let result = run_simple(&mut channel, |_| Ok(None)).await;
        assert!(matches!(
            result,
            Err(Error::Deserialization(DeserializationError::UnsupportedKindType(_)))
        ));

        peer.send_text(r#"{"jsonrpc":"2.0","method":"x","id":1}"#)
            .unwrap();
        let result =
            run_simple(&mut channel, |_| Err(ErrorObject::invalid_params("nope").into())).await;
        assert!(matches!(result, Err(Error::Protocol(_))));
    }
}
