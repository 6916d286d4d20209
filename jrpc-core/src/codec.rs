//! Text codec for JSON-RPC messages
//!
//! Channels move JSON text; the engine works on [`serde_json::Value`]. This
//! module sits between the two:
//!
//! - [`parse`] turns text into a value, mapping malformed input to
//!   [`Error::Parse`] with the parser's message
//! - [`encode`] turns any serializable value (messages included) into
//!   compact text
//! - [`decode_message`] parses and reads a single [`Message`] in one step
//!
//! A parse error is reported to the peer with only the first line of the
//! parser message; [`first_line`] extracts it.
//!
//! # Examples
//!
//! ```rust
//! use jrpc_core::{codec, Error};
//!
//! let value = codec::parse(r#"{"jsonrpc":"2.0","method":"ping"}"#).unwrap();
//! assert_eq!(value["method"], "ping");
//!
//! assert!(matches!(codec::parse("{not json"), Err(Error::Parse(_))));
//! ```

use crate::error::{Error, Result};
use crate::message::Message;
use serde::Serialize;
use serde_json::Value;

/// Parse JSON text
///
/// # Errors
///
/// `Error::Parse` carrying the parser message when the text is not JSON.
pub fn parse(text: &str) -> Result<Value> {
    serde_json::from_str(text).map_err(|e| Error::Parse(e.to_string()))
}

/// Encode a value as compact JSON text
///
/// Object keys keep their insertion order, so messages come out as
/// `jsonrpc`, `method`/`id`, ... exactly as the message types build them.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| Error::Serialization(e.to_string()))
}

/// Parse text and read it as a single message
///
/// ```rust
/// use jrpc_core::codec;
///
/// let message = codec::decode_message(r#"{"jsonrpc":"2.0","id":1,"result":true}"#).unwrap();
/// assert!(message.is_response());
/// ```
pub fn decode_message(text: &str) -> Result<Message> {
    let value = parse(text)?;
    Ok(Message::from_json(&value)?)
}

/// First line of a possibly multi-line message
pub fn first_line(message: &str) -> &str {
    message.lines().next().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DeserializationError;
    use crate::message::ResponseObject;
    use serde_json::json;

    #[test]
    fn test_parse_error_keeps_parser_message() {
        match parse("{\"a\": }") {
            Err(Error::Parse(message)) => assert!(message.contains("line 1")),
            other => panic!("Expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_encode_message() {
        let response = ResponseObject::success(Some(1.into()), json!("lorem"));
        assert_eq!(
            encode(&response).unwrap(),
            r#"{"jsonrpc":"2.0","id":1,"result":"lorem"}"#
        );
    }

    #[test]
    fn test_decode_message_reports_structure_errors() {
        match decode_message("[1, 2]") {
            Err(Error::Deserialization(DeserializationError::UnsupportedKindType(kind))) => {
                assert_eq!(kind.name(), "array")
            }
            other => panic!("Expected deserialization error, got {:?}", other),
        }
    }

    #[test]
    fn test_first_line() {
        assert_eq!(first_line("expected value\nat line 2"), "expected value");
        assert_eq!(first_line("single"), "single");
        assert_eq!(first_line(""), "");
    }
}
