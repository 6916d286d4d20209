//! Message loop integration tests

use jrpc_core::{Error, ErrorObject, IntOrString, Message, Result};
use jrpc_server::{
    from_fn, Channel, Context, JsonRpcServer, MemoryChannel, MessageHandler,
    NotificationErrorPolicy,
};
use serde_json::{json, Value};

/// Records every message it sees
#[derive(Default)]
struct Recorder {
    seen: Vec<Message>,
}

impl MessageHandler for Recorder {
    fn handle(&mut self, message: Message, _ctx: &mut Context<'_>) -> Result<()> {
        self.seen.push(message);
        Ok(())
    }
}

/// Feed `inputs` to a server, run it to completion and collect its output
async fn exchange<H: MessageHandler>(
    policy: NotificationErrorPolicy,
    inputs: &[&str],
    handler: H,
) -> Vec<Value> {
    let (channel, mut peer) = MemoryChannel::pair();
    for input in inputs {
        peer.send_text(*input).unwrap();
    }
    peer.close_sender();

    let mut server = JsonRpcServer::builder(channel)
        .notification_errors(policy)
        .build();
    server.run(handler).await.unwrap();
    server.close().await.unwrap();

    let mut output = Vec::new();
    while let Some(value) = peer.receive().await.unwrap() {
        output.push(value);
    }
    output
}

#[tokio::test]
async fn test_notification_produces_no_output() {
    let mut recorder = Recorder::default();
    let output = exchange(
        NotificationErrorPolicy::Reply,
        &[r#"{"jsonrpc":"2.0","method":"test"}"#],
        &mut recorder,
    )
    .await;

    assert!(output.is_empty());
    assert_eq!(recorder.seen.len(), 1);
    assert!(recorder.seen[0].is_notification());
    assert_eq!(recorder.seen[0].method(), Some("test"));
}

#[tokio::test]
async fn test_request_response() {
    let (channel, mut peer) = MemoryChannel::pair();
    peer.send_text(r#"{"jsonrpc":"2.0","method":"test","id":1}"#)
        .unwrap();
    peer.close_sender();

    let mut server = JsonRpcServer::new(channel);
    server
        .run(from_fn(|_, ctx| ctx.respond(json!("lorem"))))
        .await
        .unwrap();
    server.close().await.unwrap();

    assert_eq!(
        peer.receive_text().await.as_deref(),
        Some(r#"{"jsonrpc":"2.0","id":1,"result":"lorem"}"#)
    );
    assert_eq!(peer.receive_text().await, None);
}

#[tokio::test]
async fn test_malformed_json_answers_parse_error_and_continues() {
    let mut recorder = Recorder::default();
    let output = exchange(
        NotificationErrorPolicy::Reply,
        &["{\"jsonrpc\": \"2.0\", ", r#"{"jsonrpc":"2.0","method":"after"}"#],
        &mut recorder,
    )
    .await;

    assert_eq!(output.len(), 1);
    let response = &output[0];
    assert_eq!(response["jsonrpc"], "2.0");
    assert_eq!(response["id"], Value::Null);
    assert_eq!(response["error"]["code"], -32700);

    let message = response["error"]["message"].as_str().unwrap();
    assert!(!message.is_empty());
    assert!(!message.contains('\n'));

    // The loop kept going
    assert_eq!(recorder.seen.len(), 1);
    assert_eq!(recorder.seen[0].method(), Some("after"));
}

#[tokio::test]
async fn test_batch_is_processed_in_order() {
    let batch = r#"[
        {"jsonrpc":"2.0","method":"first","id":1,"params":[1]},
        {"jsonrpc":"2.0","method":"second","id":"two","params":{"n":2}}
    ]"#;

    let mut calls = Vec::new();
    let output = exchange(
        NotificationErrorPolicy::Reply,
        &[batch],
        from_fn(|message, ctx| {
            if let Message::Request(request) = message {
                calls.push((request.id.clone(), request.method.clone()));
                ctx.respond(request.params.map(|p| p.into_value()).unwrap_or_default())?;
            }
            Ok(())
        }),
    )
    .await;

    assert_eq!(
        calls,
        vec![
            (IntOrString::Integer(1), "first".to_string()),
            (IntOrString::from("two"), "second".to_string()),
        ]
    );
    assert_eq!(
        output,
        vec![
            json!({"jsonrpc": "2.0", "id": 1, "result": [1]}),
            json!({"jsonrpc": "2.0", "id": "two", "result": {"n": 2}}),
        ]
    );
}

#[tokio::test]
async fn test_faulty_batch_element_does_not_stop_siblings() {
    let batch = r#"[
        {"jsonrpc":"2.0","id":1},
        7,
        {"jsonrpc":"2.0","method":"ok","id":3}
    ]"#;

    let output = exchange(
        NotificationErrorPolicy::Reply,
        &[batch],
        from_fn(|_, ctx| ctx.respond(json!(true))),
    )
    .await;

    assert_eq!(
        output,
        vec![
            json!({
                "jsonrpc": "2.0",
                "id": null,
                "error": {"code": -32600, "message": "Missing key: result, error"}
            }),
            json!({
                "jsonrpc": "2.0",
                "id": null,
                "error": {"code": -32600, "message": "Unsupported kind type: integer"}
            }),
            json!({"jsonrpc": "2.0", "id": 3, "result": true}),
        ]
    );
}

#[tokio::test]
async fn test_invalid_request() {
    let output = exchange(
        NotificationErrorPolicy::Reply,
        &[r#"{"jsonrpc":"2.0","method":"m","id":1,"params":"scalar"}"#],
        Recorder::default(),
    )
    .await;

    assert_eq!(
        output,
        vec![json!({
            "jsonrpc": "2.0",
            "id": null,
            "error": {"code": -32600, "message": "Unsupported kind type: string"}
        })]
    );
}

#[tokio::test]
async fn test_protocol_error_is_sent_verbatim() {
    let output = exchange(
        NotificationErrorPolicy::Reply,
        &[r#"{"jsonrpc":"2.0","method":"withdraw","id":"tx-1"}"#],
        from_fn(|_, _| {
            Err(ErrorObject::with_data(1001, "Insufficient funds", json!({"balance": 5})).into())
        }),
    )
    .await;

    assert_eq!(
        output,
        vec![json!({
            "jsonrpc": "2.0",
            "id": "tx-1",
            "error": {"code": 1001, "message": "Insufficient funds", "data": {"balance": 5}}
        })]
    );
}

#[tokio::test]
async fn test_other_failures_become_internal_errors() {
    let output = exchange(
        NotificationErrorPolicy::Reply,
        &[r#"{"jsonrpc":"2.0","method":"explode","id":4}"#],
        from_fn(|_, _| Err(Error::handler("disk full"))),
    )
    .await;

    assert_eq!(
        output,
        vec![json!({
            "jsonrpc": "2.0",
            "id": 4,
            "error": {"code": -32603, "message": "disk full"}
        })]
    );
}

#[tokio::test]
async fn test_messages_queued_before_failure_are_still_sent() {
    let output = exchange(
        NotificationErrorPolicy::Reply,
        &[r#"{"jsonrpc":"2.0","method":"work","id":1}"#],
        from_fn(|_, ctx| {
            ctx.notify("progress", None);
            Err(ErrorObject::internal_error("gave up").into())
        }),
    )
    .await;

    assert_eq!(
        output,
        vec![
            json!({"jsonrpc": "2.0", "method": "progress"}),
            json!({
                "jsonrpc": "2.0",
                "id": 1,
                "error": {"code": -32603, "message": "gave up"}
            }),
        ]
    );
}

// Failing notifications are answered with a null id by default, even though
// JSON-RPC says notifications get no response. `Suppress` turns that off.
#[tokio::test]
async fn test_failing_notification_replies_with_null_id() {
    let output = exchange(
        NotificationErrorPolicy::Reply,
        &[r#"{"jsonrpc":"2.0","method":"log"}"#],
        from_fn(|_, _| Err(ErrorObject::invalid_params("bad level").into())),
    )
    .await;

    assert_eq!(
        output,
        vec![json!({
            "jsonrpc": "2.0",
            "id": null,
            "error": {"code": -32602, "message": "bad level"}
        })]
    );
}

#[tokio::test]
async fn test_failing_notification_suppressed() {
    let output = exchange(
        NotificationErrorPolicy::Suppress,
        &[
            r#"{"jsonrpc":"2.0","method":"log"}"#,
            r#"{"jsonrpc":"2.0","method":"log","id":2}"#,
        ],
        from_fn(|_, _| Err(Error::handler("boom"))),
    )
    .await;

    // Only the request is answered
    assert_eq!(
        output,
        vec![json!({
            "jsonrpc": "2.0",
            "id": 2,
            "error": {"code": -32603, "message": "boom"}
        })]
    );
}

#[tokio::test]
async fn test_notification_cannot_respond() {
    let output = exchange(
        NotificationErrorPolicy::Suppress,
        &[r#"{"jsonrpc":"2.0","method":"note"}"#],
        from_fn(|_, ctx| ctx.respond(json!(1))),
    )
    .await;

    assert!(output.is_empty());
}

#[tokio::test]
async fn test_empty_batch_produces_nothing() {
    let mut recorder = Recorder::default();
    let output = exchange(NotificationErrorPolicy::Reply, &["[]"], &mut recorder).await;

    assert!(output.is_empty());
    assert!(recorder.seen.is_empty());
}
