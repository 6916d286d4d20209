//! Engine over newline-delimited JSON

use jrpc_core::adapter::IntOrStringAdapter;
use jrpc_core::{ErrorObject, JsonAdapter, Message};
use jrpc_server::{from_fn, JsonRpcServer, LineChannel, LineEnding};
use serde_json::{json, Value};

#[tokio::test]
async fn test_serve_over_line_stream() {
    let input: &[u8] = concat!(
        "{\"jsonrpc\":\"2.0\",\"method\":\"ping\",\"id\":1}\n",
        "\n",
        "{\"jsonrpc\": \"2.0\", \n",
        "[{\"jsonrpc\":\"2.0\",\"method\":\"nope\",\"id\":2},",
        "{\"jsonrpc\":\"2.0\",\"method\":\"log\"}]\n",
    )
    .as_bytes();

    let channel = LineChannel::new(input, Vec::new()).with_line_ending(LineEnding::Lf);
    let mut server = JsonRpcServer::new(channel);
    server
        .run(from_fn(|message, ctx| match message {
            Message::Request(request) if request.method == "ping" => ctx.respond(json!("pong")),
            Message::Request(request) => Err(ErrorObject::method_not_found(&request.method).into()),
            _ => Ok(()),
        }))
        .await
        .unwrap();

    let (_, written) = server.into_channel().into_inner();
    let lines: Vec<Value> = String::from_utf8(written)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], json!({"jsonrpc": "2.0", "id": 1, "result": "pong"}));
    assert_eq!(lines[1]["id"], Value::Null);
    assert_eq!(lines[1]["error"]["code"], -32700);
    assert_eq!(lines[2]["id"], 2);
    assert_eq!(lines[2]["error"]["code"], -32601);
}

#[tokio::test]
async fn test_non_utf8_line_is_answered_and_reading_continues() {
    let input: &[u8] = b"\xff\xfe\n{\"jsonrpc\":\"2.0\",\"method\":\"ping\",\"id\":1}\n";

    let channel = LineChannel::new(input, Vec::new()).with_line_ending(LineEnding::Lf);
    let mut server = JsonRpcServer::new(channel);
    server
        .run(from_fn(|_, ctx| ctx.respond(json!("pong"))))
        .await
        .unwrap();

    let (_, written) = server.into_channel().into_inner();
    let lines: Vec<Value> = String::from_utf8(written)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["id"], Value::Null);
    assert_eq!(lines[0]["error"]["code"], -32700);
    assert_eq!(lines[1], json!({"jsonrpc": "2.0", "id": 1, "result": "pong"}));
}

#[tokio::test]
async fn test_duplex_round_trip() {
    let (client_io, server_io) = tokio::io::duplex(1024);
    let (server_read, server_write) = tokio::io::split(server_io);
    let (client_read, client_write) = tokio::io::split(client_io);

    let server_task = tokio::spawn(async move {
        let channel = LineChannel::new(tokio::io::BufReader::new(server_read), server_write);
        JsonRpcServer::new(channel)
            .serve(from_fn(|message, ctx| {
                if let Message::Request(request) = message {
                    ctx.respond(json!(request.method))?;
                }
                Ok(())
            }))
            .await
    });

    let mut client = JsonRpcServer::new(LineChannel::new(
        tokio::io::BufReader::new(client_read),
        client_write,
    ));
    let id = client.request("hello", None).await.unwrap();
    let reply = client.receive().await.unwrap().unwrap();
    assert_eq!(
        reply,
        json!({"jsonrpc": "2.0", "id": IntOrStringAdapter::serialize(&id), "result": "hello"})
    );

    client.close().await.unwrap();
    server_task.await.unwrap().unwrap();
}
