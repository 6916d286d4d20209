//! Stdio echo server
//!
//! Speaks newline-delimited JSON-RPC 2.0 over stdin and stdout. Logs go to
//! stderr so they never mix with protocol output.
//!
//! Run with: cargo run --example stdio_echo
//!
//! Then type, one message per line:
//!
//! ```text
//! {"jsonrpc":"2.0","method":"ping","id":1}
//! {"jsonrpc":"2.0","method":"echo","params":["hello"],"id":2}
//! {"jsonrpc":"2.0","method":"add","params":{"a":2,"b":3},"id":3}
//! [{"jsonrpc":"2.0","method":"ping","id":4},{"jsonrpc":"2.0","method":"log","params":["hi"]}]
//! ```

use jrpc::{
    from_fn, init_observability, ArrayOrObject, Context, ErrorObject, JsonRpcServer, LineChannel,
    Message, ObservabilityConfig, RequestObject,
};
use serde_json::{json, Value};

fn add(params: Option<&ArrayOrObject>) -> jrpc::Result<Value> {
    let object = params
        .and_then(ArrayOrObject::as_object)
        .ok_or_else(|| ErrorObject::invalid_params("expected {\"a\": int, \"b\": int}"))?;
    let operand = |name: &str| {
        object
            .get(name)
            .and_then(Value::as_i64)
            .ok_or_else(|| ErrorObject::invalid_params(format!("missing integer '{}'", name)))
    };
    Ok(json!(operand("a")? + operand("b")?))
}

fn handle_request(request: RequestObject, ctx: &mut Context<'_>) -> jrpc::Result<()> {
    tracing::info!(method = %request.method, id = %request.id, "Request");
    match request.method.as_str() {
        "ping" => ctx.respond(json!("pong")),
        "echo" => ctx.respond(request.params.map(ArrayOrObject::into_value).unwrap_or(Value::Null)),
        "add" => ctx.respond(add(request.params.as_ref())?),
        other => Err(ErrorObject::method_not_found(other).into()),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = ObservabilityConfig::new("stdio-echo").with_log_level("debug");
    let _guard = init_observability(config)?;

    let server = JsonRpcServer::builder(LineChannel::stdio())
        .with_default_metrics("stdio-echo")
        .build();

    server
        .serve(from_fn(|message, ctx| match message {
            Message::Request(request) => handle_request(request, ctx),
            Message::Notification(notification) => {
                tracing::info!(method = %notification.method, "Notification");
                Ok(())
            }
            Message::Response(response) => {
                tracing::debug!(id = ?response.id, "Unsolicited response");
                Ok(())
            }
        }))
        .await?;

    Ok(())
}
