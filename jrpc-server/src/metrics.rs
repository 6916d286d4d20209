//! Engine metrics
//!
//! OpenTelemetry instruments recorded by [`JsonRpcServer`](crate::JsonRpcServer)
//! when metrics are enabled on the builder. They are exported through the
//! global meter provider installed by `jrpc_core::init_observability`; with
//! no provider installed, recording is a no-op.
//!
//! | Instrument                         | Kind      | Attributes |
//! |------------------------------------|-----------|------------|
//! | `jrpc.server.messages.received`    | counter   | `kind`     |
//! | `jrpc.server.responses.sent`       | counter   | `outcome`  |
//! | `jrpc.server.errors`               | counter   | `category` |
//! | `jrpc.server.batch.size`           | histogram |            |
//! | `jrpc.server.pending_handlers`     | gauge     |            |

use opentelemetry::{
    global,
    metrics::{Counter, Gauge, Histogram, Meter},
    InstrumentationScope, KeyValue,
};

/// Failure categories recorded in `jrpc.server.errors`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Malformed JSON text
    Parse,
    /// JSON that is not a valid message
    InvalidRequest,
    /// Error object raised by a handler
    Protocol,
    /// Any other handler failure
    Internal,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Parse => "parse",
            ErrorCategory::InvalidRequest => "invalid_request",
            ErrorCategory::Protocol => "protocol",
            ErrorCategory::Internal => "internal",
        }
    }
}

/// Instruments for one engine (or a group of engines sharing them)
pub struct ServerMetrics {
    pub messages_received: Counter<u64>,
    pub responses_sent: Counter<u64>,
    pub errors: Counter<u64>,
    pub batch_size: Histogram<u64>,
    pub pending_handlers: Gauge<i64>,
}

impl ServerMetrics {
    /// Create instruments on the global meter provider
    pub fn new(service_name: impl Into<String>) -> Self {
        let scope = InstrumentationScope::builder(service_name.into()).build();
        let meter = global::meter_with_scope(scope);
        Self::new_with_meter(&meter)
    }

    /// Create instruments on a specific meter
    pub fn new_with_meter(meter: &Meter) -> Self {
        Self {
            messages_received: meter
                .u64_counter("jrpc.server.messages.received")
                .with_description("Messages decoded by the engine")
                .build(),
            responses_sent: meter
                .u64_counter("jrpc.server.responses.sent")
                .with_description("Responses written to the channel")
                .build(),
            errors: meter
                .u64_counter("jrpc.server.errors")
                .with_description("Failures answered with an error response")
                .build(),
            batch_size: meter
                .u64_histogram("jrpc.server.batch.size")
                .with_description("Number of elements in received batches")
                .build(),
            pending_handlers: meter
                .i64_gauge("jrpc.server.pending_handlers")
                .with_description("Outgoing requests awaiting a response")
                .build(),
        }
    }

    /// Record a decoded message of the given kind ("request", "notification", "response")
    pub fn record_message(&self, kind: &'static str) {
        self.messages_received.add(1, &[KeyValue::new("kind", kind)]);
    }

    /// Record a response written to the channel
    pub fn record_response(&self, success: bool) {
        let outcome = if success { "success" } else { "error" };
        self.responses_sent.add(1, &[KeyValue::new("outcome", outcome)]);
    }

    pub fn record_error(&self, category: ErrorCategory) {
        self.errors
            .add(1, &[KeyValue::new("category", category.as_str())]);
    }

    pub fn record_batch(&self, size: usize) {
        self.batch_size.record(size as u64, &[]);
    }

    pub fn update_pending(&self, count: usize) {
        self.pending_handlers.record(count as i64, &[]);
    }
}
