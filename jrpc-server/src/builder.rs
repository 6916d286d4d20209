//! Engine configuration
//!
//! ```rust
//! use jrpc_server::{JsonRpcServer, MemoryChannel, NotificationErrorPolicy};
//!
//! let (channel, _peer) = MemoryChannel::pair();
//! let server = JsonRpcServer::builder(channel)
//!     .notification_errors(NotificationErrorPolicy::Suppress)
//!     .first_request_id(100)
//!     .with_default_metrics("calculator")
//!     .build();
//! assert_eq!(server.notification_errors(), NotificationErrorPolicy::Suppress);
//! ```

use crate::channel::Channel;
use crate::metrics::ServerMetrics;
use crate::pending::RequestIdGenerator;
use crate::server::JsonRpcServer;
use std::sync::Arc;

/// What to do when handling a notification fails
///
/// JSON-RPC forbids answering notifications, but a failure would then go
/// unnoticed by the peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotificationErrorPolicy {
    /// Send an error response with a null id
    #[default]
    Reply,
    /// Log the failure and send nothing
    Suppress,
}

/// Builder for [`JsonRpcServer`]
pub struct ServerBuilder<C> {
    channel: C,
    notification_errors: NotificationErrorPolicy,
    first_request_id: i32,
    metrics: Option<Arc<ServerMetrics>>,
}

impl<C: Channel> ServerBuilder<C> {
    pub fn new(channel: C) -> Self {
        Self {
            channel,
            notification_errors: NotificationErrorPolicy::default(),
            first_request_id: 0,
            metrics: None,
        }
    }

    /// Set the notification failure policy
    pub fn notification_errors(mut self, policy: NotificationErrorPolicy) -> Self {
        self.notification_errors = policy;
        self
    }

    /// Id of the first outgoing request (0 by default)
    pub fn first_request_id(mut self, id: i32) -> Self {
        self.first_request_id = id;
        self
    }

    /// Record engine metrics on shared instruments
    pub fn with_metrics(mut self, metrics: Arc<ServerMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Record engine metrics on the global meter provider
    pub fn with_default_metrics(mut self, service_name: impl Into<String>) -> Self {
        self.metrics = Some(Arc::new(ServerMetrics::new(service_name)));
        self
    }

    pub fn build(self) -> JsonRpcServer<C> {
        JsonRpcServer::from_parts(
            self.channel,
            RequestIdGenerator::starting_at(self.first_request_id),
            self.notification_errors,
            self.metrics,
        )
    }
}
