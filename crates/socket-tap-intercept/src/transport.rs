//! Traits at the transport seam.

use std::sync::Arc;

use async_trait::async_trait;
use socket_tap_core::{ConnectionId, RawPayload};
use thiserror::Error;

/// Transport error.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("transport closed: {0}")]
    Closed(String),
}

/// Sink for observed transport activity.
///
/// Adapters call these from inside the host transport's own callbacks, so
/// implementations must contain every failure: a panic escaping here would
/// break the host's unrelated handling of the same event. Nothing in this
/// trait may block.
pub trait TransportObserver: Send + Sync {
    /// The host performed an outbound send on a socket instance. The send
    /// itself has already happened; observation never suppresses it.
    fn on_send(&self, connection: ConnectionId, raw: RawPayload);

    /// An inbound frame arrived on a socket instance.
    fn on_receive(&self, connection: ConnectionId, raw: RawPayload);

    /// A socket instance closed.
    fn on_close(&self, connection: ConnectionId);

    /// A polling-fallback response body completed. The body may batch
    /// several frames; splitting is the observer's job.
    fn on_poll_response(&self, body: &str);
}

/// An adapter that drives a real transport and feeds an observer.
///
/// One implementation per environment: whatever mechanism that environment
/// uses to watch an existing connection lives behind this trait, keeping the
/// interception core free of it.
#[async_trait]
pub trait TransportSource: Send {
    /// Pump the transport until it ends, reporting everything observed.
    async fn pump(&mut self, observer: Arc<dyn TransportObserver>) -> Result<(), TransportError>;
}
