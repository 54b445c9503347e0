//! Routes observed payloads through the frame decoder onto the bus.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use socket_tap_core::{
    ConnectionId, DecodeError, DecodedMessage, Direction, EventBus, RawPayload, TapEvent, decode,
};

use crate::polling;
use crate::state::{ConnectionState, Lifecycle};
use crate::transport::TransportObserver;

/// Debug trace switches. Both default off.
///
/// Decode failures are part of normal operation (control frames never
/// decode), so they are invisible unless `log_failures` is set.
#[derive(Debug, Default)]
pub struct DebugConfig {
    log_failures: AtomicBool,
    log_successes: AtomicBool,
}

impl DebugConfig {
    /// Set both switches.
    pub fn set(&self, log_failures: bool, log_successes: bool) {
        self.log_failures.store(log_failures, Ordering::Relaxed);
        self.log_successes.store(log_successes, Ordering::Relaxed);
    }

    fn failures(&self) -> bool {
        self.log_failures.load(Ordering::Relaxed)
    }

    fn successes(&self) -> bool {
        self.log_successes.load(Ordering::Relaxed)
    }
}

/// The transport interceptor.
///
/// Implements [`TransportObserver`]; everything an adapter reports lands
/// here, gets decoded, and is published on the bus stamped with its
/// direction. State is keyed per connection instance, so overlapping socket
/// lifetimes are each tracked independently.
pub struct Interceptor {
    bus: Arc<EventBus>,
    debug: DebugConfig,
    connections: Mutex<HashMap<ConnectionId, ConnectionState>>,
}

impl Interceptor {
    /// Create an interceptor publishing to `bus`.
    #[must_use]
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self {
            bus,
            debug: DebugConfig::default(),
            connections: Mutex::new(HashMap::new()),
        }
    }

    /// The debug trace switches.
    #[must_use]
    pub const fn debug(&self) -> &DebugConfig {
        &self.debug
    }

    /// Decode one payload, honoring the debug switches. `None` means the
    /// payload was not an application frame; the caller publishes nothing.
    fn decode_traced(
        &self,
        direction: Direction,
        raw: &RawPayload,
    ) -> Option<DecodedMessage> {
        match decode(raw) {
            Ok(message) => {
                if self.debug.successes() {
                    tracing::debug!(
                        ?direction,
                        event = %message.event_name,
                        payload = ?message.payload,
                        "decoded frame"
                    );
                }
                Some(message)
            }
            Err(err) => {
                if self.debug.failures() && !matches!(err, DecodeError::NoFramePrefix) {
                    tracing::debug!(?direction, %err, ?raw, "frame did not decode");
                } else if self.debug.failures() {
                    tracing::trace!(?direction, ?raw, "skipped non-event frame");
                }
                None
            }
        }
    }

    /// Run the per-connection state machine for an observed send.
    fn attach_on_send(&self, connection: ConnectionId) -> Option<Lifecycle> {
        let mut connections = self.connections.lock().unwrap_or_else(|e| e.into_inner());
        connections.entry(connection).or_default().observe_send()
    }

    fn is_attached(&self, connection: ConnectionId) -> bool {
        let connections = self.connections.lock().unwrap_or_else(|e| e.into_inner());
        connections
            .get(&connection)
            .is_some_and(ConnectionState::is_attached)
    }

    /// Tear down state for a closed connection, reporting whether it had
    /// been attached.
    fn detach_on_close(&self, connection: ConnectionId) -> Option<Lifecycle> {
        let mut connections = self.connections.lock().unwrap_or_else(|e| e.into_inner());
        connections
            .remove(&connection)
            .and_then(|mut state| state.observe_close())
    }
}

impl TransportObserver for Interceptor {
    fn on_send(&self, connection: ConnectionId, raw: RawPayload) {
        // State first: an attach transition publishes `Connected` before the
        // `Send` event for the frame that triggered it. The lock is released
        // before anything is published.
        if self.attach_on_send(connection) == Some(Lifecycle::Connected) {
            tracing::info!(%connection, "attached to socket instance");
            self.bus.publish(TapEvent::Connected { connection });
        }

        if let Some(message) = self.decode_traced(Direction::Outbound, &raw) {
            self.bus.publish(TapEvent::Send { connection, message });
        }
    }

    fn on_receive(&self, connection: ConnectionId, raw: RawPayload) {
        // Inbound traffic on an instance that never sent is not observed;
        // attach is send-triggered.
        if !self.is_attached(connection) {
            tracing::trace!(%connection, "inbound frame on detached instance dropped");
            return;
        }

        if let Some(message) = self.decode_traced(Direction::Inbound, &raw) {
            self.bus.publish(TapEvent::Message {
                connection: Some(connection),
                message,
            });
        }
    }

    fn on_close(&self, connection: ConnectionId) {
        if self.detach_on_close(connection) == Some(Lifecycle::Disconnected) {
            tracing::info!(%connection, "socket instance closed");
            self.bus.publish(TapEvent::Disconnected { connection });
        }
    }

    fn on_poll_response(&self, body: &str) {
        // The polling surface has no socket lifetime; its frames are
        // inbound with no connection attribution.
        for frame in polling::split_frames(body) {
            if let Some(message) = self.decode_traced(Direction::Inbound, &RawPayload::from(frame))
            {
                self.bus.publish(TapEvent::Message {
                    connection: None,
                    message,
                });
            }
        }
    }
}
