//! Typed event model published on the [`crate::bus::EventBus`].

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::frame::DecodedMessage;

/// Identifier for one logical socket lifetime, minted by the transport
/// adapter when it first sees a new instance.
pub type ConnectionId = Uuid;

/// Which way a frame travelled over the observed connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Server to client.
    Inbound,
    /// Client to server.
    Outbound,
}

/// An observed event, published in transport order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TapEvent {
    /// A socket instance was attached (first outbound send observed).
    Connected { connection: ConnectionId },
    /// The attached socket instance closed.
    Disconnected { connection: ConnectionId },
    /// An inbound application message.
    ///
    /// `connection` is `None` for frames recovered from the polling
    /// fallback, which has no socket lifetime of its own.
    Message {
        connection: Option<ConnectionId>,
        message: DecodedMessage,
    },
    /// An outbound application message.
    Send {
        connection: ConnectionId,
        message: DecodedMessage,
    },
}

/// The four event kinds, for filtered subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Connected,
    Disconnected,
    Message,
    Send,
}

impl TapEvent {
    /// The kind of this event.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::Connected { .. } => EventKind::Connected,
            Self::Disconnected { .. } => EventKind::Disconnected,
            Self::Message { .. } => EventKind::Message,
            Self::Send { .. } => EventKind::Send,
        }
    }

    /// The decoded message, for `Message` and `Send` events.
    #[must_use]
    pub const fn message(&self) -> Option<&DecodedMessage> {
        match self {
            Self::Message { message, .. } | Self::Send { message, .. } => Some(message),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn kind_matches_variant() {
        let id = Uuid::new_v4();
        assert_eq!(TapEvent::Connected { connection: id }.kind(), EventKind::Connected);
        assert_eq!(
            TapEvent::Disconnected { connection: id }.kind(),
            EventKind::Disconnected
        );
    }

    #[test]
    fn serializes_with_snake_case_tag() {
        let id = Uuid::nil();
        let json = serde_json::to_value(TapEvent::Connected { connection: id }).unwrap();
        assert_eq!(json["type"], "connected");
    }
}
