//! Broadcast event bus.
//!
//! A single process-wide publish point. Publishing is a synchronous channel
//! send, so every subscriber observes `Message`/`Send` events in exactly the
//! order the transport delivered the corresponding frames. Subscribers
//! unsubscribe by dropping their receiver; in-flight dispatch to other
//! subscribers is unaffected.

use futures::StreamExt;
use futures::stream::BoxStream;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

use crate::event::{ConnectionId, EventKind, TapEvent};
use crate::frame::DecodedMessage;

/// Channel capacity. A subscriber that lags behind by more than this many
/// events observes a `Lagged` gap rather than blocking the publisher.
const CHANNEL_CAPACITY: usize = 1024;

/// Event bus with broadcast fan-out.
pub struct EventBus {
    sender: broadcast::Sender<TapEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    /// Create a new event bus.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// A send with no subscribers is not an error; the event is dropped.
    pub fn publish(&self, event: TapEvent) {
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events. Drop the receiver to unsubscribe.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<TapEvent> {
        self.sender.subscribe()
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Stream of all events, lag gaps skipped.
    #[must_use]
    pub fn events(&self) -> BoxStream<'static, TapEvent> {
        BroadcastStream::new(self.subscribe())
            .filter_map(|res| async move { res.ok() })
            .boxed()
    }

    /// Stream of events of a single kind.
    #[must_use]
    pub fn stream_of(&self, kind: EventKind) -> BoxStream<'static, TapEvent> {
        self.events()
            .filter(move |ev| futures::future::ready(ev.kind() == kind))
            .boxed()
    }

    /// Stream of inbound application messages.
    #[must_use]
    pub fn inbound_messages(
        &self,
    ) -> BoxStream<'static, (Option<ConnectionId>, DecodedMessage)> {
        self.events()
            .filter_map(|ev| async move {
                match ev {
                    TapEvent::Message { connection, message } => Some((connection, message)),
                    _ => None,
                }
            })
            .boxed()
    }

    /// Stream of outbound application messages.
    #[must_use]
    pub fn outbound_messages(&self) -> BoxStream<'static, (ConnectionId, DecodedMessage)> {
        self.events()
            .filter_map(|ev| async move {
                match ev {
                    TapEvent::Send { connection, message } => Some((connection, message)),
                    _ => None,
                }
            })
            .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn message_event(name: &str) -> TapEvent {
        TapEvent::Message {
            connection: None,
            message: DecodedMessage {
                event_name: name.to_owned(),
                payload: None,
            },
        }
    }

    #[tokio::test]
    async fn subscribers_see_events_in_publish_order() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        bus.publish(message_event("first"));
        bus.publish(message_event("second"));
        bus.publish(message_event("third"));

        for expected in ["first", "second", "third"] {
            let ev = rx.recv().await.unwrap();
            assert_eq!(ev.message().unwrap().event_name, expected);
        }
    }

    #[tokio::test]
    async fn dropping_one_receiver_leaves_others_subscribed() {
        let bus = EventBus::new();
        let dropped = bus.subscribe();
        let mut kept = bus.subscribe();
        drop(dropped);

        bus.publish(message_event("still-delivered"));
        let ev = kept.recv().await.unwrap();
        assert_eq!(ev.message().unwrap().event_name, "still-delivered");
        assert_eq!(bus.subscriber_count(), 1);
    }

    #[tokio::test]
    async fn stream_of_filters_by_kind() {
        let bus = EventBus::new();
        let mut connected = bus.stream_of(EventKind::Connected);

        let id = Uuid::new_v4();
        bus.publish(message_event("noise"));
        bus.publish(TapEvent::Connected { connection: id });

        let ev = connected.next().await.unwrap();
        assert_eq!(ev, TapEvent::Connected { connection: id });
    }

    #[tokio::test]
    async fn outbound_stream_skips_inbound_traffic() {
        let bus = EventBus::new();
        let mut outbound = bus.outbound_messages();

        let id = Uuid::new_v4();
        bus.publish(message_event("inbound-only"));
        bus.publish(TapEvent::Send {
            connection: id,
            message: DecodedMessage {
                event_name: "attack".to_owned(),
                payload: None,
            },
        });

        let (conn, msg) = outbound.next().await.unwrap();
        assert_eq!(conn, id);
        assert_eq!(msg.event_name, "attack");
    }
}
