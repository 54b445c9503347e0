//! Core building blocks for passive socket observation.
//!
//! This crate provides:
//! - `frame` - Decoding of raw transport payloads into `[eventName, payload]` pairs
//! - `event` - The typed event model (`TapEvent`, `Direction`, `ConnectionId`)
//! - `bus` - Broadcast event bus that fans decoded traffic out to subscribers

pub mod bus;
pub mod event;
pub mod frame;

pub use bus::EventBus;
pub use event::{ConnectionId, Direction, EventKind, TapEvent};
pub use frame::{DecodeError, DecodedMessage, RawPayload, decode};
