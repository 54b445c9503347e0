//! Transport interception for passive socket observation.
//!
//! This crate provides:
//! - `transport` - The observer and adapter traits at the transport seam
//! - `state` - Per-connection attach state machine
//! - `polling` - Frame splitting for the polling-fallback surface
//! - `interceptor` - Routes every payload through the frame decoder
//! - `install` - Process-wide singleton install
//!
//! The interceptor never reaches into the observed transport itself: an
//! adapter (one per environment) watches a real connection and drives the
//! [`TransportObserver`] it was given. The adapter decides *how* a
//! connection is observed; this crate decides *what* the observed traffic
//! means.

pub mod install;
pub mod interceptor;
pub mod polling;
pub mod state;
pub mod transport;

pub use install::{SocketTap, install};
pub use interceptor::{DebugConfig, Interceptor};
pub use transport::{TransportError, TransportObserver, TransportSource};
