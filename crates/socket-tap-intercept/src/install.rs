//! Process-wide install.

use std::sync::{Arc, OnceLock};

use socket_tap_core::EventBus;

use crate::interceptor::Interceptor;
use crate::transport::TransportObserver;

/// The assembled tap: one bus, one interceptor.
pub struct SocketTap {
    bus: Arc<EventBus>,
    interceptor: Arc<Interceptor>,
}

impl Default for SocketTap {
    fn default() -> Self {
        Self::new()
    }
}

impl SocketTap {
    /// Create a standalone tap. Most callers want [`install`] instead; this
    /// constructor exists for tests and embedders that manage their own
    /// lifetime.
    #[must_use]
    pub fn new() -> Self {
        let bus = Arc::new(EventBus::new());
        let interceptor = Arc::new(Interceptor::new(Arc::clone(&bus)));
        Self { bus, interceptor }
    }

    /// The event bus consumers subscribe on.
    #[must_use]
    pub const fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    /// The observer to hand to transport adapters.
    #[must_use]
    pub fn observer(&self) -> Arc<dyn TransportObserver> {
        Arc::clone(&self.interceptor) as Arc<dyn TransportObserver>
    }

    /// Toggle the two debug trace switches: `log_failures` traces every
    /// decode failure with its reason and payload, `log_successes` every
    /// decoded event. Both default off.
    pub fn set_debug_mode(&self, log_failures: bool, log_successes: bool) {
        self.interceptor.debug().set(log_failures, log_successes);
        tracing::info!(log_failures, log_successes, "debug mode updated");
    }
}

static TAP: OnceLock<SocketTap> = OnceLock::new();

/// Install the process-wide tap.
///
/// Idempotent: the first call creates the singleton, every later call
/// returns the same instance, so the observable event stream is identical
/// however many times this runs.
pub fn install() -> &'static SocketTap {
    TAP.get_or_init(|| {
        tracing::info!("socket tap installed");
        SocketTap::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use socket_tap_core::{EventKind, RawPayload};
    use uuid::Uuid;

    #[test]
    fn install_is_idempotent() {
        assert!(std::ptr::eq(install(), install()));
    }

    #[tokio::test]
    async fn installed_tap_publishes_through_its_own_bus() {
        let tap = install();
        let mut rx = tap.bus().subscribe();
        let conn = Uuid::new_v4();

        tap.observer().on_send(conn, RawPayload::from(r#"42["probe"]"#));

        let kinds: Vec<EventKind> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|ev| ev.kind())
            .collect();
        assert!(kinds.contains(&EventKind::Connected));
        assert!(kinds.contains(&EventKind::Send));
    }
}
