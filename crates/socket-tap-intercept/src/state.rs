//! Per-connection attach state.
//!
//! One machine per socket instance, consulted on every observed call. This
//! replaces the trick of swapping the send wrapper out after first use: the
//! transition is explicit, so re-entrant sends from inside a subscriber
//! callback cannot re-run the one-time attach logic.

/// Attach phase of one socket instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// No listeners registered yet. Initial state.
    #[default]
    Detached,
    /// Listeners registered; inbound traffic is observed.
    Attached,
}

/// Lifecycle event produced by a state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Connected,
    Disconnected,
}

/// State machine for one socket lifetime.
#[derive(Debug, Default)]
pub struct ConnectionState {
    phase: Phase,
}

impl ConnectionState {
    /// Create a new machine in the detached phase.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether inbound traffic on this instance is observed.
    #[must_use]
    pub const fn is_attached(&self) -> bool {
        matches!(self.phase, Phase::Attached)
    }

    /// An outbound send was observed. The first send attaches the instance
    /// and yields `Connected`; every later send yields nothing.
    pub fn observe_send(&mut self) -> Option<Lifecycle> {
        match self.phase {
            Phase::Detached => {
                self.phase = Phase::Attached;
                Some(Lifecycle::Connected)
            }
            Phase::Attached => None,
        }
    }

    /// A close was observed. Detaches and yields `Disconnected` if the
    /// instance was attached; a close while detached yields nothing.
    pub fn observe_close(&mut self) -> Option<Lifecycle> {
        match self.phase {
            Phase::Attached => {
                self.phase = Phase::Detached;
                Some(Lifecycle::Disconnected)
            }
            Phase::Detached => None,
        }
    }
}
