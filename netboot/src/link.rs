//! Link supervision for negotiated (point-to-point) links.
//!
//! The protocol engine reports status changes; [`LinkMonitor`] turns them
//! into a state and an action for the owner to carry out. Keeping the
//! monitor pure (no engine handle inside) lets the owner drain engine
//! events and drive the engine without fighting the borrow checker.
//!
//! Readiness latches: once the link has been up, [`LinkMonitor::is_ready`]
//! stays true even across later faults or closure. Boot code polls it
//! exactly once, while waiting for first connectivity, and nothing else
//! consumes it.

use log::{info, warn};

use crate::ppp::PppStatus;

/// Where the link currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// Not started, or deliberately closed. Nothing restarts from here.
    Idle,
    /// Negotiation in progress, including automatic reconnects.
    Connecting,
    /// Negotiation completed.
    Connected,
    /// Retry budget exhausted; parked until somebody starts over.
    Failed,
}

/// What the owner must do after feeding a status to the monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum LinkAction {
    None,
    /// Ask the protocol engine to connect again.
    Reconnect,
}

/// Tracks link state and decides on reconnection.
///
/// By default faults trigger reconnection forever; the device's only job
/// is to be reachable, so it keeps trying. A retry ceiling is opt-in via
/// [`LinkMonitor::with_retry_limit`] and changes nothing until it is hit.
pub struct LinkMonitor {
    state: LinkState,
    ready: bool,
    retries: u32,
    retry_limit: Option<u32>,
}

impl LinkMonitor {
    /// Monitor with unbounded reconnection.
    pub const fn new() -> Self {
        Self {
            state: LinkState::Idle,
            ready: false,
            retries: 0,
            retry_limit: None,
        }
    }

    /// Monitor allowing at most `limit` automatic reconnects per outage.
    pub const fn with_retry_limit(limit: u32) -> Self {
        Self {
            state: LinkState::Idle,
            ready: false,
            retries: 0,
            retry_limit: Some(limit),
        }
    }

    /// Note that the first connect has been initiated.
    pub fn start(&mut self) {
        self.state = LinkState::Connecting;
        self.retries = 0;
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    /// Latched: has the link ever come up.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Reconnect attempts since the last successful negotiation.
    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// Feed one engine status report through the machine.
    pub fn on_status(&mut self, status: PppStatus) -> LinkAction {
        match status {
            PppStatus::Up => {
                info!("link up after {} reconnects", self.retries);
                self.state = LinkState::Connected;
                self.ready = true;
                self.retries = 0;
                LinkAction::None
            }
            PppStatus::Closed => {
                // Deliberate closure is final; no automatic restart.
                info!("link closed");
                self.state = LinkState::Idle;
                LinkAction::None
            }
            PppStatus::Fault(code) => {
                // A late fault after closure or parking changes nothing.
                if matches!(self.state, LinkState::Idle | LinkState::Failed) {
                    return LinkAction::None;
                }
                match self.retry_limit {
                    Some(limit) if self.retries >= limit => {
                        warn!("link fault {}, retry budget spent, parking", code);
                        self.state = LinkState::Failed;
                        LinkAction::None
                    }
                    _ => {
                        self.retries += 1;
                        warn!("link fault {}, reconnect attempt {}", code, self.retries);
                        self.state = LinkState::Connecting;
                        LinkAction::Reconnect
                    }
                }
            }
        }
    }
}

impl Default for LinkMonitor {
    fn default() -> Self {
        Self::new()
    }
}
