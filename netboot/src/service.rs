//! Cooperative network service loop.
//!
//! There is one execution context and no scheduler; the network makes
//! progress only when somebody calls [`NetContext::tick`]. A tick is one
//! non-blocking pass over the transport: fire whatever protocol timers
//! are due, move whatever input the hardware has. Idle ticks must stay
//! cheap, the application's main loop calls this every iteration.

use log::debug;

/// What one service pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollEvent {
    /// Input moved from the device into the protocol engine.
    pub fed_input: bool,
    /// Protocol state advanced (timers fired, sockets progressed).
    pub progressed: bool,
}

/// One network transport behind the service loop.
///
/// Exactly two implementations exist, one per link flavor: the wired
/// smoltcp stack and the serial point-to-point link. An image wires in
/// one of them at its single construction site; the loop neither knows
/// nor cares which.
pub trait LinkTransport {
    /// One non-blocking pass: fire due timers, move pending input.
    fn pump(&mut self, now_ms: u64) -> PollEvent;

    /// Whether the link is ready to carry traffic.
    fn link_up(&self) -> bool;
}

/// Everything the service loop works on, passed around explicitly.
///
/// No global bring-up state: whoever owns the context owns the network.
pub struct NetContext<T: LinkTransport> {
    transport: T,
}

impl<T: LinkTransport> NetContext<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// One cooperative tick of the network.
    pub fn tick(&mut self, now_ms: u64) -> PollEvent {
        self.transport.pump(now_ms)
    }

    /// Whether the underlying link is ready to carry traffic.
    pub fn link_up(&self) -> bool {
        self.transport.link_up()
    }

    /// The transport, for link-specific queries.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The transport, for link-specific control.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Spin the service loop until the link is up.
    ///
    /// This is the one deliberately blocking call in the crate: boot
    /// holds here while a negotiated link comes up, because handing an
    /// application a dead link helps nobody. `pace` runs before every
    /// tick; return `false` from it to give up (hosts and tests bound
    /// the wait that way, firmware passes `|| true`). Returns whether
    /// the link came up.
    pub fn block_until_up(
        &mut self,
        mut clock: impl FnMut() -> u64,
        mut pace: impl FnMut() -> bool,
    ) -> bool {
        while !self.link_up() {
            if !pace() {
                debug!("gave up waiting for link");
                return false;
            }
            self.tick(clock());
        }
        true
    }
}
