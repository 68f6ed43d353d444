//! Serial point-to-point transport.
//!
//! The PPP engine itself (framing, LCP/IPCP negotiation, addressing) is
//! an external component reached through [`PppCodec`]. This module owns
//! the plumbing around it: the UART byte pump, the engine clock, and
//! link supervision with automatic reconnect.
//!
//! Status reports are drained as events instead of arriving through a
//! callback. The engine queues them while it works; every service pass
//! empties the queue into the [`LinkMonitor`] and carries out whatever
//! action falls out. That keeps the engine borrowable while its own
//! reports are being handled.

use crate::device::SerialPort;
use crate::link::{LinkAction, LinkMonitor, LinkState};
use crate::service::{LinkTransport, PollEvent};

/// Status report from the point-to-point engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PppStatus {
    /// Negotiation finished; the link carries traffic.
    Up,
    /// Closed on local request.
    Closed,
    /// Negotiation or carrier fault, with the engine's error code.
    Fault(u8),
}

/// Interface onto the external point-to-point protocol engine.
///
/// Created bound to an output sink: whatever byte stream the engine
/// produces (negotiation frames, encapsulated traffic) goes out through
/// the closure handed to [`PppCodec::create`].
pub trait PppCodec {
    /// Create an engine instance writing its outbound stream through
    /// `output`, which returns how many bytes it accepted.
    fn create(output: impl FnMut(&[u8]) -> usize + 'static) -> Self
    where
        Self: Sized;

    /// Do not require peer authentication.
    fn disable_auth(&mut self);

    /// Make the negotiated interface the system default, so traffic
    /// with no better match uses this link.
    fn make_default(&mut self);

    /// Begin (or begin again) negotiation.
    fn connect(&mut self);

    /// Close the link on local request. The engine confirms through a
    /// [`PppStatus::Closed`] report.
    fn close(&mut self);

    /// Feed one received byte into the engine's deframer.
    fn input(&mut self, byte: u8);

    /// Advance the engine's protocol timers to `now_ms`.
    fn advance(&mut self, now_ms: u64);

    /// Next pending status report, oldest first.
    fn take_status(&mut self) -> Option<PppStatus>;
}

/// Serial point-to-point transport: UART, engine and supervision.
pub struct PppLink<S: SerialPort, C: PppCodec> {
    port: S,
    codec: C,
    monitor: LinkMonitor,
}

impl<S, C> PppLink<S, C>
where
    S: SerialPort + 'static,
    C: PppCodec,
{
    /// Create the engine over `port` and initiate the first connect.
    ///
    /// Returns immediately; negotiation happens as the service loop
    /// pumps the link. `retry_limit` of `None` reconnects forever, which
    /// is the shipping default.
    pub fn bring_up(port: S, retry_limit: Option<u32>) -> Self {
        let tx = port.clone();
        let mut codec = C::create(move |bytes| {
            tx.write_all(bytes);
            bytes.len()
        });
        codec.disable_auth();
        codec.make_default();
        codec.connect();

        let mut monitor = match retry_limit {
            Some(limit) => LinkMonitor::with_retry_limit(limit),
            None => LinkMonitor::new(),
        };
        monitor.start();

        Self {
            port,
            codec,
            monitor,
        }
    }

    /// Current supervision state (not latched; see [`LinkMonitor`]).
    pub fn state(&self) -> LinkState {
        self.monitor.state()
    }

    /// Reconnect attempts since the last successful negotiation.
    pub fn retries(&self) -> u32 {
        self.monitor.retries()
    }

    /// Close the link. Final: the monitor treats the engine's
    /// confirmation as a deliberate stop, not a fault.
    pub fn disconnect(&mut self) {
        self.codec.close();
    }

    /// Engine access, for link-specific queries (negotiated addresses).
    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Engine access for tests and diagnostics.
    pub fn codec_mut(&mut self) -> &mut C {
        &mut self.codec
    }
}

impl<S, C> LinkTransport for PppLink<S, C>
where
    S: SerialPort + 'static,
    C: PppCodec,
{
    fn pump(&mut self, now_ms: u64) -> PollEvent {
        self.codec.advance(now_ms);

        // One byte per pass keeps the UART side fair to everything else
        // sharing the main loop.
        let fed_input = match self.port.read_byte() {
            Some(byte) => {
                self.codec.input(byte);
                true
            }
            None => false,
        };

        let mut progressed = false;
        while let Some(status) = self.codec.take_status() {
            progressed = true;
            if self.monitor.on_status(status) == LinkAction::Reconnect {
                self.codec.connect();
            }
        }

        PollEvent {
            fed_input,
            progressed,
        }
    }

    // Latched first-connectivity flag; this is what boot waits on.
    fn link_up(&self) -> bool {
        self.monitor.is_ready()
    }
}
