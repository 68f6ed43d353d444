//! Bootstrap entry points.
//!
//! Two ways onto the network, one per link flavor:
//!
//! - [`boot_wired`]: resolve identity from the store, attach the smoltcp
//!   stack, hand over. The wired path is fully up the moment attachment
//!   completes, so there is nothing to wait for.
//! - [`boot_serial_ppp`]: start the point-to-point engine, then spin the
//!   service loop until first connectivity before handing over. Nothing
//!   useful exists before the link is up, so boot waits as long as it
//!   takes.
//!
//! Both share [`platform_prelude`]: interrupt sources masked, delivery
//! enabled, serial brought up, heap arena donated, in that order.
//!
//! Control transfer is final. The application entry never returns and
//! takes the whole [`NetContext`] with it; from then on the network
//! lives wherever the application keeps the context.

use core::convert::Infallible;

use log::{debug, info, LevelFilter};

use crate::config::{ConfigStore, InterfaceConfig};
use crate::device::{PacketDevice, SerialPort};
use crate::heap;
use crate::logger;
use crate::platform::Platform;
use crate::ppp::{PppCodec, PppLink};
use crate::service::NetContext;
use crate::stack::WiredStack;

/// Log level compiled into firmware entry points.
const LOG_LEVEL: LevelFilter = LevelFilter::Info;

/// Hardware groundwork shared by both entry points.
///
/// Masking before enabling keeps the window where delivery is on but
/// handlers are not yet registered free of spurious vectors.
pub fn platform_prelude<P: Platform>(platform: &mut P) -> P::Serial {
    platform.mask_all_interrupts();
    platform.enable_interrupts();
    let serial = platform.init_serial();
    // Platform contract: the region is unused RAM and ours alone.
    unsafe { heap::give(platform.heap_region()) };
    serial
}

/// Resolve the interface identity and attach the wired stack.
///
/// Synchronous: the returned context is reachable at the resolved
/// address before this returns.
pub fn bring_up_wired<D: PacketDevice>(
    store: &dyn ConfigStore,
    device: D,
    now_ms: u64,
) -> NetContext<WiredStack<D>> {
    let config = InterfaceConfig::resolve(store);
    info!("MAC address {}", config.mac);
    info!(
        "IPv4 {}/{} gateway {}",
        config.address,
        config.prefix_len(),
        config.gateway
    );
    NetContext::new(WiredStack::bring_up(device, config, now_ms))
}

/// Start the serial point-to-point link.
///
/// Returns immediately; negotiation proceeds as the service loop runs.
/// `retry_limit` of `None` (the shipping default) reconnects forever.
pub fn bring_up_serial_ppp<S, C>(port: S, retry_limit: Option<u32>) -> NetContext<PppLink<S, C>>
where
    S: SerialPort + 'static,
    C: PppCodec,
{
    NetContext::new(PppLink::bring_up(port, retry_limit))
}

/// Full wired boot. Ends by transferring control to `app` for good.
///
/// `app` returns [`Infallible`]: there is no value it could produce, so
/// the handoff cannot be walked back.
pub fn boot_wired<P, D, F>(mut platform: P, store: &dyn ConfigStore, device: D, app: F) -> !
where
    P: Platform,
    D: PacketDevice,
    F: FnOnce(NetContext<WiredStack<D>>) -> Infallible,
{
    let serial = platform_prelude(&mut platform);
    let sink = serial.clone();
    logger::init(move |byte| sink.write_byte(byte), LOG_LEVEL);
    info!("netboot {} (wired ethernet)", crate::VERSION);
    debug!("boot heap: {} bytes", heap::heap_stats().total_size);

    let ctx = bring_up_wired(store, device, platform.monotonic_ms());
    info!("wired link up, handing over");
    match app(ctx) {}
}

/// Full serial boot. Spins until first connectivity, then transfers
/// control to `app` for good.
///
/// The UART belongs to the link engine here, and routing log output
/// through it would corrupt the framing, so this path installs no log
/// sink. Bring-up records still go through the facade; they are dropped
/// unless a sink was wired up beforehand (an in-memory buffer drained
/// over the network, typically).
pub fn boot_serial_ppp<P, C, F>(mut platform: P, app: F) -> !
where
    P: Platform,
    C: PppCodec,
    F: FnOnce(NetContext<PppLink<P::Serial, C>>) -> Infallible,
{
    let serial = platform_prelude(&mut platform);
    info!("netboot {} (serial ppp)", crate::VERSION);
    let mut ctx = bring_up_serial_ppp::<_, C>(serial, None);
    let _ = ctx.block_until_up(|| platform.monotonic_ms(), || true);
    info!("serial link up, handing over");
    match app(ctx) {}
}
