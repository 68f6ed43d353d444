//! Kestrel network boot core.
//!
//! Everything between reset and a usable network link: configuration
//! resolution from the flash store, transport bring-up (wired Ethernet
//! through smoltcp, or a serial point-to-point link), link supervision
//! with automatic reconnect, and the cooperative service loop the
//! application keeps pumping afterwards.
//!
//! The crate is `no_std` + `alloc`; the boot heap receives its arena
//! from the platform during [`boot::platform_prelude`].

#![no_std]

extern crate alloc;

#[cfg(test)]
extern crate std;

pub mod boot;
pub mod config;
pub mod device;
pub mod heap;
pub mod link;
pub mod logger;
pub mod platform;
pub mod ppp;
pub mod service;
pub mod stack;

pub use boot::{boot_serial_ppp, boot_wired, bring_up_serial_ppp, bring_up_wired, platform_prelude};
pub use config::{ConfigStore, InterfaceConfig, MacAddr};
pub use device::{PacketDevice, SerialPort};
pub use link::{LinkMonitor, LinkState};
pub use platform::{HeapRegion, MmioRegion, Platform};
pub use ppp::{PppCodec, PppLink, PppStatus};
pub use service::{LinkTransport, NetContext, PollEvent};
pub use stack::{DeviceAdapter, WiredStack};

/// Crate version, logged in the boot banner.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
