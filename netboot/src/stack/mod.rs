//! smoltcp integration layer.
//!
//! Bridges [`PacketDevice`] drivers to the smoltcp TCP/IP stack.
//!
//! # Components
//!
//! - [`DeviceAdapter`] - Adapts `PacketDevice` to smoltcp's `Device` trait
//! - [`WiredStack`] - Interface + sockets, fully configured at bring-up

mod interface;

use smoltcp::phy::{Device, DeviceCapabilities, Medium, RxToken, TxToken};
use smoltcp::time::Instant;

use crate::device::PacketDevice;

pub use interface::{WiredStack, TCP_RX_BUFFER_SIZE, TCP_TX_BUFFER_SIZE};

/// Largest frame the adapter moves in one piece.
pub const MTU: usize = 1536;

/// Thin adapter that exposes a `PacketDevice` to smoltcp.
pub struct DeviceAdapter<D: PacketDevice> {
    pub inner: D,
}

impl<D: PacketDevice> DeviceAdapter<D> {
    pub fn new(inner: D) -> Self {
        Self { inner }
    }
}

impl<D: PacketDevice> Device for DeviceAdapter<D> {
    type RxToken<'a> = AdapterRxToken where Self: 'a;
    type TxToken<'a> = AdapterTxToken<'a, D> where Self: 'a;

    fn capabilities(&self) -> DeviceCapabilities {
        let mut caps = DeviceCapabilities::default();
        caps.max_transmission_unit = MTU;
        caps.medium = Medium::Ethernet;
        caps
    }

    fn receive(&mut self, _timestamp: Instant) -> Option<(Self::RxToken<'_>, Self::TxToken<'_>)> {
        // Copy the frame out of the device up front; the token then owns
        // it and the device stays free for the paired TX token.
        let mut token = AdapterRxToken {
            buffer: [0u8; MTU],
            len: 0,
        };
        match self.inner.receive(&mut token.buffer) {
            Ok(Some(len)) if len > 0 => {
                token.len = len;
                Some((
                    token,
                    AdapterTxToken {
                        device: &mut self.inner,
                    },
                ))
            }
            Err(err) => {
                // The device already let the frame go; only the report
                // reaches this side.
                log::debug!("rx frame dropped: {}", err);
                None
            }
            // No frame or a zero-length frame: nothing this pass.
            _ => None,
        }
    }

    fn transmit(&mut self, _timestamp: Instant) -> Option<Self::TxToken<'_>> {
        if self.inner.can_transmit() {
            Some(AdapterTxToken {
                device: &mut self.inner,
            })
        } else {
            None
        }
    }
}

pub struct AdapterRxToken {
    buffer: [u8; MTU],
    len: usize,
}

impl RxToken for AdapterRxToken {
    fn consume<R, F>(self, f: F) -> R
    where
        F: FnOnce(&mut [u8]) -> R,
    {
        let mut buf = self.buffer;
        f(&mut buf[..self.len])
    }
}

pub struct AdapterTxToken<'a, D: PacketDevice> {
    device: &'a mut D,
}

impl<'a, D: PacketDevice> TxToken for AdapterTxToken<'a, D> {
    fn consume<R, F>(self, len: usize, f: F) -> R
    where
        F: FnOnce(&mut [u8]) -> R,
    {
        let mut buffer = [0u8; MTU];
        let result = f(&mut buffer[..len]);
        // smoltcp gets `result` back either way; a full queue here only
        // costs a retransmit later.
        if let Err(err) = self.device.transmit(&buffer[..len]) {
            log::debug!("tx frame dropped: {}", err);
        }
        result
    }
}
