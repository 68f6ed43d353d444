//! Wired interface bring-up.
//!
//! [`WiredStack`] owns everything the wired path needs: the device
//! adapter, the smoltcp `Interface` and the socket set.
//!
//! ```text
//! ┌────────────────────────────────────────────┐
//! │                 WiredStack                 │
//! │  (Interface + SocketSet + identity)        │
//! └────────────────────────────────────────────┘
//!                      │
//!                      ▼
//! ┌────────────────────────────────────────────┐
//! │         DeviceAdapter<D: PacketDevice>     │
//! └────────────────────────────────────────────┘
//! ```
//!
//! Construction is the whole bootstrap: address, prefix and default
//! route are installed before the value is handed back, so no caller
//! ever observes a half-configured interface. Afterwards the stack only
//! needs [`WiredStack::pump`] from the service loop.

extern crate alloc;

use alloc::vec;

use smoltcp::iface::{Config, Interface, SocketHandle, SocketSet};
use smoltcp::socket::tcp::{Socket as TcpSocket, SocketBuffer as TcpSocketBuffer};
use smoltcp::time::Instant;
use smoltcp::wire::{EthernetAddress, IpCidr, Ipv4Address, Ipv4Cidr};

use super::DeviceAdapter;
use crate::config::InterfaceConfig;
use crate::device::PacketDevice;
use crate::service::{LinkTransport, PollEvent};

/// TCP receive buffer size for sockets created through the stack.
pub const TCP_RX_BUFFER_SIZE: usize = 16384;

/// TCP transmit buffer size.
pub const TCP_TX_BUFFER_SIZE: usize = 16384;

/// Full wired network stack over a frame device.
pub struct WiredStack<D: PacketDevice> {
    /// The underlying device adapter.
    device: DeviceAdapter<D>,
    /// smoltcp interface.
    iface: Interface,
    /// Socket set for the downstream application.
    sockets: SocketSet<'static>,
    /// Identity the interface was brought up with.
    config: InterfaceConfig,
}

impl<D: PacketDevice> WiredStack<D> {
    /// Attach the stack to `device` under a fully resolved identity.
    ///
    /// Address, prefix and default route all land before the value is
    /// returned; the interface is reachable the moment this completes
    /// and never under a partial configuration.
    pub fn bring_up(device: D, config: InterfaceConfig, now_ms: u64) -> Self {
        let mut adapter = DeviceAdapter::new(device);
        let ethernet_addr = EthernetAddress(config.mac.octets());
        let mut iface = Interface::new(
            Config::new(ethernet_addr.into()),
            &mut adapter,
            Instant::from_millis(now_ms as i64),
        );

        let address = Ipv4Address::from_bytes(&config.address.octets());
        let cidr = Ipv4Cidr::new(address, config.prefix_len());
        iface.update_ip_addrs(|addrs| {
            addrs.push(IpCidr::Ipv4(cidr)).ok();
        });

        let gateway = Ipv4Address::from_bytes(&config.gateway.octets());
        iface.routes_mut().add_default_ipv4_route(gateway).ok();

        Self {
            device: adapter,
            iface,
            sockets: SocketSet::new(vec![]),
            config,
        }
    }

    /// Identity the stack was brought up with.
    pub fn config(&self) -> &InterfaceConfig {
        &self.config
    }

    /// smoltcp interface (read-only).
    pub fn iface(&self) -> &Interface {
        &self.iface
    }

    /// Socket set owned by the stack.
    pub fn sockets_mut(&mut self) -> &mut SocketSet<'static> {
        &mut self.sockets
    }

    /// Interface and sockets together, for calls that need both sides
    /// of the borrow (socket connect wants the interface context).
    pub fn iface_and_sockets(&mut self) -> (&mut Interface, &mut SocketSet<'static>) {
        (&mut self.iface, &mut self.sockets)
    }

    /// Allocate a TCP socket in the stack's set and return its handle.
    ///
    /// The stack only owns the socket memory; connecting, listening and
    /// data transfer stay with the application.
    pub fn tcp_socket(&mut self) -> SocketHandle {
        let rx_buffer = TcpSocketBuffer::new(vec![0u8; TCP_RX_BUFFER_SIZE]);
        let tx_buffer = TcpSocketBuffer::new(vec![0u8; TCP_TX_BUFFER_SIZE]);
        self.sockets.add(TcpSocket::new(rx_buffer, tx_buffer))
    }

    /// One smoltcp poll: fires due protocol timers and drains device RX.
    ///
    /// Returns `true` if any socket made progress.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        self.iface.poll(
            Instant::from_millis(now_ms as i64),
            &mut self.device,
            &mut self.sockets,
        )
    }
}

impl<D: PacketDevice> LinkTransport for WiredStack<D> {
    fn pump(&mut self, now_ms: u64) -> PollEvent {
        let fed_input = self.device.inner.can_receive();
        let progressed = self.poll(now_ms);
        PollEvent {
            fed_input,
            progressed,
        }
    }

    // The wired link needs no negotiation; attached means usable.
    fn link_up(&self) -> bool {
        true
    }
}
