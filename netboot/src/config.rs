//! Boot-Time Network Configuration
//!
//! Network identity (MAC address, IPv4 settings) comes from a small
//! key/value store kept on flash. Resolution is fail-open: a missing key,
//! an unreadable value or a malformed one falls back to the compiled-in
//! default for that key, so the device always comes up reachable at a
//! known address.

use core::fmt;
use core::net::Ipv4Addr;

/// Longest value the resolver will accept from the store, in bytes.
pub const MAX_VALUE_LEN: usize = 31;

/// Store key for the MAC address override.
pub const KEY_MAC: &str = "mac";
/// Store key for the interface address.
pub const KEY_IP: &str = "ip";
/// Store key for the subnet mask.
pub const KEY_NETMASK: &str = "netmask";
/// Store key for the default gateway.
pub const KEY_GATEWAY: &str = "gateway";

/// Factory default MAC, used when the store has no valid `mac` entry.
pub const DEFAULT_MAC: MacAddr = MacAddr([0x10, 0xe2, 0xd5, 0x32, 0x50, 0x00]);

/// Read-only view of the boot configuration store.
///
/// The store itself (flash layout, wear leveling, write paths) lives
/// elsewhere; bring-up only ever looks values up.
pub trait ConfigStore {
    /// Copy the value for `key` into `buf`.
    ///
    /// Returns the number of bytes copied, or `None` when the key is not
    /// present. Values longer than `buf` are truncated.
    fn read(&self, key: &str, buf: &mut [u8]) -> Option<usize>;
}

/// Ethernet MAC address (6 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacAddr(pub [u8; 6]);

impl MacAddr {
    /// Create a new MAC address
    pub const fn new(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    /// Get octets
    pub const fn octets(&self) -> [u8; 6] {
        self.0
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4], self.0[5]
        )
    }
}

/// Fully resolved network identity for the boot interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterfaceConfig {
    /// Hardware address of the interface
    pub mac: MacAddr,
    /// IPv4 address of the interface
    pub address: Ipv4Addr,
    /// Subnet mask
    pub netmask: Ipv4Addr,
    /// Default gateway
    pub gateway: Ipv4Addr,
}

impl Default for InterfaceConfig {
    fn default() -> Self {
        Self {
            mac: DEFAULT_MAC,
            address: Ipv4Addr::new(192, 168, 1, 50),
            netmask: Ipv4Addr::new(255, 255, 255, 0),
            gateway: Ipv4Addr::new(192, 168, 1, 1),
        }
    }
}

impl InterfaceConfig {
    /// Resolve the full identity from `store`.
    ///
    /// Each key falls back independently: one malformed entry never
    /// poisons the others.
    pub fn resolve(store: &dyn ConfigStore) -> Self {
        let defaults = Self::default();
        Self {
            mac: resolve(store, KEY_MAC, parse_mac, defaults.mac),
            address: resolve(store, KEY_IP, parse_ipv4, defaults.address),
            netmask: resolve(store, KEY_NETMASK, parse_ipv4, defaults.netmask),
            gateway: resolve(store, KEY_GATEWAY, parse_ipv4, defaults.gateway),
        }
    }

    /// CIDR prefix length of the resolved netmask.
    pub fn prefix_len(&self) -> u8 {
        u32::from_be_bytes(self.netmask.octets()).leading_ones() as u8
    }
}

/// Look up `key` in `store` and run the value through `parse`.
///
/// Any miss along the way (absent key, empty, oversized or non-UTF-8
/// value, parse failure) yields `default`. The store is never written
/// back, so a malformed entry keeps producing the same fallback on
/// every boot.
pub fn resolve<T>(
    store: &dyn ConfigStore,
    key: &str,
    parse: impl Fn(&str) -> Option<T>,
    default: T,
) -> T {
    let mut buf = [0u8; MAX_VALUE_LEN];
    store
        .read(key, &mut buf)
        .filter(|&len| len > 0)
        .and_then(|len| buf.get(..len))
        .and_then(|raw| core::str::from_utf8(raw).ok())
        .and_then(|value| parse(value))
        .unwrap_or(default)
}

/// Parse a MAC address in colon-separated hex form (`xx:xx:xx:xx:xx:xx`).
///
/// All six groups must parse and every separator must be `:`, or the
/// whole value is rejected. No partial results.
pub fn parse_mac(s: &str) -> Option<MacAddr> {
    let raw = s.as_bytes();
    if raw.len() != 17 {
        return None;
    }
    let mut mac = [0u8; 6];
    for (i, byte) in mac.iter_mut().enumerate() {
        let hi = hex_nibble(raw[3 * i])?;
        let lo = hex_nibble(raw[3 * i + 1])?;
        *byte = (hi << 4) | lo;
        if i < 5 && raw[3 * i + 2] != b':' {
            return None;
        }
    }
    Some(MacAddr(mac))
}

/// Parse a dotted-quad IPv4 address (`a.b.c.d`).
pub fn parse_ipv4(s: &str) -> Option<Ipv4Addr> {
    s.parse().ok()
}

fn hex_nibble(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}
