//! Transport hardware abstraction.
//!
//! Bring-up is generic over the two kinds of link hardware it can sit on:
//!
//! - [`PacketDevice`] - frame-oriented NICs (wired Ethernet)
//! - [`SerialPort`] - byte-oriented UARTs (point-to-point links)
//!
//! Both interfaces are strictly non-blocking on the receive side; "nothing
//! there" is a normal answer, not an error. Concrete drivers live with the
//! board support code, except for the on-chip slot NIC in [`slot_nic`].

use core::fmt;

pub mod slot_nic;

/// TX error types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxError {
    /// TX queue is full, try again after the device drains.
    QueueFull,
    /// Frame too large for the device.
    FrameTooLarge,
}

/// RX error types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RxError {
    /// A pending frame exceeded the provided buffer and was dropped.
    BufferTooSmall {
        /// Size the dropped frame needed.
        needed: usize,
    },
}

impl fmt::Display for TxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::QueueFull => write!(f, "TX queue full"),
            Self::FrameTooLarge => write!(f, "Frame too large"),
        }
    }
}

impl fmt::Display for RxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BufferTooSmall { needed } => {
                write!(f, "RX buffer too small, frame needs {} bytes", needed)
            }
        }
    }
}

/// Frame-oriented network device interface.
///
/// The interface identity (MAC address) is not part of this trait; it is
/// resolved from the configuration store and pushed into the stack, the
/// device only moves frames.
pub trait PacketDevice {
    /// Check if the device can accept a TX frame.
    ///
    /// Returns true if `transmit()` will succeed.
    fn can_transmit(&self) -> bool;

    /// Check if the device has a received frame ready.
    ///
    /// Returns true if `receive()` will return `Ok(Some(_))`.
    fn can_receive(&self) -> bool;

    /// Transmit an Ethernet frame.
    ///
    /// # Contract
    /// - MUST return immediately (no completion wait)
    fn transmit(&mut self, frame: &[u8]) -> Result<(), TxError>;

    /// Receive an Ethernet frame into `buffer`.
    ///
    /// # Returns
    /// - `Ok(Some(len))`: Frame received, `len` bytes copied
    /// - `Ok(None)`: No frame available (normal)
    /// - `Err(RxError)`: Frame dropped; the report is informational
    ///
    /// # Contract
    /// - MUST return immediately (no blocking)
    /// - MUST NOT hold a frame for a later, larger buffer; a frame that
    ///   does not fit is dropped so the frames behind it keep flowing
    fn receive(&mut self, buffer: &mut [u8]) -> Result<Option<usize>, RxError>;
}

/// Byte-oriented serial interface.
///
/// Implementations are cheap capability handles onto one piece of
/// hardware; `Clone` hands the same port to a second user (the link
/// engine's output path and the service loop's input path both need it).
pub trait SerialPort: Clone {
    /// Write one byte, waiting for FIFO space if the port is busy.
    fn write_byte(&self, byte: u8);

    /// Read one byte if the receive FIFO has one. Never blocks.
    fn read_byte(&self) -> Option<u8>;

    /// Write a whole buffer.
    fn write_all(&self, bytes: &[u8]) {
        for &byte in bytes {
            self.write_byte(byte);
        }
    }
}

/// Placeholder NIC that does nothing. Useful for early bring-up.
pub struct NullDevice;

impl PacketDevice for NullDevice {
    fn can_transmit(&self) -> bool {
        false
    }

    fn can_receive(&self) -> bool {
        false
    }

    fn transmit(&mut self, _frame: &[u8]) -> Result<(), TxError> {
        Err(TxError::QueueFull)
    }

    fn receive(&mut self, _buffer: &mut [u8]) -> Result<Option<usize>, RxError> {
        Ok(None)
    }
}
