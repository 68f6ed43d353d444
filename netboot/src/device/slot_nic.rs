//! Driver for the on-chip slot-buffer Ethernet MAC.
//!
//! The MAC exposes a small register file and a packet SRAM carved into
//! fixed 2 KiB slots: two receive slots followed by two transmit slots.
//! Hardware fills a receive slot and raises the pending flag; the driver
//! copies the frame out and writes 1 to release the slot. On transmit the
//! driver claims the next slot, fills it, writes the length and pulses
//! start. No descriptors, no DMA rings.

use super::{PacketDevice, RxError, TxError};
use crate::platform::MmioRegion;

/// Number of receive slots.
pub const RX_SLOTS: usize = 2;
/// Number of transmit slots.
pub const TX_SLOTS: usize = 2;
/// Size of one packet slot in bytes.
pub const SLOT_LEN: usize = 0x800;
/// Total packet SRAM the device needs (RX slots first, then TX slots).
pub const SRAM_LEN: usize = (RX_SLOTS + TX_SLOTS) * SLOT_LEN;

/// Slot index of the oldest received frame.
const REG_RX_SLOT: usize = 0x00;
/// Length of that frame in bytes.
const REG_RX_LENGTH: usize = 0x04;
/// Nonzero while a received frame waits; write 1 to release the slot.
const REG_RX_PENDING: usize = 0x08;
/// Slot most recently queued for transmit.
const REG_TX_SLOT: usize = 0x0c;
/// Length of the frame being queued.
const REG_TX_LENGTH: usize = 0x10;
/// Write 1 to start transmission of the queued slot.
const REG_TX_START: usize = 0x14;
/// Nonzero while another frame can be queued.
const REG_TX_READY: usize = 0x18;

/// Size of the register window in bytes.
pub const REG_WINDOW_LEN: usize = 0x1c;

/// Slot-buffer Ethernet MAC behind two bounded MMIO windows.
pub struct SlotNic {
    regs: MmioRegion,
    sram: MmioRegion,
}

impl SlotNic {
    /// Attach to the device.
    ///
    /// `regs` must cover at least [`REG_WINDOW_LEN`] bytes and `sram` at
    /// least [`SRAM_LEN`] bytes.
    pub fn new(regs: MmioRegion, sram: MmioRegion) -> Self {
        assert!(regs.len() >= REG_WINDOW_LEN, "register window too small");
        assert!(sram.len() >= SRAM_LEN, "packet SRAM window too small");
        Self { regs, sram }
    }

    const fn rx_offset(slot: usize) -> usize {
        slot * SLOT_LEN
    }

    const fn tx_offset(slot: usize) -> usize {
        (RX_SLOTS + slot) * SLOT_LEN
    }
}

impl PacketDevice for SlotNic {
    fn can_transmit(&self) -> bool {
        self.regs.read32(REG_TX_READY) != 0
    }

    fn can_receive(&self) -> bool {
        self.regs.read32(REG_RX_PENDING) != 0
    }

    fn transmit(&mut self, frame: &[u8]) -> Result<(), TxError> {
        if frame.len() > SLOT_LEN {
            return Err(TxError::FrameTooLarge);
        }
        if self.regs.read32(REG_TX_READY) == 0 {
            return Err(TxError::QueueFull);
        }
        let slot = (self.regs.read32(REG_TX_SLOT) as usize + 1) % TX_SLOTS;
        self.sram.write_bytes(Self::tx_offset(slot), frame);
        self.regs.write32(REG_TX_SLOT, slot as u32);
        self.regs.write32(REG_TX_LENGTH, frame.len() as u32);
        self.regs.write32(REG_TX_START, 1);
        Ok(())
    }

    fn receive(&mut self, buffer: &mut [u8]) -> Result<Option<usize>, RxError> {
        if self.regs.read32(REG_RX_PENDING) == 0 {
            return Ok(None);
        }
        // Hardware-reported index and length are clamped to the slot
        // geometry before they reach memory accesses.
        let slot = self.regs.read32(REG_RX_SLOT) as usize % RX_SLOTS;
        let length = (self.regs.read32(REG_RX_LENGTH) as usize).min(SLOT_LEN);
        if buffer.len() < length {
            // A held slot would stall every frame queued behind it, and
            // no caller comes back with a bigger buffer. Drop and release.
            self.regs.write32(REG_RX_PENDING, 1);
            return Err(RxError::BufferTooSmall { needed: length });
        }
        self.sram.read_bytes(Self::rx_offset(slot), &mut buffer[..length]);
        self.regs.write32(REG_RX_PENDING, 1);
        Ok(Some(length))
    }
}
