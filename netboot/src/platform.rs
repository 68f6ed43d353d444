//! Board/SoC seam for the boot path.
//!
//! Everything the entry point needs from the hardware goes through
//! [`Platform`]: interrupt gating, the boot serial port, the RAM arena for
//! the heap, and a monotonic clock. Firmware images implement it over the
//! real SoC; the host test rig implements it over plain memory.

use core::ptr;

use crate::device::SerialPort;

/// RAM arena handed to the boot heap, exactly once.
#[derive(Debug, Clone, Copy)]
pub struct HeapRegion {
    /// First byte of the arena.
    pub base: *mut u8,
    /// Arena size in bytes.
    pub len: usize,
}

impl HeapRegion {
    /// Create a region descriptor. Nothing is touched until the heap
    /// takes ownership of it.
    pub const fn new(base: *mut u8, len: usize) -> Self {
        Self { base, len }
    }
}

/// Bounded window onto device registers or packet SRAM.
///
/// Construction is the single unsafe step; every access after that is a
/// bounds-checked volatile read or write inside the window. Handles are
/// cheap to copy and carry no driver state.
#[derive(Debug, Clone, Copy)]
pub struct MmioRegion {
    base: *mut u8,
    len: usize,
}

impl MmioRegion {
    /// Create a window over `base..base + len`.
    ///
    /// # Safety
    /// The range must be mapped and owned by the device for the life of
    /// the region, `base` must be 4-byte aligned, and no other code may
    /// access the range except through `MmioRegion` handles.
    pub const unsafe fn new(base: *mut u8, len: usize) -> Self {
        Self { base, len }
    }

    /// Window size in bytes.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether the window is zero-sized.
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Read a 32-bit register at byte `offset`.
    pub fn read32(&self, offset: usize) -> u32 {
        self.check_word(offset);
        unsafe { ptr::read_volatile(self.base.add(offset) as *const u32) }
    }

    /// Write a 32-bit register at byte `offset`.
    pub fn write32(&self, offset: usize, value: u32) {
        self.check_word(offset);
        unsafe { ptr::write_volatile(self.base.add(offset) as *mut u32, value) }
    }

    /// Copy `out.len()` bytes out of the window starting at `offset`.
    pub fn read_bytes(&self, offset: usize, out: &mut [u8]) {
        self.check_range(offset, out.len());
        for (i, byte) in out.iter_mut().enumerate() {
            *byte = unsafe { ptr::read_volatile(self.base.add(offset + i)) };
        }
    }

    /// Copy `data` into the window starting at `offset`.
    pub fn write_bytes(&self, offset: usize, data: &[u8]) {
        self.check_range(offset, data.len());
        for (i, &byte) in data.iter().enumerate() {
            unsafe { ptr::write_volatile(self.base.add(offset + i), byte) };
        }
    }

    fn check_word(&self, offset: usize) {
        assert!(offset % 4 == 0, "unaligned register access at {:#x}", offset);
        self.check_range(offset, 4);
    }

    fn check_range(&self, offset: usize, size: usize) {
        let ok = offset
            .checked_add(size)
            .map_or(false, |end| end <= self.len);
        assert!(ok, "access at {:#x}+{} outside {}-byte window", offset, size, self.len);
    }
}

/// What the boot entry point needs from the board.
///
/// The prelude calls these in a fixed order: mask, enable, serial, heap.
/// Masking before enabling keeps the window where delivery is on but
/// handlers are not yet registered free of spurious vectors.
pub trait Platform {
    /// Capability handle for the boot serial port.
    type Serial: SerialPort + Send + 'static;

    /// Mask every interrupt source at the controller.
    fn mask_all_interrupts(&mut self);

    /// Enable interrupt delivery at the core.
    fn enable_interrupts(&mut self);

    /// Bring up the boot serial port and hand out its handle.
    fn init_serial(&mut self) -> Self::Serial;

    /// Bounds of the RAM arena the boot heap may own.
    fn heap_region(&mut self) -> HeapRegion;

    /// Milliseconds since power-on. Only ever moves forward.
    fn monotonic_ms(&self) -> u64;
}
