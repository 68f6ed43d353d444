//! Boot Heap
//!
//! Uses linked_list_allocator for a battle-tested, no_std heap. The arena
//! is not a static buffer: the platform donates one RAM region (typically
//! everything between the end of the loaded image and the top of RAM) and
//! [`give`] hands it to the allocator exactly once. Later donations are
//! ignored.
//!
//! # Feature Flags
//!
//! - `global-heap`: Register [`LockedHeap`] as `#[global_allocator]`.
//!   Only firmware images enable this; host builds keep their own
//!   allocator and can still drive the heap explicitly in tests.
//!
//! # Safety
//!
//! - [`give`] must run before the first allocation
//! - Thread-safety: spin lock inside, fine for the single-core boot path

use core::alloc::{GlobalAlloc, Layout};
use core::ptr::NonNull;

use linked_list_allocator::Heap;

use crate::platform::HeapRegion;

/// Locked heap wrapper implementing GlobalAlloc
pub struct LockedHeap {
    inner: spin::Mutex<Heap>,
}

impl LockedHeap {
    /// Create an empty (uninitialized) heap
    pub const fn empty() -> Self {
        Self {
            inner: spin::Mutex::new(Heap::empty()),
        }
    }

    /// Initialize the heap with a memory region
    ///
    /// # Safety
    /// - Must be called exactly once
    /// - Memory region must be valid and not used elsewhere
    pub unsafe fn init(&self, start: *mut u8, size: usize) {
        self.inner.lock().init(start, size);
    }
}

unsafe impl GlobalAlloc for LockedHeap {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        self.inner
            .lock()
            .allocate_first_fit(layout)
            .map(|nn| nn.as_ptr())
            .unwrap_or(core::ptr::null_mut())
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        if let Some(nn) = NonNull::new(ptr) {
            self.inner.lock().deallocate(nn, layout);
        }
    }
}

#[cfg_attr(feature = "global-heap", global_allocator)]
static GLOBAL: LockedHeap = LockedHeap::empty();

static ARENA_TAKEN: spin::Once<()> = spin::Once::new();

/// Hand the boot heap its arena.
///
/// The first call wins; anything after that is ignored, so a re-entered
/// boot path cannot re-initialize a live heap.
///
/// # Safety
/// - `region` must be unused RAM, exclusively owned by the heap from here on
/// - Must run before the first allocation
pub unsafe fn give(region: HeapRegion) {
    ARENA_TAKEN.call_once(|| unsafe {
        GLOBAL.init(region.base, region.len);
    });
}

/// Check if the heap has received its arena
pub fn is_initialized() -> bool {
    ARENA_TAKEN.is_completed()
}

/// Get heap statistics for debugging
pub fn heap_stats() -> HeapStats {
    let heap = GLOBAL.inner.lock();
    HeapStats {
        total_size: heap.size(),
        used: heap.used(),
        free: heap.free(),
    }
}

/// Heap statistics
#[derive(Debug, Clone, Copy)]
pub struct HeapStats {
    pub total_size: usize,
    pub used: usize,
    pub free: usize,
}

impl HeapStats {
    /// Get usage percentage
    pub fn usage_percent(&self) -> u8 {
        if self.total_size == 0 {
            return 0;
        }
        ((self.used * 100) / self.total_size) as u8
    }
}
