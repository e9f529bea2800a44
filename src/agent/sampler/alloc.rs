//! A `GlobalAlloc` wrapper that keeps running heap counters for the sampler.
//!
//! The counters only move once the allocator is installed by the binary:
//!
//! ```rust,ignore
//! use metrics_agent::CountingAllocator;
//!
//! #[global_allocator]
//! static GLOBAL: CountingAllocator = CountingAllocator::new(std::alloc::System);
//! ```

use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::{AtomicU64, Ordering};

static LIVE_BYTES: AtomicU64 = AtomicU64::new(0);
static TOTAL_BYTES: AtomicU64 = AtomicU64::new(0);
static MALLOCS: AtomicU64 = AtomicU64::new(0);
static FREES: AtomicU64 = AtomicU64::new(0);

/// Point-in-time view of the allocation counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AllocStats {
    /// Bytes currently allocated.
    pub live_bytes: u64,
    /// Bytes allocated over the lifetime of the process.
    pub total_bytes: u64,
    /// Number of allocations.
    pub mallocs: u64,
    /// Number of deallocations.
    pub frees: u64,
}

impl AllocStats {
    /// Number of live heap objects.
    pub fn objects(&self) -> u64 {
        self.mallocs.saturating_sub(self.frees)
    }
}

pub fn snapshot() -> AllocStats {
    AllocStats {
        live_bytes: LIVE_BYTES.load(Ordering::Relaxed),
        total_bytes: TOTAL_BYTES.load(Ordering::Relaxed),
        mallocs: MALLOCS.load(Ordering::Relaxed),
        frees: FREES.load(Ordering::Relaxed),
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct CountingAllocator<A = System> {
    inner: A,
}

impl<A> CountingAllocator<A> {
    pub const fn new(inner: A) -> Self {
        Self { inner }
    }
}

// Nothing in here may allocate or log: both would re-enter the allocator.
fn record_alloc(size: usize) {
    let size = size as u64;
    LIVE_BYTES.fetch_add(size, Ordering::Relaxed);
    TOTAL_BYTES.fetch_add(size, Ordering::Relaxed);
    MALLOCS.fetch_add(1, Ordering::Relaxed);
}

fn record_free(size: usize) {
    let size = size as u64;
    let _ = LIVE_BYTES.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |live| {
        Some(live.saturating_sub(size))
    });
    FREES.fetch_add(1, Ordering::Relaxed);
}

unsafe impl<A: GlobalAlloc> GlobalAlloc for CountingAllocator<A> {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = self.inner.alloc(layout);
        if !ptr.is_null() {
            record_alloc(layout.size());
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        record_free(layout.size());
        self.inner.dealloc(ptr, layout);
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        let ptr = self.inner.alloc_zeroed(layout);
        if !ptr.is_null() {
            record_alloc(layout.size());
        }
        ptr
    }

    /// A successful reallocation counts as freeing the old block and
    /// allocating the new one.
    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let new_ptr = self.inner.realloc(ptr, layout, new_size);
        if !new_ptr.is_null() {
            record_free(layout.size());
            record_alloc(new_size);
        }
        new_ptr
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The test binary does not install the allocator, so drive it directly.
    #[test]
    fn test_counts_alloc_and_free() {
        let allocator = CountingAllocator::new(System);
        let layout = Layout::from_size_align(64, 8).unwrap();

        let before = snapshot();
        unsafe {
            let ptr = allocator.alloc(layout);
            assert!(!ptr.is_null());
            let ptr = allocator.realloc(ptr, layout, 128);
            assert!(!ptr.is_null());
            allocator.dealloc(ptr, Layout::from_size_align(128, 8).unwrap());
        }
        let after = snapshot();

        assert!(after.mallocs >= before.mallocs + 2);
        assert!(after.frees >= before.frees + 2);
        assert!(after.total_bytes >= before.total_bytes + 192);
    }

    #[test]
    fn test_objects_saturate() {
        let stats = AllocStats {
            mallocs: 1,
            frees: 3,
            ..Default::default()
        };
        assert_eq!(stats.objects(), 0);
    }
}
