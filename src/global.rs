//! Optional `#[global_allocator]` wrapper.
//!
//! The core façade is deliberately single-threaded (see spec's
//! concurrency non-goals); this module is the one place a lock appears,
//! analogous to the teacher's `KernelAllocator` wrapping its slab heap in
//! an `IrqMutex`. Here the lock is a plain `spin::Mutex` since this crate
//! has no interrupt context to worry about.

use core::alloc::{GlobalAlloc, Layout};
use core::ptr;

use spin::Mutex;

use crate::arena::Arena;
use crate::facade::Allocator;

/// Wraps an [`Allocator`] behind a spinlock so it can serve as a
/// `#[global_allocator]`.
pub struct GlobalAllocator<A: Arena> {
    inner: Mutex<Allocator<A>>,
}

impl<A: Arena> GlobalAllocator<A> {
    pub const fn new(arena: A) -> Self {
        GlobalAllocator {
            inner: Mutex::new(Allocator::new(arena)),
        }
    }
}

unsafe impl<A: Arena> GlobalAlloc for GlobalAllocator<A> {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let mut guard = self.inner.lock();
        let size = layout.size().max(layout.align());
        match guard.allocate(size) {
            Ok(ptr) => ptr.as_ptr(),
            Err(_) => ptr::null_mut(),
        }
    }

    unsafe fn dealloc(&self, ptr: *mut u8, _layout: Layout) {
        if let Some(nn) = core::ptr::NonNull::new(ptr) {
            let mut guard = self.inner.lock();
            unsafe { guard.free(nn) };
        }
    }

    unsafe fn realloc(&self, ptr: *mut u8, _layout: Layout, new_size: usize) -> *mut u8 {
        let Some(nn) = core::ptr::NonNull::new(ptr) else {
            return unsafe { self.alloc(Layout::from_size_align_unchecked(new_size, 1)) };
        };
        let mut guard = self.inner.lock();
        match unsafe { guard.reallocate(nn, new_size) } {
            Ok(new_ptr) => new_ptr.as_ptr(),
            Err(_) => ptr::null_mut(),
        }
    }
}
