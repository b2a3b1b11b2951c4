#![no_std]
#![allow(unsafe_op_in_unsafe_fn)]

//! A segregated free-list allocator core: boundary-tag coalescing,
//! footer elision for allocated blocks, and a dedicated mini-block list
//! for the minimum block size.
//!
//! The [`Arena`](arena::Arena) trait abstracts the backing byte region;
//! [`StaticArena`](arena::StaticArena) is the concrete fixed-size
//! backing provided here. [`Allocator`](facade::Allocator) is the public
//! façade: `init`, `allocate`, `free`, `reallocate`, `calloc_like`, and
//! `checkheap`.

pub mod arena;
mod block;
mod checkheap;
mod coalesce;
pub mod config;
pub mod error;
#[cfg(feature = "global-allocator")]
pub mod global;
pub mod facade;
mod freelist;
pub mod klog;
mod split;

pub use arena::{Arena, StaticArena};
pub use error::{AllocError, AllocResult};
pub use facade::Allocator;

#[cfg(test)]
extern crate std;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DSIZE;

    fn new_allocator() -> Allocator<StaticArena<{ 1 << 20 }>> {
        let mut a = Allocator::new(StaticArena::new());
        a.init().expect("init on a freshly-sized arena succeeds");
        a
    }

    #[test]
    fn basic_alloc_free_reuse() {
        // S1
        let mut alloc = new_allocator();
        let a = alloc.allocate(24).unwrap();
        assert!(alloc.checkheap());
        unsafe { alloc.free(a) };
        assert!(alloc.checkheap());
        let b = alloc.allocate(24).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn coalesce_forward() {
        // S2
        let mut alloc = new_allocator();
        let a = alloc.allocate(24).unwrap();
        let b = alloc.allocate(24).unwrap();
        let _c = alloc.allocate(24).unwrap();
        unsafe { alloc.free(b) };
        unsafe { alloc.free(a) };
        assert!(alloc.checkheap());
    }

    #[test]
    fn coalesce_both_sides() {
        // S3
        let mut alloc = new_allocator();
        let a = alloc.allocate(24).unwrap();
        let b = alloc.allocate(24).unwrap();
        let c = alloc.allocate(24).unwrap();
        unsafe { alloc.free(a) };
        unsafe { alloc.free(c) };
        unsafe { alloc.free(b) };
        assert!(alloc.checkheap());
    }

    #[test]
    fn split_leaves_single_remainder() {
        // S4: a freshly-extended arena holds one free block of CHUNK_SIZE
        // bytes; allocating 24 bytes (asize 32) should leave a single free
        // remainder of CHUNK_SIZE - 32 bytes immediately after it.
        let mut alloc = new_allocator();
        let a = alloc.allocate(24).unwrap();
        let a_block = unsafe { block::Block::from_payload(a) };
        let remainder = a_block.next_in_memory();
        assert!(!remainder.is_alloc());
        assert_eq!(remainder.size(), crate::config::CHUNK_SIZE - 32);
        assert!(alloc.checkheap());
    }

    #[test]
    fn mini_block_flags_update_on_free() {
        // S5
        let mut alloc = new_allocator();
        let a = alloc.allocate(1).unwrap();
        let b = alloc.allocate(24).unwrap();
        let b_block = unsafe { block::Block::from_payload(b) };
        assert!(b_block.header().prev_is_mini());
        assert!(b_block.header().prev_alloc());
        unsafe { alloc.free(a) };
        assert!(b_block.header().prev_is_mini());
        assert!(!b_block.header().prev_alloc());
        assert!(alloc.checkheap());
    }

    #[test]
    fn reallocate_preserves_contents_and_recycles_old_block() {
        // S6
        let mut alloc = new_allocator();
        let a = alloc.allocate(24).unwrap();
        unsafe {
            a.as_ptr().copy_from(b"abc".as_ptr(), 3);
        }
        let b = unsafe { alloc.reallocate(a, 200).unwrap() };
        assert_ne!(a, b);
        let mut buf = [0u8; 3];
        unsafe { buf.as_mut_ptr().copy_from(b.as_ptr(), 3) };
        assert_eq!(&buf, b"abc");
        assert!(alloc.checkheap());
    }

    #[test]
    fn alignment_holds_for_varied_sizes() {
        let mut alloc = new_allocator();
        for n in [1usize, 7, 8, 15, 16, 17, 100, 1000] {
            let p = alloc.allocate(n).unwrap();
            assert_eq!(p.as_ptr() as usize % DSIZE, 0);
        }
        assert!(alloc.checkheap());
    }

    #[test]
    fn zero_size_allocate_is_rejected() {
        let mut alloc = new_allocator();
        assert_eq!(alloc.allocate(0), Err(AllocError::ZeroSizeRequest));
    }

    #[test]
    fn calloc_zeroes_memory() {
        let mut alloc = new_allocator();
        let p = alloc.calloc_like(16, 4).unwrap();
        let slice = unsafe { core::slice::from_raw_parts(p.as_ptr(), 64) };
        assert!(slice.iter().all(|&b| b == 0));
        assert!(alloc.checkheap());
    }

    #[test]
    fn calloc_overflow_is_rejected() {
        let mut alloc = new_allocator();
        assert_eq!(
            alloc.calloc_like(usize::MAX, 2),
            Err(AllocError::CallocOverflow)
        );
    }

    #[test]
    fn arena_extends_when_out_of_space() {
        let mut alloc = new_allocator();
        let mut ptrs = std::vec::Vec::new();
        for _ in 0..2000 {
            ptrs.push(alloc.allocate(24).unwrap());
        }
        assert!(alloc.checkheap());
        for p in ptrs {
            unsafe { alloc.free(p) };
        }
        assert!(alloc.checkheap());
    }

    #[test]
    fn out_of_memory_reported_cleanly() {
        let mut alloc: Allocator<StaticArena<8192>> = Allocator::new(StaticArena::new());
        alloc.init().unwrap();
        let mut last = Ok(core::ptr::NonNull::dangling());
        loop {
            last = alloc.allocate(64);
            if last.is_err() {
                break;
            }
        }
        assert_eq!(last, Err(AllocError::OutOfMemory));
        assert!(alloc.checkheap());
    }
}
