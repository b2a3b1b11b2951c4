//! The allocator façade: `init`, `allocate`, `free`, `reallocate`,
//! `calloc_like`, and `checkheap`, tying the header codec, free-list
//! index, and coalescing/splitting engine together over an [`Arena`].

use core::ptr::NonNull;

use crate::arena::Arena;
use crate::block::Block;
use crate::checkheap;
use crate::coalesce;
use crate::config::{CHUNK_SIZE, DSIZE, MAX_REQUEST_SIZE, WSIZE};
use crate::error::{AllocError, AllocResult};
use crate::freelist::FreeLists;
use crate::klog::{alloc_debug, alloc_error, alloc_trace};
use crate::split;

fn round_up(size: usize, multiple: usize) -> usize {
    multiple * size.div_ceil(multiple)
}

/// A segregated free-list allocator operating over a caller-supplied
/// [`Arena`]. Not `Sync`/`Send`: callers needing concurrent access wrap an
/// instance themselves (see [`crate::global`] for an example).
pub struct Allocator<A: Arena> {
    arena: A,
    lists: FreeLists,
    initialized: bool,
}

// SAFETY: every pointer this type stores (free-list links, block
// addresses) refers into `arena`'s own backing storage, which moves with
// `self`. There is no thread-local or task-local state; access just needs
// to be serialized by the caller (see `global::GlobalAllocator`).
unsafe impl<A: Arena + Send> Send for Allocator<A> {}

impl<A: Arena> Allocator<A> {
    pub const fn new(arena: A) -> Self {
        Allocator {
            arena,
            lists: FreeLists::new(),
            initialized: false,
        }
    }

    fn first_block(&self) -> Block {
        // SAFETY: the prologue word always occupies `base()..base()+WSIZE`
        // once `init` has run.
        unsafe { Block::from_header_ptr(NonNull::new_unchecked(self.arena.base().as_ptr().add(WSIZE))) }
    }

    fn prologue(&self) -> Block {
        unsafe { Block::from_header_ptr(self.arena.base()) }
    }

    fn epilogue(&self) -> Block {
        let offset = self.arena.committed() - WSIZE;
        unsafe { Block::from_header_ptr(NonNull::new_unchecked(self.arena.base().as_ptr().add(offset))) }
    }

    /// Initialize sentinels and pre-extend by one chunk. Safe to call once
    /// before any other operation; later calls are no-ops.
    pub fn init(&mut self) -> AllocResult<()> {
        if self.initialized {
            return Ok(());
        }
        if self.arena.capacity() < 2 * WSIZE {
            return Err(AllocError::ArenaTooSmall);
        }
        if !self.arena.grow(2 * WSIZE) {
            return Err(AllocError::ArenaTooSmall);
        }
        self.prologue().write(0, true, false, true);
        self.epilogue().write(0, true, false, true);
        self.initialized = true;

        let extended = self.extend_arena(CHUNK_SIZE)?;
        self.insert_free_block(extended);
        alloc_debug!("allocator initialized, arena base = {:#x}", self.arena.base().as_ptr() as usize);
        Ok(())
    }

    fn insert_free_block(&mut self, block: Block) {
        if block.is_mini() {
            self.lists.insert_mini(block);
        } else {
            self.lists.insert_regular(block);
        }
    }

    fn remove_free_block(&mut self, block: Block) {
        if block.is_mini() {
            self.lists.remove_mini(block);
        } else {
            self.lists.remove_regular(block);
        }
    }

    /// Grow the arena by at least `min_bytes`, returning the coalesced
    /// free block produced (which may absorb the previous last block).
    fn extend_arena(&mut self, min_bytes: usize) -> AllocResult<Block> {
        let bytes = round_up(min_bytes, DSIZE);
        let old_epilogue = self.epilogue();
        let prev_alloc = old_epilogue.header().prev_alloc();
        let prev_is_mini = old_epilogue.header().prev_is_mini();

        if !self.arena.grow(bytes) {
            alloc_error!("arena exhausted requesting {} more bytes", bytes);
            return Err(AllocError::OutOfMemory);
        }

        let new_block = old_epilogue;
        new_block.write(bytes, prev_alloc, prev_is_mini, false);
        let new_epilogue = self.epilogue();
        new_epilogue.write(0, false, false, true);

        if !prev_alloc {
            let prev = if prev_is_mini {
                new_block.prev_mini_in_memory()
            } else {
                new_block.prev_in_memory()
            };
            self.remove_free_block(prev);
        }

        Ok(coalesce::coalesce(new_block))
    }

    /// Payload is 16-byte aligned. Returns `Err` on zero-size requests,
    /// oversized requests, or arena exhaustion.
    pub fn allocate(&mut self, n: usize) -> AllocResult<NonNull<u8>> {
        if !self.initialized {
            self.init()?;
        }
        if n == 0 {
            return Err(AllocError::ZeroSizeRequest);
        }
        if n > MAX_REQUEST_SIZE {
            return Err(AllocError::RequestTooLarge { requested: n });
        }

        let asize = round_up(n + WSIZE, DSIZE).max(DSIZE);

        // A block found by `find_fit` is still linked into its free list
        // and must be unlinked before splitting; a block produced by
        // `extend_arena` was never linked (its predecessor, if merged, was
        // unlinked before the merge, and the result was returned bare).
        let block = match self.lists.find_fit(asize) {
            Some(b) => {
                self.remove_free_block(b);
                b
            }
            None => self.extend_arena(asize.max(CHUNK_SIZE))?,
        };
        let allocated = split::place(&mut self.lists, block, asize);
        alloc_trace!("allocate({}) -> {:#x}", n, allocated.addr());
        Ok(allocated.payload())
    }

    /// # Safety
    /// `ptr` must have been returned by `allocate`/`reallocate` on this
    /// allocator and not already freed.
    pub unsafe fn free(&mut self, ptr: NonNull<u8>) {
        let block = unsafe { Block::from_payload(ptr) };
        let size = block.size();
        let prev_alloc = block.header().prev_alloc();
        let prev_is_mini = block.header().prev_is_mini();
        block.write(size, prev_alloc, prev_is_mini, false);

        if !prev_alloc {
            let prev = if prev_is_mini {
                block.prev_mini_in_memory()
            } else {
                block.prev_in_memory()
            };
            self.remove_free_block(prev);
        }
        let next = block.next_in_memory();
        if next.size() != 0 && !next.is_alloc() {
            self.remove_free_block(next);
        }

        let merged = coalesce::coalesce(block);
        self.insert_free_block(merged);
        alloc_trace!("free({:#x})", ptr.as_ptr() as usize);
    }

    /// `n == 0` frees `ptr` and returns `Err(ZeroSizeRequest)`; `ptr`
    /// being used to request a fresh allocation is the caller's job (this
    /// crate takes `NonNull`, not `Option<NonNull>`, at this layer — see
    /// [`crate::global`] for the nullable C-style entry point).
    ///
    /// # Safety
    /// `ptr` must have been returned by `allocate`/`reallocate` on this
    /// allocator and not already freed.
    pub unsafe fn reallocate(&mut self, ptr: NonNull<u8>, n: usize) -> AllocResult<NonNull<u8>> {
        if n == 0 {
            unsafe { self.free(ptr) };
            return Err(AllocError::ZeroSizeRequest);
        }

        let old_block = unsafe { Block::from_payload(ptr) };
        let old_payload_size = old_block.size() - WSIZE;
        let new_ptr = self.allocate(n)?;

        let copy_len = core::cmp::min(n, old_payload_size);
        // SAFETY: `ptr` and `new_ptr` are both valid, non-overlapping
        // (freshly allocated) regions of at least `copy_len` bytes.
        unsafe {
            core::ptr::copy_nonoverlapping(ptr.as_ptr(), new_ptr.as_ptr(), copy_len);
        }
        unsafe { self.free(ptr) };
        Ok(new_ptr)
    }

    /// Checks `nelem * elem_size` for overflow, allocates, and zero-fills.
    pub fn calloc_like(&mut self, nelem: usize, elem_size: usize) -> AllocResult<NonNull<u8>> {
        let total = nelem.checked_mul(elem_size).ok_or(AllocError::CallocOverflow)?;
        let ptr = self.allocate(total)?;
        // SAFETY: `allocate` guarantees at least `total` usable bytes at `ptr`.
        unsafe { core::ptr::write_bytes(ptr.as_ptr(), 0, total) };
        Ok(ptr)
    }

    /// Runs the full invariant auditor over the heap. Intended for debug
    /// builds and tests; cheap enough to call after every operation in a
    /// property test but not free, so production callers should gate it.
    pub fn checkheap(&self) -> bool {
        if !self.initialized {
            return true;
        }
        checkheap::audit(self.first_block(), self.epilogue(), &self.lists)
    }
}
