//! Block representation and neighbor navigation.
//!
//! A block is addressed by a [`NonNull<u8>`] pointing at its header word.
//! Free non-mini blocks overlay `next`/`prev` free-list pointers directly
//! onto their payload bytes (the classic intrusive-list trick: a free
//! block's payload is unused, so it doubles as list storage). Free mini
//! blocks overlay only a `next` pointer, since the mini free list is
//! singly-linked.

use core::ptr::NonNull;

use crate::config::DSIZE;
use crate::header::{Flags, Word};

/// A block pointer: the address of a block's header word.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Block(NonNull<u8>);

impl Block {
    /// # Safety
    /// `ptr` must point at a valid header word inside the arena.
    pub unsafe fn from_header_ptr(ptr: NonNull<u8>) -> Self {
        Block(ptr)
    }

    pub fn as_ptr(self) -> NonNull<u8> {
        self.0
    }

    pub fn addr(self) -> usize {
        self.0.as_ptr() as usize
    }

    #[inline]
    fn header_ptr(self) -> *mut u64 {
        self.0.as_ptr().cast()
    }

    #[inline]
    pub fn header(self) -> Word {
        // SAFETY: every live `Block` points at a readable header word.
        Word::from_raw(unsafe { self.header_ptr().read() })
    }

    #[inline]
    pub fn set_header(self, word: Word) {
        // SAFETY: every live `Block` points at a writable header word.
        unsafe { self.header_ptr().write(word.raw()) };
    }

    #[inline]
    pub fn size(self) -> usize {
        self.header().size()
    }

    #[inline]
    pub fn is_alloc(self) -> bool {
        self.header().is_alloc()
    }

    #[inline]
    pub fn is_mini(self) -> bool {
        self.size() == DSIZE
    }

    /// Payload start, i.e. one word past the header.
    pub fn payload(self) -> NonNull<u8> {
        // SAFETY: the payload immediately follows the header within the block.
        unsafe { NonNull::new_unchecked(self.0.as_ptr().add(crate::config::WSIZE)) }
    }

    /// Recover the owning block from a payload pointer previously handed
    /// out by `allocate`.
    ///
    /// # Safety
    /// `payload` must be a pointer previously returned by this crate's
    /// `allocate`/`reallocate` and not yet freed.
    pub unsafe fn from_payload(payload: NonNull<u8>) -> Self {
        let header = unsafe { payload.as_ptr().sub(crate::config::WSIZE) };
        Block(unsafe { NonNull::new_unchecked(header) })
    }

    fn footer_ptr(self) -> *mut u64 {
        // SAFETY: only called on non-mini blocks with a footer, guaranteed by caller.
        unsafe { self.0.as_ptr().add(self.size() - crate::config::WSIZE).cast() }
    }

    /// Read the footer word. Only valid for non-mini blocks (mini blocks
    /// and all allocated blocks elide their footer).
    pub fn footer(self) -> Word {
        // SAFETY: caller guarantees this block has a footer.
        Word::from_raw(unsafe { self.footer_ptr().read() })
    }

    pub fn set_footer(self, word: Word) {
        // SAFETY: caller guarantees this block has a footer.
        unsafe { self.footer_ptr().write(word.raw()) };
    }

    /// The block immediately following this one in address order.
    pub fn next_in_memory(self) -> Block {
        let next = unsafe { NonNull::new_unchecked(self.0.as_ptr().add(self.size())) };
        Block(next)
    }

    /// The block immediately preceding this one in address order.
    ///
    /// Requires that the predecessor is free and not mini (it must have a
    /// footer to read its size from); callers determine this via this
    /// block's own header bits (`prev_alloc`, `prev_is_mini`) before calling.
    pub fn prev_in_memory(self) -> Block {
        let footer_ptr = unsafe { self.0.as_ptr().sub(crate::config::WSIZE) };
        let footer = Word::from_raw(unsafe { (footer_ptr as *const u64).read() });
        let prev = unsafe { NonNull::new_unchecked(self.0.as_ptr().sub(footer.size())) };
        Block(prev)
    }

    /// The mini block immediately preceding this one; its size is always
    /// exactly `DSIZE` so no footer read is needed.
    pub fn prev_mini_in_memory(self) -> Block {
        let prev = unsafe { NonNull::new_unchecked(self.0.as_ptr().sub(DSIZE)) };
        Block(prev)
    }

    // --- free-list pointer overlay (non-mini blocks) ---

    fn free_next_slot(self) -> *mut *mut u8 {
        self.payload().as_ptr().cast()
    }

    fn free_prev_slot(self) -> *mut *mut u8 {
        unsafe { self.payload().as_ptr().add(crate::config::WSIZE).cast() }
    }

    pub fn free_next(self) -> Option<Block> {
        let raw = unsafe { self.free_next_slot().read() };
        NonNull::new(raw).map(Block)
    }

    pub fn set_free_next(self, next: Option<Block>) {
        let raw = next.map_or(core::ptr::null_mut(), |b| b.0.as_ptr());
        unsafe { self.free_next_slot().write(raw) };
    }

    pub fn free_prev(self) -> Option<Block> {
        let raw = unsafe { self.free_prev_slot().read() };
        NonNull::new(raw).map(Block)
    }

    pub fn set_free_prev(self, prev: Option<Block>) {
        let raw = prev.map_or(core::ptr::null_mut(), |b| b.0.as_ptr());
        unsafe { self.free_prev_slot().write(raw) };
    }

    // --- mini free-list overlay (singly-linked) ---

    pub fn mini_next(self) -> Option<Block> {
        let raw = unsafe { self.free_next_slot().read() };
        NonNull::new(raw).map(Block)
    }

    pub fn set_mini_next(self, next: Option<Block>) {
        let raw = next.map_or(core::ptr::null_mut(), |b| b.0.as_ptr());
        unsafe { self.free_next_slot().write(raw) };
    }

    /// Mark this block allocated/free, updating only its own `ALLOC` bit.
    pub fn set_alloc(self, alloc: bool) {
        self.set_header(self.header().with_alloc(alloc));
    }

    /// Update the bits describing this block's predecessor.
    pub fn set_prev_info(self, prev_alloc: bool, prev_is_mini: bool) {
        self.set_header(self.header().with_prev(prev_alloc, prev_is_mini));
        if !self.is_alloc() && !self.is_mini() {
            self.set_footer(self.footer().with_prev(prev_alloc, prev_is_mini));
        }
    }

    /// Write a full block: header, and footer if non-mini and free.
    pub fn write(self, size: usize, prev_alloc: bool, prev_is_mini: bool, alloc: bool) {
        let mut flags = Flags::empty();
        flags.set(Flags::ALLOC, alloc);
        flags.set(Flags::PREV_ALLOC, prev_alloc);
        flags.set(Flags::PREV_IS_MINI, prev_is_mini);
        let word = Word::pack(size, flags);
        self.set_header(word);
        if !alloc && size != DSIZE {
            self.set_footer(word);
        }
    }
}
