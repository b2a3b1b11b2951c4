//! Packed header/footer word codec.
//!
//! Every block begins with one word (`WSIZE` bytes) that packs the block's
//! size together with three status bits. Non-mini free blocks additionally
//! carry a matching footer word at their tail; allocated blocks and mini
//! blocks never do (footer elision), so the status bits about the
//! *previous* block exist precisely so a predecessor's allocatedness/mini-ness
//! can be read without touching memory that may not hold a footer.

use bitflags::bitflags;

use crate::config::DSIZE;

bitflags! {
    /// Status bits packed into the low nibble of a header/footer word.
    ///
    /// The size occupies bits `[63:4]`; these three bits occupy bits
    /// `[2:0]`. Combine with `|` the same way a packed page-table entry
    /// combines permission bits with a physical address.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Flags: u64 {
        /// This block is currently allocated.
        const ALLOC        = 1 << 0;
        /// The previous block (in address order) is allocated.
        const PREV_ALLOC   = 1 << 1;
        /// The previous block is a mini block (implies `PREV_ALLOC` is
        /// meaningless for footer-reading purposes: mini blocks never have
        /// a footer regardless of alloc state).
        const PREV_IS_MINI = 1 << 2;
    }
}

const SIZE_MASK: u64 = !0xF;

/// A packed header or footer word.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Word(u64);

impl Word {
    pub fn pack(size: usize, flags: Flags) -> Self {
        debug_assert_eq!(size & 0xF, 0, "block size must be DSIZE-aligned");
        Word((size as u64 & SIZE_MASK) | flags.bits())
    }

    #[inline]
    pub fn size(self) -> usize {
        (self.0 & SIZE_MASK) as usize
    }

    #[inline]
    pub fn flags(self) -> Flags {
        Flags::from_bits_truncate(self.0)
    }

    #[inline]
    pub fn is_alloc(self) -> bool {
        self.flags().contains(Flags::ALLOC)
    }

    #[inline]
    pub fn prev_alloc(self) -> bool {
        self.flags().contains(Flags::PREV_ALLOC)
    }

    #[inline]
    pub fn prev_is_mini(self) -> bool {
        self.flags().contains(Flags::PREV_IS_MINI)
    }

    #[inline]
    pub fn is_mini(self) -> bool {
        self.size() == DSIZE
    }

    #[inline]
    pub fn raw(self) -> u64 {
        self.0
    }

    #[inline]
    pub fn from_raw(raw: u64) -> Self {
        Word(raw)
    }

    /// Returns a copy with `ALLOC` set/cleared, size and other bits intact.
    pub fn with_alloc(self, alloc: bool) -> Self {
        let mut flags = self.flags();
        flags.set(Flags::ALLOC, alloc);
        Word::pack(self.size(), flags)
    }

    /// Returns a copy with `PREV_ALLOC`/`PREV_IS_MINI` set to describe a
    /// given predecessor.
    pub fn with_prev(self, prev_alloc: bool, prev_is_mini: bool) -> Self {
        let mut flags = self.flags();
        flags.set(Flags::PREV_ALLOC, prev_alloc);
        flags.set(Flags::PREV_IS_MINI, prev_is_mini);
        Word::pack(self.size(), flags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_extract_roundtrip() {
        let w = Word::pack(48, Flags::ALLOC | Flags::PREV_ALLOC);
        assert_eq!(w.size(), 48);
        assert!(w.is_alloc());
        assert!(w.prev_alloc());
        assert!(!w.prev_is_mini());
    }

    #[test]
    fn mini_detection() {
        let w = Word::pack(DSIZE, Flags::empty());
        assert!(w.is_mini());
        let w = Word::pack(DSIZE * 2, Flags::empty());
        assert!(!w.is_mini());
    }

    #[test]
    fn with_alloc_preserves_size_and_prev_bits() {
        let w = Word::pack(64, Flags::PREV_ALLOC | Flags::PREV_IS_MINI);
        let w2 = w.with_alloc(true);
        assert_eq!(w2.size(), 64);
        assert!(w2.is_alloc());
        assert!(w2.prev_alloc());
        assert!(w2.prev_is_mini());
    }

    #[test]
    fn with_prev_preserves_size_and_alloc() {
        let w = Word::pack(32, Flags::ALLOC);
        let w2 = w.with_prev(false, true);
        assert_eq!(w2.size(), 32);
        assert!(w2.is_alloc());
        assert!(!w2.prev_alloc());
        assert!(w2.prev_is_mini());
    }
}
