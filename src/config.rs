//! Tunable constants for the allocator core.
//!
//! Mirrors the sizing constants a reference malloc implementation hardcodes,
//! collected in one place instead of scattered across modules.

/// Word size in bytes. The packed header/footer words are one word wide.
pub const WSIZE: usize = 8;

/// Double-word size in bytes; the crate's alignment unit. Every block size
/// is a multiple of `DSIZE`, and every returned payload pointer is
/// `DSIZE`-aligned.
pub const DSIZE: usize = 2 * WSIZE;

/// Amount by which the arena grows when it cannot satisfy a request from
/// existing free space.
pub const CHUNK_SIZE: usize = 1 << 12;

/// Number of segregated free lists for non-mini blocks.
pub const N_LISTS: usize = 12;

/// Requests larger than this are rejected outright rather than attempted
/// against a fixed-size arena that could never satisfy them.
pub const MAX_REQUEST_SIZE: usize = 1 << 30;
