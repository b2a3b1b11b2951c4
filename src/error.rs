//! Error types for the allocator core.

use core::fmt;

/// Errors a core allocator operation can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocError {
    /// The arena could not be grown far enough to satisfy a request.
    OutOfMemory,
    /// The requested size exceeds [`crate::config::MAX_REQUEST_SIZE`].
    RequestTooLarge { requested: usize },
    /// `init` was called with a backing region too small to hold the
    /// prologue and epilogue boundary tags.
    ArenaTooSmall,
    /// A pointer passed to `free`/`reallocate` does not point at a live,
    /// allocated block inside the arena.
    InvalidPointer,
    /// `checkheap` found the heap's invariants violated.
    HeapCorrupted,
    /// `allocate`/`reallocate` was called with a zero size (a spurious
    /// request under spec, not a usable allocation).
    ZeroSizeRequest,
    /// `calloc_like`'s `nelem * elem_size` overflowed `usize`.
    CallocOverflow,
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfMemory => write!(f, "arena exhausted, unable to extend further"),
            Self::RequestTooLarge { requested } => {
                write!(f, "requested size {requested} exceeds the maximum single allocation")
            }
            Self::ArenaTooSmall => write!(f, "backing region too small for prologue/epilogue"),
            Self::InvalidPointer => write!(f, "pointer does not reference a live allocation"),
            Self::HeapCorrupted => write!(f, "heap invariant violation detected by checkheap"),
            Self::ZeroSizeRequest => write!(f, "zero-size allocation request"),
            Self::CallocOverflow => write!(f, "calloc element count * element size overflows"),
        }
    }
}

/// Convenience result type for allocator operations.
pub type AllocResult<T = ()> = Result<T, AllocError>;
