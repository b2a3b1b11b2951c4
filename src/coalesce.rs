//! Boundary-tag coalescing.
//!
//! `coalesce` expects the caller to have already removed `block`'s free
//! neighbors from whichever free list they occupied (mini or segregated);
//! it performs only the header/footer rewriting to merge adjacent free
//! blocks, and returns the address of the resulting block without
//! inserting it anywhere — the caller does that based on the final size.

use crate::block::Block;

/// Locate the in-memory predecessor of `block`, which must be free
/// (`prev_alloc == false`).
fn locate_prev(block: Block) -> Block {
    if block.header().prev_is_mini() {
        block.prev_mini_in_memory()
    } else {
        block.prev_in_memory()
    }
}

/// Merge `block` with any free neighbors. `block`'s own header/footer must
/// already be written as a free block of its pre-merge size with correct
/// `prev_alloc`/`prev_is_mini` bits describing *its* predecessor.
///
/// Returns the address of the merged (or untouched) block.
pub fn coalesce(block: Block) -> Block {
    let prev_free = !block.header().prev_alloc();
    let next = block.next_in_memory();
    let next_free = next.size() != 0 && !next.is_alloc();

    match (prev_free, next_free) {
        (false, false) => {
            // Case 1: no merge. The freed block's own mini-ness is the
            // one fact the successor's header must now reflect; derive it
            // directly from `block`, never by re-reading a header that may
            // already have been partially rewritten.
            next.set_prev_info(false, block.is_mini());
            block
        }
        (false, true) => {
            // Case 2: merge with next.
            let merged_size = block.size() + next.size();
            let prev_alloc = block.header().prev_alloc();
            let prev_is_mini = block.header().prev_is_mini();
            block.write(merged_size, prev_alloc, prev_is_mini, false);
            let successor = block.next_in_memory();
            successor.set_prev_info(false, false);
            block
        }
        (true, false) => {
            // Case 3: merge with prev.
            let prev = locate_prev(block);
            let merged_size = prev.size() + block.size();
            let prev_alloc = prev.header().prev_alloc();
            let prev_is_mini = prev.header().prev_is_mini();
            prev.write(merged_size, prev_alloc, prev_is_mini, false);
            next.set_prev_info(false, false);
            prev
        }
        (true, true) => {
            // Case 4: merge with both neighbors.
            let prev = locate_prev(block);
            let merged_size = prev.size() + block.size() + next.size();
            let prev_alloc = prev.header().prev_alloc();
            let prev_is_mini = prev.header().prev_is_mini();
            prev.write(merged_size, prev_alloc, prev_is_mini, false);
            let successor = next.next_in_memory();
            successor.set_prev_info(false, false);
            prev
        }
    }
}
