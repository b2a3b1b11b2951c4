//! Heap consistency auditor.
//!
//! Walks the heap from the first real block to the epilogue, checking
//! invariants I1-I7, then cross-checks every segregated/mini list against
//! that walk. Unlike the reference implementation this crate was grounded
//! on (whose `mm_checkheap` is a stub), this one actually runs the checks
//! the reference only sketches in a comment.

use crate::block::Block;
use crate::config::{DSIZE, N_LISTS};
use crate::freelist::{FreeLists, find_seg_index};
use crate::klog::alloc_warn;

/// Returns `true` iff every invariant holds. Logs the first violation
/// found at `Warn` level as a diagnostic aid; does not stop at the first
/// failure category so multiple distinct problems can show up across
/// repeated runs, but it does return as soon as the overall verdict is
/// known to be false to keep this cheap to call after every operation in
/// debug builds.
pub fn audit(first: Block, epilogue: Block, lists: &FreeLists) -> bool {
    let mut ok = true;
    let mut free_count_by_walk = 0usize;
    let mut prev: Option<Block> = None;
    let mut cur = first;

    loop {
        let size = cur.size();
        let is_epilogue = cur.addr() == epilogue.addr();

        if !is_epilogue && size % DSIZE != 0 {
            alloc_warn!("checkheap: block {:#x} has unaligned size {}", cur.addr(), size);
            ok = false;
        }

        if let Some(p) = prev {
            let expect_prev_alloc = p.is_alloc();
            let expect_prev_is_mini = p.size() == DSIZE;
            if cur.header().prev_alloc() != expect_prev_alloc {
                alloc_warn!(
                    "checkheap: block {:#x} prev_alloc bit disagrees with predecessor",
                    cur.addr()
                );
                ok = false;
            }
            if cur.header().prev_is_mini() != expect_prev_is_mini {
                alloc_warn!(
                    "checkheap: block {:#x} prev_is_mini bit disagrees with predecessor",
                    cur.addr()
                );
                ok = false;
            }
            if !p.is_alloc() && !cur.is_alloc() && !is_epilogue {
                alloc_warn!(
                    "checkheap: adjacent free blocks at {:#x} and {:#x}",
                    p.addr(),
                    cur.addr()
                );
                ok = false;
            }
        }

        if !is_epilogue {
            if !cur.is_alloc() {
                free_count_by_walk += 1;
                if size != DSIZE && cur.footer() != cur.header() {
                    alloc_warn!("checkheap: free block {:#x} footer disagrees with header", cur.addr());
                    ok = false;
                }
            }
        }

        if is_epilogue {
            if size != 0 || !cur.is_alloc() {
                alloc_warn!("checkheap: epilogue malformed at {:#x}", cur.addr());
                ok = false;
            }
            break;
        }

        prev = Some(cur);
        cur = cur.next_in_memory();
    }

    let mut free_count_by_lists = 0usize;
    for idx in 0..N_LISTS {
        let Some(head) = lists.seg_head(idx) else {
            continue;
        };
        let mut node = head;
        loop {
            free_count_by_lists += 1;
            if find_seg_index(node.size()) != idx {
                alloc_warn!("checkheap: block {:#x} misfiled in segregated list {}", node.addr(), idx);
                ok = false;
            }
            let next = node.free_next();
            let prev_link = node.free_prev();
            match (next, prev_link) {
                (Some(n), Some(p)) => {
                    if n.free_prev().map(|b| b.addr()) != Some(node.addr())
                        || p.free_next().map(|b| b.addr()) != Some(node.addr())
                    {
                        alloc_warn!("checkheap: circular-list consistency broken at {:#x}", node.addr());
                        ok = false;
                    }
                }
                _ => {
                    alloc_warn!("checkheap: free block {:#x} missing list pointers", node.addr());
                    ok = false;
                }
            }
            let Some(n) = next else { break };
            if n.addr() == head.addr() {
                break;
            }
            node = n;
        }
    }

    let mut mini_node = lists.mini_head();
    while let Some(node) = mini_node {
        free_count_by_lists += 1;
        if node.size() != DSIZE {
            alloc_warn!("checkheap: non-mini block {:#x} on mini list", node.addr());
            ok = false;
        }
        mini_node = node.mini_next();
    }

    if free_count_by_walk != free_count_by_lists {
        alloc_warn!(
            "checkheap: free block count by heap walk ({}) disagrees with list membership ({})",
            free_count_by_walk,
            free_count_by_lists
        );
        ok = false;
    }

    ok
}
