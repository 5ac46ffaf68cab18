//! Invariant checks for split heaps.

use heapvis_core::{Geometry, Heap};

/// Verify the layout invariants of a heap that has been split.
///
/// Checks that:
/// - pages are page-aligned, strictly ascending, and non-empty
/// - blocks are numbered from zero within each page and lie in their page
/// - block addresses tile `[first_chunk.addr, last_chunk.end)` in
///   `block_size` steps with no gap or overlap
/// - every block references an existing chunk, chunk references never go
///   backwards, and they only change right after an `end_of_chunk` block
/// - each chunk that owns at least one block has exactly one
///   `end_of_chunk` block, and it is its last block
/// - when chunks are block-aligned, non-empty and non-overlapping, every
///   chunk owns at least one block (otherwise a chunk may legitimately
///   share its only block with a neighbour and own none)
/// - the transient dirty map has been discarded
pub fn check_layout(heap: &Heap, geometry: &Geometry) -> Result<(), String> {
    let Some((start, end)) = heap.chunk_span() else {
        return Err(format!("heap {} has no chunks", heap.number()));
    };
    if !heap.page_dirtiness().is_empty() {
        return Err(format!("heap {} still holds its dirty map", heap.number()));
    }

    let mut expected_addr = start;
    let mut prev_page: Option<u64> = None;
    let mut prev_block: Option<(usize, bool)> = None;
    let mut end_flags = vec![0usize; heap.chunks().len()];
    let mut last_block_of = vec![None; heap.chunks().len()];

    for page in heap.pages() {
        if page.addr() & geometry.page_mask() != 0 {
            return Err(format!("page {:#x} is not page-aligned", page.addr()));
        }
        if prev_page.is_some_and(|p| p >= page.addr()) {
            return Err(format!("page {:#x} out of order", page.addr()));
        }
        prev_page = Some(page.addr());
        if page.blocks().is_empty() {
            return Err(format!("page {:#x} has no blocks", page.addr()));
        }

        for (i, block) in page.blocks().iter().enumerate() {
            if block.number() as usize != i {
                return Err(format!(
                    "block {:#x} numbered {} at position {i}",
                    block.addr(),
                    block.number()
                ));
            }
            if block.addr() != expected_addr {
                return Err(format!(
                    "expected block at {expected_addr:#x}, found {:#x}",
                    block.addr()
                ));
            }
            if geometry.page_base(block.addr()) != page.addr() {
                return Err(format!(
                    "block {:#x} outside page {:#x}",
                    block.addr(),
                    page.addr()
                ));
            }
            let chunk = block.chunk();
            if chunk >= heap.chunks().len() {
                return Err(format!("block {:#x} references missing chunk {chunk}", block.addr()));
            }
            if let Some((prev_chunk, prev_end)) = prev_block {
                if chunk < prev_chunk {
                    return Err(format!("block {:#x} attribution went backwards", block.addr()));
                }
                if chunk != prev_chunk && !prev_end {
                    return Err(format!(
                        "block {:#x} switched chunk without an end_of_chunk block",
                        block.addr()
                    ));
                }
            }
            if block.end_of_chunk() {
                end_flags[chunk] += 1;
            }
            last_block_of[chunk] = Some(block.end_of_chunk());
            prev_block = Some((chunk, block.end_of_chunk()));
            expected_addr += geometry.block_size;
        }
    }

    if expected_addr < end {
        return Err(format!(
            "blocks stop at {expected_addr:#x}, span ends at {end:#x}"
        ));
    }
    if expected_addr - end >= geometry.block_size {
        return Err(format!(
            "blocks run to {expected_addr:#x}, past span end {end:#x}"
        ));
    }
    let chunks = heap.chunks();
    let on_block = |n: u64| n % geometry.block_size == 0;
    let block_aligned = chunks.iter().all(|c| {
        c.size() > 0 && on_block(c.size()) && c.addr().checked_sub(start).is_some_and(on_block)
    }) && chunks.windows(2).all(|w| w[1].addr() >= w[0].end());
    for (i, last) in last_block_of.iter().enumerate() {
        match last {
            Some(true) if end_flags[i] == 1 => {}
            Some(_) => {
                return Err(format!(
                    "chunk {i} has {} end_of_chunk blocks or does not end on one",
                    end_flags[i]
                ))
            }
            None if block_aligned => {
                return Err(format!("chunk {i} owns no block"));
            }
            None => {}
        }
    }
    Ok(())
}
