//! The chunk splitter.

use std::thread;

use heapvis_core::{Block, Chunk, Geometry, Heap, HeapId, Page};

use crate::error::LayoutError;

/// Largest worker pool [`ChunkSplitter::perform_parallel`] will start.
const MAX_WORKERS: usize = 64;

/// Cuts heaps into pages and blocks.
///
/// ```
/// use heapvis_core::{ChunkKind, Geometry, Heap, HeapId};
/// use heapvis_layout::ChunkSplitter;
///
/// let mut heap = Heap::new(HeapId(0), 0x1000, 0x1000);
/// heap.push_chunk(0x1000, 0x1000, ChunkKind::Top, None);
///
/// let splitter = ChunkSplitter::new(Geometry::default()).unwrap();
/// splitter.split_heap(&mut heap).unwrap();
/// assert_eq!(heap.pages().len(), 1);
/// assert_eq!(heap.pages()[0].blocks().len(), 256);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct ChunkSplitter {
    geometry: Geometry,
}

impl ChunkSplitter {
    /// Create a splitter. Returns `Err(LayoutError::Config)` for an
    /// invalid geometry.
    pub fn new(geometry: Geometry) -> Result<Self, LayoutError> {
        geometry.validate()?;
        Ok(Self { geometry })
    }

    /// The geometry pages and blocks are cut with.
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Split every heap in order, stopping at the first failure.
    pub fn perform(&self, heaps: &mut [Heap]) -> Result<(), LayoutError> {
        for heap in heaps.iter_mut() {
            self.split_heap(heap)?;
        }
        Ok(())
    }

    /// Split heaps on up to `workers` threads (clamped to `[1, 64]`).
    ///
    /// Output is identical to [`perform`](Self::perform). On failure the
    /// error of the lowest-indexed failing heap is returned; other heaps
    /// may or may not have been split.
    pub fn perform_parallel(&self, heaps: &mut [Heap], workers: usize) -> Result<(), LayoutError> {
        let workers = workers.clamp(1, MAX_WORKERS).min(heaps.len());
        if workers <= 1 {
            return self.perform(heaps);
        }
        let numbers: Vec<HeapId> = heaps.iter().map(Heap::number).collect();

        let (task_tx, task_rx) = crossbeam_channel::unbounded::<(usize, &mut Heap)>();
        let (result_tx, result_rx) = crossbeam_channel::unbounded();
        for task in heaps.iter_mut().enumerate() {
            // Receiver is alive; an unbounded send cannot fail here.
            let _ = task_tx.send(task);
        }
        drop(task_tx);

        let mut panicked = false;
        thread::scope(|s| {
            let handles: Vec<_> = (0..workers)
                .map(|_| {
                    let task_rx = task_rx.clone();
                    let result_tx = result_tx.clone();
                    s.spawn(move || {
                        for (index, heap) in task_rx {
                            let result = self.split_heap(heap);
                            if result_tx.send((index, result)).is_err() {
                                break;
                            }
                        }
                    })
                })
                .collect();
            for handle in handles {
                panicked |= handle.join().is_err();
            }
        });
        drop(task_rx);
        drop(result_tx);

        let mut results: Vec<Option<Result<(), LayoutError>>> = vec![None; numbers.len()];
        for (index, result) in result_rx {
            results[index] = Some(result);
        }
        for (index, result) in results.into_iter().enumerate() {
            match result {
                Some(Ok(())) => {}
                Some(Err(e)) => return Err(e),
                None if panicked => {
                    return Err(LayoutError::WorkerPanicked {
                        heap: numbers[index],
                    })
                }
                None => {}
            }
        }
        Ok(())
    }

    /// Split one heap: build its pages and discard its dirty map.
    ///
    /// On error the heap is left untouched.
    pub fn split_heap(&self, heap: &mut Heap) -> Result<(), LayoutError> {
        let span = tracing::info_span!("split_heap", heap = %heap.number());
        let _guard = span.enter();

        let pages = self.layout_pages(heap)?;
        tracing::debug!(
            pages = pages.len(),
            blocks = pages.iter().map(Page::block_count).sum::<usize>(),
            "heap split"
        );
        heap.set_pages(pages);
        Ok(())
    }

    fn layout_pages(&self, heap: &Heap) -> Result<Vec<Page>, LayoutError> {
        let (start, end) = heap.chunk_span().ok_or(LayoutError::EmptyHeap {
            heap: heap.number(),
        })?;
        if end.saturating_sub(start) % self.geometry.block_size != 0 {
            tracing::warn!(
                start = format_args!("{start:#x}"),
                end = format_args!("{end:#x}"),
                block_size = self.geometry.block_size,
                "chunk span is not a whole number of blocks; last block overhangs"
            );
        }
        self.sweep(heap, heap.chunks(), start, end)
    }

    /// One forward pass over `[start, end)` in block steps.
    ///
    /// The current chunk only ever advances to the next index, right after
    /// the block in which it ends.
    fn sweep(
        &self,
        heap: &Heap,
        chunks: &[Chunk],
        start: u64,
        end: u64,
    ) -> Result<Vec<Page>, LayoutError> {
        let block_size = self.geometry.block_size;
        let mut pages = Vec::new();
        let mut current = 0usize;
        let mut addr = start;

        'pages: while addr < end {
            let page_addr = self.geometry.page_base(addr);
            let mut page = Page::new(page_addr, heap.dirtiness_of(page_addr));
            let limit = page_addr.saturating_add(self.geometry.page_size).min(end);
            let mut number = 0u32;

            while addr < limit {
                let chunk = chunks.get(current).ok_or(LayoutError::ChunksExhausted {
                    heap: heap.number(),
                    addr,
                })?;
                let end_of_chunk = addr.saturating_add(block_size) >= chunk.end();
                page.push_block(Block::new(addr, number, current, end_of_chunk));
                number += 1;
                if end_of_chunk {
                    current += 1;
                }
                match addr.checked_add(block_size) {
                    Some(next) => addr = next,
                    None => {
                        pages.push(page);
                        break 'pages;
                    }
                }
            }
            pages.push(page);
        }
        Ok(pages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heapvis_core::{ChunkKind, Dirty};
    use heapvis_parse::parse_str;
    use heapvis_test_utils::{check_layout, LogBuilder};
    use proptest::prelude::*;

    fn split(log: &str) -> Vec<Heap> {
        let mut heaps = parse_str(log, Geometry::default()).unwrap();
        ChunkSplitter::default().perform(&mut heaps).unwrap();
        heaps
    }

    // ── Reference scenario ──────────────────────────────────────

    #[test]
    fn two_chunk_two_page_heap() {
        let heaps = split(
            "Heap 1000 size 8192\n\
             chunk 1000 size 4096 bytes  first-chunk\n\
             chunk 2000 size 4096 bytes [free] \n\
             Pages in use for 0x1000-0x3000: 10\n",
        );
        let heap = &heaps[0];
        assert_eq!(heap.pages().len(), 2);

        let first = &heap.pages()[0];
        assert_eq!(first.addr(), 0x1000);
        assert_eq!(first.dirty(), Dirty::Dirty);
        assert_eq!(first.blocks().len(), 256);
        let last = first.blocks()[255];
        assert!(last.end_of_chunk());
        assert!(heap.block_is_used(&last));
        assert!(first.blocks()[..255].iter().all(|b| !b.end_of_chunk()));

        let second = &heap.pages()[1];
        assert_eq!(second.addr(), 0x2000);
        assert_eq!(second.dirty(), Dirty::Clean);
        assert_eq!(second.blocks().len(), 256);
        assert!(second
            .blocks()
            .iter()
            .all(|b| heap.chunk_of(b).map(|c| c.kind()) == Some(ChunkKind::Free)));

        assert!(heap.page_dirtiness().is_empty());
        check_layout(heap, &Geometry::default()).unwrap();
    }

    // ── Boundaries ──────────────────────────────────────────────

    #[test]
    fn missing_dirty_entry_is_maybe_dirty() {
        let heaps = split(
            &LogBuilder::new()
                .contiguous_heap(0x4000, &[(0x1000, ChunkKind::Used), (0x1000, ChunkKind::Top)])
                .pages(0x4000, 0x5000, "0")
                .build(),
        );
        let pages = heaps[0].pages();
        assert_eq!(pages[0].dirty(), Dirty::Clean);
        assert!(!pages[0].maybe_dirty());
        assert_eq!(pages[1].dirty(), Dirty::Unknown);
        assert!(pages[1].maybe_dirty());
    }

    #[test]
    fn unaligned_start_and_short_last_page() {
        // Chunks start 0x30 into a page and stop 0x100 into the next one.
        let heaps = split(
            &LogBuilder::new()
                .heap(0x10000, 0x1100)
                .chunk(0x10030, 0x40, ChunkKind::Used, Some("x"))
                .chunk(0x10070, 0x1090, ChunkKind::Top, None)
                .build(),
        );
        let heap = &heaps[0];
        let pages = heap.pages();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].addr(), 0x10000);
        assert_eq!(pages[0].blocks()[0].addr(), 0x10030);
        assert_eq!(pages[0].blocks()[0].number(), 0);
        assert_eq!(pages[0].blocks().len(), (0x1000 - 0x30) / 16);
        assert_eq!(pages[1].addr(), 0x11000);
        assert_eq!(pages[1].blocks().len(), 0x100 / 16);
        check_layout(heap, &Geometry::default()).unwrap();
    }

    #[test]
    fn block_straddling_chunk_seam() {
        // First chunk ends 8 bytes into its second block.
        let mut heap = Heap::new(HeapId(0), 0x0, 0x40);
        heap.push_chunk(0x0, 0x18, ChunkKind::Used, None);
        heap.push_chunk(0x18, 0x28, ChunkKind::Top, None);
        ChunkSplitter::default().split_heap(&mut heap).unwrap();

        let blocks = heap.pages()[0].blocks();
        assert_eq!(blocks.len(), 4);
        assert_eq!((blocks[0].chunk(), blocks[0].end_of_chunk()), (0, false));
        assert_eq!((blocks[1].chunk(), blocks[1].end_of_chunk()), (0, true));
        assert_eq!((blocks[2].chunk(), blocks[2].end_of_chunk()), (1, false));
        assert_eq!((blocks[3].chunk(), blocks[3].end_of_chunk()), (1, true));
    }

    #[test]
    fn ragged_span_overhangs_by_less_than_a_block() {
        let mut heap = Heap::new(HeapId(0), 0x0, 0x28);
        heap.push_chunk(0x0, 0x28, ChunkKind::Top, None);
        ChunkSplitter::default().split_heap(&mut heap).unwrap();
        let blocks = heap.pages()[0].blocks();
        assert_eq!(blocks.len(), 3);
        assert!(blocks[2].end_of_chunk());
        check_layout(&heap, &Geometry::default()).unwrap();
    }

    #[test]
    fn custom_geometry() {
        let geometry = Geometry {
            page_size: 256,
            block_size: 32,
        };
        let mut heap = Heap::new(HeapId(0), 0x0, 0x200);
        heap.push_chunk(0x0, 0x200, ChunkKind::Top, None);
        ChunkSplitter::new(geometry)
            .unwrap()
            .split_heap(&mut heap)
            .unwrap();
        assert_eq!(heap.pages().len(), 2);
        assert!(heap.pages().iter().all(|p| p.blocks().len() == 8));
        check_layout(&heap, &geometry).unwrap();
    }

    // ── Errors ──────────────────────────────────────────────────

    #[test]
    fn empty_heap_is_rejected() {
        let mut heap = Heap::new(HeapId(4), 0x1000, 0x1000);
        heap.record_page_dirtiness(0x1000, Dirty::Dirty);
        let err = ChunkSplitter::default().split_heap(&mut heap).unwrap_err();
        assert_eq!(err, LayoutError::EmptyHeap { heap: HeapId(4) });
        // Left untouched on error.
        assert_eq!(heap.page_dirtiness().len(), 1);
    }

    #[test]
    fn running_out_of_chunks_is_reported() {
        let mut heap = Heap::new(HeapId(2), 0x0, 0x40);
        heap.push_chunk(0x0, 0x20, ChunkKind::Used, None);
        let splitter = ChunkSplitter::default();
        let err = splitter
            .sweep(&heap, heap.chunks(), 0x0, 0x40)
            .unwrap_err();
        assert_eq!(
            err,
            LayoutError::ChunksExhausted {
                heap: HeapId(2),
                addr: 0x20
            }
        );
    }

    #[test]
    fn first_failure_stops_sequential_run() {
        let mut heaps = vec![Heap::new(HeapId(0), 0x0, 0), Heap::new(HeapId(1), 0x1000, 0)];
        heaps[1].push_chunk(0x1000, 0x10, ChunkKind::Top, None);
        let err = ChunkSplitter::default().perform(&mut heaps).unwrap_err();
        assert_eq!(err, LayoutError::EmptyHeap { heap: HeapId(0) });
        assert!(heaps[1].pages().is_empty());
    }

    #[test]
    fn invalid_geometry_is_rejected() {
        let err = ChunkSplitter::new(Geometry {
            page_size: 4096,
            block_size: 0,
        })
        .unwrap_err();
        assert!(matches!(err, LayoutError::Config(_)));
    }

    // ── Parallel ────────────────────────────────────────────────

    fn many_heaps() -> String {
        let mut builder = LogBuilder::new();
        for i in 0..12u64 {
            let base = 0x100_0000 * (i + 1);
            builder = builder
                .contiguous_heap(
                    base,
                    &[
                        (0x30 * (i + 1), ChunkKind::Used),
                        (0x20, ChunkKind::Free),
                        (0x2000, ChunkKind::Top),
                    ],
                )
                .pages(base, base + 0x3000, "101");
        }
        builder.build()
    }

    #[test]
    fn parallel_matches_sequential() {
        let log = many_heaps();
        let mut sequential = parse_str(&log, Geometry::default()).unwrap();
        let mut parallel = sequential.clone();
        let splitter = ChunkSplitter::default();
        splitter.perform(&mut sequential).unwrap();
        splitter.perform_parallel(&mut parallel, 4).unwrap();
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn parallel_reports_lowest_failing_heap() {
        let mut heaps = parse_str(&many_heaps(), Geometry::default()).unwrap();
        heaps.insert(3, Heap::new(HeapId(90), 0x10, 0));
        heaps.insert(7, Heap::new(HeapId(91), 0x20, 0));
        let err = ChunkSplitter::default()
            .perform_parallel(&mut heaps, 3)
            .unwrap_err();
        assert_eq!(err, LayoutError::EmptyHeap { heap: HeapId(90) });
    }

    #[test]
    fn parallel_with_one_worker_or_no_heaps() {
        let splitter = ChunkSplitter::default();
        splitter.perform_parallel(&mut [], 8).unwrap();
        let mut heaps = parse_str(&many_heaps(), Geometry::default()).unwrap();
        splitter.perform_parallel(&mut heaps, 0).unwrap();
        assert!(heaps.iter().all(|h| !h.pages().is_empty()));
    }

    // ── Properties ──────────────────────────────────────────────

    fn arb_kind() -> impl Strategy<Value = ChunkKind> {
        prop_oneof![
            Just(ChunkKind::Used),
            Just(ChunkKind::Free),
            Just(ChunkKind::Fence),
            Just(ChunkKind::Top),
        ]
    }

    proptest! {
        #[test]
        fn contiguous_chunks_satisfy_layout_invariants(
            base_page in 1u64..1 << 20,
            start_block in 0u64..256,
            chunks in prop::collection::vec((1u64..600, arb_kind()), 1..40),
        ) {
            let base = base_page * 4096 + start_block * 16;
            let sized: Vec<(u64, ChunkKind)> =
                chunks.iter().map(|&(blocks, kind)| (blocks * 16, kind)).collect();
            let heaps = split(&LogBuilder::new().contiguous_heap(base, &sized).build());
            let heap = &heaps[0];
            prop_assert!(check_layout(heap, &Geometry::default()).is_ok(),
                "{:?}", check_layout(heap, &Geometry::default()));

            // Exactly one end_of_chunk block per chunk, in chunk order.
            let ends: Vec<usize> = heap
                .pages()
                .iter()
                .flat_map(|p| p.blocks())
                .filter(|b| b.end_of_chunk())
                .map(|b| b.chunk())
                .collect();
            prop_assert_eq!(ends, (0..sized.len()).collect::<Vec<_>>());

            // Block count is exactly the span in blocks.
            let total: u64 = sized.iter().map(|(s, _)| s).sum();
            let blocks: usize = heap.pages().iter().map(|p| p.block_count()).sum();
            prop_assert_eq!(blocks as u64, total / 16);
        }

        #[test]
        fn pages_without_usage_bits_are_maybe_dirty(
            bits in "[01?]{0,8}",
        ) {
            let log = LogBuilder::new()
                .contiguous_heap(0x40000, &[(0x8000, ChunkKind::Top)])
                .pages(0x40000, 0x48000, &bits)
                .build();
            let heaps = split(&log);
            let pages = heaps[0].pages();
            prop_assert_eq!(pages.len(), 8);
            for (i, page) in pages.iter().enumerate() {
                let expected = bits.chars().nth(i).map_or(Dirty::Unknown, Dirty::from_usage_char);
                prop_assert_eq!(page.dirty(), expected);
                prop_assert_eq!(page.maybe_dirty(), expected != Dirty::Clean);
            }
        }
    }
}
