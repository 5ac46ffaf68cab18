//! Heaps: the root of the model.

use crate::chunk::{Chunk, ChunkKind};
use crate::id::{ChunkId, HeapId};
use crate::page::{Block, Dirty, Page};
use indexmap::IndexMap;
use std::ops::Range;

/// Page base address → dirty state, in the order the log reported them.
///
/// Transient: filled by the parser, drained by the splitter when it
/// produces [`Page`]s.
pub type DirtyMap = IndexMap<u64, Dirty>;

/// A contiguous allocator region and everything derived from it.
///
/// Built in two passes. The parser creates the heap, appends chunks and
/// records page dirtiness, then sorts the chunks by address. The splitter
/// later drains the dirty map into [`Page`]s. Neither pass touches the heap
/// afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Heap {
    number: HeapId,
    addr: u64,
    size: u64,
    chunks: Vec<Chunk>,
    pages: Vec<Page>,
    page_dirtiness: DirtyMap,
}

impl Heap {
    /// Create an empty heap.
    pub fn new(number: HeapId, addr: u64, size: u64) -> Self {
        Self {
            number,
            addr,
            size,
            chunks: Vec::new(),
            pages: Vec::new(),
            page_dirtiness: DirtyMap::new(),
        }
    }

    /// Parse-order index of this heap.
    pub fn number(&self) -> HeapId {
        self.number
    }

    /// Base address.
    pub fn addr(&self) -> u64 {
        self.addr
    }

    /// Declared size in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Chunks, address-sorted once parsing has finished.
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Pages, populated by the splitter.
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Append a chunk. Its number is the count of chunks already present.
    pub fn push_chunk(
        &mut self,
        addr: u64,
        size: u64,
        kind: ChunkKind,
        preview: Option<String>,
    ) -> ChunkId {
        let number = ChunkId(u32::try_from(self.chunks.len()).unwrap_or(u32::MAX));
        self.chunks
            .push(Chunk::new(self.number, number, addr, size, kind, preview));
        number
    }

    /// Sort chunks ascending by address. Chunk numbers are left untouched.
    pub fn sort_chunks(&mut self) {
        self.chunks.sort_by_key(Chunk::addr);
    }

    /// Record the dirty state of the page based at `page_addr`.
    ///
    /// A later record for the same page overwrites the earlier one.
    pub fn record_page_dirtiness(&mut self, page_addr: u64, dirty: Dirty) {
        self.page_dirtiness.insert(page_addr, dirty);
    }

    /// Forget every recorded page in `range`; those pages read as
    /// [`Dirty::Unknown`] again.
    pub fn forget_page_dirtiness(&mut self, range: Range<u64>) {
        self.page_dirtiness.retain(|addr, _| !range.contains(addr));
    }

    /// The transient dirty map. Empty once the heap has been split.
    pub fn page_dirtiness(&self) -> &DirtyMap {
        &self.page_dirtiness
    }

    /// Dirty state for the page based at `page_addr`; [`Dirty::Unknown`]
    /// when the log said nothing about it.
    pub fn dirtiness_of(&self, page_addr: u64) -> Dirty {
        self.page_dirtiness
            .get(&page_addr)
            .copied()
            .unwrap_or_default()
    }

    /// Install the pages produced by the splitter and drop the dirty map.
    pub fn set_pages(&mut self, pages: Vec<Page>) {
        self.pages = pages;
        self.page_dirtiness = DirtyMap::new();
    }

    /// `[first_chunk.addr, last_chunk.end)`, or `None` without chunks.
    pub fn chunk_span(&self) -> Option<(u64, u64)> {
        let first = self.chunks.first()?;
        let last = self.chunks.last()?;
        Some((first.addr(), last.end()))
    }

    /// Offset of `chunk` from the heap base, `None` if it lies below it.
    pub fn chunk_offset(&self, chunk: &Chunk) -> Option<u64> {
        chunk.addr().checked_sub(self.addr)
    }

    /// Resolve the chunk a block belongs to.
    pub fn chunk_of(&self, block: &Block) -> Option<&Chunk> {
        self.chunks.get(block.chunk())
    }

    /// Whether the chunk owning `block` is a used chunk.
    pub fn block_is_used(&self, block: &Block) -> bool {
        self.chunk_of(block).is_some_and(Chunk::is_used)
    }

    /// Pages that are dirty or of unknown state.
    pub fn maybe_dirty_pages(&self) -> impl Iterator<Item = &Page> {
        self.pages.iter().filter(|p| p.maybe_dirty())
    }

    /// Pages known to be clean.
    pub fn clean_pages(&self) -> impl Iterator<Item = &Page> {
        self.pages.iter().filter(|p| !p.maybe_dirty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn heap_with_chunks() -> Heap {
        let mut heap = Heap::new(HeapId(0), 0x1000, 0x3000);
        heap.push_chunk(0x2000, 0x1000, ChunkKind::Free, None);
        heap.push_chunk(0x1000, 0x1000, ChunkKind::Used, Some("abc".into()));
        heap
    }

    #[test]
    fn chunk_numbers_follow_push_order() {
        let heap = heap_with_chunks();
        assert_eq!(heap.chunks()[0].number(), ChunkId(0));
        assert_eq!(heap.chunks()[1].number(), ChunkId(1));
    }

    #[test]
    fn sorting_keeps_numbers() {
        let mut heap = heap_with_chunks();
        heap.sort_chunks();
        assert_eq!(heap.chunks()[0].addr(), 0x1000);
        assert_eq!(heap.chunks()[0].number(), ChunkId(1));
        assert_eq!(heap.chunks()[1].addr(), 0x2000);
        assert_eq!(heap.chunks()[1].number(), ChunkId(0));
    }

    #[test]
    fn missing_dirty_entry_is_unknown() {
        let mut heap = heap_with_chunks();
        heap.record_page_dirtiness(0x1000, Dirty::Clean);
        assert_eq!(heap.dirtiness_of(0x1000), Dirty::Clean);
        assert_eq!(heap.dirtiness_of(0x2000), Dirty::Unknown);
    }

    #[test]
    fn forgetting_a_range_keeps_the_rest() {
        let mut heap = heap_with_chunks();
        for (addr, dirty) in [(0x1000, Dirty::Dirty), (0x2000, Dirty::Clean), (0x3000, Dirty::Dirty)] {
            heap.record_page_dirtiness(addr, dirty);
        }
        heap.forget_page_dirtiness(0x2000..0x3000);
        assert_eq!(heap.page_dirtiness().len(), 2);
        assert_eq!(heap.dirtiness_of(0x2000), Dirty::Unknown);
        assert_eq!(heap.dirtiness_of(0x3000), Dirty::Dirty);
        let order: Vec<u64> = heap.page_dirtiness().keys().copied().collect();
        assert_eq!(order, [0x1000, 0x3000]);
    }

    #[test]
    fn set_pages_clears_dirty_map() {
        let mut heap = heap_with_chunks();
        heap.record_page_dirtiness(0x1000, Dirty::Dirty);
        heap.set_pages(vec![Page::new(0x1000, Dirty::Dirty)]);
        assert!(heap.page_dirtiness().is_empty());
        assert_eq!(heap.pages().len(), 1);
    }

    #[test]
    fn span_and_offsets() {
        let mut heap = heap_with_chunks();
        heap.sort_chunks();
        assert_eq!(heap.chunk_span(), Some((0x1000, 0x3000)));
        assert_eq!(heap.chunk_offset(&heap.chunks()[1]), Some(0x1000));
        assert_eq!(Heap::new(HeapId(1), 0, 0).chunk_span(), None);

        let below = Chunk::new(HeapId(0), ChunkId(9), 0x800, 16, ChunkKind::Used, None);
        assert_eq!(heap.chunk_offset(&below), None);
    }

    #[test]
    fn block_resolution() {
        let mut heap = heap_with_chunks();
        heap.sort_chunks();
        let used = Block::new(0x1000, 0, 0, false);
        let free = Block::new(0x2000, 0, 1, false);
        let dangling = Block::new(0x3000, 0, 7, false);
        assert!(heap.block_is_used(&used));
        assert!(!heap.block_is_used(&free));
        assert!(heap.chunk_of(&dangling).is_none());
        assert!(!heap.block_is_used(&dangling));
    }

    #[test]
    fn page_partitions() {
        let mut heap = heap_with_chunks();
        heap.set_pages(vec![
            Page::new(0x1000, Dirty::Dirty),
            Page::new(0x2000, Dirty::Clean),
            Page::new(0x3000, Dirty::Unknown),
        ]);
        assert_eq!(heap.maybe_dirty_pages().count(), 2);
        assert_eq!(heap.clean_pages().count(), 1);
    }

    proptest! {
        #[test]
        fn sort_never_renumbers(addrs in prop::collection::vec(0u64..1 << 40, 1..64)) {
            let mut heap = Heap::new(HeapId(0), 0, 0);
            for &a in &addrs {
                heap.push_chunk(a, 16, ChunkKind::Used, None);
            }
            heap.sort_chunks();
            for pair in heap.chunks().windows(2) {
                prop_assert!(pair[0].addr() <= pair[1].addr());
            }
            for chunk in heap.chunks() {
                prop_assert_eq!(addrs[chunk.number().0 as usize], chunk.addr());
            }
        }
    }
}
