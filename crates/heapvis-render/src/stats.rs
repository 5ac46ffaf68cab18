//! Per-heap page statistics.

use heapvis_core::{Geometry, Heap};

const MIB: f64 = 1024.0 * 1024.0;

/// Convert a byte count to mebibytes.
pub fn mebibytes(bytes: u64) -> f64 {
    bytes as f64 / MIB
}

/// Aggregate page statistics of one split heap.
///
/// Percentages use truncating integer division, `count * 100 / total`,
/// and are 0 for a heap without pages.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeapStats {
    /// Declared heap size in bytes.
    pub virtual_bytes: u64,
    /// Number of pages produced by the splitter.
    pub total_pages: usize,
    /// Pages that are dirty or of unknown state.
    pub maybe_dirty_pages: usize,
    /// Pages known to be clean.
    pub clean_pages: usize,
    /// Page size used for the byte figures.
    pub page_size: u64,
}

impl HeapStats {
    /// Compute statistics for `heap`.
    pub fn of(heap: &Heap, geometry: &Geometry) -> Self {
        let maybe_dirty_pages = heap.maybe_dirty_pages().count();
        Self {
            virtual_bytes: heap.size(),
            total_pages: heap.pages().len(),
            maybe_dirty_pages,
            clean_pages: heap.pages().len() - maybe_dirty_pages,
            page_size: geometry.page_size,
        }
    }

    /// Declared heap size in MiB.
    pub fn virtual_mib(&self) -> f64 {
        mebibytes(self.virtual_bytes)
    }

    /// Size of the maybe-dirty pages in MiB.
    pub fn maybe_dirty_mib(&self) -> f64 {
        mebibytes(self.maybe_dirty_pages as u64 * self.page_size)
    }

    /// Size of the clean pages in MiB.
    pub fn clean_mib(&self) -> f64 {
        mebibytes(self.clean_pages as u64 * self.page_size)
    }

    /// Share of maybe-dirty pages, truncated to a whole percent.
    pub fn maybe_dirty_percent(&self) -> usize {
        percent(self.maybe_dirty_pages, self.total_pages)
    }

    /// Share of clean pages, truncated to a whole percent.
    pub fn clean_percent(&self) -> usize {
        percent(self.clean_pages, self.total_pages)
    }
}

fn percent(count: usize, total: usize) -> usize {
    if total == 0 {
        0
    } else {
        count * 100 / total
    }
}
