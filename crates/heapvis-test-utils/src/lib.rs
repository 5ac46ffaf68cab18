//! Test utilities for heapvis development.
//!
//! - [`LogBuilder`] writes heap-dump logs in the exact textual shape the
//!   allocator dump hook produces
//! - [`check_layout`] verifies the page/block invariants of a split heap

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

mod layout;

pub use layout::check_layout;

use heapvis_core::ChunkKind;
use std::fmt::Write;

/// Builder for heap-dump log text.
///
/// ```
/// use heapvis_core::ChunkKind;
/// use heapvis_test_utils::LogBuilder;
///
/// let log = LogBuilder::new()
///     .heap(0x1000, 0x2000)
///     .pages(0x1000, 0x3000, "10")
///     .chunk(0x1000, 0x1000, ChunkKind::Used, Some("hello"))
///     .chunk(0x2000, 0x1000, ChunkKind::Top, None)
///     .build();
/// assert_eq!(log.lines().count(), 4);
/// ```
#[derive(Clone, Debug, Default)]
pub struct LogBuilder {
    text: String,
}

impl LogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// `Heap  0x<addr> size <size> bytes:`
    pub fn heap(mut self, addr: u64, size: u64) -> Self {
        let _ = writeln!(self.text, "Heap  {addr:#x} size {size:>10} bytes:");
        self
    }

    /// `chunk 0x<addr> size <size> bytes <marker><preview>`
    pub fn chunk(mut self, addr: u64, size: u64, kind: ChunkKind, preview: Option<&str>) -> Self {
        let marker = match kind {
            ChunkKind::Top => " (top)  ",
            ChunkKind::Fence => " (fence)",
            ChunkKind::Free => " [free] ",
            ChunkKind::Used => "          ",
        };
        let _ = writeln!(
            self.text,
            "chunk {addr:#x} size {size:>10} bytes{marker}{}",
            preview.unwrap_or("")
        );
        self
    }

    /// `Pages in use for 0x<start>-0x<end>: <bits>`
    pub fn pages(mut self, start: u64, end: u64, bits: &str) -> Self {
        let _ = writeln!(self.text, "Pages in use for {start:#x}-{end:#x}: {bits}");
        self
    }

    /// Append an arbitrary line verbatim.
    pub fn line(mut self, raw: &str) -> Self {
        self.text.push_str(raw);
        self.text.push('\n');
        self
    }

    /// Append a heap whose chunks follow each other without gaps,
    /// starting at `addr`. The last chunk is written as given; callers
    /// usually pass `ChunkKind::Top` for it.
    pub fn contiguous_heap(mut self, addr: u64, chunks: &[(u64, ChunkKind)]) -> Self {
        let total: u64 = chunks.iter().map(|(size, _)| size).sum();
        self = self.heap(addr, total);
        let mut cursor = addr;
        for &(size, kind) in chunks {
            self = self.chunk(cursor, size, kind, None);
            cursor += size;
        }
        self
    }

    pub fn build(self) -> String {
        self.text
    }

    pub fn lines(&self) -> Vec<String> {
        self.text.lines().map(str::to_owned).collect()
    }
}
