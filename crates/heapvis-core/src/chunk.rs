//! Allocation chunks.

use crate::id::{ChunkId, HeapId};
use std::fmt;

/// Allocation classification of a chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChunkKind {
    /// Handed out to the program.
    Used,
    /// On a free list.
    Free,
    /// Allocator bookkeeping fence at the end of a heap.
    Fence,
    /// The top (wilderness) chunk.
    Top,
}

impl ChunkKind {
    /// Whether blocks of this chunk are drawn as allocated.
    pub fn is_used(self) -> bool {
        self == Self::Used
    }

    /// Classify the marker text that follows `bytes` on a chunk line.
    ///
    /// First match wins: `top`, then `fence`, then `free`; anything else,
    /// including a blank marker, is a used chunk.
    pub fn from_marker(marker: &str) -> Self {
        if marker.contains("top") {
            Self::Top
        } else if marker.contains("fence") {
            Self::Fence
        } else if marker.contains("free") {
            Self::Free
        } else {
            Self::Used
        }
    }
}

impl fmt::Display for ChunkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Used => "used",
            Self::Free => "free",
            Self::Fence => "fence",
            Self::Top => "top",
        };
        f.write_str(name)
    }
}

/// A contiguous address range inside one heap with a single [`ChunkKind`].
///
/// The owning heap is recorded as a [`HeapId`], not a reference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chunk {
    heap: HeapId,
    number: ChunkId,
    addr: u64,
    size: u64,
    kind: ChunkKind,
    preview: Option<String>,
}

impl Chunk {
    /// Create a chunk. An empty or all-whitespace `preview` is stored as `None`.
    pub fn new(
        heap: HeapId,
        number: ChunkId,
        addr: u64,
        size: u64,
        kind: ChunkKind,
        preview: Option<String>,
    ) -> Self {
        let preview = preview.and_then(|p| {
            let trimmed = p.trim();
            if trimmed.is_empty() {
                None
            } else if trimmed.len() == p.len() {
                Some(p)
            } else {
                Some(trimmed.to_owned())
            }
        });
        Self {
            heap,
            number,
            addr,
            size,
            kind,
            preview,
        }
    }

    /// The heap this chunk belongs to.
    pub fn heap(&self) -> HeapId {
        self.heap
    }

    /// Parse-order index within the owning heap.
    pub fn number(&self) -> ChunkId {
        self.number
    }

    /// Start address.
    pub fn addr(&self) -> u64 {
        self.addr
    }

    /// Size in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// One past the last byte.
    pub fn end(&self) -> u64 {
        self.addr.saturating_add(self.size)
    }

    /// Allocation classification.
    pub fn kind(&self) -> ChunkKind {
        self.kind
    }

    /// Whether this chunk is handed out to the program.
    pub fn is_used(&self) -> bool {
        self.kind.is_used()
    }

    /// Printable preview of the chunk contents, if the log carried one.
    pub fn preview(&self) -> Option<&str> {
        self.preview.as_deref()
    }
}
