//! Strongly-typed identifiers for heaps and chunks.
//!
//! Both identifiers record *parse order*: the n-th heap-start line in a log
//! yields `HeapId(n)`, the n-th chunk line of a heap yields `ChunkId(n)`.
//! Sorting heaps or chunks by address never renumbers them.

use std::fmt;

/// Identifies a heap by the order its heap-start line appeared in the log.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HeapId(pub u32);

impl fmt::Display for HeapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for HeapId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Identifies a chunk by the order its line appeared within its heap.
///
/// Renderers cycle colours on this value, so it must stay stable across
/// the post-parse address sort.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkId(pub u32);

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ChunkId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}
