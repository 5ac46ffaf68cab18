//! Page and block layout for parsed heaps.
//!
//! [`ChunkSplitter`] walks each heap's address-sorted chunks once, from the
//! first chunk's start to the last chunk's end, cutting the range into
//! page-aligned [`Page`](heapvis_core::Page)s and fixed-size
//! [`Block`](heapvis_core::Block)s. Each block is attributed to the chunk
//! whose bytes start it; the block in which a chunk ends carries
//! `end_of_chunk` so renderers can mark the seam.
//!
//! Heaps are independent, so [`ChunkSplitter::perform_parallel`] may split
//! them on a worker pool; results are identical to
//! [`ChunkSplitter::perform`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod splitter;

pub use error::LayoutError;
pub use splitter::ChunkSplitter;
