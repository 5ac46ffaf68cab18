//! Core model for heap-dump visualization.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! entities every other heapvis crate passes around:
//!
//! - [`Heap`]: a contiguous allocator region with its chunks, and (after
//!   layout) its pages
//! - [`Chunk`]: an address range with one [`ChunkKind`]
//! - [`Page`]: a page-aligned slice of a heap carrying a [`Dirty`] tristate
//! - [`Block`]: the fixed-size unit a page is cut into
//! - [`Geometry`]: page and block sizes shared by parser, splitter and renderer

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod chunk;
pub mod error;
pub mod geometry;
pub mod heap;
pub mod id;
pub mod page;

pub use chunk::{Chunk, ChunkKind};
pub use error::ConfigError;
pub use geometry::{Geometry, BLOCK_SIZE, PAGE_SIZE};
pub use heap::{DirtyMap, Heap};
pub use id::{ChunkId, HeapId};
pub use page::{Block, Dirty, Page};
