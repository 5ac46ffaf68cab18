//! Heapvis: a heap fragmentation visualizer.
//!
//! This is the top-level facade crate that re-exports the public API of the
//! heapvis sub-crates and ties them together in a [`Pipeline`].
//!
//! # Quick start
//!
//! ```rust
//! use heapvis::prelude::*;
//!
//! let log = "\
//! Heap  0x10000 size 8192 bytes:
//! chunk 0x10000 size 4096 bytes           hello
//! chunk 0x11000 size 4096 bytes (top)
//! Pages in use for 0x10000-0x12000: 10
//! ";
//!
//! let pipeline = Pipeline::new(VisualizerConfig::default()).unwrap();
//! let heaps = pipeline.analyze_lines(log.lines()).unwrap();
//! assert_eq!(heaps[0].pages().len(), 2);
//! assert_eq!(heaps[0].pages()[0].dirty(), Dirty::Dirty);
//!
//! let mut images = MemorySink::new();
//! let html = pipeline.render(&heaps, Vec::new(), &mut images).unwrap();
//! assert!(String::from_utf8(html).unwrap().contains("page-10000.png"));
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `heapvis-core` | Heaps, chunks, pages, blocks, geometry |
//! | [`parse`] | `heapvis-parse` | Heap-dump log parser |
//! | [`layout`] | `heapvis-layout` | Page and block splitter |
//! | [`render`] | `heapvis-render` | Statistics, rasters, HTML report |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod pipeline;

pub use config::VisualizerConfig;
pub use error::Error;
pub use pipeline::Pipeline;

/// Data model and geometry (`heapvis-core`).
pub use heapvis_core as types;

/// Heap-dump log parsing (`heapvis-parse`).
///
/// [`parse::HeapLogParser`] for line-at-a-time feeding,
/// [`parse::parse_reader`] for whole streams.
pub use heapvis_parse as parse;

/// Page and block layout (`heapvis-layout`).
pub use heapvis_layout as layout;

/// Rendering (`heapvis-render`).
///
/// [`render::HtmlReport`] writes the markup; rasters go to an
/// [`render::ImageSink`].
pub use heapvis_render as render;

/// Common imports for typical heapvis usage.
pub mod prelude {
    pub use crate::{Error, Pipeline, VisualizerConfig};

    // Model
    pub use heapvis_core::{Block, Chunk, ChunkKind, Dirty, Geometry, Heap, Page};

    // Passes
    pub use heapvis_layout::ChunkSplitter;
    pub use heapvis_parse::HeapLogParser;

    // Rendering
    pub use heapvis_render::{HeapStats, HtmlReport, ImageSink, MemorySink, PageRaster};
}
