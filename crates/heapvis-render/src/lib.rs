//! Rendering for laid-out heaps.
//!
//! Consumes heaps that have been through the splitter and turns them into
//! something a human can look at:
//!
//! - [`HeapStats`]: page counts, sizes and dirty/clean percentages
//! - [`palette`]: block colours cycled on chunk number
//! - [`PageRaster`]: one page as a square RGB pixel grid, one cell per block
//! - [`HtmlReport`]: an `index.html` document referencing one image per
//!   maybe-dirty page and a shared placeholder for clean pages
//!
//! Encoding rasters into an image file format is left to an
//! [`ImageSink`] implementation.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod html;
pub mod palette;
pub mod raster;
pub mod sink;
pub mod stats;

pub use error::RenderError;
pub use html::{HtmlReport, CLEAN_PAGE_IMAGE_NAME, STYLESHEET, STYLESHEET_NAME};
pub use palette::Rgb;
pub use raster::PageRaster;
pub use sink::{ImageSink, MemorySink};
pub use stats::HeapStats;

/// Largest accepted pixels-per-block scale.
pub const MAX_BLOCK_SCALE: u32 = 64;

/// Largest accepted page raster edge in pixels.
pub const MAX_RASTER_EDGE: u32 = 4096;
