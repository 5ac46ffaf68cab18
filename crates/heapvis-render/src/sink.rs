//! Destinations for page rasters.

use std::io;

use indexmap::IndexMap;

use crate::raster::PageRaster;

/// Receives every image a report references.
///
/// Implementations decide how (and whether) to encode the raster; the
/// report only cares that `name` can later be resolved next to the markup.
pub trait ImageSink {
    /// Store `raster` under the file name `name`.
    fn write_image(&mut self, name: &str, raster: &PageRaster) -> io::Result<()>;
}

impl<S: ImageSink + ?Sized> ImageSink for &mut S {
    fn write_image(&mut self, name: &str, raster: &PageRaster) -> io::Result<()> {
        (**self).write_image(name, raster)
    }
}

/// Keeps rasters in memory, in the order they were written.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    images: IndexMap<String, PageRaster>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raster stored under `name`.
    pub fn get(&self, name: &str) -> Option<&PageRaster> {
        self.images.get(name)
    }

    /// Names in write order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.images.keys().map(String::as_str)
    }

    /// Number of stored images.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Whether nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

impl ImageSink for MemorySink {
    fn write_image(&mut self, name: &str, raster: &PageRaster) -> io::Result<()> {
        self.images.insert(name.to_owned(), raster.clone());
        Ok(())
    }
}
