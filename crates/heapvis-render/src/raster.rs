//! Page rasters.
//!
//! A page is drawn as a square grid with one cell per block slot, filled
//! row-major in block order. Cells are `scale` pixels wide. A page whose
//! blocks start mid-page (the first page of a heap) or stop early (the
//! last) leaves the remaining cells in the background colour.

use heapvis_core::{ConfigError, Geometry, Heap, Page};

use crate::palette::{self, Rgb};
use crate::{MAX_BLOCK_SCALE, MAX_RASTER_EDGE};

/// An RGB pixel grid for one page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageRaster {
    cells: u32,
    scale: u32,
    pixels: Vec<Rgb>,
}

impl PageRaster {
    /// Cells per grid row: the smallest `n` with `n * n >= blocks_per_page`.
    pub fn grid_side(geometry: &Geometry) -> u64 {
        let blocks = geometry.blocks_per_page();
        let side = blocks.isqrt();
        if side * side < blocks {
            side + 1
        } else {
            side
        }
    }

    /// Pixel edge of a page raster for `geometry` at `scale`.
    ///
    /// Fails for a zero scale and for edges above [`MAX_RASTER_EDGE`].
    pub fn edge(geometry: &Geometry, scale: u32) -> Result<u32, ConfigError> {
        if scale == 0 {
            return Err(ConfigError::BlockScaleOutOfRange {
                value: scale,
                max: MAX_BLOCK_SCALE,
            });
        }
        let edge = Self::grid_side(geometry).saturating_mul(u64::from(scale));
        u32::try_from(edge)
            .ok()
            .filter(|&e| e <= MAX_RASTER_EDGE)
            .ok_or(ConfigError::RasterTooLarge {
                edge,
                max: u64::from(MAX_RASTER_EDGE),
            })
    }

    /// A raster filled with one colour.
    pub fn filled(geometry: &Geometry, scale: u32, color: Rgb) -> Result<Self, ConfigError> {
        let edge = Self::edge(geometry, scale)? as usize;
        Ok(Self {
            cells: (edge / scale as usize) as u32,
            scale,
            pixels: vec![color; edge * edge],
        })
    }

    /// The shared placeholder drawn for every clean page.
    pub fn clean(geometry: &Geometry, scale: u32) -> Result<Self, ConfigError> {
        Self::filled(geometry, scale, palette::CLEAN_PAGE_COLOR)
    }

    /// Draw `page` of `heap`.
    ///
    /// Blocks whose chunk index does not resolve are left as background.
    pub fn render(
        heap: &Heap,
        page: &Page,
        geometry: &Geometry,
        scale: u32,
    ) -> Result<Self, ConfigError> {
        let mut raster = Self::filled(geometry, scale, palette::PAGE_BG_COLOR)?;
        let capacity = raster.cells * raster.cells;
        for (i, block) in page.blocks().iter().enumerate() {
            let Ok(index) = u32::try_from(i) else { break };
            if index >= capacity {
                break;
            }
            if let Some(chunk) = heap.chunk_of(block) {
                raster.fill_cell(index % raster.cells, index / raster.cells, palette::block_color(chunk));
            }
        }
        Ok(raster)
    }

    fn fill_cell(&mut self, cx: u32, cy: u32, color: Rgb) {
        let edge = self.width() as usize;
        let scale = self.scale as usize;
        let (x0, y0) = (cx as usize * scale, cy as usize * scale);
        for y in y0..y0 + scale {
            let row = y * edge;
            self.pixels[row + x0..row + x0 + scale].fill(color);
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.cells * self.scale
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.width()
    }

    /// Pixels per block edge.
    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Pixel at `(x, y)`, `None` outside the raster.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        self.pixels
            .get(y as usize * self.width() as usize + x as usize)
            .copied()
    }

    /// All pixels, row-major.
    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    /// Pixels as packed `RGB8` bytes, row-major.
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|p| p.to_array()).collect()
    }
}
