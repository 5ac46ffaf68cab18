//! Block colours.
//!
//! Adjacent chunks are told apart by cycling through four shades, keyed on
//! the chunk's parse-order number.

use heapvis_core::Chunk;
use std::fmt;

/// An opaque RGB colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Build a colour from its components.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self(r, g, b)
    }

    /// Components as a byte array.
    pub const fn to_array(self) -> [u8; 3] {
        [self.0, self.1, self.2]
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// Shades for blocks of used chunks.
pub const USED_BLOCK_COLORS: [Rgb; 4] = [
    Rgb::new(0xff, 0, 0),
    Rgb::new(0xf0, 0, 0),
    Rgb::new(0xe1, 0, 0),
    Rgb::new(0xd2, 0, 0),
];

/// Shades for blocks of free, fence and top chunks.
pub const FREE_BLOCK_COLORS: [Rgb; 4] = [
    Rgb::new(0xce, 0xce, 0xce),
    Rgb::new(0xbf, 0xbf, 0xbf),
    Rgb::new(0xb0, 0xb0, 0xb0),
    Rgb::new(0xa1, 0xa1, 0xa1),
];

/// Background of a page image where no block is drawn.
pub const PAGE_BG_COLOR: Rgb = Rgb::new(0x77, 0x77, 0x77);

/// Fill colour of the clean-page placeholder.
pub const CLEAN_PAGE_COLOR: Rgb = Rgb::new(0xff, 0xff, 0xff);

/// Colour of a block owned by `chunk`.
pub fn block_color(chunk: &Chunk) -> Rgb {
    let shade = chunk.number().0 as usize % USED_BLOCK_COLORS.len();
    if chunk.is_used() {
        USED_BLOCK_COLORS[shade]
    } else {
        FREE_BLOCK_COLORS[shade]
    }
}
