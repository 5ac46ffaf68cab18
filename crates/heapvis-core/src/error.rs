//! Configuration errors shared by every heapvis crate.

use std::error::Error;
use std::fmt;

/// Errors detected while validating a [`Geometry`](crate::Geometry) or a
/// renderer setting.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A size parameter is zero.
    ZeroSize {
        /// Which parameter was zero.
        name: &'static str,
    },
    /// A size parameter is not a power of two.
    NotPowerOfTwo {
        /// Which parameter was invalid.
        name: &'static str,
        /// The offending value.
        value: u64,
    },
    /// The block size exceeds the page size.
    BlockLargerThanPage {
        /// Configured block size.
        block_size: u64,
        /// Configured page size.
        page_size: u64,
    },
    /// A renderer block scale is outside its accepted range.
    BlockScaleOutOfRange {
        /// The offending value.
        value: u32,
        /// Largest accepted value.
        max: u32,
    },
    /// A page raster would exceed the largest accepted pixel edge.
    RasterTooLarge {
        /// Requested edge in pixels, saturated at `u64::MAX`.
        edge: u64,
        /// Largest accepted edge in pixels.
        max: u64,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroSize { name } => write!(f, "{name} must be non-zero"),
            Self::NotPowerOfTwo { name, value } => {
                write!(f, "{name} must be a power of two, got {value}")
            }
            Self::BlockLargerThanPage {
                block_size,
                page_size,
            } => {
                write!(
                    f,
                    "block_size {block_size} exceeds page_size {page_size}"
                )
            }
            Self::BlockScaleOutOfRange { value, max } => {
                write!(f, "block_scale must be in 1..={max}, got {value}")
            }
            Self::RasterTooLarge { edge, max } => {
                write!(f, "page raster edge of {edge} pixels exceeds {max}")
            }
        }
    }
}

impl Error for ConfigError {}
