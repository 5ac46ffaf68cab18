//! Page and block geometry.

use crate::error::ConfigError;

/// Default page size in bytes; the granularity of dirty tracking.
pub const PAGE_SIZE: u64 = 4096;

/// Default block size in bytes; the granularity of chunk attribution.
pub const BLOCK_SIZE: u64 = 16;

/// Page and block sizes used to cut heaps into pages and blocks.
///
/// Both sizes must be non-zero powers of two with `block_size <= page_size`.
/// Call [`validate`](Geometry::validate) before handing a hand-built
/// geometry to the parser or splitter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Geometry {
    /// Page size in bytes. Default: 4096.
    pub page_size: u64,
    /// Block size in bytes. Default: 16.
    pub block_size: u64,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            page_size: PAGE_SIZE,
            block_size: BLOCK_SIZE,
        }
    }
}

impl Geometry {
    /// Check the size invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_size("page_size", self.page_size)?;
        check_size("block_size", self.block_size)?;
        if self.block_size > self.page_size {
            return Err(ConfigError::BlockLargerThanPage {
                block_size: self.block_size,
                page_size: self.page_size,
            });
        }
        Ok(())
    }

    /// Mask selecting the offset within a page.
    pub fn page_mask(&self) -> u64 {
        self.page_size - 1
    }

    /// Round `addr` down to the base of its page.
    pub fn page_base(&self, addr: u64) -> u64 {
        addr & !self.page_mask()
    }

    /// Nominal number of blocks in a full page.
    pub fn blocks_per_page(&self) -> u64 {
        self.page_size / self.block_size
    }
}

fn check_size(name: &'static str, value: u64) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::ZeroSize { name });
    }
    if !value.is_power_of_two() {
        return Err(ConfigError::NotPowerOfTwo { name, value });
    }
    Ok(())
}
