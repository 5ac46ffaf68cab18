//! Top-level configuration.

use heapvis_core::{ConfigError, Geometry};
use heapvis_render::{PageRaster, MAX_BLOCK_SCALE};

/// Largest accepted layout worker count.
const MAX_LAYOUT_WORKERS: usize = 64;

/// Configuration for a [`Pipeline`](crate::Pipeline).
#[derive(Clone, Debug)]
pub struct VisualizerConfig {
    /// Page and block sizes. Default: 4096 / 16.
    pub geometry: Geometry,
    /// Pixel edge of one block in page images, in `1..=64`. Default: 1.
    pub block_scale: u32,
    /// Threads used to split heaps. `None` = split sequentially on the
    /// calling thread. Explicit values are clamped to `[1, 64]`.
    pub layout_workers: Option<usize>,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            geometry: Geometry::default(),
            block_scale: 1,
            layout_workers: None,
        }
    }
}

impl VisualizerConfig {
    /// Check the geometry, the block scale and the page raster size.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.geometry.validate()?;
        if !(1..=MAX_BLOCK_SCALE).contains(&self.block_scale) {
            return Err(ConfigError::BlockScaleOutOfRange {
                value: self.block_scale,
                max: MAX_BLOCK_SCALE,
            });
        }
        PageRaster::edge(&self.geometry, self.block_scale)?;
        Ok(())
    }

    /// Worker count for the split phase, or `None` for a sequential split.
    pub fn resolved_layout_workers(&self) -> Option<usize> {
        self.layout_workers.map(|n| n.clamp(1, MAX_LAYOUT_WORKERS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_validates() {
        VisualizerConfig::default().validate().unwrap();
    }

    #[test]
    fn block_scale_bounds() {
        let mut config = VisualizerConfig::default();
        config.block_scale = 64;
        assert!(config.validate().is_ok());
        config.block_scale = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::BlockScaleOutOfRange { value: 0, max: 64 })
        ));
        config.block_scale = 65;
        assert!(config.validate().is_err());
    }

    #[test]
    fn bad_geometry_is_rejected() {
        let config = VisualizerConfig {
            geometry: Geometry {
                page_size: 4096,
                block_size: 24,
            },
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotPowerOfTwo { value: 24, .. })
        ));
    }

    #[test]
    fn oversized_raster_is_rejected() {
        let config = VisualizerConfig {
            geometry: Geometry {
                page_size: 1 << 62,
                block_size: 1,
            },
            block_scale: 2,
            ..Default::default()
        };
        assert!(config.geometry.validate().is_ok());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::RasterTooLarge { .. })
        ));
    }

    #[test]
    fn workers_are_clamped() {
        let mut config = VisualizerConfig::default();
        assert_eq!(config.resolved_layout_workers(), None);
        config.layout_workers = Some(0);
        assert_eq!(config.resolved_layout_workers(), Some(1));
        config.layout_workers = Some(1000);
        assert_eq!(config.resolved_layout_workers(), Some(64));
    }
}
