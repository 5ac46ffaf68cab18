//! End-to-end pipeline: parse, split, render.

use std::io::{BufRead, Write};
use std::time::Instant;

use heapvis_core::Heap;
use heapvis_layout::ChunkSplitter;
use heapvis_parse::HeapLogParser;
use heapvis_render::{HtmlReport, ImageSink};

use crate::config::VisualizerConfig;
use crate::error::Error;

/// Runs the parser, the splitter and the report writer with one
/// validated [`VisualizerConfig`].
#[derive(Clone, Debug)]
pub struct Pipeline {
    config: VisualizerConfig,
    splitter: ChunkSplitter,
}

impl Pipeline {
    /// Validate `config` and build a pipeline.
    pub fn new(config: VisualizerConfig) -> Result<Self, Error> {
        config.validate()?;
        let splitter = ChunkSplitter::new(config.geometry)?;
        Ok(Self { config, splitter })
    }

    /// The configuration this pipeline was built with.
    pub fn config(&self) -> &VisualizerConfig {
        &self.config
    }

    /// Parse log lines and split the resulting heaps.
    ///
    /// Heaps come back sorted by address with their pages populated.
    pub fn analyze_lines<I, S>(&self, lines: I) -> Result<Vec<Heap>, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let start = Instant::now();
        let mut parser = HeapLogParser::new(self.config.geometry)?;
        parser.feed_lines(lines)?;
        self.finish(parser, start)
    }

    /// Like [`analyze_lines`](Self::analyze_lines), reading from `reader`.
    pub fn analyze_reader<R: BufRead>(&self, reader: R) -> Result<Vec<Heap>, Error> {
        let start = Instant::now();
        let mut parser = HeapLogParser::new(self.config.geometry)?;
        parser.feed_reader(reader)?;
        self.finish(parser, start)
    }

    fn finish(&self, parser: HeapLogParser, start: Instant) -> Result<Vec<Heap>, Error> {
        let lines = parser.lines_seen();
        let mut heaps = parser.finish();
        tracing::info!(
            heaps = heaps.len(),
            lines,
            elapsed_us = start.elapsed().as_micros() as u64,
            "parsed heap log"
        );

        let start = Instant::now();
        match self.config.resolved_layout_workers() {
            Some(workers) => self.splitter.perform_parallel(&mut heaps, workers)?,
            None => self.splitter.perform(&mut heaps)?,
        }
        tracing::info!(
            pages = heaps.iter().map(|h| h.pages().len()).sum::<usize>(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "split heaps"
        );
        Ok(heaps)
    }

    /// Write the HTML report for `heaps` to `out` and every page image to
    /// `images`, returning `out`.
    pub fn render<W, S>(&self, heaps: &[Heap], out: W, images: &mut S) -> Result<W, Error>
    where
        W: Write,
        S: ImageSink + ?Sized,
    {
        let start = Instant::now();
        let report = HtmlReport::new(out, self.config.geometry, self.config.block_scale)?;
        let out = report.render(heaps, images)?;
        tracing::info!(
            heaps = heaps.len(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "rendered report"
        );
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heapvis_core::{ChunkKind, Geometry};
    use heapvis_render::MemorySink;
    use heapvis_test_utils::{check_layout, LogBuilder};

    fn three_heaps() -> String {
        LogBuilder::new()
            .contiguous_heap(0x30000, &[(0x800, ChunkKind::Used), (0x1800, ChunkKind::Top)])
            .contiguous_heap(0x10000, &[(0x3000, ChunkKind::Top)])
            .contiguous_heap(0x20000, &[(0x10, ChunkKind::Free), (0xff0, ChunkKind::Top)])
            .pages(0x10000, 0x13000, "1?0")
            .build()
    }

    #[test]
    fn rejects_invalid_config() {
        let config = VisualizerConfig {
            block_scale: 0,
            ..Default::default()
        };
        assert!(matches!(Pipeline::new(config), Err(Error::Config(_))));
    }

    #[test]
    fn rejects_geometry_whose_raster_would_not_fit() {
        let config = VisualizerConfig {
            geometry: Geometry {
                page_size: 1 << 62,
                block_size: 1,
            },
            block_scale: 2,
            ..Default::default()
        };
        assert!(matches!(
            Pipeline::new(config),
            Err(Error::Config(heapvis_core::ConfigError::RasterTooLarge { .. }))
        ));
    }

    #[test]
    fn analyze_sorts_and_splits() {
        let pipeline = Pipeline::new(VisualizerConfig::default()).unwrap();
        let heaps = pipeline.analyze_lines(three_heaps().lines()).unwrap();
        let addrs: Vec<u64> = heaps.iter().map(Heap::addr).collect();
        assert_eq!(addrs, [0x10000, 0x20000, 0x30000]);
        for heap in &heaps {
            check_layout(heap, &Geometry::default()).unwrap();
        }
    }

    #[test]
    fn parallel_matches_sequential() {
        let sequential = Pipeline::new(VisualizerConfig::default())
            .unwrap()
            .analyze_reader(three_heaps().as_bytes())
            .unwrap();
        let parallel = Pipeline::new(VisualizerConfig {
            layout_workers: Some(3),
            ..Default::default()
        })
        .unwrap()
        .analyze_reader(three_heaps().as_bytes())
        .unwrap();
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn render_uses_block_scale() {
        let pipeline = Pipeline::new(VisualizerConfig {
            block_scale: 2,
            ..Default::default()
        })
        .unwrap();
        let heaps = pipeline.analyze_lines(three_heaps().lines()).unwrap();
        let mut images = MemorySink::new();
        pipeline.render(&heaps, Vec::new(), &mut images).unwrap();
        assert_eq!(images.get("page-clean.png").map(|r| r.width()), Some(32));
        assert!(images.get("page-10000.png").is_some());
        assert!(images.get("page-11000.png").is_some());
        assert!(images.get("page-12000.png").is_none());
    }
}
