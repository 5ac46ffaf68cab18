//! Stateful log parser.
//!
//! [`HeapLogParser`] consumes lines one at a time. The heap that chunk and
//! pages-in-use lines attach to is tracked by an explicit cursor, so a
//! line can never be attributed to a heap other than the most recently
//! started one, and a line with no heap to attach to is an error.

use std::io::BufRead;

use heapvis_core::{Dirty, Geometry, Heap, HeapId};

use crate::error::ParseError;
use crate::line::{LineKind, LogLine};

/// Folds heap-dump lines into [`Heap`]s.
///
/// ```
/// use heapvis_parse::HeapLogParser;
///
/// let mut parser = HeapLogParser::default();
/// parser.feed("Heap 1000 size 8192").unwrap();
/// parser.feed("chunk 1000 size 8192 bytes (top)").unwrap();
/// let heaps = parser.finish();
/// assert_eq!(heaps.len(), 1);
/// assert_eq!(heaps[0].chunks().len(), 1);
/// ```
#[derive(Debug)]
pub struct HeapLogParser {
    geometry: Geometry,
    heaps: Vec<Heap>,
    /// Index into `heaps` of the heap new lines attach to.
    current: Option<usize>,
    lines_seen: usize,
    lines_skipped: usize,
}

impl Default for HeapLogParser {
    fn default() -> Self {
        Self::with_geometry(Geometry::default())
    }
}

impl HeapLogParser {
    /// Create a parser for logs written with the given page geometry.
    ///
    /// Returns `Err(ParseError::Config)` if the geometry is invalid.
    pub fn new(geometry: Geometry) -> Result<Self, ParseError> {
        geometry.validate()?;
        Ok(Self::with_geometry(geometry))
    }

    fn with_geometry(geometry: Geometry) -> Self {
        Self {
            geometry,
            heaps: Vec::new(),
            current: None,
            lines_seen: 0,
            lines_skipped: 0,
        }
    }

    /// Consume the next line of the log.
    pub fn feed(&mut self, line: &str) -> Result<(), ParseError> {
        self.lines_seen += 1;
        let line_no = self.lines_seen;
        match LogLine::classify(line_no, line)? {
            LogLine::HeapStart { addr, size } => {
                let number = HeapId(u32::try_from(self.heaps.len()).unwrap_or(u32::MAX));
                tracing::debug!(heap = %number, addr = format_args!("{addr:#x}"), size, "heap start");
                self.heaps.push(Heap::new(number, addr, size));
                self.current = Some(self.heaps.len() - 1);
            }
            LogLine::Chunk {
                addr,
                size,
                kind,
                preview,
            } => {
                if addr.checked_add(size).is_none() {
                    return Err(ParseError::AddressOverflow {
                        line: line_no,
                        addr,
                        size,
                    });
                }
                let heap = self.current_heap(line_no, LineKind::Chunk)?;
                heap.push_chunk(addr, size, kind, preview.map(str::to_owned));
            }
            LogLine::PagesInUse { start, end, usage } => {
                let page_size = self.geometry.page_size;
                let heap = self.current_heap(line_no, LineKind::PagesInUse)?;
                record_usage(heap, page_size, start, end, usage);
            }
            LogLine::PagesUnavailable { start, end, detail } => {
                let heap = self.current_heap(line_no, LineKind::PagesInUse)?;
                tracing::warn!(
                    heap = %heap.number(),
                    line = line_no,
                    start = format_args!("{start:#x}"),
                    end = format_args!("{end:#x}"),
                    detail,
                    "page residency unavailable; pages stay unknown"
                );
            }
            LogLine::Other => self.lines_skipped += 1,
        }
        Ok(())
    }

    /// Feed every line of `lines`, stopping at the first error.
    pub fn feed_lines<I, S>(&mut self, lines: I) -> Result<(), ParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for line in lines {
            self.feed(line.as_ref())?;
        }
        Ok(())
    }

    /// Feed every line read from `reader`, stopping at the first error.
    ///
    /// Generic over `R: BufRead` so tests can use `&[u8]` and production
    /// code can use `BufReader<File>`.
    pub fn feed_reader<R: BufRead>(&mut self, reader: R) -> Result<(), ParseError> {
        for line in reader.lines() {
            self.feed(&line?)?;
        }
        Ok(())
    }

    /// Number of lines consumed so far.
    pub fn lines_seen(&self) -> usize {
        self.lines_seen
    }

    /// Number of lines that matched no known shape.
    pub fn lines_skipped(&self) -> usize {
        self.lines_skipped
    }

    /// Sort heaps and their chunks by address and return them.
    ///
    /// Heap and chunk numbers keep their parse-order values.
    pub fn finish(self) -> Vec<Heap> {
        let mut heaps = self.heaps;
        heaps.sort_by_key(Heap::addr);
        for heap in &mut heaps {
            heap.sort_chunks();
        }
        tracing::debug!(
            heaps = heaps.len(),
            lines = self.lines_seen,
            skipped = self.lines_skipped,
            "parse finished"
        );
        heaps
    }

    fn current_heap(&mut self, line: usize, kind: LineKind) -> Result<&mut Heap, ParseError> {
        self.current
            .and_then(|i| self.heaps.get_mut(i))
            .ok_or(ParseError::NoCurrentHeap { line, kind })
    }
}

/// Record one dirty entry per page of `[start, end)` that `usage` covers.
///
/// Pages past the end of `usage` are left unrecorded, dropping any earlier
/// record, so they read as unknown.
fn record_usage(heap: &mut Heap, page_size: u64, start: u64, end: u64, usage: &str) {
    let mut addr = start;
    for c in usage.chars() {
        if addr >= end {
            return;
        }
        heap.record_page_dirtiness(addr, Dirty::from_usage_char(c));
        match addr.checked_add(page_size) {
            Some(next) => addr = next,
            None => return,
        }
    }
    if addr < end {
        heap.forget_page_dirtiness(addr..end);
    }
}

/// Parse a whole log given as lines.
pub fn parse_lines<I, S>(lines: I, geometry: Geometry) -> Result<Vec<Heap>, ParseError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut parser = HeapLogParser::new(geometry)?;
    parser.feed_lines(lines)?;
    Ok(parser.finish())
}

/// Parse a whole log held in memory.
pub fn parse_str(text: &str, geometry: Geometry) -> Result<Vec<Heap>, ParseError> {
    parse_lines(text.lines(), geometry)
}

/// Parse a whole log from a buffered reader.
pub fn parse_reader<R: BufRead>(reader: R, geometry: Geometry) -> Result<Vec<Heap>, ParseError> {
    let mut parser = HeapLogParser::new(geometry)?;
    parser.feed_reader(reader)?;
    Ok(parser.finish())
}
