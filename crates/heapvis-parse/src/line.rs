//! Single-line classification.
//!
//! [`LogLine::classify`] recognises the three line shapes of a heap dump.
//! Shape detection is keyword based; once a line has the shape of a heap,
//! chunk or pages-in-use line its numeric fields *must* parse.

use crate::error::ParseError;
use heapvis_core::ChunkKind;
use smallvec::SmallVec;
use std::fmt;

const PAGES_IN_USE_PREFIX: &str = "Pages in use for ";

/// Chunk markers in the order they are tried.
const CHUNK_MARKERS: [&str; 3] = ["(top)", "(fence)", "[free]"];

/// Shape of a recognised line, used in error reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineKind {
    /// `Heap <addr> size <n> ...`
    HeapStart,
    /// `chunk <addr> size <n> bytes <marker> <preview>`
    Chunk,
    /// `Pages in use for 0x<start>-0x<end>: <bits>`
    PagesInUse,
}

impl fmt::Display for LineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::HeapStart => "heap-start",
            Self::Chunk => "chunk",
            Self::PagesInUse => "pages-in-use",
        };
        f.write_str(name)
    }
}

/// One classified log line, borrowing text fields from the input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogLine<'a> {
    /// Start of a new heap.
    HeapStart {
        /// Heap base address.
        addr: u64,
        /// Declared heap size in bytes.
        size: u64,
    },
    /// One chunk of the current heap.
    Chunk {
        /// Chunk start address.
        addr: u64,
        /// Chunk size in bytes.
        size: u64,
        /// Classification from the marker.
        kind: ChunkKind,
        /// Preview text, `None` when blank.
        preview: Option<&'a str>,
    },
    /// Residency bits for `[start, end)`, one character per page.
    PagesInUse {
        /// First page address.
        start: u64,
        /// End of the covered range (exclusive).
        end: u64,
        /// Leading run of `0`, `1` and `?` characters.
        usage: &'a str,
    },
    /// A pages-in-use line whose residency query failed, e.g. `ERROR (Cannot allocate memory)`.
    PagesUnavailable {
        /// First page address.
        start: u64,
        /// End of the covered range (exclusive).
        end: u64,
        /// Whatever the hook wrote instead of a bitstring.
        detail: &'a str,
    },
    /// Anything else; ignored.
    Other,
}

impl<'a> LogLine<'a> {
    /// Classify one line. `line_no` is only used for error reports.
    ///
    /// Leading and trailing whitespace is ignored.
    pub fn classify(line_no: usize, raw: &'a str) -> Result<Self, ParseError> {
        let line = raw.trim();
        if let Some(parsed) = heap_start(line_no, line)? {
            return Ok(parsed);
        }
        if let Some(parsed) = chunk(line_no, line)? {
            return Ok(parsed);
        }
        if let Some(parsed) = pages_in_use(line_no, line)? {
            return Ok(parsed);
        }
        Ok(Self::Other)
    }

    /// Shape of this line, `None` for [`LogLine::Other`].
    pub fn kind(&self) -> Option<LineKind> {
        match self {
            Self::HeapStart { .. } => Some(LineKind::HeapStart),
            Self::Chunk { .. } => Some(LineKind::Chunk),
            Self::PagesInUse { .. } | Self::PagesUnavailable { .. } => {
                Some(LineKind::PagesInUse)
            }
            Self::Other => None,
        }
    }
}

fn heap_start(line_no: usize, line: &str) -> Result<Option<LogLine<'static>>, ParseError> {
    let tokens: SmallVec<[&str; 6]> = line.split_whitespace().take(4).collect();
    if tokens.len() < 4
        || !tokens[0].eq_ignore_ascii_case("heap")
        || !tokens[2].eq_ignore_ascii_case("size")
    {
        return Ok(None);
    }
    Ok(Some(LogLine::HeapStart {
        addr: parse_hex(line_no, "addr", tokens[1])?,
        size: parse_dec(line_no, "size", tokens[3])?,
    }))
}

fn chunk(line_no: usize, line: &str) -> Result<Option<LogLine<'_>>, ParseError> {
    let mut rest = line;
    let mut tokens: SmallVec<[&str; 5]> = SmallVec::new();
    while tokens.len() < 5 {
        match next_token(rest) {
            Some((token, tail)) => {
                tokens.push(token);
                rest = tail;
            }
            None => return Ok(None),
        }
    }
    if tokens[0] != "chunk" || tokens[2] != "size" || tokens[4] != "bytes" {
        return Ok(None);
    }
    let addr = parse_hex(line_no, "addr", tokens[1])?;
    let size = parse_dec(line_no, "size", tokens[3])?;

    // A marker only counts in the column right after `bytes`.
    let tail = rest.strip_prefix(char::is_whitespace).unwrap_or(rest);
    let (kind, preview) = match CHUNK_MARKERS.iter().find(|m| tail.starts_with(**m)) {
        Some(marker) => (ChunkKind::from_marker(marker), &tail[marker.len()..]),
        None => (ChunkKind::Used, tail),
    };
    let preview = preview.trim();
    Ok(Some(LogLine::Chunk {
        addr,
        size,
        kind,
        preview: (!preview.is_empty()).then_some(preview),
    }))
}

fn pages_in_use(line_no: usize, line: &str) -> Result<Option<LogLine<'_>>, ParseError> {
    let Some(body) = line.strip_prefix(PAGES_IN_USE_PREFIX) else {
        return Ok(None);
    };
    let Some((range, usage)) = body.split_once(':') else {
        return Ok(None);
    };
    let Some((start, end)) = range.trim().split_once('-') else {
        return Ok(None);
    };
    let start = parse_hex(line_no, "start", start)?;
    let end = parse_hex(line_no, "end", end)?;

    let usage = usage.trim_start();
    let bits_len = usage
        .find(|c| !matches!(c, '0' | '1' | '?'))
        .unwrap_or(usage.len());
    if bits_len == 0 {
        return Ok(Some(LogLine::PagesUnavailable {
            start,
            end,
            detail: usage.trim_end(),
        }));
    }
    Ok(Some(LogLine::PagesInUse {
        start,
        end,
        usage: &usage[..bits_len],
    }))
}

/// Split off the next whitespace-delimited token.
fn next_token(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    if s.is_empty() {
        return None;
    }
    let end = s.find(char::is_whitespace).unwrap_or(s.len());
    Some((&s[..end], &s[end..]))
}

fn parse_hex(line_no: usize, field: &'static str, token: &str) -> Result<u64, ParseError> {
    let digits = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
        .unwrap_or(token);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(format_error(line_no, field, token));
    }
    u64::from_str_radix(digits, 16).map_err(|_| format_error(line_no, field, token))
}

fn parse_dec(line_no: usize, field: &'static str, token: &str) -> Result<u64, ParseError> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format_error(line_no, field, token));
    }
    token
        .parse()
        .map_err(|_| format_error(line_no, field, token))
}

fn format_error(line: usize, field: &'static str, token: &str) -> ParseError {
    ParseError::Format {
        line,
        field,
        token: token.to_owned(),
    }
}
