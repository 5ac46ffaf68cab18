//! Error types for log parsing.

use crate::line::LineKind;
use heapvis_core::ConfigError;
use std::fmt;
use std::io;

/// Errors that abort a parse. No partial heap list is returned alongside.
#[derive(Debug)]
pub enum ParseError {
    /// Reading the log source failed.
    Io(io::Error),
    /// The parser was given an invalid geometry.
    Config(ConfigError),
    /// A recognised line carried a malformed hex or decimal field.
    Format {
        /// 1-based line number.
        line: usize,
        /// Which field failed (`"addr"`, `"size"`, `"start"`, `"end"`).
        field: &'static str,
        /// The offending token.
        token: String,
    },
    /// A chunk ends past the top of the address space.
    AddressOverflow {
        /// 1-based line number.
        line: usize,
        /// Chunk start address.
        addr: u64,
        /// Chunk size.
        size: u64,
    },
    /// A chunk or pages-in-use line appeared before any heap-start line.
    NoCurrentHeap {
        /// 1-based line number.
        line: usize,
        /// Shape of the orphaned line.
        kind: LineKind,
    },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Config(e) => write!(f, "invalid geometry: {e}"),
            Self::Format { line, field, token } => {
                write!(f, "line {line}: malformed {field} {token:?}")
            }
            Self::AddressOverflow { line, addr, size } => {
                write!(
                    f,
                    "line {line}: chunk at {addr:#x} with size {size} overflows the address space"
                )
            }
            Self::NoCurrentHeap { line, kind } => {
                write!(f, "line {line}: {kind} line before any heap-start line")
            }
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ParseError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<ConfigError> for ParseError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}
