//! Parser for allocator heap-dump logs.
//!
//! Turns the text written by the allocator dump hook into [`Heap`]s with
//! their chunks and per-page dirty state. Three line shapes are recognised:
//!
//! ```text
//! Heap  0x7f0000000000 size     135168 bytes:
//! Pages in use for 0x7f0000000000-0x7f0000021000: 110000000000000000000000000000001
//! chunk 0x7f0000000030 size       1040 bytes           hello world0000
//! chunk 0x7f0000000440 size         48 bytes [free]
//! chunk 0x7f0000000470 size     134960 bytes (top)
//! ```
//!
//! Every other line is skipped. Numeric fields that fail to parse abort the
//! whole run with [`ParseError::Format`].
//!
//! # Architecture
//!
//! - [`line`] classifies a single line into a [`LogLine`]
//! - [`HeapLogParser`] folds lines into heaps, tracking the current heap
//!   with an explicit cursor
//! - [`parse_lines`], [`parse_str`] and [`parse_reader`] drive the parser
//!   over a whole log

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod line;
pub mod parser;

pub use error::ParseError;
pub use line::{LineKind, LogLine};
pub use parser::{parse_lines, parse_reader, parse_str, HeapLogParser};

#[doc(no_inline)]
pub use heapvis_core::Heap;
