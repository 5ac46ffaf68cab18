//! Error types for the layout pass.

use heapvis_core::{ConfigError, HeapId};
use std::error::Error;
use std::fmt;

/// Errors that stop a heap from being laid out.
///
/// Every variant names the heap at fault.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LayoutError {
    /// The splitter was given an invalid geometry.
    Config(ConfigError),
    /// The heap has no chunks, so there is no range to split.
    EmptyHeap {
        /// The offending heap.
        heap: HeapId,
    },
    /// The sweep ran out of chunks before reaching the end of the range.
    ChunksExhausted {
        /// The offending heap.
        heap: HeapId,
        /// Address of the block that had no chunk to belong to.
        addr: u64,
    },
    /// A worker thread panicked while splitting this heap.
    WorkerPanicked {
        /// The heap being split.
        heap: HeapId,
    },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "invalid geometry: {e}"),
            Self::EmptyHeap { heap } => write!(f, "heap {heap} has no chunks"),
            Self::ChunksExhausted { heap, addr } => {
                write!(
                    f,
                    "heap {heap}: ran out of chunks at {addr:#x} before the end of the chunk range"
                )
            }
            Self::WorkerPanicked { heap } => {
                write!(f, "heap {heap}: layout worker panicked")
            }
        }
    }
}

impl Error for LayoutError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for LayoutError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}
