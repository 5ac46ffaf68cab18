//! Unified error type for the pipeline.

use std::error::Error as StdError;
use std::fmt;
use std::io;

use heapvis_core::ConfigError;
use heapvis_layout::LayoutError;
use heapvis_parse::ParseError;
use heapvis_render::RenderError;

/// Any failure of a [`Pipeline`](crate::Pipeline) phase.
#[derive(Debug)]
pub enum Error {
    /// Invalid configuration.
    Config(ConfigError),
    /// The log could not be read or contained a malformed value.
    Parse(ParseError),
    /// A heap could not be split.
    Layout(LayoutError),
    /// Writing the report or an image failed.
    Io(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "configuration error: {e}"),
            Self::Parse(e) => write!(f, "parse error: {e}"),
            Self::Layout(e) => write!(f, "layout error: {e}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Parse(e) => Some(e),
            Self::Layout(e) => Some(e),
            Self::Io(e) => Some(e),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        match e {
            ParseError::Config(e) => Self::Config(e),
            other => Self::Parse(other),
        }
    }
}

impl From<LayoutError> for Error {
    fn from(e: LayoutError) -> Self {
        match e {
            LayoutError::Config(e) => Self::Config(e),
            other => Self::Layout(other),
        }
    }
}

impl From<RenderError> for Error {
    fn from(e: RenderError) -> Self {
        match e {
            RenderError::Io(e) => Self::Io(e),
            RenderError::Config(e) => Self::Config(e),
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}
