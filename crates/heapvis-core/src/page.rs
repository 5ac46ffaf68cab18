//! Pages and the blocks they are cut into.

use std::fmt;

/// Per-page dirty state recorded by the allocator dump.
///
/// Missing information is [`Dirty::Unknown`], which is *not* the same as
/// clean: [`maybe_dirty`](Dirty::maybe_dirty) rounds it up to dirty.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Dirty {
    /// The page is resident (`'1'` in the usage bitstring).
    Dirty,
    /// The page is not resident (`'0'`).
    Clean,
    /// No usable information for this page.
    #[default]
    Unknown,
}

impl Dirty {
    /// Classify one character of a pages-in-use bitstring.
    pub fn from_usage_char(c: char) -> Self {
        match c {
            '1' => Self::Dirty,
            '0' => Self::Clean,
            _ => Self::Unknown,
        }
    }

    /// `true` unless the page is known to be clean.
    pub fn maybe_dirty(self) -> bool {
        self != Self::Clean
    }

    /// The tristate as `Some(true)`, `Some(false)` or `None`.
    pub fn as_bool(self) -> Option<bool> {
        match self {
            Self::Dirty => Some(true),
            Self::Clean => Some(false),
            Self::Unknown => None,
        }
    }
}

impl From<Option<bool>> for Dirty {
    fn from(v: Option<bool>) -> Self {
        match v {
            Some(true) => Self::Dirty,
            Some(false) => Self::Clean,
            None => Self::Unknown,
        }
    }
}

impl fmt::Display for Dirty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Dirty => "dirty",
            Self::Clean => "clean",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// A fixed-size slice of a page, attributed to exactly one chunk.
///
/// `chunk` is the index of the owning chunk in
/// [`Heap::chunks`](crate::Heap::chunks), a non-owning back-reference.
/// Resolve it with [`Heap::chunk_of`](crate::Heap::chunk_of).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Block {
    addr: u64,
    number: u32,
    chunk: usize,
    end_of_chunk: bool,
}

impl Block {
    /// Create a block at `addr`, the `number`-th block of its page.
    pub fn new(addr: u64, number: u32, chunk: usize, end_of_chunk: bool) -> Self {
        Self {
            addr,
            number,
            chunk,
            end_of_chunk,
        }
    }

    /// Start address.
    pub fn addr(&self) -> u64 {
        self.addr
    }

    /// Index within the owning page.
    pub fn number(&self) -> u32 {
        self.number
    }

    /// Index of the owning chunk in the heap's address-sorted chunk list.
    pub fn chunk(&self) -> usize {
        self.chunk
    }

    /// Whether the owning chunk ends inside (or exactly at the end of) this block.
    pub fn end_of_chunk(&self) -> bool {
        self.end_of_chunk
    }
}

/// A page-aligned region of a heap together with its blocks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page {
    addr: u64,
    dirty: Dirty,
    blocks: Vec<Block>,
}

impl Page {
    /// Create an empty page at the page-aligned address `addr`.
    pub fn new(addr: u64, dirty: Dirty) -> Self {
        Self {
            addr,
            dirty,
            blocks: Vec::new(),
        }
    }

    /// Page base address.
    pub fn addr(&self) -> u64 {
        self.addr
    }

    /// Recorded dirty state.
    pub fn dirty(&self) -> Dirty {
        self.dirty
    }

    /// `true` unless the page is known to be clean.
    pub fn maybe_dirty(&self) -> bool {
        self.dirty.maybe_dirty()
    }

    /// Blocks in ascending address order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Append a block. Blocks must be pushed in ascending address order.
    pub fn push_block(&mut self, block: Block) {
        debug_assert!(
            self.blocks.last().is_none_or(|b| b.addr < block.addr),
            "blocks must be pushed in ascending address order"
        );
        self.blocks.push(block);
    }

    /// Number of blocks currently in the page.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }
}
