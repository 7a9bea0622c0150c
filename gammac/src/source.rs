//! Types related to source files.

use std::fmt;
use std::ops::{Deref, Range};

use crate::files::FileId;

/// Byte offsets into source files.
pub type BytePos = u32;

/// Line and column of a character in a source file, both starting at 1.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    /// The position of the first character in a file.
    pub const START: Position = Position { line: 1, column: 1 };

    /// The position following a character `ch` found at this position.
    pub fn advance(self, ch: char) -> Position {
        match ch {
            '\n' => Position {
                line: self.line + 1,
                column: 1,
            },
            _ => Position {
                line: self.line,
                column: self.column + 1,
            },
        }
    }
}

impl Default for Position {
    fn default() -> Position {
        Position::START
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Byte ranges in source files.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct FileRange {
    file_id: FileId,
    byte_range: ByteRange,
}

impl fmt::Debug for FileRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FileRange({}, {}..{})",
            self.file_id, self.byte_range.start, self.byte_range.end
        )
    }
}

impl FileRange {
    pub const fn new(file_id: FileId, byte_range: ByteRange) -> Self {
        Self {
            file_id,
            byte_range,
        }
    }

    pub fn file_id(&self) -> FileId {
        self.file_id
    }

    pub const fn byte_range(&self) -> ByteRange {
        self.byte_range
    }

    pub const fn start(&self) -> BytePos {
        self.byte_range.start
    }

    pub const fn end(&self) -> BytePos {
        self.byte_range.end
    }
}

impl From<FileRange> for Range<usize> {
    fn from(file_range: FileRange) -> Self {
        file_range.byte_range.into()
    }
}

#[derive(Copy, Clone, PartialEq, Eq)]
pub struct ByteRange {
    start: BytePos,
    end: BytePos,
}

impl fmt::Debug for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ByteRange({}..{})", self.start, self.end)
    }
}

impl ByteRange {
    pub fn new(start: BytePos, end: BytePos) -> Self {
        Self { start, end }
    }

    pub const fn start(&self) -> BytePos {
        self.start
    }

    pub const fn end(&self) -> BytePos {
        self.end
    }

    pub fn merge(self, other: Self) -> Self {
        Self::new(self.start.min(other.start), self.end.max(other.end))
    }
}

impl From<ByteRange> for Range<usize> {
    fn from(range: ByteRange) -> Self {
        (range.start as usize)..(range.end as usize)
    }
}

/// A smart constructor around `String`, which guarantees its length is <=
/// `u32::MAX`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramSource(String);

pub const MAX_SOURCE_LEN: usize = u32::MAX as usize;

impl Deref for ProgramSource {
    type Target = String;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for ProgramSource {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceTooBig {
    pub actual_len: usize,
}

impl TryFrom<String> for ProgramSource {
    type Error = SourceTooBig;

    fn try_from(string: String) -> Result<Self, Self::Error> {
        if string.len() <= MAX_SOURCE_LEN {
            Ok(Self(string))
        } else {
            Err(SourceTooBig {
                actual_len: string.len(),
            })
        }
    }
}
