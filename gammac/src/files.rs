//! The database of loaded source files, addressed by [`FileId`].
//!
//! This is a variant of `codespan_reporting::files::SimpleFiles` that hands
//! out non-zero `u32` ids, so that ids can be stored compactly in tokens and
//! diagnostics.

use std::fmt;
use std::num::NonZeroU32;
use std::ops::Range;

use codespan_reporting::files::{Error, SimpleFile};

use crate::source::ProgramSource;

/// File id.
// - Use `u32` over `usize` because 4 billion files should be enough for anyone
// - `NonZeroU32` keeps `Option<FileId>` the same size as `FileId`
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct FileId(NonZeroU32);

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl TryFrom<u32> for FileId {
    type Error = <NonZeroU32 as TryFrom<u32>>::Error;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        let id = NonZeroU32::try_from(value)?;
        Ok(Self(id))
    }
}

impl From<FileId> for usize {
    fn from(value: FileId) -> Self {
        value.0.get() as Self
    }
}

/// Source files loaded by the driver, kept alive so that diagnostics can
/// quote them.
pub struct Files {
    files: Vec<SimpleFile<String, ProgramSource>>,
}

impl Files {
    /// Create a new files database.
    pub fn new() -> Self {
        Self { files: Vec::new() }
    }

    /// Add a file to the database, returning the handle that can be used to
    /// refer to it again.
    pub fn add(&mut self, name: String, source: ProgramSource) -> FileId {
        self.files.push(SimpleFile::new(name, source));
        // Ids start at one, so the length after pushing is the new id.
        let len = u32::try_from(self.files.len())
            .expect("Too many files (maximum amount of files is `u32::MAX`)");
        FileId(NonZeroU32::new(len).expect("length is non-zero after a push"))
    }

    /// Get the file corresponding to the given id.
    pub fn get(&self, file_id: FileId) -> Result<&SimpleFile<String, ProgramSource>, Error> {
        let index = usize::from(file_id) - 1;
        self.files.get(index).ok_or(Error::FileMissing)
    }
}

impl Default for Files {
    fn default() -> Self {
        Files::new()
    }
}

impl<'a> codespan_reporting::files::Files<'a> for Files {
    type FileId = FileId;
    type Name = &'a str;
    type Source = &'a str;

    fn name(&'a self, file_id: FileId) -> Result<&'a str, Error> {
        Ok(self.get(file_id)?.name().as_str())
    }

    fn source(&'a self, file_id: FileId) -> Result<&'a str, Error> {
        Ok(self.get(file_id)?.source().as_ref())
    }

    fn line_index(&'a self, file_id: FileId, byte_index: usize) -> Result<usize, Error> {
        self.get(file_id)?.line_index((), byte_index)
    }

    fn line_range(&'a self, file_id: FileId, line_index: usize) -> Result<Range<usize>, Error> {
        self.get(file_id)?.line_range((), line_index)
    }
}
