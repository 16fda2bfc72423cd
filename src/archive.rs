//! Archive data structures

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use crate::decoder::Decoder;
use crate::error::Result;
use crate::extractor::{ExtractConfig, ExtractReport, Extractor};
use crate::scanner;

/// A single file section of an archive.
///
/// `data` borrows from the buffer the archive was parsed from; nothing is
/// copied. The name is taken as written (after trimming) and is not
/// sanitized here, so it may contain `..` segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File<'a> {
    /// Name of the file (may include subdirectories)
    pub name: Cow<'a, str>,
    /// Contents of the file
    pub data: &'a [u8],
}

impl<'a> File<'a> {
    /// Create a file from a name and borrowed contents.
    pub fn new(name: impl Into<Cow<'a, str>>, data: &'a [u8]) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    /// Whether the contents end with a newline. Empty contents do not.
    pub fn ends_with_newline(&self) -> bool {
        self.data.ends_with(b"\n")
    }

    /// Check if the contents contain a line that would be read back as a
    /// header. Such a file is split in two when the archive is formatted and
    /// parsed again.
    pub fn has_marker_conflict(&self) -> bool {
        scanner::find_header(self.data, 0).is_some()
    }

    /// Check if the name can be written as a header line and read back
    /// unchanged.
    pub fn has_canonical_name(&self) -> bool {
        !self.name.is_empty()
            && !self.name.contains('\n')
            && !self.name.starts_with(' ')
            && !self.name.ends_with(' ')
    }
}

/// A fully decoded txtar archive.
///
/// Owns the list of files, not the bytes: the comment and every file's
/// contents borrow from the source buffer, which must outlive the archive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Archive<'a> {
    /// Bytes before the first header (the whole input if there is none)
    pub comment: &'a [u8],
    /// Files in the archive, in the order they appear
    pub files: Vec<File<'a>>,
}

impl<'a> Archive<'a> {
    /// Create an empty archive
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an archive with a comment
    pub fn with_comment(comment: &'a [u8]) -> Self {
        Self {
            comment,
            files: Vec::new(),
        }
    }

    /// Parse `raw` into an archive. Never fails on content; every byte
    /// sequence is a valid archive.
    pub fn parse(raw: &'a [u8]) -> Self {
        let decoder = Decoder::parse(raw);
        let comment = decoder.comment();
        let files = decoder.collect();
        Self { comment, files }
    }

    /// Like [`Archive::parse`], but reports allocation failure instead of
    /// aborting. Either the whole archive is returned or nothing is.
    pub fn try_parse(raw: &'a [u8]) -> Result<Self> {
        let decoder = Decoder::parse(raw);
        let comment = decoder.comment();
        let mut files = Vec::new();
        for file in decoder {
            files.try_reserve(1)?;
            files.push(file);
        }
        Ok(Self { comment, files })
    }

    /// Append a file
    pub fn add_file(&mut self, file: File<'a>) {
        self.files.push(file);
    }

    /// First file with the given name
    pub fn get(&self, name: &str) -> Option<&File<'a>> {
        self.files.iter().find(|f| f.name == name)
    }

    /// File names in archive order
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.files.iter().map(|f| f.name.as_ref())
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Format the archive in canonical txtar form
    pub fn to_bytes(&self) -> Vec<u8> {
        crate::encoder::format(self.comment, &self.files)
    }

    /// Write every file under `dir`, creating it if needed. Stops at the
    /// first failure; returns the written paths in archive order.
    pub fn extract(&self, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
        let report = self.extract_with(dir, &ExtractConfig::default())?;
        Ok(report.written)
    }

    /// Write every file under `dir` using the given configuration.
    pub fn extract_with(&self, dir: impl AsRef<Path>, config: &ExtractConfig) -> Result<ExtractReport> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        Extractor::open(dir)?.extract_all(&self.files, config)
    }
}

impl<'a> IntoIterator for Archive<'a> {
    type Item = File<'a>;
    type IntoIter = std::vec::IntoIter<File<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.into_iter()
    }
}

impl<'a, 'b> IntoIterator for &'b Archive<'a> {
    type Item = &'b File<'a>;
    type IntoIter = std::slice::Iter<'b, File<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}
