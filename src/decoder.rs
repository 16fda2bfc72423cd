//! Txtar archive decoder
//!
//! [`Decoder`] walks a buffer lazily, one file per call to `next`, without
//! copying or allocating (names that are not valid UTF-8 are the exception,
//! they are decoded lossily).

use std::iter::FusedIterator;

use crate::archive::File;
use crate::scanner::{find_header, Header};

/// Lazily decodes the files of a txtar buffer.
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    raw: &'a [u8],
    comment: &'a [u8],
    /// Header of the next file to yield; `None` once exhausted.
    cursor: Option<Header<'a>>,
}

impl<'a> Decoder<'a> {
    /// Start decoding `raw`. Finds the first header and fixes the comment.
    pub fn parse(raw: &'a [u8]) -> Self {
        let cursor = find_header(raw, 0);
        let comment_end = cursor.as_ref().map_or(raw.len(), |h| h.header_offset);
        Self {
            raw,
            comment: &raw[..comment_end],
            cursor,
        }
    }

    /// Bytes before the first header, or the whole buffer if there is none
    pub fn comment(&self) -> &'a [u8] {
        self.comment
    }

    /// The buffer being decoded
    pub fn raw(&self) -> &'a [u8] {
        self.raw
    }

    /// Header of the file the next call to `next` will return
    pub fn peek_header(&self) -> Option<&Header<'a>> {
        self.cursor.as_ref()
    }
}

impl<'a> Iterator for Decoder<'a> {
    type Item = File<'a>;

    fn next(&mut self) -> Option<File<'a>> {
        let current = self.cursor.take()?;
        self.cursor = find_header(self.raw, current.body_offset);

        let body_end = self
            .cursor
            .as_ref()
            .map_or(self.raw.len(), |h| h.header_offset);

        Some(File {
            name: current.name,
            data: &self.raw[current.body_offset..body_end],
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.cursor.is_none() {
            return (0, Some(0));
        }
        // A header line is at least `-- x --`
        let rest = self.raw.len() - self.cursor.as_ref().map_or(0, |h| h.header_offset);
        (1, Some(rest / crate::scanner::MIN_MARKER_LEN + 1))
    }
}

impl FusedIterator for Decoder<'_> {}
