//! Header line recognition
//!
//! A header line looks like `-- NAME --` and must start at offset 0 or right
//! after a `\n`. There is no escaping, so anything that fails the test below
//! is plain file content. Scanning is a single forward pass: after a rejected
//! candidate the search resumes at the next line, which keeps the total work
//! linear in the buffer length.

use std::borrow::Cow;
use std::ops::Range;

// Txtar format constants
pub const MARKER_PREFIX: &[u8] = b"-- ";
pub const MARKER_SUFFIX: &[u8] = b" --";
pub const MARKER_PREFIX_LEN: usize = 3; // len("-- ")
pub const MARKER_SUFFIX_LEN: usize = 3; // len(" --")
/// Shortest possible header line, `-- x --`.
pub const MIN_MARKER_LEN: usize = MARKER_PREFIX_LEN + 1 + MARKER_SUFFIX_LEN;

const NEWLINE_MARKER: &[u8] = b"\n-- ";

/// A recognized header line inside a buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header<'a> {
    /// File name with surrounding spaces removed. Never empty.
    pub name: Cow<'a, str>,
    /// Offset of the leading `-` of the header line.
    pub header_offset: usize,
    /// First byte after the header line's newline, or the buffer length when
    /// the header is the last line and has no newline.
    pub body_offset: usize,
}

impl Header<'_> {
    /// Byte range of the header line as written, newline included.
    pub fn marker_range(&self) -> Range<usize> {
        self.header_offset..self.body_offset
    }
}

/// Find the next header line at or after `start`.
///
/// `start` is expected to be a line start (0, or just past a `\n`); offsets
/// past the end of `raw` simply find nothing. Never fails: a buffer without
/// any header yields `None`.
pub fn find_header(raw: &[u8], start: usize) -> Option<Header<'_>> {
    let mut line_start = start.min(raw.len());

    loop {
        if !raw[line_start..].starts_with(MARKER_PREFIX) {
            line_start = next_marker_line(raw, line_start)?;
        }

        let line_end = raw[line_start..]
            .iter()
            .position(|&b| b == b'\n')
            .map_or(raw.len(), |i| line_start + i);

        if let Some(name) = marker_name(&raw[line_start..line_end]) {
            let header = Header {
                name: String::from_utf8_lossy(name),
                header_offset: line_start,
                body_offset: (line_end + 1).min(raw.len()),
            };
            log::trace!("header '{}' at {}", header.name, header.header_offset);
            return Some(header);
        }

        if line_end >= raw.len() {
            return None;
        }
        line_start = line_end + 1;
    }
}

/// Extract the trimmed name from a single line (without its newline), if the
/// line is a header.
pub fn marker_name(line: &[u8]) -> Option<&[u8]> {
    if line.len() < MIN_MARKER_LEN
        || !line.starts_with(MARKER_PREFIX)
        || !line.ends_with(MARKER_SUFFIX)
    {
        return None;
    }

    let name = trim_spaces(&line[MARKER_PREFIX_LEN..line.len() - MARKER_SUFFIX_LEN]);
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Offset of the `-- ` following the next `\n` at or after `from`.
fn next_marker_line(raw: &[u8], from: usize) -> Option<usize> {
    raw[from..]
        .windows(NEWLINE_MARKER.len())
        .position(|w| w == NEWLINE_MARKER)
        .map(|i| from + i + 1)
}

fn trim_spaces(mut s: &[u8]) -> &[u8] {
    while let [b' ', rest @ ..] = s {
        s = rest;
    }
    while let [rest @ .., b' '] = s {
        s = rest;
    }
    s
}
