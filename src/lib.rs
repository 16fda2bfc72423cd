//! # txtar-fs
//!
//! Parsing, canonical formatting and safe extraction of txtar archives.
//!
//! ## Txtar Format
//!
//! A txtar archive is a text format that encodes multiple files:
//!
//! ```text
//! optional comment
//! -- file1.txt --
//! content of file1
//! -- dir/file2.txt --
//! content of file2
//! ```
//!
//! A header is a line of the form `-- NAME --` that starts the buffer or
//! follows a newline. Spaces around the name are ignored and the name must
//! not be empty. Everything before the first header is the comment. There is
//! no escaping and no way to fail: any byte sequence is an archive, possibly
//! one with no files at all.
//!
//! ## Parsing
//!
//! [`Decoder`] walks a buffer lazily and hands out [`File`]s that borrow
//! from it. [`Archive`] collects them into a list; the bytes themselves are
//! still borrowed, so the buffer must outlive the archive.
//!
//! ```
//! use txtar_fs::Archive;
//!
//! let raw = b"notes\n-- a.txt --\nhello\n-- b.txt --\nworld\n";
//! let archive = Archive::parse(raw);
//! assert_eq!(archive.comment, b"notes\n");
//! assert_eq!(archive.names().collect::<Vec<_>>(), ["a.txt", "b.txt"]);
//! assert_eq!(archive.get("b.txt").unwrap().data, b"world\n");
//! ```
//!
//! ## Formatting
//!
//! [`Encoder`] writes the canonical form: unpadded names and a trailing
//! newline on every section. Formatting a parsed archive a second time gives
//! back the same bytes.
//!
//! ## Extraction
//!
//! [`Extractor`] writes files under a destination directory and rejects any
//! name that resolves outside it (or onto it) with
//! [`Error::PathTraversal`]. Names with `..` that stay inside, such as
//! `a/../b`, are allowed.

pub mod archive;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod extractor;
pub mod scanner;

pub use archive::{Archive, File};
pub use decoder::Decoder;
pub use encoder::{format, Encoder};
pub use error::{Error, Result};
pub use extractor::{extract, ExtractConfig, ExtractMode, ExtractReport, Extractor, FailedFile};
pub use scanner::{find_header, Header};
