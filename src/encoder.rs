//! Txtar archive encoder
//!
//! Output is canonical: header names are written without padding and every
//! section ends with a newline. Formatting is therefore not byte-exact. The
//! only change to parsed content is a newline appended to a comment or file
//! that lacked one, so parsing the output and formatting it again reproduces
//! the output exactly.

use std::io::{self, Write};
use std::path::Path;

use crate::archive::{Archive, File};
use crate::scanner::{MARKER_PREFIX, MARKER_SUFFIX};

/// Writes txtar sections to a sink
pub struct Encoder<W: Write> {
    writer: W,
}

impl<W: Write> Encoder<W> {
    /// Start an archive, writing the comment if there is one.
    ///
    /// A missing newline at the end of the comment is added. An empty comment
    /// writes nothing at all.
    pub fn begin(mut writer: W, comment: Option<&[u8]>) -> io::Result<Self> {
        if let Some(comment) = comment.filter(|c| !c.is_empty()) {
            writer.write_all(comment)?;
            if !comment.ends_with(b"\n") {
                writer.write_all(b"\n")?;
            }
        }
        Ok(Self { writer })
    }

    /// Write one file section
    pub fn write_file(&mut self, file: &File<'_>) -> io::Result<()> {
        if !file.has_canonical_name() {
            log::warn!("file name {:?} will not be read back unchanged", file.name);
        }
        if file.has_marker_conflict() {
            log::warn!(
                "contents of '{}' contain a header line and will be split when parsed",
                file.name
            );
        }

        // Write file header
        self.writer.write_all(MARKER_PREFIX)?;
        self.writer.write_all(file.name.as_bytes())?;
        self.writer.write_all(MARKER_SUFFIX)?;
        self.writer.write_all(b"\n")?;

        // Write file content
        self.writer.write_all(file.data)?;

        // Ensure trailing newline
        if !file.ends_with_newline() {
            self.writer.write_all(b"\n")?;
        }

        Ok(())
    }

    /// Write every file of an archive in order
    pub fn write_files<'f, 'a: 'f>(
        &mut self,
        files: impl IntoIterator<Item = &'f File<'a>>,
    ) -> io::Result<()> {
        for file in files {
            self.write_file(file)?;
        }
        Ok(())
    }

    /// Flush and hand back the sink
    pub fn finish(mut self) -> io::Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }

    /// Encode a whole archive to a writer
    pub fn write_archive(writer: W, archive: &Archive<'_>) -> io::Result<W> {
        let mut encoder = Self::begin(writer, Some(archive.comment))?;
        encoder.write_files(&archive.files)?;
        encoder.finish()
    }
}

/// Format a comment and files into a new buffer
pub fn format<'f, 'a: 'f>(
    comment: &[u8],
    files: impl IntoIterator<Item = &'f File<'a>>,
) -> Vec<u8> {
    let mut out = Vec::new();
    // Writing into a Vec cannot fail
    let _ = Encoder::begin(&mut out, Some(comment))
        .and_then(|mut encoder| encoder.write_files(files));
    out
}

/// Encode an archive to a file, replacing it if it exists
pub fn encode_to_file(archive: &Archive<'_>, path: &Path) -> io::Result<()> {
    let file = std::fs::File::create(path)?;
    let writer = Encoder::write_archive(io::BufWriter::new(file), archive)?;
    writer.into_inner().map_err(io::IntoInnerError::into_error)?;
    Ok(())
}
