//! Writing archive files to disk
//!
//! Every file name is resolved lexically against the destination directory
//! and must land strictly inside it. `..` segments are allowed as long as
//! the normalized result stays within the destination, so `a/../b` is fine
//! while `../x` and `a/../../x` are rejected with
//! [`Error::PathTraversal`] before anything touches the filesystem.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::archive::File;
use crate::decoder::Decoder;
use crate::error::{Error, Result};

/// What to do when a file cannot be written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExtractMode {
    /// Stop at the first failure. Files already written stay in place.
    #[default]
    FailFast,
    /// Log the failure, skip the file and keep going.
    BestEffort,
}

/// Configuration for batch extraction
#[derive(Debug, Clone, Default)]
pub struct ExtractConfig {
    pub mode: ExtractMode,
}

impl ExtractConfig {
    pub fn best_effort() -> Self {
        Self {
            mode: ExtractMode::BestEffort,
        }
    }
}

/// A file that could not be written during best-effort extraction
#[derive(Debug)]
pub struct FailedFile {
    /// Name as written in the archive
    pub name: String,
    pub error: Error,
}

/// Outcome of a batch extraction
#[derive(Debug, Default)]
pub struct ExtractReport {
    /// Paths written, in archive order
    pub written: Vec<PathBuf>,
    /// Files skipped in [`ExtractMode::BestEffort`]; always empty in fail-fast
    /// mode
    pub failed: Vec<FailedFile>,
}

impl ExtractReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Writes files under a fixed destination directory.
///
/// The destination is resolved to an absolute, symlink-free path once, when
/// the extractor is opened. Every name is checked against that snapshot.
#[derive(Debug)]
pub struct Extractor {
    anchor: PathBuf,
}

impl Extractor {
    /// Open an existing directory as the extraction root
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let anchor = fs::canonicalize(dir.as_ref())?;
        if !fs::metadata(&anchor)?.is_dir() {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a directory", anchor.display()),
            )));
        }
        log::debug!("extracting into {}", anchor.display());
        Ok(Self { anchor })
    }

    /// The resolved destination directory
    pub fn anchor(&self) -> &Path {
        &self.anchor
    }

    /// Resolve an archive name to the path it would be written to.
    ///
    /// Pure path arithmetic: `.` is dropped, `..` removes the previous
    /// component, and root or drive prefixes in the name are ignored so the
    /// name is always taken relative to the destination.
    pub fn resolve(&self, name: &str) -> Result<PathBuf> {
        let path = join_normalized(&self.anchor, name);
        if is_descendant(&self.anchor, &path) {
            Ok(path)
        } else {
            Err(Error::PathTraversal {
                name: name.to_string(),
                path,
            })
        }
    }

    /// Write one file, creating missing parent directories and replacing any
    /// existing file at the target.
    pub fn write_file(&self, file: &File<'_>) -> Result<PathBuf> {
        let path = self.resolve(&file.name)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, file.data)?;

        log::debug!("extracted '{}' ({} bytes)", file.name, file.data.len());
        Ok(path)
    }

    /// Write files in order, handling failures according to `config`
    pub fn extract_all<'f, 'a: 'f>(
        &self,
        files: impl IntoIterator<Item = &'f File<'a>>,
        config: &ExtractConfig,
    ) -> Result<ExtractReport> {
        let mut report = ExtractReport::default();

        for file in files {
            match self.write_file(file) {
                Ok(path) => report.written.push(path),
                Err(error) => match config.mode {
                    ExtractMode::FailFast => return Err(error),
                    ExtractMode::BestEffort => {
                        log::warn!("skipping '{}': {}", file.name, error);
                        report.failed.push(FailedFile {
                            name: file.name.to_string(),
                            error,
                        });
                    }
                },
            }
        }

        Ok(report)
    }
}

/// Parse `raw` and write its files under `dir`, creating `dir` if it does not
/// exist. Stops at the first failure.
pub fn extract(raw: &[u8], dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;
    let extractor = Extractor::open(dir)?;
    Decoder::parse(raw).map(|file| extractor.write_file(&file)).collect()
}

fn join_normalized(base: &Path, name: &str) -> PathBuf {
    let mut path = base.to_path_buf();
    for component in Path::new(name).components() {
        match component {
            Component::Normal(part) => path.push(part),
            Component::ParentDir => {
                path.pop();
            }
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }
    path
}

/// Strictly below `root`: the root itself does not count.
fn is_descendant(root: &Path, path: &Path) -> bool {
    path != root && path.starts_with(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::Archive;

    fn setup() -> (tempfile::TempDir, PathBuf) {
        let tmp = tempfile::tempdir().unwrap();
        let dest = tmp.path().join("dest");
        fs::create_dir(&dest).unwrap();
        (tmp, dest)
    }

    #[test]
    fn test_extract_accept() {
        let (_tmp, dest) = setup();
        let raw = b"-- foo/bar.txt --\nsetting up the bar\n-- baz/qux.txt --\ncleaning up the qux\n";

        let written = extract(raw, &dest).unwrap();
        assert_eq!(written.len(), 2);
        assert_eq!(fs::read(dest.join("foo/bar.txt")).unwrap(), b"setting up the bar\n");
        assert_eq!(fs::read(dest.join("baz/qux.txt")).unwrap(), b"cleaning up the qux\n");
    }

    #[test]
    fn test_extract_reject_traversal() {
        let (tmp, dest) = setup();
        let extractor = Extractor::open(&dest).unwrap();

        for name in ["../foo", "foo/../../bar", "foo/../bar/../../baz"] {
            let err = extractor.write_file(&File::new(name, b"x\n")).unwrap_err();
            assert!(err.is_path_traversal(), "{name}: {err}");
        }

        assert!(!tmp.path().join("foo").exists());
        assert!(!tmp.path().join("bar").exists());
        assert!(!tmp.path().join("baz").exists());
        assert_eq!(fs::read_dir(&dest).unwrap().count(), 0);
    }

    #[test]
    fn test_extract_dotdot_inside_destination() {
        let (_tmp, dest) = setup();
        let extractor = Extractor::open(&dest).unwrap();

        let path = extractor.write_file(&File::new("a/../b", b"b\n")).unwrap();
        assert_eq!(path, extractor.anchor().join("b"));
        assert_eq!(fs::read(dest.join("b")).unwrap(), b"b\n");
        assert!(!dest.join("a").exists());
    }

    #[test]
    fn test_destination_itself_rejected() {
        let (_tmp, dest) = setup();
        let extractor = Extractor::open(&dest).unwrap();

        for name in [".", "foo/..", "./a/../"] {
            let err = extractor.resolve(name).unwrap_err();
            match err {
                Error::PathTraversal { path, .. } => assert_eq!(path, extractor.anchor()),
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn test_sibling_prefix_rejected() {
        let (tmp, dest) = setup();
        let extractor = Extractor::open(&dest).unwrap();

        // `dest2` shares a textual prefix with `dest` but is not inside it
        let err = extractor.resolve("../dest2/x").unwrap_err();
        assert!(err.is_path_traversal());
        assert!(!tmp.path().join("dest2").exists());
    }

    #[test]
    fn test_absolute_name_stays_inside() {
        let (_tmp, dest) = setup();
        let extractor = Extractor::open(&dest).unwrap();

        let path = extractor.resolve("/etc/passwd").unwrap();
        assert_eq!(path, extractor.anchor().join("etc").join("passwd"));
    }

    #[test]
    fn test_overwrite_and_leave_others() {
        let (_tmp, dest) = setup();
        fs::write(dest.join("keep.txt"), b"untouched").unwrap();
        fs::write(dest.join("f.txt"), b"old contents that are longer").unwrap();

        extract(b"-- f.txt --\nnew\n", &dest).unwrap();

        assert_eq!(fs::read(dest.join("f.txt")).unwrap(), b"new\n");
        assert_eq!(fs::read(dest.join("keep.txt")).unwrap(), b"untouched");
    }

    #[test]
    fn test_fail_fast_stops_batch() {
        let (_tmp, dest) = setup();
        let archive = Archive::parse(b"-- one --\n1\n-- ../escape --\nx\n-- two --\n2\n");
        let extractor = Extractor::open(&dest).unwrap();

        let err = extractor
            .extract_all(&archive.files, &ExtractConfig::default())
            .unwrap_err();
        assert!(err.is_path_traversal());
        assert!(dest.join("one").exists());
        assert!(!dest.join("two").exists());
    }

    #[test]
    fn test_best_effort_continues() {
        let (_tmp, dest) = setup();
        let archive = Archive::parse(b"-- one --\n1\n-- ../escape --\nx\n-- two --\n2\n");
        let extractor = Extractor::open(&dest).unwrap();

        let report = extractor
            .extract_all(&archive.files, &ExtractConfig::best_effort())
            .unwrap();
        assert!(!report.is_complete());
        assert_eq!(report.written.len(), 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].name, "../escape");
        assert!(report.failed[0].error.is_path_traversal());
        assert_eq!(fs::read(dest.join("two")).unwrap(), b"2\n");
    }

    #[test]
    fn test_io_error_passthrough() {
        let (_tmp, dest) = setup();
        let extractor = Extractor::open(&dest).unwrap();

        extractor.write_file(&File::new("plain", b"file\n")).unwrap();
        let err = extractor.write_file(&File::new("plain/child", b"x\n")).unwrap_err();
        assert!(matches!(err, Error::Io(_)), "{err:?}");
    }

    #[test]
    fn test_open_missing_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let err = Extractor::open(tmp.path().join("missing")).unwrap_err();
        match err {
            Error::Io(e) => assert_eq!(e.kind(), io::ErrorKind::NotFound),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_open_file_is_not_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("file");
        fs::write(&file, b"").unwrap();
        assert!(matches!(Extractor::open(&file), Err(Error::Io(_))));
    }

    #[test]
    fn test_extract_creates_missing_destination() {
        let tmp = tempfile::tempdir().unwrap();
        let dest = tmp.path().join("a").join("b");
        extract(b"comment\n-- x --\nx\n", &dest).unwrap();
        assert_eq!(fs::read(dest.join("x")).unwrap(), b"x\n");
    }

    #[test]
    fn test_extract_empty_archive() {
        let (_tmp, dest) = setup();
        assert!(extract(b"only a comment\n", &dest).unwrap().is_empty());
        assert_eq!(fs::read_dir(&dest).unwrap().count(), 0);
    }
}
