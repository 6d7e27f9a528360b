// crates/formsmith-cli/src/output.rs
// ============================================================================
// Module: CLI File I/O
// Description: Size-limited reads and atomic writes for CLI artifacts.
// Purpose: Keep partial files and oversized inputs out of the workflow.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Inputs are read with a hard byte cap. Outputs are written to a sibling
//! temporary file and renamed into place, so readers never observe a partial
//! artifact.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::fs::File;
use std::fs::OpenOptions;
use std::io;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Attempts made to allocate a unique temporary file.
const TEMP_ATTEMPTS: usize = 16;
/// Per-process counter for temporary file names.
static TEMP_COUNTER: AtomicUsize = AtomicUsize::new(0);

// ============================================================================
// SECTION: Reads
// ============================================================================

/// Errors from [`read_bytes_with_limit`].
#[derive(Debug, Error)]
pub enum ReadLimitError {
    /// File could not be read.
    #[error("{0}")]
    Io(#[from] io::Error),
    /// File exceeds the limit.
    #[error("input is {size} bytes (limit {limit})")]
    TooLarge {
        /// Observed size in bytes.
        size: u64,
        /// Configured limit in bytes.
        limit: usize,
    },
}

/// Reads a file, refusing anything larger than `max_bytes`.
///
/// # Errors
///
/// Returns [`ReadLimitError`] on I/O failure or when the file is too large.
pub fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let file = File::open(path)?;
    let size = file.metadata()?.len();
    let limit = u64::try_from(max_bytes).unwrap_or(u64::MAX);
    if size > limit {
        return Err(ReadLimitError::TooLarge {
            size,
            limit: max_bytes,
        });
    }
    let mut bytes = Vec::new();
    file.take(limit.saturating_add(1)).read_to_end(&mut bytes)?;
    if bytes.len() > max_bytes {
        return Err(ReadLimitError::TooLarge {
            size: u64::try_from(bytes.len()).unwrap_or(u64::MAX),
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

// ============================================================================
// SECTION: Writes
// ============================================================================

/// Writes `bytes` to `path` via a temporary file and rename.
///
/// # Errors
///
/// Returns an I/O error when the temporary file cannot be created, written,
/// or moved into place. The temporary file is removed on failure.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let (temp_path, mut file) = create_temp_output(path)?;
    let written = file.write_all(bytes).and_then(|()| file.sync_all());
    drop(file);
    if let Err(err) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(err);
    }
    persist_temp_output(&temp_path, path)
}

/// Creates a unique temporary output file alongside the destination.
fn create_temp_output(path: &Path) -> io::Result<(PathBuf, File)> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file_name = path.file_name().and_then(|name| name.to_str()).ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "output path does not include a file name")
    })?;
    for _ in 0 .. TEMP_ATTEMPTS {
        let attempt = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        let temp_path = parent.join(format!(".{file_name}.tmp.{}.{attempt}", std::process::id()));
        match OpenOptions::new().write(true).create_new(true).open(&temp_path) {
            Ok(file) => return Ok((temp_path, file)),
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {}
            Err(err) => return Err(err),
        }
    }
    Err(io::Error::other("failed to allocate temporary output path"))
}

/// Moves the temporary output file to the final destination.
fn persist_temp_output(temp_path: &Path, path: &Path) -> io::Result<()> {
    match fs::rename(temp_path, path) {
        Ok(()) => Ok(()),
        Err(err) => {
            if path.exists() {
                fs::remove_file(path)?;
                return fs::rename(temp_path, path);
            }
            let _ = fs::remove_file(temp_path);
            Err(err)
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, reason = "Test-only assertions.")]

    use super::*;

    #[test]
    fn atomic_write_replaces_and_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("form.html");
        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"second");
        let names: Vec<_> = fs::read_dir(dir.path()).unwrap().map(|entry| entry.unwrap().file_name()).collect();
        assert_eq!(names.len(), 1);
    }

    #[test]
    fn atomic_write_requires_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let err = write_atomic(&dir.path().join(".."), b"x").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn read_limit_is_enforced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.json");
        fs::write(&path, b"0123456789").unwrap();
        assert_eq!(read_bytes_with_limit(&path, 10).unwrap().len(), 10);
        assert!(matches!(
            read_bytes_with_limit(&path, 9),
            Err(ReadLimitError::TooLarge { size: 10, limit: 9 })
        ));
        assert!(matches!(read_bytes_with_limit(&dir.path().join("absent"), 9), Err(ReadLimitError::Io(_))));
    }
}
