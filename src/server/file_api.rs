//! File API for bridge file operations
//!
//! Paths are joined onto the bridge root exactly as the client sent them.
//! There is no sandbox: absolute paths and `..` reach whatever the process
//! can reach.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

/// Directory path fragments `list` never descends into
pub const LIST_SKIP_DIRS: &[&str] = &["node_modules", "dist"];

/// File entry for recursive listing
#[derive(Debug, Clone, PartialEq)]
pub struct FileEntry {
    pub name: String,
    /// Client path joined with the entry's path below it
    pub path: String,
}

/// File API error types
#[derive(Error, Debug)]
pub enum FileApiError {
    #[error("File not found: {0}")]
    NotFound(String),
    #[error("Not a directory: {0}")]
    NotADirectory(String),
    #[error("File is not valid UTF-8: {0}")]
    InvalidUtf8(String),
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("Failed to list {path}: {source}")]
    Walk {
        path: String,
        #[source]
        source: walkdir::Error,
    },
}

fn io_error(path: &str) -> impl FnOnce(io::Error) -> FileApiError + '_ {
    move |e| {
        if e.kind() == io::ErrorKind::NotFound {
            FileApiError::NotFound(path.to_string())
        } else {
            FileApiError::Io {
                path: path.to_string(),
                source: e,
            }
        }
    }
}

/// Read file content as UTF-8 string
pub fn read_file(root: &Path, path: &str) -> Result<String, FileApiError> {
    let file_path = root.join(path);
    debug!("Reading file: {:?}", file_path);

    let bytes = fs::read(&file_path).map_err(io_error(path))?;
    String::from_utf8(bytes).map_err(|_| FileApiError::InvalidUtf8(path.to_string()))
}

/// Overwrite (or create) a file; the parent directory must already exist
pub fn write_file(root: &Path, path: &str, content: &str) -> Result<(), FileApiError> {
    let file_path = root.join(path);
    debug!("Writing file: {:?}", file_path);

    fs::write(&file_path, content).map_err(io_error(path))
}

/// Create a file, creating missing parent directories first
///
/// Directory creation failures are not reported on their own; if the
/// parent really is unusable the write that follows fails instead.
pub fn create_file(root: &Path, path: &str, content: &str) -> Result<(), FileApiError> {
    let file_path = root.join(path);

    if let Some(parent) = file_path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            debug!("create_dir_all({:?}) failed: {}", parent, e);
        }
    }

    debug!("Creating file: {:?}", file_path);
    fs::write(&file_path, content).map_err(io_error(path))
}

/// Remove a single file
pub fn delete_file(root: &Path, path: &str) -> Result<(), FileApiError> {
    let file_path = root.join(path);
    debug!("Deleting file: {:?}", file_path);

    fs::remove_file(&file_path).map_err(io_error(path))
}

/// Path reported to the client for an entry found while walking `dir_path`
fn client_path(base: &Path, dir_path: &Path, entry_path: &Path) -> PathBuf {
    match entry_path.strip_prefix(dir_path) {
        Ok(rel) => base.join(rel),
        Err(_) => entry_path.to_path_buf(),
    }
}

fn is_skipped_dir(path: &Path) -> bool {
    let path_str = path.to_string_lossy();
    LIST_SKIP_DIRS.iter().any(|skip| path_str.contains(skip))
}

/// Recursively list files below `path`
///
/// Depth-first in directory-read order. Directories are traversed but not
/// reported, and a directory whose client path contains one of
/// `LIST_SKIP_DIRS` is not entered at all. Any error aborts the listing.
pub fn list_files(root: &Path, path: &str) -> Result<Vec<FileEntry>, FileApiError> {
    let dir_path = root.join(path);
    debug!("Listing files in: {:?}", dir_path);

    let metadata = fs::metadata(&dir_path).map_err(io_error(path))?;
    if !metadata.is_dir() {
        return Err(FileApiError::NotADirectory(path.to_string()));
    }

    // "." 和 "./site" 上报为 "src/x.ts"、"site/x.ts"
    let base: PathBuf = Path::new(path)
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();
    let walker = WalkDir::new(&dir_path)
        .min_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_entry(|entry| {
            !(entry.file_type().is_dir()
                && is_skipped_dir(&client_path(&base, &dir_path, entry.path())))
        });

    let mut entries = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|source| FileApiError::Walk {
            path: path.to_string(),
            source,
        })?;
        if entry.file_type().is_dir() {
            continue;
        }

        entries.push(FileEntry {
            name: entry.file_name().to_string_lossy().to_string(),
            path: client_path(&base, &dir_path, entry.path())
                .to_string_lossy()
                .to_string(),
        });
    }

    Ok(entries)
}
