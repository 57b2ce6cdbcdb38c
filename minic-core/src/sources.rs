use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::error::CoreError;

/// Default extension of minic source files.
pub const DEFAULT_EXTENSION: &str = "mc";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path relative to the directory that was scanned.
    pub path: PathBuf,
    pub contents: String,
}

/// Collect every file under `root` with the given extension, sorted by
/// relative path. Each file is an independent translation unit.
pub fn load_sources(root: impl AsRef<Path>, extension: &str) -> Result<Vec<SourceFile>, CoreError> {
    let root = root.as_ref();
    if !root.exists() {
        return Err(CoreError::MissingSource(root.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).into_iter().filter_map(Result::ok) {
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == extension) {
            let contents = fs::read_to_string(path)?;
            let relative = path.strip_prefix(root).unwrap_or(path).to_path_buf();
            files.push(SourceFile {
                path: relative,
                contents,
            });
        }
    }
    files.sort_by(|a, b| a.path.cmp(&b.path));
    debug!(root = %root.display(), files = files.len(), "loaded sources");
    Ok(files)
}
