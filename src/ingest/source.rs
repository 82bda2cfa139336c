use std::fs;
use std::path::{Path, PathBuf};

use crate::ingest::decompress::Compression;
use crate::ingest::error::IngestError;

/// Matches record files by name: `<stem>.<ext>`, optionally followed by a
/// compression suffix the reader knows how to expand.
#[derive(Debug, Clone)]
pub struct RecordFilePattern {
    extension: String,
}

impl RecordFilePattern {
    pub fn new(extension: &str) -> Self {
        Self {
            extension: extension.trim_start_matches('.').to_string(),
        }
    }

    pub fn matches(&self, file_name: &str) -> bool {
        let uncompressed = Compression::strip_suffix(file_name);
        match uncompressed.rsplit_once('.') {
            Some((stem, ext)) => !stem.is_empty() && ext == self.extension,
            None => false,
        }
    }
}

/// Lists the record files under `root` in the order they are processed.
///
/// A file given directly is returned as-is whatever its name. Directories are
/// walked depth-first, children in name order, using an explicit stack.
/// Symlinked directories are not followed.
pub fn discover(root: &Path, pattern: &RecordFilePattern) -> Result<Vec<PathBuf>, IngestError> {
    if !root.exists() {
        return Err(IngestError::PathNotFound(root.display().to_string()));
    }
    if !root.is_dir() {
        return Ok(vec![root.to_path_buf()]);
    }

    let mut files = Vec::new();
    let mut pending = vec![Entry::Dir(root.to_path_buf())];

    while let Some(entry) = pending.pop() {
        match entry {
            Entry::File(path) => files.push(path),
            Entry::Dir(dir) => {
                let mut children = read_children(&dir, pattern)?;
                children.sort_by(|a, b| a.path().cmp(b.path()));
                pending.extend(children.into_iter().rev());
            }
        }
    }

    Ok(files)
}

enum Entry {
    File(PathBuf),
    Dir(PathBuf),
}

impl Entry {
    fn path(&self) -> &Path {
        match self {
            Entry::File(p) | Entry::Dir(p) => p,
        }
    }
}

fn read_children(dir: &Path, pattern: &RecordFilePattern) -> Result<Vec<Entry>, IngestError> {
    let read_err = |source| IngestError::Read {
        file: dir.display().to_string(),
        source,
    };

    let mut children = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(read_err)?;

        if file_type.is_dir() {
            children.push(Entry::Dir(path));
        } else if file_type.is_file() || (file_type.is_symlink() && path.is_file()) {
            let name = entry.file_name();
            if pattern.matches(&name.to_string_lossy()) {
                children.push(Entry::File(path));
            }
        } else {
            log::debug!("Skipping {}", path.display());
        }
    }
    Ok(children)
}
