use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Local directories already created during one mirror run.
#[derive(Debug, Default)]
pub struct DirectoryCache {
    created: HashSet<PathBuf>,
}

impl DirectoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates `dir` and its parents unless this run already did.
    ///
    /// Returns `true` if the directory was created (or found) now, `false`
    /// if it was already in the cache.
    pub fn ensure(&mut self, dir: &Path) -> io::Result<bool> {
        if self.created.contains(dir) {
            return Ok(false);
        }
        fs::create_dir_all(dir)?;
        self.created.insert(dir.to_path_buf());
        Ok(true)
    }

    pub fn contains(&self, dir: &Path) -> bool {
        self.created.contains(dir)
    }

    pub fn len(&self) -> usize {
        self.created.len()
    }

    pub fn is_empty(&self) -> bool {
        self.created.is_empty()
    }
}
