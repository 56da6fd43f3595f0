// src/watch/hash.rs

//! Content hashing used to drop change events that did not change anything.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use blake3::Hasher;
use tracing::debug;

/// Compute the hash of a single file.
pub fn compute_file_hash(path: &Path) -> Result<String> {
    let mut hasher = Hasher::new();
    let mut file =
        File::open(path).with_context(|| format!("opening file for hashing: {:?}", path))?;
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize().to_hex().to_string())
}

/// In-memory record of the last seen content hash per file.
#[derive(Debug, Default)]
pub struct ContentHashes {
    hashes: HashMap<PathBuf, String>,
}

impl ContentHashes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the current content of `path` and report whether it differs
    /// from what was recorded before.
    ///
    /// A file seen for the first time counts as changed. So does a file that
    /// can no longer be read (removed, renamed away); its entry is dropped.
    pub fn content_changed(&mut self, path: &Path) -> bool {
        let hash = match compute_file_hash(path) {
            Ok(hash) => hash,
            Err(err) => {
                debug!(?path, error = %err, "cannot hash file; treating as changed");
                self.hashes.remove(path);
                return true;
            }
        };

        match self.hashes.get(path) {
            Some(previous) if *previous == hash => {
                debug!(?path, "content unchanged");
                false
            }
            _ => {
                self.hashes.insert(path.to_path_buf(), hash);
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn only_real_content_changes_count() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.go");
        fs::write(&file, "package a\n").unwrap();

        let mut hashes = ContentHashes::new();
        assert!(hashes.content_changed(&file), "first sighting counts as a change");
        assert!(!hashes.content_changed(&file), "same bytes are not a change");

        fs::write(&file, "package a\n\nfunc A() {}\n").unwrap();
        assert!(hashes.content_changed(&file));
    }

    #[test]
    fn removed_file_counts_as_changed() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("gone.go");
        fs::write(&file, "x").unwrap();

        let mut hashes = ContentHashes::new();
        assert!(hashes.content_changed(&file));
        fs::remove_file(&file).unwrap();
        assert!(hashes.content_changed(&file));
    }
}
