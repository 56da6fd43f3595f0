// src/watch/filter.rs

//! Decides whether a changed path is a source file worth rebuilding for.

use std::fmt;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::config::WatchSection;
use crate::errors::Result;
use crate::watch::path_utils::{relative_str, to_slash};

/// Extension + exclude-glob filter for change events.
///
/// A path is relevant when its extension is one of `extensions` and it is not
/// matched by any `exclude` glob. Globs are evaluated against the path
/// relative to `root` (forward slashes); paths that cannot be related to
/// `root` are matched as given.
#[derive(Clone)]
pub struct SourceFilter {
    root: PathBuf,
    extensions: Vec<String>,
    exclude: Option<GlobSet>,
}

impl fmt::Debug for SourceFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceFilter")
            .field("root", &self.root)
            .field("extensions", &self.extensions)
            .finish_non_exhaustive()
    }
}

impl SourceFilter {
    pub fn new<E, S>(root: impl Into<PathBuf>, extensions: E, exclude: &[String]) -> Result<Self>
    where
        E: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self {
            root: root.into(),
            extensions: extensions
                .into_iter()
                .map(|e| e.into().trim_start_matches('.').to_string())
                .collect(),
            exclude: compile_globs(exclude)?,
        })
    }

    /// Build from a validated `[watch]` section, watching `root`.
    pub fn from_config(root: impl Into<PathBuf>, watch: &WatchSection) -> Result<Self> {
        Self::new(root, watch.extensions.iter().cloned(), &watch.exclude)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    pub fn is_relevant(&self, path: &Path) -> bool {
        let ext_matches = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| self.extensions.iter().any(|want| want == e));

        if !ext_matches {
            return false;
        }

        match &self.exclude {
            Some(set) => {
                let rel = relative_str(&self.root, path).unwrap_or_else(|| to_slash(path));
                !set.is_match(rel.as_str())
            }
            None => true,
        }
    }
}

fn compile_globs(patterns: &[String]) -> Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }

    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(Some(builder.build()?))
}
