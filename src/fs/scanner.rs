//! Source tree traversal
//!
//! Streams every file under the source root to a visitor as it is found.
//! Unreadable directories are logged and skipped; the rest of the tree is
//! still visited.

use crate::error::{Result, SortError};
use crate::logging::RunLog;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Counters gathered during a walk
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkStats {
    /// Files handed to the visitor
    pub files_found: u64,
    /// Directories that could not be read
    pub branch_errors: u64,
}

/// Recursive walker over the source root
#[derive(Debug, Clone)]
pub struct TreeWalker {
    root: PathBuf,
    skip: Option<PathBuf>,
}

impl TreeWalker {
    /// Walk everything under `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            skip: None,
        }
    }

    /// Do not descend into `dir` if it lies inside the source tree
    ///
    /// Used for an output root nested in the source, so that copies made
    /// during the run are never picked up again. Has no effect when either
    /// path cannot be resolved or `dir` is outside the tree.
    pub fn skipping(mut self, dir: &Path) -> Self {
        self.skip = nested_path(&self.root, dir);
        self
    }

    /// The directory that will be pruned, if any
    pub fn skipped_dir(&self) -> Option<&Path> {
        self.skip.as_deref()
    }

    /// Visit every file under the root
    ///
    /// The visitor may stop the walk by returning an error, which is passed
    /// back to the caller. Traversal errors are not: they are logged,
    /// counted, and the affected branch is dropped.
    pub fn walk<F>(&self, log: &RunLog, mut visit: F) -> Result<WalkStats>
    where
        F: FnMut(PathBuf) -> Result<()>,
    {
        let mut stats = WalkStats::default();
        let skip = self.skip.as_deref();

        let walker = WalkDir::new(&self.root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| !is_skipped(entry, skip, log));

        for entry in walker {
            match entry {
                Ok(entry) => {
                    if !is_sortable(&entry) {
                        continue;
                    }
                    stats.files_found += 1;
                    visit(entry.into_path())?;
                }
                Err(err) => {
                    stats.branch_errors += 1;
                    log.branch_failed(&SortError::walk(&err, &self.root));
                }
            }
        }

        Ok(stats)
    }

    /// Collect every file path under the root
    pub fn collect(&self, log: &RunLog) -> Result<(Vec<PathBuf>, WalkStats)> {
        let mut files = Vec::new();
        let stats = self.walk(log, |path| {
            files.push(path);
            Ok(())
        })?;
        Ok((files, stats))
    }
}

fn is_skipped(entry: &DirEntry, skip: Option<&Path>, log: &RunLog) -> bool {
    match skip {
        Some(dir) if entry.depth() > 0 && entry.file_type().is_dir() && entry.path() == dir => {
            log.skipped_output(dir);
            true
        }
        _ => false,
    }
}

/// Directories are traversed, not copied. Links to directories are neither
/// followed nor copied; any other link (including a dangling one) is passed
/// on and the copier deals with it.
fn is_sortable(entry: &DirEntry) -> bool {
    let file_type = entry.file_type();
    if file_type.is_dir() {
        return false;
    }
    if file_type.is_symlink() {
        return !std::fs::metadata(entry.path())
            .map(|m| m.is_dir())
            .unwrap_or(false);
    }
    true
}

/// `dir` spelled relative to `root`'s own spelling, if it lies inside it
fn nested_path(root: &Path, dir: &Path) -> Option<PathBuf> {
    let root_real = root.canonicalize().ok()?;
    let dir_real = dir.canonicalize().ok()?;
    let relative = dir_real.strip_prefix(&root_real).ok()?;
    if relative.as_os_str().is_empty() {
        return None;
    }
    Some(root.join(relative))
}
