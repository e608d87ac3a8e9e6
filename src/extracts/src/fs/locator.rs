use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use glob::Pattern;
use itertools::Itertools;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Recursive, extension-based file discovery below a submit directory.
///
/// Within a directory, files come before sub-directories and both are visited
/// in file-name order.
#[derive(Debug, Clone)]
pub struct FileLocator {
    root: PathBuf,
}

impl FileLocator {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All files matching `*.extension`, or `name_pattern.extension` when a
    /// pattern is given. Both use shell-glob semantics.
    pub fn find(&self, extension: &str, name_pattern: Option<&str>) -> Vec<PathBuf> {
        let pattern = match name_pattern {
            Some(name) => format!("{}.{}", name, extension),
            None => format!("*.{}", extension),
        };
        let pattern = match Pattern::new(&pattern) {
            Ok(pattern) => pattern,
            Err(e) => {
                warn!("Invalid file pattern {:?}: {}", pattern, e);
                return Vec::new();
            }
        };

        WalkDir::new(&self.root)
            .follow_links(true)
            .sort_by(files_first)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    debug!("Skipping unreadable entry: {}", e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| pattern.matches(&entry.file_name().to_string_lossy()))
            .map(DirEntry::into_path)
            .collect()
    }

    /// Files belonging to one job, ordered by file name wherever they sit in
    /// the tree, so the last one is the latest attempt. The job name is
    /// matched literally.
    pub fn find_for_job(&self, extension: &str, job_name: &str) -> Vec<PathBuf> {
        self.find(extension, Some(&Pattern::escape(job_name)))
            .into_iter()
            .sorted_by(|a, b| a.file_name().cmp(&b.file_name()).then_with(|| a.cmp(b)))
            .collect()
    }

    pub fn find_first(&self, extension: &str) -> Option<PathBuf> {
        self.find(extension, None).into_iter().next()
    }
}

fn files_first(a: &DirEntry, b: &DirEntry) -> Ordering {
    a.file_type()
        .is_dir()
        .cmp(&b.file_type().is_dir())
        .then_with(|| a.file_name().cmp(b.file_name()))
}
