//! Source tree discovery.
//!
//! Walks every source root, skips excluded folders and the target root,
//! and classifies each regular file by extension. Records come back sorted
//! by source path so runs are reproducible.

use std::fs;
use std::path::{Path, PathBuf};

use sieve_diagnostic::{io_error, missing_resource, Result};

use crate::options::Options;
use crate::pattern::FolderPattern;
use crate::record::{FileFlags, FileRecord};

/// Extension sets used to classify files.
#[derive(Clone, Debug, Default)]
pub struct Classifier {
    processed: Vec<String>,
    excluded: Vec<String>,
}

impl Classifier {
    pub fn new(processed: &[String], excluded: &[String]) -> Self {
        Classifier {
            processed: processed.to_vec(),
            excluded: excluded.to_vec(),
        }
    }

    /// Excluded extensions win over processed ones; anything else is
    /// copied.
    pub fn classify(&self, path: &Path) -> FileFlags {
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        if self.excluded.contains(&extension) {
            FileFlags::EXCLUDED
        } else if self.processed.contains(&extension) {
            FileFlags::empty()
        } else {
            FileFlags::COPY_ONLY
        }
    }
}

/// Find and classify every file under the source roots of `options`.
pub fn discover(options: &Options) -> Result<Vec<FileRecord>> {
    let classifier = Classifier::new(&options.extensions, &options.excluded);
    let patterns: Vec<FolderPattern> = options
        .exclude_folders
        .iter()
        .map(|p| FolderPattern::new(p))
        .collect();
    let target = fs::canonicalize(&options.target).ok();

    let mut records = Vec::new();
    for root in options.source_roots() {
        if !root.is_dir() {
            return Err(missing_resource(format!(
                "source root '{}' is not a directory",
                root.display()
            )));
        }
        walk(&root, &patterns, target.as_deref(), |source, relative| {
            let flags = classifier.classify(&source);
            records.push(FileRecord::new(source, relative, flags));
        })?;
    }
    records.sort_by(|a, b| a.source.cmp(&b.source));
    tracing::debug!(files = records.len(), "discovered");
    Ok(records)
}

fn walk(
    root: &Path,
    patterns: &[FolderPattern],
    target: Option<&Path>,
    mut found: impl FnMut(PathBuf, PathBuf),
) -> Result<()> {
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let entries = fs::read_dir(&dir).map_err(|e| io_error("read", &dir, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| io_error("read", &dir, e))?;
            let path = entry.path();
            let file_type = entry.file_type().map_err(|e| io_error("read", &path, e))?;
            let relative = path.strip_prefix(root).unwrap_or(path.as_path()).to_path_buf();

            if file_type.is_dir() {
                if let Some(pattern) = patterns.iter().find(|p| p.matches_path(&relative)) {
                    tracing::debug!(folder = %relative.display(), pattern = pattern.as_str(), "excluded folder");
                    continue;
                }
                if target.is_some_and(|t| fs::canonicalize(&path).is_ok_and(|p| p == t)) {
                    tracing::debug!(folder = %relative.display(), "skipping target root");
                    continue;
                }
                pending.push(path);
            } else if file_type.is_file() {
                found(path, relative);
            } else {
                tracing::trace!(path = %path.display(), "not a regular file");
            }
        }
    }
    Ok(())
}
