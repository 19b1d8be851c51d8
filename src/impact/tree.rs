//! Directory probes against the working tree.
//!
//! A directory that cannot be listed is treated as empty: it has neither
//! test files nor buildable files. Deleted and moved packages are routine.

use crate::impact::types::Conventions;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct ProjectTree {
    root: PathBuf,
    conventions: Conventions,
}

impl ProjectTree {
    pub fn new(root: impl Into<PathBuf>, conventions: Conventions) -> Self {
        Self {
            root: root.into(),
            conventions,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn conventions(&self) -> &Conventions {
        &self.conventions
    }

    fn file_names(&self, dir: &str) -> Option<Vec<String>> {
        let abs = if dir == "." {
            self.root.clone()
        } else {
            self.root.join(dir)
        };
        let entries = match fs::read_dir(&abs) {
            Ok(entries) => entries,
            Err(err) => {
                tracing::debug!("cannot list {}: {}", abs.display(), err);
                return None;
            }
        };
        let names = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| !t.is_dir()).unwrap_or(false))
            .map(|entry| entry.file_name().to_string_lossy().to_string())
            .collect();
        Some(names)
    }

    /// Whether `dir` holds at least one visible test file.
    pub fn has_test_files(&self, dir: &str) -> bool {
        self.file_names(dir).is_some_and(|names| {
            names.iter().any(|name| {
                self.conventions.is_test_file(name) && !Conventions::is_invisible(name)
            })
        })
    }

    /// Whether `dir` exists and holds at least one source file.
    pub fn has_source_files(&self, dir: &str) -> bool {
        self.file_names(dir)
            .is_some_and(|names| names.iter().any(|name| self.conventions.is_source_file(name)))
    }

    /// Keep only directories that can be built and tested.
    pub fn retain_buildable(&self, dirs: &BTreeSet<String>) -> BTreeSet<String> {
        dirs.iter()
            .filter(|dir| {
                let keep = self.has_source_files(dir);
                if !keep {
                    tracing::debug!("dropping {}: no buildable files", dir);
                }
                keep
            })
            .cloned()
            .collect()
    }
}
