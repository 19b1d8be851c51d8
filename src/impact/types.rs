//! Value types threaded through classification and reachability.

use serde::Serialize;
use std::collections::BTreeSet;

/// File-naming conventions of the toolchain being analyzed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conventions {
    /// Suffix of buildable source files, e.g. `.go`.
    pub source_suffix: String,
    /// Suffix of test files, e.g. `_test.go`.
    pub test_suffix: String,
    /// Name of fixture directories, e.g. `testdata`.
    pub fixture_dir: String,
}

impl Default for Conventions {
    fn default() -> Self {
        Self {
            source_suffix: ".go".to_string(),
            test_suffix: "_test.go".to_string(),
            fixture_dir: "testdata".to_string(),
        }
    }
}

impl Conventions {
    pub fn is_test_file(&self, name: &str) -> bool {
        name.ends_with(&self.test_suffix)
    }

    pub fn is_source_file(&self, name: &str) -> bool {
        name.ends_with(&self.source_suffix)
    }

    /// Names the toolchain never looks at.
    pub fn is_invisible(name: &str) -> bool {
        name.starts_with('.') || name.starts_with('_')
    }
}

/// Altered and impacted directories of a single run.
///
/// Every altered directory is also impacted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImpactSets {
    altered: BTreeSet<String>,
    impacted: BTreeSet<String>,
}

impl ImpactSets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_impacted(&mut self, dir: &str) {
        if !self.impacted.contains(dir) {
            self.impacted.insert(dir.to_string());
        }
    }

    pub fn mark_altered(&mut self, dir: &str) {
        if !self.altered.contains(dir) {
            self.altered.insert(dir.to_string());
        }
        self.mark_impacted(dir);
    }

    pub fn is_altered(&self, dir: &str) -> bool {
        self.altered.contains(dir)
    }

    pub fn is_impacted(&self, dir: &str) -> bool {
        self.impacted.contains(dir)
    }

    pub fn altered(&self) -> &BTreeSet<String> {
        &self.altered
    }

    pub fn impacted(&self) -> &BTreeSet<String> {
        &self.impacted
    }
}
