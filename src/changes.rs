//! Changed-file listing from git
//!
//! Turns a comparison specifier into the set of changed paths, relative to
//! the repository root.
//!
//! ## Specifier forms
//!
//! - `""` - everything pending in the working tree, including untracked files
//!   (`git status --porcelain`)
//! - `<rev>` - `git diff --name-only <rev>` plus untracked files
//! - `<rev> <rev>`, `<rev>..<rev>`, `<rev>...<rev>` - exactly the diff between
//!   the revisions; untracked files are not included
//!
//! Renames are reported as the old path plus the new path.

use crate::error::SlimError;
use crate::util::{clean_slash_path, run_tool};
use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Parsed comparison specifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffSpec {
    /// Everything currently pending.
    Pending,
    /// Diff against one revision, plus untracked files.
    Revision(String),
    /// Explicit range; each part is passed to git as its own argument.
    Range(Vec<String>),
}

impl DiffSpec {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() {
            DiffSpec::Pending
        } else if raw.contains([' ', '.']) {
            DiffSpec::Range(raw.split_whitespace().map(str::to_string).collect())
        } else {
            DiffSpec::Revision(raw.to_string())
        }
    }

    pub fn includes_untracked(&self) -> bool {
        !matches!(self, DiffSpec::Range(_))
    }
}

/// Distinct changed paths, root-relative with forward slashes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    paths: BTreeSet<String>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a path; empty entries are dropped.
    pub fn insert(&mut self, path: &str) -> bool {
        let path = path.trim_end_matches(['\r', '\n']);
        if path.is_empty() {
            return false;
        }
        self.paths.insert(clean_slash_path(path))
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Paths in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }

    pub fn to_sorted_vec(&self) -> Vec<String> {
        self.paths.iter().cloned().collect()
    }
}

impl<S: AsRef<str>> FromIterator<S> for ChangeSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = ChangeSet::new();
        set.extend(iter);
        set
    }
}

impl<S: AsRef<str>> Extend<S> for ChangeSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for path in iter {
            self.insert(path.as_ref());
        }
    }
}

fn decode(program: &str, output: Vec<u8>) -> Result<String> {
    String::from_utf8(output).map_err(|err| {
        SlimError::MalformedOutput {
            program: program.to_string(),
            detail: format!("non UTF-8 path list: {err}"),
        }
        .into()
    })
}

/// Parse NUL-separated `git diff --name-only -z` output.
pub fn parse_name_list(output: &str) -> Vec<String> {
    output
        .split('\0')
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse `git status --porcelain -z` output.
///
/// Each entry is `XY PATH`; renames and copies are followed by an extra
/// entry holding the original path. A rename yields both paths.
pub fn parse_status(output: &str, untracked_only: bool) -> Result<Vec<String>> {
    let mut names = Vec::new();
    let mut entries = output.split('\0').filter(|entry| !entry.is_empty());

    while let Some(entry) = entries.next() {
        if entry.len() < 4 || !entry.is_char_boundary(2) || entry.as_bytes()[2] != b' ' {
            anyhow::bail!("malformed git status entry: {:?}", entry);
        }
        let (status, path) = (&entry[..2], &entry[3..]);
        let renamed = status.contains('R');
        let original = if renamed || status.contains('C') {
            Some(
                entries
                    .next()
                    .with_context(|| format!("missing original path for {:?}", entry))?,
            )
        } else {
            None
        };

        if untracked_only && status != "??" {
            continue;
        }
        if renamed {
            if let Some(original) = original {
                names.push(original.to_string());
            }
        }
        names.push(path.to_string());
    }

    Ok(names)
}

/// Thin wrapper around the git executable, bound to a directory.
#[derive(Debug, Clone)]
pub struct Git {
    program: String,
    dir: PathBuf,
}

impl Git {
    pub fn new(program: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            dir: dir.into(),
        }
    }

    fn run(&self, args: &[&str]) -> Result<String> {
        let args: Vec<String> = args.iter().map(|arg| arg.to_string()).collect();
        let output = run_tool(&self.program, &args, &self.dir)?;
        decode(&self.program, output)
    }

    /// Top-level directory of the work tree.
    pub fn toplevel(&self) -> Result<PathBuf> {
        let out = self.run(&["rev-parse", "--show-toplevel"])?;
        let top = out.trim();
        if top.is_empty() {
            return Err(SlimError::MalformedOutput {
                program: self.program.clone(),
                detail: "empty output from rev-parse --show-toplevel".to_string(),
            }
            .into());
        }
        Ok(PathBuf::from(top))
    }

    /// Paths reported by `git status`, optionally only untracked ones.
    pub fn status(&self, untracked_only: bool) -> Result<Vec<String>> {
        let out = self.run(&["status", "--porcelain", "-z", "--untracked-files=all"])?;
        parse_status(&out, untracked_only).context("Failed to parse git status")
    }

    /// Paths differing between the given revisions (or the work tree).
    pub fn diff_names(&self, revisions: &[String]) -> Result<Vec<String>> {
        let mut args = vec!["diff", "--name-only", "-z", "--no-renames"];
        args.extend(revisions.iter().map(String::as_str));
        args.push("--");
        let out = self.run(&args)?;
        Ok(parse_name_list(&out))
    }

    /// Changed paths for a specifier.
    ///
    /// With `include_staged`, a single-revision diff also picks up every
    /// pending status entry instead of only untracked files.
    pub fn changes(&self, spec: &DiffSpec, include_staged: bool) -> Result<ChangeSet> {
        let mut changes = ChangeSet::new();
        match spec {
            DiffSpec::Pending => {}
            DiffSpec::Revision(rev) => {
                changes.extend(self.diff_names(std::slice::from_ref(rev))?);
            }
            DiffSpec::Range(revs) => changes.extend(self.diff_names(revs)?),
        }
        if spec.includes_untracked() {
            let untracked_only = *spec != DiffSpec::Pending && !include_staged;
            changes.extend(self.status(untracked_only)?);
        }
        tracing::debug!("{} changed paths for {:?}", changes.len(), spec);
        Ok(changes)
    }
}
