//! End-to-end run: git changes + go packages -> impacted directories.

use crate::changes::{ChangeSet, DiffSpec, Git};
use crate::config::Config;
use crate::golist::GoTool;
use crate::impact::{ImpactEngine, PackageLocator, ProjectTree};
use crate::model::{Package, Report};
use crate::util::resolve_path;
use anyhow::{Context, Result};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    /// Working directory for git and go.
    pub repo: PathBuf,
    /// Comparison specifier, see [`DiffSpec`].
    pub diff: String,
    /// Package patterns forwarded to `go list`.
    pub patterns: Vec<String>,
    pub config: Config,
}

impl AnalyzeOptions {
    pub fn new(repo: impl Into<PathBuf>, diff: impl Into<String>, config: Config) -> Self {
        Self {
            repo: repo.into(),
            diff: diff.into(),
            patterns: Vec::new(),
            config,
        }
    }

    pub fn with_patterns(mut self, patterns: Vec<String>) -> Self {
        self.patterns = patterns;
        self
    }
}

/// Compute the report from already collected inputs.
pub fn analyze_with(
    changes: &ChangeSet,
    packages: &[Package],
    locator: &dyn PackageLocator,
    tree: &ProjectTree,
) -> Result<Report> {
    let engine = ImpactEngine::new(tree, locator);
    let (sets, impacted) = engine.analyze(changes, packages)?;
    Ok(Report {
        changed: changes.to_sorted_vec(),
        altered: sets.altered().iter().cloned().collect(),
        impacted,
    })
}

/// Run every stage against the real tools.
pub fn analyze(options: &AnalyzeOptions) -> Result<Report> {
    let config = &options.config;

    let root = Git::new(&config.git_bin, &options.repo)
        .toplevel()
        .context("Failed to locate repository root")?;
    let root = resolve_path(&root);
    tracing::debug!("project root: {}", root.display());

    let git = Git::new(&config.git_bin, &root);
    let spec = DiffSpec::parse(&options.diff);
    let changes = git
        .changes(&spec, config.include_staged)
        .context("Failed to list changed files")?;
    tracing::debug!("changed: {:?}", changes.to_sorted_vec());

    let go = GoTool::new(&config.go_bin, &options.repo);
    let packages = go
        .list(&options.patterns)
        .context("Failed to list packages")?;
    let locator = go
        .locator(&packages)
        .context("Failed to locate package dependencies")?;

    let tree = ProjectTree::new(root, config.conventions());
    analyze_with(&changes, &packages, &locator, &tree)
}
