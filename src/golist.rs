//! Package metadata from `go list`
//!
//! `go list -json` reports `Deps` as the full transitive closure but test
//! imports only one level deep. [`close_test_imports`] widens the test lists
//! with the dependencies of every package they name, so that all three lists
//! can be treated as transitive. Test imports outside the listed patterns are
//! fetched with a second `go list` call first.

use crate::error::SlimError;
use crate::impact::engine::{CGO_PSEUDO_PACKAGE, PackageLocator};
use crate::model::Package;
use crate::util::run_tool;
use anyhow::Result;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Import paths resolved per `go list -find` invocation.
const LOCATE_BATCH: usize = 256;

/// Decode the concatenated JSON objects printed by `go list -json`.
pub fn parse_package_stream(program: &str, output: &[u8]) -> Result<Vec<Package>> {
    let mut packages = Vec::new();
    for item in serde_json::Deserializer::from_slice(output).into_iter::<Package>() {
        let pkg = item.map_err(|err| SlimError::MalformedOutput {
            program: program.to_string(),
            detail: format!("invalid package JSON: {err}"),
        })?;
        packages.push(pkg);
    }
    Ok(packages)
}

/// Extend test and external-test imports with the `Deps` of the packages
/// they name. `unlisted` carries packages the patterns did not match.
pub fn close_test_imports(packages: &mut [Package], unlisted: &[Package]) {
    let deps_by_import: HashMap<String, Vec<String>> = packages
        .iter()
        .chain(unlisted)
        .map(|pkg| (pkg.import_path.clone(), pkg.deps.clone()))
        .collect();

    let widen = |imports: &mut Vec<String>| {
        let mut seen: BTreeSet<String> = imports.iter().cloned().collect();
        let direct = imports.clone();
        for import_path in &direct {
            if let Some(deps) = deps_by_import.get(import_path) {
                for dep in deps {
                    if seen.insert(dep.clone()) {
                        imports.push(dep.clone());
                    }
                }
            }
        }
    };

    for pkg in packages.iter_mut() {
        widen(&mut pkg.test_imports);
        widen(&mut pkg.xtest_imports);
    }
}

/// Runs the go toolchain in a fixed working directory.
#[derive(Debug, Clone)]
pub struct GoTool {
    program: String,
    dir: PathBuf,
}

impl GoTool {
    pub fn new(program: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            dir: dir.into(),
        }
    }

    /// Packages matching `patterns`, with closed test-import lists.
    pub fn list(&self, patterns: &[String]) -> Result<Vec<Package>> {
        let mut args = vec!["list".to_string(), "-json".to_string()];
        args.extend(patterns.iter().cloned());
        let output = run_tool(&self.program, &args, &self.dir)?;
        let mut packages = parse_package_stream(&self.program, &output)?;
        let unlisted = self.unlisted_test_imports(&packages)?;
        close_test_imports(&mut packages, &unlisted);
        tracing::debug!(
            "go list returned {} packages, {} more reached from tests",
            packages.len(),
            unlisted.len()
        );
        Ok(packages)
    }

    /// Packages named by test imports that the patterns did not match, each
    /// with its own transitive `Deps`.
    fn unlisted_test_imports(&self, packages: &[Package]) -> Result<Vec<Package>> {
        let listed: HashSet<&str> = packages
            .iter()
            .map(|pkg| pkg.import_path.as_str())
            .collect();
        let wanted: Vec<String> = packages
            .iter()
            .flat_map(|pkg| pkg.test_imports.iter().chain(&pkg.xtest_imports))
            .filter(|import_path| {
                import_path.as_str() != CGO_PSEUDO_PACKAGE
                    && !listed.contains(import_path.as_str())
            })
            .cloned()
            .collect::<BTreeSet<String>>()
            .into_iter()
            .collect();

        let mut unlisted = Vec::new();
        for chunk in wanted.chunks(LOCATE_BATCH) {
            let mut args = vec!["list".to_string(), "-e".to_string(), "-json".to_string()];
            args.extend(chunk.iter().cloned());
            let output = run_tool(&self.program, &args, &self.dir)?;
            unlisted.extend(parse_package_stream(&self.program, &output)?);
        }
        Ok(unlisted)
    }

    /// Build a locator for every import path the packages depend on.
    pub fn locator(&self, packages: &[Package]) -> Result<GoLocator> {
        let mut locator = GoLocator::from_packages(packages);
        let missing: Vec<String> = packages
            .iter()
            .flat_map(|pkg| pkg.dependency_lists())
            .flat_map(|(_, imports)| imports.iter())
            .filter(|import_path| {
                import_path.as_str() != CGO_PSEUDO_PACKAGE
                    && !locator.dirs.contains_key(*import_path)
            })
            .cloned()
            .collect::<BTreeSet<String>>()
            .into_iter()
            .collect();

        for chunk in missing.chunks(LOCATE_BATCH) {
            let mut args = vec![
                "list".to_string(),
                "-e".to_string(),
                "-find".to_string(),
                "-f".to_string(),
                "{{.ImportPath}}\t{{.Dir}}\t{{if .Error}}{{.Error.Err}}{{end}}".to_string(),
            ];
            args.extend(chunk.iter().cloned());
            let output = run_tool(&self.program, &args, &self.dir)?;
            locator.absorb_find_output(&String::from_utf8_lossy(&output));
        }
        tracing::debug!("resolved {} import paths", locator.dirs.len());

        Ok(locator)
    }
}

/// Import path to directory index built from `go list` output.
#[derive(Debug, Clone, Default)]
pub struct GoLocator {
    dirs: HashMap<String, PathBuf>,
    failures: HashMap<String, String>,
}

impl GoLocator {
    pub fn from_packages(packages: &[Package]) -> Self {
        let dirs = packages
            .iter()
            .map(|pkg| (pkg.import_path.clone(), pkg.dir.clone()))
            .collect();
        Self {
            dirs,
            failures: HashMap::new(),
        }
    }

    /// Record lines of `ImportPath<TAB>Dir<TAB>Error`.
    pub fn absorb_find_output(&mut self, output: &str) {
        for line in output.lines() {
            let mut fields = line.splitn(3, '\t');
            let import_path = fields.next().unwrap_or_default().trim();
            let dir = fields.next().unwrap_or_default().trim();
            let error = fields.next().unwrap_or_default().trim();
            if import_path.is_empty() {
                continue;
            }
            if dir.is_empty() {
                let reason = if error.is_empty() {
                    "no directory reported".to_string()
                } else {
                    error.to_string()
                };
                self.failures.insert(import_path.to_string(), reason);
            } else {
                self.dirs
                    .insert(import_path.to_string(), Path::new(dir).to_path_buf());
            }
        }
    }
}

impl PackageLocator for GoLocator {
    fn locate(&self, import_path: &str) -> Result<PathBuf> {
        if let Some(dir) = self.dirs.get(import_path) {
            return Ok(dir.clone());
        }
        let reason = self
            .failures
            .get(import_path)
            .cloned()
            .unwrap_or_else(|| "not reported by go list".to_string());
        Err(SlimError::Unresolved {
            import_path: import_path.to_string(),
            reason,
        }
        .into())
    }
}
