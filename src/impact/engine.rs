//! Dependency reachability over the package list.
//!
//! The package lister already hands over transitive dependency lists, so
//! reachability is a membership test per package rather than a graph walk:
//! a package is impacted when its own directory or any directory in one of
//! its three dependency lists was altered.

use crate::changes::ChangeSet;
use crate::impact::classify::classify_changes;
use crate::impact::tree::ProjectTree;
use crate::impact::types::ImpactSets;
use crate::error::SlimError;
use crate::model::Package;
use crate::util::{project_rel_path, resolve_path};
use anyhow::Result;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

/// Import path of the cgo pseudo-package; it has no directory.
pub const CGO_PSEUDO_PACKAGE: &str = "C";

/// Resolves an import path to the directory holding that package.
///
/// A failed lookup is an error, never a skipped dependency.
pub trait PackageLocator {
    fn locate(&self, import_path: &str) -> Result<PathBuf>;
}

impl PackageLocator for HashMap<String, PathBuf> {
    fn locate(&self, import_path: &str) -> Result<PathBuf> {
        self.get(import_path).cloned().ok_or_else(|| {
            SlimError::Unresolved {
                import_path: import_path.to_string(),
                reason: "not in package index".to_string(),
            }
            .into()
        })
    }
}

/// Grow `sets` by every package that depends on an altered directory.
///
/// Packages are examined in order; each either short-circuits on its own
/// directory or on the first altered dependency. Resolution failures abort,
/// and so does a listed package that does not live under `root`.
/// Dependencies outside the root (standard library, module cache) can never
/// be altered and are passed over.
pub fn propagate(
    mut sets: ImpactSets,
    packages: &[Package],
    locator: &dyn PackageLocator,
    root: &Path,
) -> Result<ImpactSets> {
    let root = resolve_path(root);
    for pkg in packages {
        let dir = project_rel_path(&root, &pkg.dir).ok_or_else(|| SlimError::OutsideRoot {
            import_path: pkg.import_path.clone(),
            dir: pkg.dir.clone(),
            root: root.clone(),
        })?;

        if sets.is_altered(&dir) {
            sets.mark_impacted(&dir);
            continue;
        }

        if let Some((list, dep)) = first_altered_dependency(pkg, &sets, locator, &root)? {
            tracing::debug!("{} impacted via {} ({})", dir, dep, list);
            sets.mark_impacted(&dir);
        }
    }
    Ok(sets)
}

fn first_altered_dependency<'p>(
    pkg: &'p Package,
    sets: &ImpactSets,
    locator: &dyn PackageLocator,
    root: &Path,
) -> Result<Option<(&'static str, &'p str)>> {
    for (list, imports) in pkg.dependency_lists() {
        for import_path in imports {
            if import_path == CGO_PSEUDO_PACKAGE {
                continue;
            }
            let located = locator.locate(import_path)?;
            let Some(dep_dir) = project_rel_path(root, &located) else {
                continue;
            };
            if sets.is_altered(&dep_dir) {
                return Ok(Some((list, import_path.as_str())));
            }
        }
    }
    Ok(None)
}

/// Classification, reachability and pruning bound to one working tree.
pub struct ImpactEngine<'a> {
    tree: &'a ProjectTree,
    locator: &'a dyn PackageLocator,
}

impl<'a> ImpactEngine<'a> {
    pub fn new(tree: &'a ProjectTree, locator: &'a dyn PackageLocator) -> Self {
        Self { tree, locator }
    }

    /// Seed the sets from the changed paths alone.
    pub fn seed(&self, changes: &ChangeSet) -> ImpactSets {
        classify_changes(changes, self.tree)
    }

    /// Fold package reachability into seeded sets.
    pub fn propagate(&self, sets: ImpactSets, packages: &[Package]) -> Result<ImpactSets> {
        propagate(sets, packages, self.locator, self.tree.root())
    }

    /// Impacted directories that still exist and hold buildable files.
    pub fn buildable(&self, sets: &ImpactSets) -> BTreeSet<String> {
        self.tree.retain_buildable(sets.impacted())
    }

    /// Full computation; returns the reachability sets and the final
    /// sorted impacted directories.
    pub fn analyze(
        &self,
        changes: &ChangeSet,
        packages: &[Package],
    ) -> Result<(ImpactSets, Vec<String>)> {
        let seeded = self.seed(changes);
        tracing::debug!("altered: {:?}", seeded.altered());
        let sets = self.propagate(seeded, packages)?;
        tracing::debug!("impacted: {:?}", sets.impacted());
        let buildable: Vec<String> = self.buildable(&sets).into_iter().collect();
        tracing::debug!("buildable impacted: {:?}", buildable);
        Ok((sets, buildable))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(entries: &[(&str, &str)]) -> HashMap<String, PathBuf> {
        entries
            .iter()
            .map(|(import, dir)| (import.to_string(), PathBuf::from(dir)))
            .collect()
    }

    #[test]
    fn altered_package_short_circuits_without_resolving() {
        let root = PathBuf::from("/repo");
        let packages = vec![Package::new("/repo/a", "m/a").with_deps(["m/unknown"])];
        let mut sets = ImpactSets::new();
        sets.mark_altered("a");

        let locator = index(&[]);
        let sets = propagate(sets, &packages, &locator, &root).unwrap();
        assert!(sets.is_impacted("a"));
    }

    #[test]
    fn each_dependency_flavor_propagates() {
        let root = PathBuf::from("/repo");
        let locator = index(&[
            ("m/core", "/repo/core"),
            ("fmt", "/usr/lib/go/src/fmt"),
        ]);
        let packages = vec![
            Package::new("/repo/core", "m/core"),
            Package::new("/repo/via_deps", "m/via_deps").with_deps(["fmt", "m/core"]),
            Package::new("/repo/via_test", "m/via_test").with_test_imports(["m/core"]),
            Package::new("/repo/via_xtest", "m/via_xtest").with_xtest_imports(["m/core"]),
            Package::new("/repo/unrelated", "m/unrelated").with_deps(["fmt"]),
        ];
        let mut sets = ImpactSets::new();
        sets.mark_altered("core");

        let sets = propagate(sets, &packages, &locator, &root).unwrap();
        let impacted: Vec<_> = sets.impacted().iter().map(String::as_str).collect();
        assert_eq!(impacted, vec!["core", "via_deps", "via_test", "via_xtest"]);
        assert_eq!(sets.altered().len(), 1);
    }

    #[test]
    fn unresolvable_dependency_is_fatal() {
        let root = PathBuf::from("/repo");
        let packages = vec![Package::new("/repo/a", "m/a").with_deps(["m/missing"])];
        let mut sets = ImpactSets::new();
        sets.mark_altered("b");

        let err = propagate(sets, &packages, &index(&[]), &root).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SlimError>(),
            Some(SlimError::Unresolved { import_path, .. }) if import_path == "m/missing"
        ));
    }

    #[test]
    fn cgo_pseudo_package_is_never_resolved() {
        let root = PathBuf::from("/repo");
        let packages = vec![Package::new("/repo/a", "m/a").with_deps(["C"])];
        let mut sets = ImpactSets::new();
        sets.mark_altered("b");
        let sets = propagate(sets, &packages, &index(&[]), &root).unwrap();
        assert!(!sets.is_impacted("a"));
    }

    #[test]
    fn test_only_impact_is_kept_when_nothing_propagates() {
        let root = PathBuf::from("/repo");
        let packages = vec![Package::new("/repo/a", "m/a")];
        let mut sets = ImpactSets::new();
        sets.mark_impacted("a");
        let sets = propagate(sets, &packages, &index(&[]), &root).unwrap();
        assert!(sets.is_impacted("a"));
        assert!(!sets.is_altered("a"));
    }

    #[test]
    fn listed_package_outside_root_is_fatal() {
        let root = PathBuf::from("/repo");
        let packages = vec![Package::new("/elsewhere/a", "m/a")];
        let err = propagate(ImpactSets::new(), &packages, &index(&[]), &root).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SlimError>(),
            Some(SlimError::OutsideRoot { import_path, .. }) if import_path == "m/a"
        ));
    }
}
