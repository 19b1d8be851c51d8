//! Fixture-directory handling.
//!
//! Tests read fixture data from a `testdata` directory next to them or
//! anywhere below one of their ancestors. A change inside such a directory
//! impacts every package on the way up that actually has tests.

use crate::impact::tree::ProjectTree;
use crate::impact::types::ImpactSets;
use crate::util::parent_dir;

/// Whether `dir` lies in the fixture directory at the project root.
pub fn is_root_fixture(dir: &str, fixture_dir: &str) -> bool {
    dir.split('/').next() == Some(fixture_dir)
}

/// Directory directly containing the first non-root fixture segment of `dir`.
///
/// `foo/bar/testdata/x` gives `foo/bar`; `testdata/x` gives `None`.
pub fn fixture_owner<'a>(dir: &'a str, fixture_dir: &str) -> Option<&'a str> {
    let mut offset = 0;
    for (idx, segment) in dir.split('/').enumerate() {
        if idx > 0 && segment == fixture_dir {
            return Some(&dir[..offset - 1]);
        }
        offset += segment.len() + 1;
    }
    None
}

/// Mark `owner` and each of its ancestors below the root as impacted when
/// they hold test files. Directories without tests do not stop the walk.
pub fn bubble_up(owner: &str, tree: &ProjectTree, sets: &mut ImpactSets) {
    let mut current = owner;
    while current != "." && !current.is_empty() {
        if tree.has_test_files(current) {
            tracing::debug!("fixture change impacts {}", current);
            sets.mark_impacted(current);
        }
        current = parent_dir(current);
    }
}

/// The root is impacted by its own fixtures only when it has tests.
pub fn mark_root(tree: &ProjectTree, sets: &mut ImpactSets) {
    if tree.has_test_files(".") {
        sets.mark_impacted(".");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impact::types::Conventions;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn owner_is_parent_of_first_fixture_segment() {
        assert_eq!(fixture_owner("foo/testdata", "testdata"), Some("foo"));
        assert_eq!(fixture_owner("foo/bar/testdata/deep", "testdata"), Some("foo/bar"));
        assert_eq!(
            fixture_owner("a/testdata/b/testdata", "testdata"),
            Some("a")
        );
        assert_eq!(fixture_owner("testdata/foo", "testdata"), None);
        assert_eq!(fixture_owner("foo/testdatax/bar", "testdata"), None);
        assert_eq!(fixture_owner("foo/xtestdata", "testdata"), None);
    }

    #[test]
    fn root_fixture_requires_leading_segment() {
        assert!(is_root_fixture("testdata", "testdata"));
        assert!(is_root_fixture("testdata/a/b", "testdata"));
        assert!(!is_root_fixture("testdatax", "testdata"));
        assert!(!is_root_fixture("pkg/testdata", "testdata"));
        assert!(!is_root_fixture(".", "testdata"));
    }

    #[test]
    fn bubbling_skips_untested_dirs_but_keeps_walking() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "a_test.go");
        touch(dir.path(), "a/a_test.go");
        touch(dir.path(), "a/b/b.go");
        touch(dir.path(), "a/b/c/c_test.go");
        touch(dir.path(), "a/b/c/testdata/in.json");
        touch(dir.path(), "sibling/s_test.go");

        let tree = ProjectTree::new(dir.path(), Conventions::default());
        let mut sets = ImpactSets::new();
        bubble_up("a/b/c", &tree, &mut sets);

        let impacted: Vec<_> = sets.impacted().iter().cloned().collect();
        assert_eq!(impacted, vec!["a".to_string(), "a/b/c".to_string()]);
        assert!(sets.altered().is_empty());
    }

    #[test]
    fn root_marked_only_with_tests() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "main.go");
        let tree = ProjectTree::new(dir.path(), Conventions::default());
        let mut sets = ImpactSets::new();
        mark_root(&tree, &mut sets);
        assert!(sets.impacted().is_empty());

        touch(dir.path(), "main_test.go");
        mark_root(&tree, &mut sets);
        assert!(sets.is_impacted("."));
    }

    #[test]
    fn absolute_owner_walk_terminates() {
        let dir = tempdir().unwrap();
        let tree = ProjectTree::new(dir.path(), Conventions::default());
        let mut sets = ImpactSets::new();
        let (_, action) = crate::impact::classify("/a/testdata/x.txt", tree.conventions());
        crate::impact::classify::apply(&action, &tree, &mut sets);
        assert!(sets.altered().is_empty());
    }
}
