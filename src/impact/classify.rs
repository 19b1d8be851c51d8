//! Changed-path classification.
//!
//! Each changed path is run through [`RULES`] in order and the first rule
//! whose predicate matches decides what happens to it. Classification is
//! purely textual; the filesystem is only consulted when a fixture action is
//! applied.

use crate::changes::ChangeSet;
use crate::impact::fixture;
use crate::impact::tree::ProjectTree;
use crate::impact::types::{Conventions, ImpactSets};
use crate::util::{base_name, parent_dir};

/// Which rule claimed a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    DotFile,
    UnderscoreFile,
    HiddenDir,
    TestFile,
    RootFixture,
    NestedFixture,
    SourceFile,
    Other,
}

/// Effect of a changed path on the impact sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Ignore,
    /// The directory's own tests must rerun; nothing propagates.
    Impact(String),
    /// Fixture at the project root.
    RootFixture,
    /// Fixture below a package; bubbling starts at `owner`.
    NestedFixture { owner: String },
    /// Regular source changed; the directory propagates to importers.
    Alter(String),
}

/// A changed path split into the parts the rules look at.
#[derive(Debug, Clone, Copy)]
pub struct ChangedFile<'a> {
    pub path: &'a str,
    pub dir: &'a str,
    pub base: &'a str,
}

impl<'a> ChangedFile<'a> {
    pub fn new(path: &'a str) -> Self {
        Self {
            path,
            dir: parent_dir(path),
            base: base_name(path),
        }
    }
}

pub struct Rule {
    pub kind: RuleKind,
    pub matches: fn(&ChangedFile<'_>, &Conventions) -> bool,
    pub action: fn(&ChangedFile<'_>, &Conventions) -> Action,
}

pub static RULES: &[Rule] = &[
    Rule {
        kind: RuleKind::DotFile,
        matches: |file, _| file.base.starts_with('.'),
        action: |_, _| Action::Ignore,
    },
    Rule {
        kind: RuleKind::UnderscoreFile,
        matches: |file, _| file.base.starts_with('_'),
        action: |_, _| Action::Ignore,
    },
    Rule {
        kind: RuleKind::HiddenDir,
        matches: |file, _| {
            file.dir.split('/').any(|segment| {
                segment != "." && segment != ".." && Conventions::is_invisible(segment)
            })
        },
        action: |_, _| Action::Ignore,
    },
    Rule {
        kind: RuleKind::TestFile,
        matches: |file, conventions| conventions.is_test_file(file.base),
        action: |file, _| Action::Impact(file.dir.to_string()),
    },
    Rule {
        kind: RuleKind::RootFixture,
        matches: |file, conventions| fixture::is_root_fixture(file.dir, &conventions.fixture_dir),
        action: |_, _| Action::RootFixture,
    },
    Rule {
        kind: RuleKind::NestedFixture,
        matches: |file, conventions| {
            fixture::fixture_owner(file.dir, &conventions.fixture_dir).is_some()
        },
        action: |file, conventions| {
            match fixture::fixture_owner(file.dir, &conventions.fixture_dir) {
                Some(owner) => Action::NestedFixture {
                    owner: owner.to_string(),
                },
                None => Action::Ignore,
            }
        },
    },
    Rule {
        kind: RuleKind::SourceFile,
        matches: |file, conventions| conventions.is_source_file(file.base),
        action: |file, _| Action::Alter(file.dir.to_string()),
    },
    Rule {
        kind: RuleKind::Other,
        matches: |_, _| true,
        action: |_, _| Action::Ignore,
    },
];

/// Decide what a single changed path does. The last rule always matches.
pub fn classify(path: &str, conventions: &Conventions) -> (RuleKind, Action) {
    let file = ChangedFile::new(path);
    for rule in RULES {
        if (rule.matches)(&file, conventions) {
            return (rule.kind, (rule.action)(&file, conventions));
        }
    }
    (RuleKind::Other, Action::Ignore)
}

/// Apply one action to the sets.
pub fn apply(action: &Action, tree: &ProjectTree, sets: &mut ImpactSets) {
    match action {
        Action::Ignore => {}
        Action::Impact(dir) => sets.mark_impacted(dir),
        Action::RootFixture => fixture::mark_root(tree, sets),
        Action::NestedFixture { owner } => fixture::bubble_up(owner, tree, sets),
        Action::Alter(dir) => sets.mark_altered(dir),
    }
}

/// Seed fresh altered/impacted sets from every changed path.
pub fn classify_changes(changes: &ChangeSet, tree: &ProjectTree) -> ImpactSets {
    let mut sets = ImpactSets::new();
    for path in changes.iter() {
        let (kind, action) = classify(path, tree.conventions());
        tracing::trace!("{} -> {:?}", path, kind);
        apply(&action, tree, &mut sets);
    }
    sets
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind_of(path: &str) -> RuleKind {
        classify(path, &Conventions::default()).0
    }

    #[test]
    fn first_matching_rule_wins() {
        assert_eq!(kind_of(".hidden_test.go"), RuleKind::DotFile);
        assert_eq!(kind_of("pkg/_gen_test.go"), RuleKind::UnderscoreFile);
        assert_eq!(kind_of(".github/tool.go"), RuleKind::HiddenDir);
        assert_eq!(kind_of("pkg/_vendor/x.go"), RuleKind::HiddenDir);
        assert_eq!(kind_of("pkg/testdata/x_test.go"), RuleKind::TestFile);
        assert_eq!(kind_of("testdata/gen.go"), RuleKind::RootFixture);
        assert_eq!(kind_of("pkg/testdata/gen.go"), RuleKind::NestedFixture);
        assert_eq!(kind_of("pkg/a.go"), RuleKind::SourceFile);
        assert_eq!(kind_of("README.md"), RuleKind::Other);
    }

    #[test]
    fn git_internals_are_ignored() {
        assert_eq!(
            classify(".git/config", &Conventions::default()),
            (RuleKind::HiddenDir, Action::Ignore)
        );
    }

    #[test]
    fn actions_carry_directories() {
        let conventions = Conventions::default();
        assert_eq!(
            classify("pkg/a/a_test.go", &conventions).1,
            Action::Impact("pkg/a".to_string())
        );
        assert_eq!(classify("main.go", &conventions).1, Action::Alter(".".to_string()));
        assert_eq!(
            classify("pkg/a/testdata/golden/out.txt", &conventions).1,
            Action::NestedFixture {
                owner: "pkg/a".to_string()
            }
        );
        assert_eq!(classify("testdata/x.txt", &conventions).1, Action::RootFixture);
    }

    #[test]
    fn custom_conventions_are_honored() {
        let conventions = Conventions {
            source_suffix: ".rs".to_string(),
            test_suffix: "_tests.rs".to_string(),
            fixture_dir: "fixtures".to_string(),
        };
        assert_eq!(classify("src/lib.rs", &conventions).0, RuleKind::SourceFile);
        assert_eq!(classify("src/lib_tests.rs", &conventions).0, RuleKind::TestFile);
        assert_eq!(classify("src/fixtures/a.json", &conventions).0, RuleKind::NestedFixture);
        assert_eq!(classify("src/main.go", &conventions).0, RuleKind::Other);
    }
}
