use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One package as reported by the package lister.
///
/// The three dependency lists are expected to be transitive already.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Package {
    pub dir: PathBuf,
    pub import_path: String,
    #[serde(default)]
    pub deps: Vec<String>,
    #[serde(default)]
    pub test_imports: Vec<String>,
    #[serde(default, rename = "XTestImports")]
    pub xtest_imports: Vec<String>,
}

impl Package {
    pub fn new(dir: impl Into<PathBuf>, import_path: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            import_path: import_path.into(),
            ..Default::default()
        }
    }

    pub fn with_deps<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.deps = deps.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_test_imports<I, S>(mut self, imports: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.test_imports = imports.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_xtest_imports<I, S>(mut self, imports: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.xtest_imports = imports.into_iter().map(Into::into).collect();
        self
    }

    /// Regular, test-only and external-test dependencies, in the order
    /// reachability examines them.
    pub fn dependency_lists(&self) -> [(&'static str, &[String]); 3] {
        [
            ("deps", self.deps.as_slice()),
            ("test_imports", self.test_imports.as_slice()),
            ("xtest_imports", self.xtest_imports.as_slice()),
        ]
    }
}

/// Outcome of one run; every list is sorted.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct Report {
    pub changed: Vec<String>,
    pub altered: Vec<String>,
    pub impacted: Vec<String>,
}

impl Report {
    /// Impacted directories in `./<dir>` form, one per line.
    pub fn render_lines(&self) -> String {
        let mut out = String::new();
        for dir in &self.impacted {
            out.push_str("./");
            out.push_str(dir);
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_go_list_field_names() {
        let raw = r#"{
            "Dir": "/src/repo/pkg/a",
            "ImportPath": "example.com/repo/pkg/a",
            "Name": "a",
            "Deps": ["fmt", "example.com/repo/pkg/b"],
            "XTestImports": ["example.com/repo/pkg/a", "testing"]
        }"#;
        let pkg: Package = serde_json::from_str(raw).unwrap();
        assert_eq!(pkg.dir, PathBuf::from("/src/repo/pkg/a"));
        assert_eq!(pkg.import_path, "example.com/repo/pkg/a");
        assert_eq!(pkg.deps.len(), 2);
        assert!(pkg.test_imports.is_empty());
        assert_eq!(pkg.xtest_imports, vec!["example.com/repo/pkg/a", "testing"]);
    }

    #[test]
    fn render_prefixes_each_directory() {
        let report = Report {
            impacted: vec![".".to_string(), "pkg/a".to_string()],
            ..Default::default()
        };
        assert_eq!(report.render_lines(), "./.\n./pkg/a\n");
        assert_eq!(Report::default().render_lines(), "");
    }
}
