use crate::error::SlimError;
use anyhow::Result;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::process::Command;

/// Run an external tool to completion and return its stdout.
///
/// A tool that cannot be started or exits non-zero is fatal; its stderr is
/// carried in the error.
pub fn run_tool(program: &str, args: &[String], cwd: &Path) -> Result<Vec<u8>> {
    tracing::debug!("running {} {}", program, args.join(" "));
    let output = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .output()
        .map_err(|source| SlimError::CommandSpawn {
            program: program.to_string(),
            source,
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(SlimError::CommandFailed {
            program: program.to_string(),
            args: args.join(" "),
            status: output.status,
            stderr: stderr.trim().to_string(),
        }
        .into());
    }

    Ok(output.stdout)
}

pub fn normalize_path(path: &Path) -> String {
    let mut parts = Vec::new();
    for comp in path.components() {
        match comp {
            Component::Normal(os) => parts.push(os.to_string_lossy().to_string()),
            Component::ParentDir => parts.push("..".to_string()),
            Component::CurDir => {}
            _ => {}
        }
    }
    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

/// Resolve symlinks in `path`.
///
/// Trailing components that no longer exist are appended to the deepest
/// existing ancestor, so a deleted package directory still resolves.
pub fn resolve_path(path: &Path) -> PathBuf {
    let mut missing = Vec::new();
    let mut current = path;
    loop {
        if let Ok(real) = fs::canonicalize(current) {
            return missing.iter().rev().fold(real, |acc, name| acc.join(name));
        }
        match (current.parent(), current.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name);
                current = parent;
            }
            _ => return path.to_path_buf(),
        }
    }
}

/// Express `path` relative to `root`, which should already be resolved.
///
/// Relative inputs are taken to be root-relative already. An absolute path
/// that does not start with `root` is compared again after resolving its
/// symlinks; if it is still outside the root the result is `None`.
pub fn project_rel_path(root: &Path, path: &Path) -> Option<String> {
    if path.is_relative() {
        return Some(normalize_path(path));
    }
    if let Ok(rel) = path.strip_prefix(root) {
        return Some(normalize_path(rel));
    }
    resolve_path(path)
        .strip_prefix(root)
        .ok()
        .map(normalize_path)
}

/// Normalize a forward-slash changed path: drop `./` and empty segments.
pub fn clean_slash_path(path: &str) -> String {
    let parts: Vec<&str> = path
        .split('/')
        .filter(|part| !part.is_empty() && *part != ".")
        .collect();
    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

/// Directory part of a forward-slash path, `.` when there is none.
pub fn parent_dir(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) => ".",
        Some(idx) => &path[..idx],
        None => ".",
    }
}

pub fn base_name(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn normalize_path_collapses_cur_dir() {
        assert_eq!(normalize_path(Path::new("./a/./b")), "a/b");
        assert_eq!(normalize_path(Path::new(".")), ".");
        assert_eq!(normalize_path(Path::new("")), ".");
    }

    #[test]
    fn project_rel_path_handles_inside_and_outside() {
        let root = PathBuf::from("/work/repo");
        assert_eq!(
            project_rel_path(&root, Path::new("/work/repo/pkg/a")).as_deref(),
            Some("pkg/a")
        );
        assert_eq!(
            project_rel_path(&root, Path::new("/work/repo")).as_deref(),
            Some(".")
        );
        assert_eq!(project_rel_path(&root, Path::new("/usr/lib/go/src/fmt")), None);
        assert_eq!(
            project_rel_path(&root, Path::new("pkg/b")).as_deref(),
            Some("pkg/b")
        );
    }

    #[test]
    fn slash_path_helpers() {
        assert_eq!(clean_slash_path("./pkg//a.go"), "pkg/a.go");
        assert_eq!(parent_dir("pkg/sub/a.go"), "pkg/sub");
        assert_eq!(parent_dir("a.go"), ".");
        assert_eq!(parent_dir("/a"), ".");
        assert_eq!(parent_dir("/"), ".");
        assert_eq!(base_name("pkg/sub/a.go"), "a.go");
        assert_eq!(base_name("a.go"), "a.go");
    }

    #[test]
    fn resolve_path_keeps_missing_tail() {
        let dir = tempfile::tempdir().unwrap();
        let real = fs::canonicalize(dir.path()).unwrap();
        assert_eq!(resolve_path(dir.path()), real);
        assert_eq!(
            resolve_path(&dir.path().join("gone/pkg")),
            real.join("gone").join("pkg")
        );
    }

    #[cfg(unix)]
    #[test]
    fn project_rel_path_sees_through_symlinks() {
        let dir = tempfile::tempdir().unwrap();
        let real = fs::canonicalize(dir.path()).unwrap();
        fs::create_dir_all(real.join("repo/pkg/a")).unwrap();
        std::os::unix::fs::symlink(real.join("repo"), real.join("link")).unwrap();

        let root = real.join("repo");
        assert_eq!(
            project_rel_path(&root, &real.join("link/pkg/a")).as_deref(),
            Some("pkg/a")
        );
        assert_eq!(
            project_rel_path(&root, &real.join("link/deleted")).as_deref(),
            Some("deleted")
        );
        assert_eq!(project_rel_path(&root, &real.join("elsewhere")), None);
    }
}
