//! Git working tree queries (status, diff)

use std::path::Path;
use tracing::warn;

use super::utils::*;
use crate::server::protocol::{ChangeType, GitChange};

/// Files never reported by `git_status`, matched by basename
pub const STATUS_HIDDEN_FILES: &[&str] = &["package-lock.json"];

/// Git status result
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GitStatusResult {
    pub changes: Vec<GitChange>,
    /// Informational note, e.g. when the root is not a repository
    pub message: Option<String>,
}

/// Map a raw two-column porcelain code to a change type
///
/// Only the first column is inspected, so a worktree-only deletion (" D")
/// falls through to `Modified`.
pub fn classify_status(code: &str) -> ChangeType {
    if code.starts_with("??") {
        ChangeType::Untracked
    } else if code.starts_with('A') {
        ChangeType::Added
    } else if code.starts_with('D') {
        ChangeType::Deleted
    } else if code.starts_with('M') {
        ChangeType::Modified
    } else if code.starts_with('R') {
        ChangeType::Renamed
    } else {
        ChangeType::Modified
    }
}

fn is_hidden(file: &str) -> bool {
    STATUS_HIDDEN_FILES
        .iter()
        .any(|hidden| file == *hidden || file.ends_with(&format!("/{}", hidden)))
}

/// Parse `git status --porcelain` (v1) output
///
/// Format: `XY PATH`, or `XY ORIG -> PATH` for renames (kept verbatim as the file).
pub fn parse_porcelain_status(output: &str) -> Vec<GitChange> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let code = line.get(..2).unwrap_or(line);
            let file = line.get(3..).unwrap_or("");
            if is_hidden(file) {
                return None;
            }
            Some(GitChange {
                file: file.to_string(),
                status: code.trim().to_string(),
                change_type: classify_status(code),
            })
        })
        .collect()
}

/// Get uncommitted changes of the repository at `workdir`
///
/// A directory outside any repository is not an error: it yields no
/// changes plus a "Not a git repository" note.
pub fn git_status(workdir: &Path) -> GitStatusResult {
    let output = run_git(workdir, &["status", "--porcelain"]);

    if output.is_not_a_repo() {
        return GitStatusResult {
            changes: Vec::new(),
            message: Some("Not a git repository".to_string()),
        };
    }
    if !output.success {
        warn!("git status failed: {}", output.stderr);
    }

    GitStatusResult {
        changes: parse_porcelain_status(&output.stdout),
        message: None,
    }
}

/// Unified diff of the working tree, optionally limited to one file
pub fn git_diff(workdir: &Path, file: Option<&str>) -> String {
    let mut args = vec!["diff"];
    if let Some(file) = file {
        args.push("--");
        args.push(file);
    }

    let output = run_git(workdir, &args);
    if !output.success {
        warn!("git diff failed: {}", output.stderr);
    }
    output.stdout
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::git::utils::test_support::init_repo;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_classify_status() {
        assert_eq!(classify_status("??"), ChangeType::Untracked);
        assert_eq!(classify_status("A "), ChangeType::Added);
        assert_eq!(classify_status("AM"), ChangeType::Added);
        assert_eq!(classify_status("D "), ChangeType::Deleted);
        assert_eq!(classify_status("M "), ChangeType::Modified);
        assert_eq!(classify_status("R "), ChangeType::Renamed);
        assert_eq!(classify_status(" M"), ChangeType::Modified);
        assert_eq!(classify_status(" D"), ChangeType::Modified);
        assert_eq!(classify_status("UU"), ChangeType::Modified);
    }

    #[test]
    fn test_parse_porcelain_status() {
        let output = " M src/index.ts\n?? notes.md\nA  new.ts\nR  old.ts -> renamed.ts\n\n D gone.ts";
        let changes = parse_porcelain_status(output);
        assert_eq!(changes.len(), 5);

        assert_eq!(changes[0].file, "src/index.ts");
        assert_eq!(changes[0].status, "M");
        assert_eq!(changes[0].change_type, ChangeType::Modified);

        assert_eq!(changes[1].file, "notes.md");
        assert_eq!(changes[1].status, "??");
        assert_eq!(changes[1].change_type, ChangeType::Untracked);

        assert_eq!(changes[2].change_type, ChangeType::Added);
        assert_eq!(changes[3].file, "old.ts -> renamed.ts");
        assert_eq!(changes[3].change_type, ChangeType::Renamed);
        assert_eq!(changes[4].status, "D");
    }

    #[test]
    fn test_package_lock_hidden_at_any_depth() {
        let output = " M package-lock.json\n M web/package-lock.json\n M my-package-lock.json\n M a.ts";
        let files: Vec<String> = parse_porcelain_status(output)
            .into_iter()
            .map(|c| c.file)
            .collect();
        assert_eq!(files, vec!["my-package-lock.json", "a.ts"]);
    }

    #[test]
    fn test_git_status_in_repo() {
        if !git_available() {
            return;
        }
        let temp = TempDir::new().unwrap();
        init_repo(temp.path());
        fs::write(temp.path().join("a.txt"), "a").unwrap();
        fs::write(temp.path().join("package-lock.json"), "{}").unwrap();

        let result = git_status(temp.path());
        assert!(result.message.is_none());
        assert_eq!(result.changes.len(), 1);
        assert_eq!(result.changes[0].file, "a.txt");
        assert_eq!(result.changes[0].change_type, ChangeType::Untracked);
    }

    #[test]
    fn test_git_diff_scoped_to_file() {
        if !git_available() {
            return;
        }
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        init_repo(root);
        fs::write(root.join("a.txt"), "one\n").unwrap();
        fs::write(root.join("b.txt"), "one\n").unwrap();
        run_git(root, &["add", "-A"]);
        assert!(run_git(root, &["commit", "-q", "-m", "init"]).success);

        fs::write(root.join("a.txt"), "two\n").unwrap();
        fs::write(root.join("b.txt"), "three\n").unwrap();

        let all = git_diff(root, None);
        assert!(all.contains("a.txt") && all.contains("b.txt"));

        let only_a = git_diff(root, Some("a.txt"));
        assert!(only_a.contains("+two"));
        assert!(!only_a.contains("b.txt"));
    }
}
