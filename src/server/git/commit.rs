//! Git commit and push operations

use std::path::Path;
use tracing::warn;

use super::utils::*;

/// Outcome of a mutating git operation
///
/// `message` is git's output on success and the failure text otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct GitOpResult {
    pub ok: bool,
    pub message: String,
}

impl GitOpResult {
    fn from_output(output: &GitOutput, success_fallback: &str, failure_fallback: &str) -> Self {
        if output.success {
            let stdout = output.stdout.trim();
            Self {
                ok: true,
                message: if stdout.is_empty() {
                    success_fallback.to_string()
                } else {
                    stdout.to_string()
                },
            }
        } else {
            Self {
                ok: false,
                message: output.failure_message(failure_fallback),
            }
        }
    }
}

/// Stage everything and commit
///
/// Runs `git add -A` followed by `git commit -m <message>`. Staging is
/// repository-wide, so edits made by other clients are committed too. The
/// message is passed as a single argument and needs no shell quoting.
pub fn git_commit(workdir: &Path, message: &str) -> GitOpResult {
    let staged = run_git(workdir, &["add", "-A"]);
    if !staged.success {
        warn!("git add -A failed: {}", staged.stderr);
    }

    let output = run_git(workdir, &["commit", "-m", message]);
    GitOpResult::from_output(&output, "Changes committed successfully", "Failed to commit")
}

/// Push the current branch to its configured upstream
pub fn git_push(workdir: &Path) -> GitOpResult {
    let output = run_git(workdir, &["push"]);
    GitOpResult::from_output(&output, "Changes pushed successfully", "Failed to push")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::git::utils::test_support::init_repo;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_commit_stages_everything() {
        if !git_available() {
            return;
        }
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        init_repo(root);
        fs::write(root.join("a.txt"), "a").unwrap();
        fs::create_dir(root.join("sub")).unwrap();
        fs::write(root.join("sub/b.txt"), "b").unwrap();

        let result = git_commit(root, "say \"hello\"");
        assert!(result.ok, "commit failed: {}", result.message);

        let log = run_git(root, &["log", "-1", "--format=%s"]);
        assert_eq!(log.stdout, "say \"hello\"");
        assert!(run_git(root, &["status", "--porcelain"]).stdout.is_empty());
    }

    #[test]
    fn test_commit_with_nothing_to_commit() {
        if !git_available() {
            return;
        }
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        init_repo(root);
        fs::write(root.join("a.txt"), "a").unwrap();
        assert!(git_commit(root, "init").ok);

        let result = git_commit(root, "fix");
        assert!(!result.ok);
        assert!(
            result.message.contains("nothing to commit"),
            "unexpected message: {}",
            result.message
        );
    }

    #[test]
    fn test_push_without_remote_fails() {
        if !git_available() {
            return;
        }
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        init_repo(root);
        fs::write(root.join("a.txt"), "a").unwrap();
        assert!(git_commit(root, "init").ok);

        let result = git_push(root);
        assert!(!result.ok);
        assert!(!result.message.is_empty());
    }
}
