//! Git utilities - subprocess helper and shared constants

use std::path::Path;
use std::process::Command;
use tracing::{debug, warn};

/// Marker git prints on stderr when the cwd has no repository
pub const NOT_A_GIT_REPO: &str = "not a git repository";

/// Outcome of a single git invocation
///
/// Git calls never fail as Rust errors: a command that cannot be spawned is
/// reported as an unsuccessful run whose stderr is the spawn error.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GitOutput {
    /// Stdout without trailing whitespace; leading columns are kept for porcelain
    pub stdout: String,
    /// Trimmed stderr
    pub stderr: String,
    pub success: bool,
}

impl GitOutput {
    /// Best available failure text: stderr, then stdout, then `fallback`
    pub fn failure_message(&self, fallback: &str) -> String {
        if !self.stderr.is_empty() {
            self.stderr.clone()
        } else if !self.stdout.trim().is_empty() {
            self.stdout.trim().to_string()
        } else {
            fallback.to_string()
        }
    }

    pub fn is_not_a_repo(&self) -> bool {
        !self.success && self.stderr.contains(NOT_A_GIT_REPO)
    }
}

/// Run `git <args>` in `workdir` and capture its output
pub fn run_git(workdir: &Path, args: &[&str]) -> GitOutput {
    debug!("git {:?} in {:?}", args, workdir);

    match Command::new("git").args(args).current_dir(workdir).output() {
        Ok(output) => GitOutput {
            stdout: String::from_utf8_lossy(&output.stdout).trim_end().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            success: output.status.success(),
        },
        Err(e) => {
            warn!("Failed to run git {:?}: {}", args, e);
            GitOutput {
                stdout: String::new(),
                stderr: format!("Failed to run git: {}", e),
                success: false,
            }
        }
    }
}

/// Whether a `git` binary can be executed at all
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}


#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_failure_message_fallbacks() {
        let out = GitOutput {
            stdout: "nothing to commit, working tree clean".to_string(),
            stderr: String::new(),
            success: false,
        };
        assert_eq!(
            out.failure_message("Failed to commit"),
            "nothing to commit, working tree clean"
        );

        let out = GitOutput {
            stdout: "ignored".to_string(),
            stderr: "fatal: no remote".to_string(),
            success: false,
        };
        assert_eq!(out.failure_message("Failed to push"), "fatal: no remote");

        assert_eq!(
            GitOutput::default().failure_message("Failed to push"),
            "Failed to push"
        );
    }

    #[test]
    fn test_run_git_outside_repo() {
        if !git_available() {
            return;
        }
        let temp = TempDir::new().unwrap();
        let out = run_git(temp.path(), &["status", "--porcelain"]);
        // A temp dir may still sit inside some enclosing repository
        if !out.success {
            assert!(out.is_not_a_repo(), "unexpected stderr: {}", out.stderr);
        }
    }
}
