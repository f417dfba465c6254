//! Git transport layer.
//!
//! The synchronizer only needs three verbs — `clone_branch`, `fetch`,
//! `reset_hard` — each reported as success/failure. They are expressed as
//! the [`GitTransport`] trait so tests can substitute a scripted fake; the
//! production implementation shells out to the system git command, which
//! automatically handles:
//! - SSH keys from ~/.ssh/
//! - Git credential helpers
//! - Personal access tokens
//! - Any authentication configured in ~/.gitconfig

use std::path::Path;
use std::process::Command;

use crate::error::{Error, Result};

/// Version-control operations the synchronizer depends on.
///
/// Implementations report success or failure only; callers never inspect
/// transport-specific output.
pub trait GitTransport {
    /// Clone `owner/repo` at `branch` into `dest`.
    fn clone_branch(&self, owner: &str, repo: &str, dest: &Path, branch: &str) -> Result<()>;

    /// Fetch `remote` inside the existing checkout at `workdir`.
    fn fetch(&self, workdir: &Path, remote: &str) -> Result<()>;

    /// Hard-reset the checkout at `workdir` to `refname`, discarding local
    /// modifications.
    fn reset_hard(&self, workdir: &Path, refname: &str) -> Result<()>;
}

/// [`GitTransport`] backed by the system `git` binary.
pub struct SystemGit;

/// Stall bound for git's HTTP transport: abort a transfer that stays under
/// 1 KB/s for 30 seconds, so a dead network fails one vault instead of
/// hanging the run.
const LOW_SPEED_LIMIT: &str = "1000";
const LOW_SPEED_TIME: &str = "30";

impl SystemGit {
    fn run(&self, vault: &str, args: &[&str], cwd: Option<&Path>) -> Result<()> {
        let mut cmd = Command::new("git");
        cmd.args(args)
            .env("GIT_TERMINAL_PROMPT", "0")
            .env("GIT_HTTP_LOW_SPEED_LIMIT", LOW_SPEED_LIMIT)
            .env("GIT_HTTP_LOW_SPEED_TIME", LOW_SPEED_TIME);
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }

        let output = cmd.output().map_err(|e| Error::GitCommand {
            command: args.join(" "),
            vault: vault.to_string(),
            stderr: e.to_string(),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);

            // Provide helpful error message for common auth failures
            let stderr = if stderr.contains("Authentication failed")
                || stderr.contains("Permission denied")
                || stderr.contains("Could not read from remote repository")
            {
                format!(
                    "Authentication failed. Make sure you have access to the repository.\n\
                     For private repos, ensure you have:\n\
                     - SSH key added to ssh-agent\n\
                     - Git credentials configured\n\
                     - Personal access token set up\n\
                     Error: {}",
                    stderr
                )
            } else {
                stderr.to_string()
            };

            return Err(Error::GitCommand {
                command: args.join(" "),
                vault: vault.to_string(),
                stderr,
            });
        }

        Ok(())
    }
}

/// HTTPS remote URL for `owner/repo`.
pub fn remote_url(owner: &str, repo: &str) -> String {
    format!("https://github.com/{}/{}.git", owner, repo)
}

impl GitTransport for SystemGit {
    fn clone_branch(&self, owner: &str, repo: &str, dest: &Path, branch: &str) -> Result<()> {
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let url = remote_url(owner, repo);
        let dest_str = dest.to_string_lossy();
        self.run(
            repo,
            &["clone", "--branch", branch, &url, dest_str.as_ref()],
            None,
        )
    }

    fn fetch(&self, workdir: &Path, remote: &str) -> Result<()> {
        let vault = workdir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.run(&vault, &["fetch", remote], Some(workdir))
    }

    fn reset_hard(&self, workdir: &Path, refname: &str) -> Result<()> {
        let vault = workdir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.run(&vault, &["reset", "--hard", refname], Some(workdir))
    }
}
