//! Repository synchronization.
//!
//! Per selected vault, exactly one of three paths runs:
//!
//! 1. The checkout directory exists but has no `.git` — a partial clone
//!    left behind by an interrupted run. The directory is deleted
//!    recursively and the vault falls through to a fresh clone.
//! 2. The checkout has valid git metadata — *repair*: fetch the tracked
//!    branch and hard-reset the working tree to the remote tip. Vaults are
//!    read-mostly mirrors; local edits are pushed upstream by the sync
//!    plugin, so repair favors remote truth to guarantee convergence.
//! 3. Nothing on disk — fresh clone of the tracked branch.
//!
//! A failure is confined to its vault: the batch continues, and the
//! per-vault outcomes are reported together at the end. Only a batch where
//! *every* vault failed aborts the run.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::git::GitTransport;
use crate::registry::VaultDescriptor;

/// Result of synchronizing one vault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Fresh clone (including recovery from a corrupt partial clone).
    Installed,
    /// Existing checkout fetched and hard-reset to the remote tip.
    Repaired,
    /// Clone or repair failed; the reason is shown in the run summary.
    Failed(String),
}

impl SyncOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, SyncOutcome::Failed(_))
    }
}

/// One vault's synchronization result, with the paths later phases need.
#[derive(Debug, Clone)]
pub struct SyncedVault {
    pub descriptor: VaultDescriptor,
    pub path: PathBuf,
    pub outcome: SyncOutcome,
}

/// Synchronize one vault checkout.
pub fn sync_vault(
    transport: &dyn GitTransport,
    descriptor: &VaultDescriptor,
    install_root: &Path,
) -> SyncedVault {
    let path = descriptor.local_path(install_root);
    let outcome = match sync_path(transport, descriptor, &path) {
        Ok(outcome) => outcome,
        Err(e) => SyncOutcome::Failed(e.to_string()),
    };
    SyncedVault {
        descriptor: descriptor.clone(),
        path,
        outcome,
    }
}

fn sync_path(
    transport: &dyn GitTransport,
    descriptor: &VaultDescriptor,
    path: &Path,
) -> Result<SyncOutcome> {
    let branch = descriptor.branch();

    if path.exists() && !path.join(".git").exists() {
        // Partial clone from an interrupted run; start over.
        log::warn!(
            "{} exists without git metadata, removing and re-cloning",
            path.display()
        );
        fs::remove_dir_all(path)?;
    }

    if path.join(".git").exists() {
        transport.fetch(path, "origin")?;
        transport.reset_hard(path, &format!("origin/{}", branch))?;
        return Ok(SyncOutcome::Repaired);
    }

    transport.clone_branch(
        &descriptor.remote_owner,
        &descriptor.remote_repo,
        path,
        branch,
    )?;
    Ok(SyncOutcome::Installed)
}

/// The fatal all-failed terminal state, if `results` is in it.
///
/// A batch where every vault failed has nothing for the downstream phases
/// to work with; the caller aborts with the per-vault reasons instead of
/// writing an empty registration.
pub fn all_failed(results: &[SyncedVault]) -> Option<Error> {
    if results.is_empty() || results.iter().any(|r| r.outcome.is_success()) {
        return None;
    }
    let failures = results
        .iter()
        .map(|r| {
            let reason = match &r.outcome {
                SyncOutcome::Failed(reason) => reason.clone(),
                _ => unreachable!(),
            };
            (r.descriptor.display_name.clone(), reason)
        })
        .collect();
    Some(Error::AllSyncsFailed { failures })
}
