//! Orchestrator for the complete provisioning operation
//!
//! This module coordinates the phases that follow vault selection:
//!
//! 1. Synchronize each selected vault (clone, repair, or recover)
//! 2. Install plugins and merge configuration into each synced vault
//! 3. Register the provisioned paths in the host application's state file
//!
//! Selection itself happens *before* this module runs — the chosen subset
//! is an explicit argument, never ambient state. One vault is processed
//! fully (sync, then plugin install and config merge) before the next
//! begins; the host state file is touched exactly once, at the end, for
//! the whole batch, so nothing is registered when every sync failed.

use std::path::Path;

use url::Url;

use crate::error::Result;
use crate::git::GitTransport;
use crate::host;
use crate::plugins::{self, AssetFetcher};
use crate::registry::{PluginSpec, VaultDescriptor};
use crate::sync::{self, SyncOutcome, SyncedVault};

/// Everything the pipeline needs besides the selection itself.
pub struct ProvisionContext<'a> {
    pub transport: &'a dyn GitTransport,
    pub fetcher: &'a dyn AssetFetcher,
    /// Base URL plugin release assets are fetched from.
    pub asset_base: Url,
    pub plugin_manifest: Vec<PluginSpec>,
    pub install_root: &'a Path,
    pub host_state_path: &'a Path,
}

/// Per-vault result of a full pipeline run.
#[derive(Debug, Clone)]
pub struct VaultReport {
    pub display_name: String,
    pub outcome: SyncOutcome,
    /// Plugin ids resolved for this vault; empty for failed vaults.
    pub plugins: Vec<String>,
}

/// Outcome of one provisioning run over a confirmed selection.
#[derive(Debug, Clone)]
pub struct ProvisionReport {
    pub vaults: Vec<VaultReport>,
}

impl ProvisionReport {
    pub fn succeeded(&self) -> usize {
        self.vaults
            .iter()
            .filter(|v| v.outcome.is_success())
            .count()
    }

    pub fn failed(&self) -> usize {
        self.vaults.len() - self.succeeded()
    }
}

/// Execute sync → plugin install → host registration for `selection`.
///
/// Failed vaults are dropped from the later phases but stay in the report;
/// partial success is a normal end state. Errs when the whole batch failed
/// to sync ([`crate::error::Error::AllSyncsFailed`] — nothing is registered
/// in that case) or when the host state file cannot be read or written.
pub fn provision_selected(
    ctx: &ProvisionContext<'_>,
    selection: &[VaultDescriptor],
) -> Result<ProvisionReport> {
    if selection.is_empty() {
        return Ok(ProvisionReport { vaults: Vec::new() });
    }

    let mut synced = Vec::with_capacity(selection.len());
    let mut reports = Vec::with_capacity(selection.len());
    let mut provisioned_paths = Vec::new();
    for descriptor in selection {
        let vault = sync::sync_vault(ctx.transport, descriptor, ctx.install_root);
        let report = install_phase(ctx, &vault);
        if report.outcome.is_success() {
            provisioned_paths.push(vault.path.clone());
        }
        synced.push(vault);
        reports.push(report);
    }

    if let Some(err) = sync::all_failed(&synced) {
        return Err(err);
    }

    host::register_batch(ctx.host_state_path, &provisioned_paths)?;

    Ok(ProvisionReport { vaults: reports })
}

/// Plugin install and config merges for one synced vault.
///
/// An error here (an unwritable vault-local config, say) is confined to
/// this vault: it is reported as a failure and the vault is dropped from
/// registration, but its siblings continue.
fn install_phase(ctx: &ProvisionContext<'_>, vault: &SyncedVault) -> VaultReport {
    let mut outcome = vault.outcome.clone();
    let plugins = if outcome.is_success() {
        match plugins::provision_vault(
            ctx.fetcher,
            &ctx.asset_base,
            &vault.path,
            &ctx.plugin_manifest,
        ) {
            Ok(ids) => ids,
            Err(e) => {
                outcome = SyncOutcome::Failed(format!("config install failed: {}", e));
                Vec::new()
            }
        }
    } else {
        Vec::new()
    };

    VaultReport {
        display_name: vault.descriptor.display_name.clone(),
        outcome,
        plugins,
    }
}
