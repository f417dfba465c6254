//! Default values for vault-setup configuration.
//!
//! This module provides centralized default values used across commands,
//! ensuring consistency and avoiding duplication. The built-in vault
//! registry and plugin manifest live here as well; both can be overridden
//! with a registry file (see [`crate::registry`]).

use std::path::PathBuf;

use crate::registry::{PluginSpec, VaultDescriptor};

/// Branch every vault tracks unless its registry entry says otherwise.
pub const DEFAULT_BRANCH: &str = "main";

/// Per-network-call timeout, in seconds.
///
/// Applied to the access prober and asset downloads; git subprocesses get
/// the equivalent stall bound via `GIT_HTTP_LOW_SPEED_*`.
pub const NETWORK_TIMEOUT_SECS: u64 = 30;

/// Vault-local directory holding the host application's per-vault state.
pub const HOST_CONFIG_DIR: &str = ".obsidian";

/// Plugin id of the sync plugin whose settings we manage.
pub const SYNC_PLUGIN_ID: &str = "obsidian-git";

/// Fixed sync-behavior policy merged into the sync plugin settings on every
/// run. Re-running vault-setup after a policy change here propagates the new
/// values to previously-provisioned vaults.
pub const SYNC_PULL_INTERVAL_MINUTES: u64 = 5;
pub const SYNC_PUSH_INTERVAL_MINUTES: u64 = 5;
pub const SYNC_AUTOSAVE_INTERVAL_MINUTES: u64 = 5;
pub const SYNC_CONFLICT_POLICY: &str = "theirs";

/// Returns the default parent directory for vault checkouts.
///
/// Defaults to `~/vaults`, falling back to `./vaults` if the home directory
/// cannot be determined.
///
/// This can be overridden by the `--install-root` CLI flag or the
/// `VAULT_SETUP_ROOT` environment variable.
pub fn default_install_root() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("vaults")
}

/// Returns the default location of the host application's global state file.
///
/// Obsidian keeps its vault registry in `obsidian.json` under the platform
/// config directory:
/// - Linux: `~/.config/obsidian/obsidian.json`
/// - macOS: `~/Library/Application Support/obsidian/obsidian.json`
///
/// Falls back to `.obsidian-state/obsidian.json` in the current directory if
/// the platform config directory cannot be determined.
pub fn default_host_state_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".obsidian-state"))
        .join("obsidian")
        .join("obsidian.json")
}

/// The built-in vault registry.
///
/// Each entry is a typed record; `local_name` uniquely determines the
/// checkout path under the install root.
pub fn builtin_registry() -> Vec<VaultDescriptor> {
    vec![
        VaultDescriptor::new("team-notes", "acme-vaults", "team-notes", "Team Notes"),
        VaultDescriptor::new("runbooks", "acme-vaults", "runbooks", "Runbooks"),
        VaultDescriptor::new(
            "engineering-wiki",
            "acme-vaults",
            "engineering-wiki",
            "Engineering Wiki",
        ),
        VaultDescriptor::new("research", "acme-vaults", "research", "Research"),
    ]
}

/// The fixed plugin manifest installed into every provisioned vault.
pub fn plugin_manifest() -> Vec<PluginSpec> {
    vec![
        PluginSpec::new("obsidian-git", "Vinzent03", "obsidian-git", "Obsidian Git"),
        PluginSpec::new(
            "obsidian-shellcommands",
            "Taitava",
            "obsidian-shellcommands",
            "Shell commands",
        ),
        PluginSpec::new("dataview", "blacksmithgu", "obsidian-dataview", "Dataview"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_install_root_ends_with_vaults() {
        let root = default_install_root();
        assert!(root.ends_with("vaults"));
    }

    #[test]
    fn test_default_host_state_path_is_obsidian_json() {
        let path = default_host_state_path();
        assert!(path.ends_with("obsidian/obsidian.json"));
    }

    #[test]
    fn test_builtin_registry_has_unique_names() {
        let registry = builtin_registry();
        let mut locals: Vec<_> = registry.iter().map(|v| v.local_name.as_str()).collect();
        locals.sort_unstable();
        locals.dedup();
        assert_eq!(locals.len(), registry.len());
    }

    #[test]
    fn test_plugin_manifest_includes_sync_plugin() {
        assert!(plugin_manifest().iter().any(|p| p.id == SYNC_PLUGIN_ID));
    }
}
