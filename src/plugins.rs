//! Plugin and configuration installation.
//!
//! For each successfully synced vault this module:
//!
//! 1. downloads the fixed plugin set into `.obsidian/plugins/<id>/`,
//!    skipping any plugin whose `main.js` is already present and non-empty
//!    (an existing install is never re-downloaded or overwritten);
//! 2. appends the resolved plugin ids to `.obsidian/community-plugins.json`
//!    (order-preserving union, never replacement);
//! 3. merges the fixed sync policy into the sync plugin's `data.json`,
//!    overwriting only the policy keys so a policy change here propagates
//!    to previously-provisioned vaults on re-run;
//! 4. if the vault ships automation tooling (an `automation/package.json`
//!    marker), installs its dependencies once and registers one shell
//!    command and one hotkey, both additively.
//!
//! Everything in here is non-fatal per plugin: a failed download is logged
//! and the remaining plugins and config merges still run.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use serde_json::{json, Value as JsonValue};
use url::Url;

use crate::defaults::{
    HOST_CONFIG_DIR, NETWORK_TIMEOUT_SECS, SYNC_AUTOSAVE_INTERVAL_MINUTES, SYNC_CONFLICT_POLICY,
    SYNC_PLUGIN_ID, SYNC_PULL_INTERVAL_MINUTES, SYNC_PUSH_INTERVAL_MINUTES,
};
use crate::error::{Error, Result};
use crate::merge::{deep_merge, union_push, update_json_file};
use crate::registry::PluginSpec;

/// The asset whose presence marks a plugin as installed.
const PRIMARY_ASSET: &str = "main.js";
/// Assets fetched for every plugin; `styles.css` is allowed to be missing.
const REQUIRED_ASSETS: [&str; 2] = ["main.js", "manifest.json"];
const OPTIONAL_ASSETS: [&str; 1] = ["styles.css"];

/// Marker file announcing that a vault ships its own automation tooling.
const AUTOMATION_MARKER: &str = "automation/package.json";
/// Directory whose presence means the automation dependencies are installed.
const AUTOMATION_MATERIALIZED: &str = "automation/node_modules";

const SHELL_COMMANDS_PLUGIN_ID: &str = "obsidian-shellcommands";
const MAINTENANCE_COMMAND_ID: &str = "vault-maintenance";

/// Fetches plugin release assets.
pub trait AssetFetcher {
    /// Download `url`, returning the response body.
    fn fetch(&self, url: &Url) -> Result<Vec<u8>>;
}

/// [`AssetFetcher`] backed by a blocking HTTP client with a bounded timeout.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent("vault-setup")
            .timeout(Duration::from_secs(NETWORK_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Network {
                url: "https://github.com".to_string(),
                message: e.to_string(),
            })?;
        Ok(Self { client })
    }
}

impl AssetFetcher for HttpFetcher {
    fn fetch(&self, url: &Url) -> Result<Vec<u8>> {
        let network_err = |message: String| Error::Network {
            url: url.to_string(),
            message,
        };
        let response = self
            .client
            .get(url.clone())
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| network_err(e.to_string()))?;
        let bytes = response.bytes().map_err(|e| network_err(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

/// URL of one release asset of a plugin repository.
///
/// `base` is `https://github.com` in production and a mock server in tests.
pub fn asset_url(base: &Url, plugin: &PluginSpec, asset: &str) -> Result<Url> {
    let path = format!(
        "{}/{}/releases/latest/download/{}",
        plugin.source_owner, plugin.source_repo, asset
    );
    Ok(base.join(&path)?)
}

/// Per-vault paths inside the host application's config directory.
fn plugin_dir(vault_root: &Path, plugin_id: &str) -> PathBuf {
    vault_root.join(HOST_CONFIG_DIR).join("plugins").join(plugin_id)
}

fn enablement_path(vault_root: &Path) -> PathBuf {
    vault_root.join(HOST_CONFIG_DIR).join("community-plugins.json")
}

fn hotkeys_path(vault_root: &Path) -> PathBuf {
    vault_root.join(HOST_CONFIG_DIR).join("hotkeys.json")
}

fn plugin_data_path(vault_root: &Path, plugin_id: &str) -> PathBuf {
    plugin_dir(vault_root, plugin_id).join("data.json")
}

/// Install one plugin's assets.
///
/// Skips the download when the primary asset already exists and is
/// non-empty. All assets are fetched before anything is written, and the
/// primary asset is written last, so an interrupted install never looks
/// complete to the next run.
fn install_plugin(
    fetcher: &dyn AssetFetcher,
    base: &Url,
    vault_root: &Path,
    plugin: &PluginSpec,
) -> Result<()> {
    let dir = plugin_dir(vault_root, &plugin.id);
    let primary = dir.join(PRIMARY_ASSET);

    if fs::metadata(&primary).map(|m| m.len() > 0).unwrap_or(false) {
        log::debug!("{} already installed, skipping download", plugin.id);
        return Ok(());
    }

    let mut fetched: Vec<(&str, Vec<u8>)> = Vec::new();
    for asset in REQUIRED_ASSETS {
        let url = asset_url(base, plugin, asset)?;
        fetched.push((asset, fetcher.fetch(&url)?));
    }
    for asset in OPTIONAL_ASSETS {
        let url = asset_url(base, plugin, asset)?;
        match fetcher.fetch(&url) {
            Ok(bytes) => fetched.push((asset, bytes)),
            Err(e) => log::debug!("{}: optional asset {} not fetched: {}", plugin.id, asset, e),
        }
    }

    fs::create_dir_all(&dir)?;
    fetched.sort_by_key(|(asset, _)| *asset == PRIMARY_ASSET);
    for (asset, bytes) in &fetched {
        fs::write(dir.join(asset), bytes)?;
    }
    Ok(())
}

/// Install the plugin manifest into a vault, returning the resolved ids.
///
/// A failed plugin is warned about and dropped from the resolved set; the
/// remaining plugins still install.
pub fn install_plugins(
    fetcher: &dyn AssetFetcher,
    base: &Url,
    vault_root: &Path,
    manifest: &[PluginSpec],
) -> Vec<String> {
    let mut resolved = Vec::new();
    for plugin in manifest {
        match install_plugin(fetcher, base, vault_root, plugin) {
            Ok(()) => resolved.push(plugin.id.clone()),
            Err(e) => {
                log::warn!(
                    "plugin {} failed to install in {}: {}",
                    plugin.display_name,
                    vault_root.display(),
                    e
                );
            }
        }
    }
    resolved
}

/// Append `ids` to the vault's plugin-enablement list (set union).
pub fn enable_plugins(vault_root: &Path, ids: &[String]) -> Result<()> {
    let items: Vec<JsonValue> = ids.iter().map(|id| json!(id)).collect();
    update_json_file(&enablement_path(vault_root), json!([]), |value| {
        if !value.is_array() {
            *value = json!([]);
        }
        union_push(value.as_array_mut().expect("enablement list is an array"), &items);
    })
}

/// Merge the fixed sync-behavior policy into the sync plugin's settings.
///
/// The policy keys are overwritten every run; everything else in the file
/// survives verbatim.
pub fn merge_sync_settings(vault_root: &Path) -> Result<()> {
    let policy = json!({
        "autoPullInterval": SYNC_PULL_INTERVAL_MINUTES,
        "autoPushInterval": SYNC_PUSH_INTERVAL_MINUTES,
        "autoSaveInterval": SYNC_AUTOSAVE_INTERVAL_MINUTES,
        "conflictResolution": SYNC_CONFLICT_POLICY,
    });
    update_json_file(
        &plugin_data_path(vault_root, SYNC_PLUGIN_ID),
        json!({}),
        |value| deep_merge(value, &policy),
    )
}

/// Provision the optional automation tooling a vault may ship.
///
/// No-op without the marker file. Dependency installation runs once and is
/// non-fatal; the command/hotkey registrations are additive merges keyed by
/// id, so user-made edits survive.
pub fn install_automation(vault_root: &Path) -> Result<()> {
    if !vault_root.join(AUTOMATION_MARKER).exists() {
        return Ok(());
    }

    if !vault_root.join(AUTOMATION_MATERIALIZED).exists() {
        let automation_dir = vault_root.join("automation");
        match Command::new("npm").arg("install").current_dir(&automation_dir).output() {
            Ok(output) if output.status.success() => {
                log::debug!("automation dependencies installed in {}", automation_dir.display());
            }
            Ok(output) => log::warn!(
                "npm install failed in {}: {}",
                automation_dir.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            ),
            Err(e) => log::warn!(
                "npm not runnable for {}: {} (is Node.js installed?)",
                automation_dir.display(),
                e
            ),
        }
    }

    register_maintenance_command(vault_root)?;
    register_maintenance_hotkey(vault_root)
}

fn register_maintenance_command(vault_root: &Path) -> Result<()> {
    update_json_file(
        &plugin_data_path(vault_root, SHELL_COMMANDS_PLUGIN_ID),
        json!({}),
        |value| {
            if !value.is_object() {
                *value = json!({});
            }
            let commands = value
                .as_object_mut()
                .expect("shell-commands settings is an object")
                .entry("shell_commands")
                .or_insert_with(|| json!([]));
            if !commands.is_array() {
                *commands = json!([]);
            }
            let commands = commands.as_array_mut().expect("shell_commands is an array");
            let exists = commands
                .iter()
                .any(|c| c.get("id").and_then(JsonValue::as_str) == Some(MAINTENANCE_COMMAND_ID));
            if !exists {
                commands.push(json!({
                    "id": MAINTENANCE_COMMAND_ID,
                    "alias": "Vault maintenance",
                    "shell_command": "npm run maintain --prefix automation",
                }));
            }
        },
    )
}

fn register_maintenance_hotkey(vault_root: &Path) -> Result<()> {
    let key = format!("{}:{}", SHELL_COMMANDS_PLUGIN_ID, MAINTENANCE_COMMAND_ID);
    update_json_file(&hotkeys_path(vault_root), json!({}), |value| {
        if !value.is_object() {
            *value = json!({});
        }
        let map = value.as_object_mut().expect("hotkeys is an object");
        if !map.contains_key(&key) {
            map.insert(
                key.clone(),
                json!([{ "modifiers": ["Mod", "Shift"], "key": "M" }]),
            );
        }
    })
}

/// Run the full installer for one synced vault.
///
/// Returns the resolved plugin ids (for the summary line). Config merges
/// always run, even when some plugin downloads failed.
pub fn provision_vault(
    fetcher: &dyn AssetFetcher,
    base: &Url,
    vault_root: &Path,
    manifest: &[PluginSpec],
) -> Result<Vec<String>> {
    let resolved = install_plugins(fetcher, base, vault_root, manifest);
    enable_plugins(vault_root, &resolved)?;
    merge_sync_settings(vault_root)?;
    install_automation(vault_root)?;
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::load_json_or;
    use std::collections::HashMap;
    use tempfile::TempDir;

    /// In-memory fetcher keyed by URL path; unknown paths fail.
    struct MapFetcher {
        responses: HashMap<String, Vec<u8>>,
    }

    impl MapFetcher {
        fn new() -> Self {
            Self {
                responses: HashMap::new(),
            }
        }

        fn with_plugin(mut self, plugin: &PluginSpec, with_styles: bool) -> Self {
            let prefix = format!(
                "/{}/{}/releases/latest/download",
                plugin.source_owner, plugin.source_repo
            );
            self.responses
                .insert(format!("{}/main.js", prefix), b"module.exports = {}".to_vec());
            self.responses.insert(
                format!("{}/manifest.json", prefix),
                format!("{{\"id\": \"{}\"}}", plugin.id).into_bytes(),
            );
            if with_styles {
                self.responses
                    .insert(format!("{}/styles.css", prefix), b".x{}".to_vec());
            }
            self
        }
    }

    impl AssetFetcher for MapFetcher {
        fn fetch(&self, url: &Url) -> Result<Vec<u8>> {
            self.responses
                .get(url.path())
                .cloned()
                .ok_or_else(|| Error::Network {
                    url: url.to_string(),
                    message: "404".to_string(),
                })
        }
    }

    fn base() -> Url {
        Url::parse("https://github.com").unwrap()
    }

    fn spec(id: &str) -> PluginSpec {
        PluginSpec::new(id, "owner", id, id)
    }

    #[test]
    fn test_asset_url() {
        let url = asset_url(&base(), &spec("obsidian-git"), "main.js").unwrap();
        assert_eq!(
            url.as_str(),
            "https://github.com/owner/obsidian-git/releases/latest/download/main.js"
        );
    }

    #[test]
    fn test_install_plugin_writes_assets() {
        let temp = TempDir::new().unwrap();
        let plugin = spec("dataview");
        let fetcher = MapFetcher::new().with_plugin(&plugin, true);

        let resolved = install_plugins(&fetcher, &base(), temp.path(), &[plugin.clone()]);

        assert_eq!(resolved, vec!["dataview"]);
        let dir = temp.path().join(".obsidian/plugins/dataview");
        assert!(dir.join("main.js").exists());
        assert!(dir.join("manifest.json").exists());
        assert!(dir.join("styles.css").exists());
    }

    #[test]
    fn test_install_plugin_skips_existing_install() {
        let temp = TempDir::new().unwrap();
        let plugin = spec("dataview");
        let dir = temp.path().join(".obsidian/plugins/dataview");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("main.js"), "existing build").unwrap();

        // Fetcher has no responses: any download attempt would fail.
        let fetcher = MapFetcher::new();
        let resolved = install_plugins(&fetcher, &base(), temp.path(), &[plugin]);

        assert_eq!(resolved, vec!["dataview"]);
        assert_eq!(
            fs::read_to_string(dir.join("main.js")).unwrap(),
            "existing build"
        );
    }

    #[test]
    fn test_install_plugin_empty_primary_is_retried() {
        let temp = TempDir::new().unwrap();
        let plugin = spec("dataview");
        let dir = temp.path().join(".obsidian/plugins/dataview");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("main.js"), "").unwrap();

        let fetcher = MapFetcher::new().with_plugin(&plugin, false);
        let resolved = install_plugins(&fetcher, &base(), temp.path(), &[plugin]);

        assert_eq!(resolved, vec!["dataview"]);
        assert_eq!(
            fs::read_to_string(dir.join("main.js")).unwrap(),
            "module.exports = {}"
        );
    }

    #[test]
    fn test_install_plugins_failure_is_isolated() {
        let temp = TempDir::new().unwrap();
        let ok = spec("dataview");
        let broken = spec("missing-plugin");
        let fetcher = MapFetcher::new().with_plugin(&ok, false);

        let resolved =
            install_plugins(&fetcher, &base(), temp.path(), &[broken, ok.clone()]);

        assert_eq!(resolved, vec!["dataview"]);
        assert!(!temp
            .path()
            .join(".obsidian/plugins/missing-plugin/main.js")
            .exists());
    }

    #[test]
    fn test_missing_optional_styles_is_fine() {
        let temp = TempDir::new().unwrap();
        let plugin = spec("dataview");
        let fetcher = MapFetcher::new().with_plugin(&plugin, false);

        let resolved = install_plugins(&fetcher, &base(), temp.path(), &[plugin]);

        assert_eq!(resolved, vec!["dataview"]);
        assert!(!temp
            .path()
            .join(".obsidian/plugins/dataview/styles.css")
            .exists());
    }

    #[test]
    fn test_enable_plugins_union() {
        let temp = TempDir::new().unwrap();
        let path = enablement_path(temp.path());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, r#"["user-plugin", "dataview"]"#).unwrap();

        enable_plugins(
            temp.path(),
            &["dataview".to_string(), "obsidian-git".to_string()],
        )
        .unwrap();

        let list = load_json_or(&path, json!([])).unwrap();
        assert_eq!(list, json!(["user-plugin", "dataview", "obsidian-git"]));
    }

    #[test]
    fn test_merge_sync_settings_preserves_user_keys() {
        let temp = TempDir::new().unwrap();
        let path = plugin_data_path(temp.path(), SYNC_PLUGIN_ID);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(
            &path,
            r#"{"autoPullInterval": 60, "commitMessage": "custom {{date}}"}"#,
        )
        .unwrap();

        merge_sync_settings(temp.path()).unwrap();

        let settings = load_json_or(&path, json!({})).unwrap();
        assert_eq!(settings["autoPullInterval"], SYNC_PULL_INTERVAL_MINUTES);
        assert_eq!(settings["commitMessage"], "custom {{date}}");
        assert_eq!(settings["conflictResolution"], SYNC_CONFLICT_POLICY);
    }

    #[test]
    fn test_install_automation_without_marker_is_noop() {
        let temp = TempDir::new().unwrap();
        install_automation(temp.path()).unwrap();
        assert!(!hotkeys_path(temp.path()).exists());
    }

    #[test]
    fn test_automation_registrations_are_additive_and_idempotent() {
        let temp = TempDir::new().unwrap();
        // Marker present, dependencies already materialized so npm never runs.
        fs::create_dir_all(temp.path().join("automation/node_modules")).unwrap();
        fs::write(temp.path().join("automation/package.json"), "{}").unwrap();

        let hotkeys = hotkeys_path(temp.path());
        fs::create_dir_all(hotkeys.parent().unwrap()).unwrap();
        fs::write(&hotkeys, r#"{"editor:toggle-bold": []}"#).unwrap();

        install_automation(temp.path()).unwrap();
        install_automation(temp.path()).unwrap();

        let keys = load_json_or(&hotkeys, json!({})).unwrap();
        assert!(keys.get("editor:toggle-bold").is_some());
        assert!(keys
            .get("obsidian-shellcommands:vault-maintenance")
            .is_some());

        let data = load_json_or(
            &plugin_data_path(temp.path(), SHELL_COMMANDS_PLUGIN_ID),
            json!({}),
        )
        .unwrap();
        assert_eq!(data["shell_commands"].as_array().unwrap().len(), 1);
    }
}
