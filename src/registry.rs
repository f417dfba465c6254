//! # Vault Registry
//!
//! Typed records describing the vault repositories and community plugins
//! this installer knows about.
//!
//! The registry is compiled in (see [`crate::defaults::builtin_registry`])
//! but can be replaced by a YAML file for fleets with a different vault set:
//!
//! ```yaml
//! vaults:
//!   - local_name: team-notes
//!     remote_owner: acme-vaults
//!     remote_repo: team-notes
//!     display_name: Team Notes
//!     branch: main        # optional, defaults to "main"
//! ```
//!
//! Parsing is strict about the things that would corrupt later phases:
//! empty names and duplicate `local_name`/`display_name` entries are
//! rejected with a hint, because `local_name` determines the checkout path
//! and `display_name` is the selector's match key.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::defaults::DEFAULT_BRANCH;
use crate::error::{Error, Result};

/// One vault repository known to the installer.
///
/// Immutable once constructed. `local_name` uniquely determines the on-disk
/// checkout path (`install_root/local_name`); `display_name` is what humans
/// pick in the selector.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VaultDescriptor {
    pub local_name: String,
    pub remote_owner: String,
    pub remote_repo: String,
    pub display_name: String,
    /// Branch to track; absent entries fall back to [`DEFAULT_BRANCH`].
    #[serde(default)]
    pub branch: Option<String>,
}

impl VaultDescriptor {
    pub fn new(local_name: &str, remote_owner: &str, remote_repo: &str, display_name: &str) -> Self {
        Self {
            local_name: local_name.to_string(),
            remote_owner: remote_owner.to_string(),
            remote_repo: remote_repo.to_string(),
            display_name: display_name.to_string(),
            branch: None,
        }
    }

    /// The checkout directory for this vault under `install_root`.
    pub fn local_path(&self, install_root: &Path) -> PathBuf {
        install_root.join(&self.local_name)
    }

    /// Branch this vault tracks.
    pub fn branch(&self) -> &str {
        self.branch.as_deref().unwrap_or(DEFAULT_BRANCH)
    }
}

/// One community plugin from the fixed install manifest.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PluginSpec {
    pub id: String,
    pub source_owner: String,
    pub source_repo: String,
    pub display_name: String,
}

impl PluginSpec {
    pub fn new(id: &str, source_owner: &str, source_repo: &str, display_name: &str) -> Self {
        Self {
            id: id.to_string(),
            source_owner: source_owner.to_string(),
            source_repo: source_repo.to_string(),
            display_name: display_name.to_string(),
        }
    }
}

/// A [`VaultDescriptor`] with its per-run derived installation state.
///
/// `already_installed` reflects whether `<path>/.git` existed when the
/// access prober ran; it is recomputed every run and never persisted.
#[derive(Debug, Clone)]
pub struct AccessibleVault {
    pub descriptor: VaultDescriptor,
    pub already_installed: bool,
}

#[derive(Debug, Deserialize)]
struct RegistryFile {
    vaults: Vec<VaultDescriptor>,
}

/// Parse a registry from YAML content.
pub fn parse(yaml_content: &str) -> Result<Vec<VaultDescriptor>> {
    let file: RegistryFile = serde_yaml::from_str(yaml_content)?;
    validate(&file.vaults)?;
    Ok(file.vaults)
}

/// Load a registry from a YAML file.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Vec<VaultDescriptor>> {
    let content = std::fs::read_to_string(path).map_err(Error::Io)?;
    parse(&content)
}

fn validate(vaults: &[VaultDescriptor]) -> Result<()> {
    if vaults.is_empty() {
        return Err(Error::Registry {
            message: "registry contains no vaults".to_string(),
            hint: Some("Add at least one entry under 'vaults:'".to_string()),
        });
    }

    let mut seen_local = HashSet::new();
    let mut seen_display = HashSet::new();
    for v in vaults {
        for (field, value) in [
            ("local_name", &v.local_name),
            ("remote_owner", &v.remote_owner),
            ("remote_repo", &v.remote_repo),
            ("display_name", &v.display_name),
        ] {
            if value.trim().is_empty() {
                return Err(Error::Registry {
                    message: format!("vault entry has an empty '{}'", field),
                    hint: Some("Every vault needs all four name fields set".to_string()),
                });
            }
        }
        // local_name becomes a single path component; reject separators
        if v.local_name.contains('/') || v.local_name.contains("..") {
            return Err(Error::Registry {
                message: format!("invalid local_name '{}'", v.local_name),
                hint: Some("local_name must be a plain directory name".to_string()),
            });
        }
        if !seen_local.insert(v.local_name.as_str()) {
            return Err(Error::Registry {
                message: format!("duplicate local_name '{}'", v.local_name),
                hint: Some("Each vault must map to a distinct checkout directory".to_string()),
            });
        }
        if !seen_display.insert(v.display_name.as_str()) {
            return Err(Error::Registry {
                message: format!("duplicate display_name '{}'", v.display_name),
                hint: Some("The selector matches vaults by display name".to_string()),
            });
        }
    }
    Ok(())
}
