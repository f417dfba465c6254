//! Access probing.
//!
//! Before anything is offered in the selector, each registry entry is
//! checked against the remote side: can the current credentials read the
//! repository at all? The probe is a plain `GET /repos/{owner}/{repo}`
//! against the GitHub API. Any non-success — 404, 403, network error,
//! timeout — counts as "no access"; the distinction does not matter to the
//! caller, so the vault is silently excluded rather than retried.

use std::env;
use std::process::Command;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};

use crate::defaults::NETWORK_TIMEOUT_SECS;
use crate::error::{Error, Result};
use crate::registry::{AccessibleVault, VaultDescriptor};

/// Read-access check against the remote hosting the vault repositories.
pub trait AccessProber {
    /// Whether the ambient credentials can read `owner/repo`.
    ///
    /// Errors are treated by callers exactly like `Ok(false)`.
    fn can_read(&self, owner: &str, repo: &str) -> Result<bool>;
}

/// [`AccessProber`] backed by the GitHub REST API.
pub struct GitHubProber {
    client: Client,
    api_base: String,
}

impl GitHubProber {
    /// Build a prober with a bounded-timeout client.
    ///
    /// The bearer token comes from `GITHUB_TOKEN` when set, otherwise from
    /// `gh auth token` (the GitHub CLI's stored credentials). An
    /// unauthenticated prober still works for public repositories.
    pub fn new() -> Result<Self> {
        Self::with_api_base("https://api.github.com")
    }

    /// Build a prober against a non-default API endpoint (used by tests).
    pub fn with_api_base(api_base: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("vault-setup"));
        if let Some(token) = ambient_token() {
            if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", token)) {
                headers.insert("Authorization", value);
            }
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(NETWORK_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Network {
                url: api_base.to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }
}

/// Token from the environment, falling back to the GitHub CLI's keychain.
fn ambient_token() -> Option<String> {
    if let Ok(token) = env::var("GITHUB_TOKEN") {
        if !token.trim().is_empty() {
            return Some(token.trim().to_string());
        }
    }
    let output = Command::new("gh").args(["auth", "token"]).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

impl AccessProber for GitHubProber {
    fn can_read(&self, owner: &str, repo: &str) -> Result<bool> {
        let url = format!("{}/repos/{}/{}", self.api_base, owner, repo);
        let response = self.client.get(&url).send().map_err(|e| Error::Network {
            url: url.clone(),
            message: e.to_string(),
        })?;
        Ok(response.status().is_success())
    }
}

/// Filter the registry down to the vaults the current credentials can read,
/// tagging each with whether a local checkout already exists.
///
/// Probe order follows registry order. A probe error excludes the vault the
/// same way "no access" does (logged at debug level only). An empty result
/// is [`Error::NoAccessibleVaults`]: there is nothing useful the rest of the
/// pipeline could do, and the user needs guidance rather than an empty menu.
pub fn probe_registry(
    prober: &dyn AccessProber,
    registry: &[VaultDescriptor],
    install_root: &std::path::Path,
) -> Result<Vec<AccessibleVault>> {
    let mut accessible = Vec::new();
    for descriptor in registry {
        match prober.can_read(&descriptor.remote_owner, &descriptor.remote_repo) {
            Ok(true) => {
                let already_installed = descriptor.local_path(install_root).join(".git").exists();
                accessible.push(AccessibleVault {
                    descriptor: descriptor.clone(),
                    already_installed,
                });
            }
            Ok(false) => {
                log::debug!(
                    "no read access to {}/{}, skipping",
                    descriptor.remote_owner,
                    descriptor.remote_repo
                );
            }
            Err(e) => {
                log::debug!(
                    "access probe failed for {}/{}: {} (treated as no access)",
                    descriptor.remote_owner,
                    descriptor.remote_repo,
                    e
                );
            }
        }
    }

    if accessible.is_empty() {
        return Err(Error::NoAccessibleVaults);
    }
    Ok(accessible)
}
