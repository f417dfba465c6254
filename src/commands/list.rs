//! List command implementation
//!
//! Shows the vault registry with per-vault access and install status, so a
//! user can see what `provision` would offer before running it.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use vault_setup::access::{probe_registry, AccessProber, GitHubProber};
use vault_setup::defaults;
use vault_setup::error::Error;
use vault_setup::output::OutputConfig;
use vault_setup::registry;
use vault_setup::suggestions;

/// Arguments for the list command
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Parent directory for vault checkouts
    #[arg(long, value_name = "PATH", env = "VAULT_SETUP_ROOT")]
    pub install_root: Option<PathBuf>,

    /// Registry file overriding the built-in vault list
    #[arg(long, value_name = "PATH", env = "VAULT_SETUP_REGISTRY")]
    pub registry: Option<PathBuf>,
}

/// Execute the list command
pub fn execute(args: ListArgs, output: &OutputConfig) -> Result<()> {
    let install_root = args
        .install_root
        .unwrap_or_else(defaults::default_install_root);
    let vault_registry = match &args.registry {
        Some(path) if !path.exists() => return Err(suggestions::registry_not_found(path)),
        Some(path) => registry::from_file(path)?,
        None => defaults::builtin_registry(),
    };

    let prober = GitHubProber::new()?;
    print_registry(&prober, &vault_registry, &install_root, output)
}

fn print_registry(
    prober: &dyn AccessProber,
    vault_registry: &[registry::VaultDescriptor],
    install_root: &std::path::Path,
    output: &OutputConfig,
) -> Result<()> {
    let accessible = match probe_registry(prober, vault_registry, install_root) {
        Ok(accessible) => accessible,
        Err(Error::NoAccessibleVaults) => {
            // Still show the registry so the user knows what exists.
            for vault in vault_registry {
                println!(
                    "{} {} ({}/{})",
                    output.emoji("🔒", "[NO-ACCESS]"),
                    vault.display_name,
                    vault.remote_owner,
                    vault.remote_repo
                );
            }
            println!();
            return Err(Error::NoAccessibleVaults.into());
        }
        Err(e) => return Err(e.into()),
    };

    for vault in vault_registry {
        let found = accessible
            .iter()
            .find(|a| a.descriptor.local_name == vault.local_name);
        let (icon, status) = match found {
            Some(a) if a.already_installed => (output.emoji("📦", "[INSTALLED]"), "installed"),
            Some(_) => (output.emoji("🔓", "[AVAILABLE]"), "available"),
            None => (output.emoji("🔒", "[NO-ACCESS]"), "no access"),
        };
        println!(
            "{} {} ({}/{}) - {}",
            icon, vault.display_name, vault.remote_owner, vault.remote_repo, status
        );
    }

    println!();
    println!(
        "{} accessible vault(s) of {} registered",
        accessible.len(),
        vault_registry.len()
    );
    Ok(())
}
