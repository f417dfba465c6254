//! Provision command implementation
//!
//! The provision command executes the full pipeline:
//! 1. Probe which registered vaults the current credentials can read
//! 2. Let the user pick a subset (or honor --all / --vault)
//! 3. Clone or repair each selected vault, one at a time
//! 4. Install the fixed plugin set and merge vault-local configuration
//! 5. Register the provisioned paths in Obsidian's global state file
//!
//! Per-vault failures never abort the batch; the run ends with a summary
//! of what succeeded and what did not.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Args;
use dialoguer::{theme::ColorfulTheme, Confirm};
use indicatif::{ProgressBar, ProgressStyle};
use url::Url;

use vault_setup::access::{probe_registry, GitHubProber};
use vault_setup::defaults;
use vault_setup::git::SystemGit;
use vault_setup::output::OutputConfig;
use vault_setup::pipeline::{provision_selected, ProvisionContext, ProvisionReport};
use vault_setup::plugins::HttpFetcher;
use vault_setup::registry::{self, AccessibleVault, VaultDescriptor};
use vault_setup::select;
use vault_setup::suggestions;
use vault_setup::sync::SyncOutcome;

/// Arguments for the provision command
#[derive(Args, Debug)]
pub struct ProvisionArgs {
    /// Parent directory for vault checkouts
    #[arg(long, value_name = "PATH", env = "VAULT_SETUP_ROOT")]
    pub install_root: Option<PathBuf>,

    /// Registry file overriding the built-in vault list
    #[arg(long, value_name = "PATH", env = "VAULT_SETUP_REGISTRY")]
    pub registry: Option<PathBuf>,

    /// Obsidian state file to register vaults in
    #[arg(long, value_name = "PATH")]
    pub host_state: Option<PathBuf>,

    /// Select every accessible vault without prompting
    #[arg(long)]
    pub all: bool,

    /// Select a vault by display name (repeatable, skips the picker)
    #[arg(long = "vault", value_name = "NAME")]
    pub vaults: Vec<String>,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Execute the provision command
pub fn execute(args: ProvisionArgs, output: &OutputConfig) -> Result<()> {
    let install_root = args
        .install_root
        .clone()
        .unwrap_or_else(defaults::default_install_root);
    let host_state_path = args
        .host_state
        .clone()
        .unwrap_or_else(defaults::default_host_state_path);
    let vault_registry = load_registry(args.registry.as_deref())?;

    println!("{} Vault Setup", output.emoji("🔐", "[VAULT-SETUP]"));
    println!();

    // Phase 1: access probing
    let probing = spinner(output, "Checking vault access...");
    let prober = GitHubProber::new()?;
    let accessible = match probe_registry(&prober, &vault_registry, &install_root) {
        Ok(accessible) => {
            probing.finish_and_clear();
            accessible
        }
        Err(e) => {
            probing.finish_and_clear();
            return Err(e.into());
        }
    };
    println!(
        "{} {} of {} registered vault(s) accessible",
        output.emoji("🔍", "[ACCESS]"),
        accessible.len(),
        vault_registry.len()
    );

    // Phase 2: selection
    let selection = select_vaults(&args, &accessible)?;
    if selection.is_empty() {
        println!("Nothing selected - nothing to do.");
        return Ok(());
    }
    if !confirm_batch(&args, output, &selection)? {
        println!("Aborted - no changes made.");
        return Ok(());
    }

    // Phases 3-5: sync, install, register
    let transport = SystemGit;
    let fetcher = HttpFetcher::new()?;
    let ctx = ProvisionContext {
        transport: &transport,
        fetcher: &fetcher,
        asset_base: Url::parse("https://github.com")?,
        plugin_manifest: defaults::plugin_manifest(),
        install_root: &install_root,
        host_state_path: &host_state_path,
    };

    let working = spinner(
        output,
        &format!("Provisioning {} vault(s)...", selection.len()),
    );
    let result = provision_selected(&ctx, &selection);
    working.finish_and_clear();

    let report = result?;
    print_summary(output, &report);

    Ok(())
}

fn load_registry(path: Option<&std::path::Path>) -> Result<Vec<VaultDescriptor>> {
    match path {
        Some(path) if !path.exists() => Err(suggestions::registry_not_found(path)),
        Some(path) => Ok(registry::from_file(path)?),
        None => Ok(defaults::builtin_registry()),
    }
}

/// Resolve the confirmed selection from flags or the interactive picker.
fn select_vaults(
    args: &ProvisionArgs,
    accessible: &[AccessibleVault],
) -> Result<Vec<VaultDescriptor>> {
    let chosen: Vec<AccessibleVault> = if !args.vaults.is_empty() {
        let valid: Vec<String> = accessible
            .iter()
            .map(|v| v.descriptor.display_name.clone())
            .collect();
        for name in &args.vaults {
            if !valid.iter().any(|v| v == select::strip_annotation(name)) {
                return Err(suggestions::unknown_vault_name(name, &valid));
            }
        }
        select::match_labels(accessible, &args.vaults)
            .into_iter()
            .cloned()
            .collect()
    } else if args.all {
        accessible.to_vec()
    } else {
        select::pick_interactive(accessible)?
    };

    Ok(chosen.into_iter().map(|v| v.descriptor).collect())
}

/// Ask before a non-interactive `--all` run touches every vault; the
/// interactive picker and explicit `--vault` flags are confirmation enough.
fn confirm_batch(
    args: &ProvisionArgs,
    output: &OutputConfig,
    selection: &[VaultDescriptor],
) -> Result<bool> {
    if args.yes || !args.all || !console::Term::stderr().features().is_attended() {
        return Ok(true);
    }

    println!();
    for vault in selection {
        println!("  {} {}", output.emoji("📦", "-"), vault.display_name);
    }
    let confirmed = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(format!("Provision {} vault(s)?", selection.len()))
        .default(true)
        .interact()?;
    Ok(confirmed)
}

fn spinner(output: &OutputConfig, message: &str) -> ProgressBar {
    let pb = if output.use_color {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("\x1b[33m{spinner}\x1b[0m {wide_msg}")
                .unwrap()
                .tick_strings(&["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"]),
        );
        pb.enable_steady_tick(Duration::from_millis(80));
        pb
    } else {
        ProgressBar::hidden()
    };
    pb.set_message(message.to_string());
    pb
}

fn print_summary(output: &OutputConfig, report: &ProvisionReport) {
    println!();
    for vault in &report.vaults {
        match &vault.outcome {
            SyncOutcome::Installed => {
                println!(
                    "{} {} installed ({} plugin(s))",
                    output.emoji("✔", "[OK]"),
                    vault.display_name,
                    vault.plugins.len()
                );
            }
            SyncOutcome::Repaired => {
                println!(
                    "{} {} repaired ({} plugin(s))",
                    output.emoji("✔", "[OK]"),
                    vault.display_name,
                    vault.plugins.len()
                );
            }
            SyncOutcome::Failed(reason) => {
                println!(
                    "{} {} failed: {}",
                    output.emoji("✘", "[FAIL]"),
                    vault.display_name,
                    reason
                );
            }
        }
    }

    println!();
    if report.failed() == 0 {
        println!(
            "{} Provisioned {} vault(s) and registered them with Obsidian",
            output.emoji("✅", "[DONE]"),
            report.succeeded()
        );
    } else {
        println!(
            "{} Provisioned {} vault(s), {} failed - failed vaults were not registered",
            output.emoji("⚠️", "[PARTIAL]"),
            report.succeeded(),
            report.failed()
        );
    }
}
