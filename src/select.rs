//! Vault selection.
//!
//! The selector turns the accessible-vault list into the subset the user
//! actually wants provisioned. Labels shown to the user are the canonical
//! display names, annotated with an `" (installed)"` suffix for vaults that
//! already have a local checkout; matching a chosen label back to its
//! descriptor strips the annotation first and then requires an exact match
//! on the canonical display name.
//!
//! An empty selection — zero boxes ticked, or Esc — is a successful no-op,
//! not an error. The caller ends the run with exit code 0.

use dialoguer::{theme::ColorfulTheme, MultiSelect};

use crate::error::Result;
use crate::registry::AccessibleVault;

/// Suffix appended to the display name of vaults with a local checkout.
pub const INSTALLED_SUFFIX: &str = " (installed)";

/// Label shown in the picker for one vault.
pub fn annotate(vault: &AccessibleVault) -> String {
    if vault.already_installed {
        format!("{}{}", vault.descriptor.display_name, INSTALLED_SUFFIX)
    } else {
        vault.descriptor.display_name.clone()
    }
}

/// Strip the `" (installed)"` annotation from a picker label, yielding the
/// canonical display name.
pub fn strip_annotation(label: &str) -> &str {
    label.strip_suffix(INSTALLED_SUFFIX).unwrap_or(label)
}

/// Match picker labels back to their vaults.
///
/// Matching is exact-string on the canonical display name; labels that
/// match nothing are dropped. Output preserves the accessible-list order.
pub fn match_labels<'a>(
    accessible: &'a [AccessibleVault],
    labels: &[String],
) -> Vec<&'a AccessibleVault> {
    let chosen: Vec<&str> = labels.iter().map(|l| strip_annotation(l)).collect();
    accessible
        .iter()
        .filter(|v| chosen.contains(&v.descriptor.display_name.as_str()))
        .collect()
}

/// Interactively pick a subset of the accessible vaults.
///
/// Already-installed vaults are pre-checked, so plain Enter re-provisions
/// (repairs) everything that is already on disk. Returns an empty vec when
/// the user cancels or picks nothing.
pub fn pick_interactive(accessible: &[AccessibleVault]) -> Result<Vec<AccessibleVault>> {
    let labels: Vec<String> = accessible.iter().map(annotate).collect();
    let defaults: Vec<bool> = accessible.iter().map(|v| v.already_installed).collect();

    let theme = ColorfulTheme::default();
    let picked = MultiSelect::with_theme(&theme)
        .with_prompt("Select vaults to install (space toggles, enter confirms)")
        .items(&labels)
        .defaults(&defaults)
        .interact_opt()
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    let indices = match picked {
        Some(indices) => indices,
        None => return Ok(Vec::new()),
    };

    Ok(indices
        .into_iter()
        .map(|i| accessible[i].clone())
        .collect())
}
