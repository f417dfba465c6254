//! # Error Suggestions
//!
//! Helper functions for generating helpful error messages with hints.
//! Errors at the command layer should tell users what went wrong AND how
//! to fix it.

use std::path::Path;

/// Generate an error for when the registry file is not found.
pub fn registry_not_found(path: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "Registry file not found: {path}\n\n\
         hint: Omit --registry to use the built-in vault registry\n\
         hint: Set VAULT_SETUP_REGISTRY to a readable YAML file",
        path = path.display()
    )
}

/// Generate an error for a `--vault` name that matches no accessible vault.
///
/// Lists the valid display names so the user doesn't have to guess.
pub fn unknown_vault_name(name: &str, valid: &[String]) -> anyhow::Error {
    anyhow::anyhow!(
        "No accessible vault named '{name}'\n\n\
         hint: Valid names are: {names}\n\
         hint: Names match the canonical display name, without the '(installed)' suffix",
        name = name,
        names = valid.join(", ")
    )
}
