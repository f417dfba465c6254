//! # Error Handling
//!
//! This module defines the centralized error handling mechanism for the
//! `vault-setup` application. It uses the `thiserror` library to create a
//! comprehensive `Error` enum that covers all anticipated failure modes,
//! providing clear and descriptive error messages.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum that represents all possible errors that can
//!   occur within the application. Each variant corresponds to a specific
//!   type of error and includes contextual information to aid in debugging.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`, used
//!   throughout the application to simplify function signatures and ensure
//!   type safety.
//!
//! ## Propagation policy
//!
//! Per-vault failures during synchronization and per-plugin failures during
//! installation are *not* represented as `Error` values — they are recorded
//! as outcomes (see `sync::SyncOutcome`) or warnings and reported in the
//! end-of-run summary, so one broken vault never halts its siblings. The
//! variants here are reserved for conditions that end the run: an empty
//! accessible set, a fully-failed batch, and host state file corruption.
//!
//! An empty selection is not an error at all; the run simply has nothing to
//! do and exits successfully.

use thiserror::Error;

/// Main error type for vault-setup operations
#[derive(Error, Debug)]
pub enum Error {
    /// An error occurred while parsing or validating a vault registry file.
    ///
    /// This error includes the specific parsing issue and optionally a hint
    /// about how to fix it.
    #[error("Registry error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    Registry {
        message: String,
        /// Optional hint for how to fix the registry issue
        hint: Option<String>,
    },

    /// None of the registered vault repositories are readable with the
    /// current credentials.
    #[error(
        "No accessible vault repositories found\n  \
         hint: Ask a vault administrator to grant your GitHub account read access\n  \
         hint: Check that `gh auth status` reports a logged-in account or set GITHUB_TOKEN"
    )]
    NoAccessibleVaults,

    /// An error occurred while executing a Git command.
    ///
    /// Includes the vault the command ran for, the subcommand, and the
    /// captured stderr.
    #[error("Git command failed for {vault}: git {command} - {stderr}")]
    GitCommand {
        command: String,
        vault: String,
        stderr: String,
    },

    /// Every selected vault failed to synchronize.
    ///
    /// Carries one `(vault, reason)` pair per failure so the caller can
    /// print a full account of what went wrong.
    #[error("All {} selected vault(s) failed to sync:\n{}", failures.len(), failures.iter().map(|(v, r)| format!("  {} - {}", v, r)).collect::<Vec<_>>().join("\n"))]
    AllSyncsFailed { failures: Vec<(String, String)> },

    /// An error occurred during a network operation.
    #[error("Network operation error: {url} - {message}")]
    Network { url: String, message: String },

    /// An error occurred during a JSON read-modify-write operation.
    #[error("Merge operation error: {path} - {message}")]
    Merge { path: String, message: String },

    /// The host application's state file exists but could not be read.
    ///
    /// This is fatal: continuing would risk writing back a state object
    /// derived from a partial read.
    #[error("Host state file unreadable: {path} - {message}")]
    HostStateUnreadable { path: String, message: String },

    /// The host application's state file could not be written.
    #[error("Host state file unwritable: {path} - {message}")]
    HostStateUnwritable { path: String, message: String },

    /// Another process holds the advisory lock on the host state file.
    #[error(
        "Host state file locked: {path}\n  \
         hint: Another vault-setup run may be in progress; retry once it finishes\n  \
         hint: Remove the stale .lock file if no other run is active"
    )]
    HostStateLocked { path: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON parsing error, wrapped from `serde_json::Error`.
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A URL parsing error, wrapped from `url::ParseError`.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
