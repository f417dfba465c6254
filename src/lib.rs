//! # Vault Setup Library
//!
//! This library provides the core functionality for provisioning a curated
//! set of private, Git-backed Obsidian vaults on a developer machine. It is
//! designed to be used by the `vault-setup` command-line tool but can also
//! be integrated into other bootstrap tooling.
//!
//! ## Core Concepts
//!
//! - **Registry (`registry`, `defaults`)**: The typed, compiled-in list of
//!   vault repositories and the fixed plugin manifest, optionally replaced
//!   by a YAML registry file.
//! - **Access Probing (`access`)**: Filters the registry to the vaults the
//!   current GitHub credentials can actually read.
//! - **Selection (`select`)**: Turns the accessible list into the
//!   user-confirmed subset; display names are annotated with an
//!   "(installed)" suffix and matched back exactly.
//! - **Synchronization (`sync`, `git`)**: Clones missing vaults, repairs
//!   existing ones by hard-resetting to the remote tip, and recovers from
//!   corrupt partial clones. Failures are isolated per vault.
//! - **Plugin Installation (`plugins`, `merge`)**: Installs a fixed plugin
//!   set idempotently and merges sync/tooling configuration into
//!   vault-local JSON state without disturbing keys it does not own.
//! - **Host Registration (`host`)**: Upserts the provisioned vault paths
//!   into Obsidian's global state file under stable content-addressed ids,
//!   preserving everything else in the file.
//!
//! ## Execution Flow
//!
//! The `pipeline` module composes the phases after selection:
//!
//! 1. **Probe**: Determine which registered vaults are readable.
//! 2. **Select**: Ask the user (or honor `--all`/`--vault`).
//! 3. **Synchronize**: Clone or repair each selected vault, in order.
//! 4. **Install**: Plugins and config merges for each synced vault.
//! 5. **Register**: One locked read-modify-write of the host state file.
//!
//! Every durable file this library touches is externally owned, so all
//! writes follow the same discipline: parse the whole document, mutate
//! only the keys we own, write the whole document back.

pub mod access;
pub mod defaults;
pub mod error;
pub mod git;
pub mod host;
pub mod merge;
pub mod output;
pub mod pipeline;
pub mod plugins;
pub mod registry;
pub mod select;
pub mod suggestions;
pub mod sync;
