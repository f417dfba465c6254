//! Host application registration.
//!
//! Obsidian keeps its known-vault list in a global `obsidian.json`:
//!
//! ```json
//! { "vaults": { "5a1f9c0d2b3e4a6f": { "path": "/home/u/vaults/team-notes",
//!   "ts": 1712345678901, "open": true } } }
//! ```
//!
//! This module upserts the provisioned vault paths into that file. The
//! contract is strict because the file is owned by another application:
//!
//! - the whole document is read once and written once per run;
//! - entries are never deleted, unknown top-level keys are preserved, and
//!   key order survives the round trip;
//! - at most one entry exists per distinct absolute path — re-registering
//!   updates the timestamp instead of duplicating;
//! - ids are a 16-hex-char digest of the canonical path, falling back to
//!   random ids on (rare) collision with a different path;
//! - a missing or malformed file is an empty state, but an unreadable or
//!   unwritable file aborts the run — continuing would risk corrupting
//!   state the user cannot easily repair.
//!
//! The read-modify-write is wrapped in an advisory lock file so two
//! concurrent runs cannot interleave their writes.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde_json::{json, Value as JsonValue};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

/// Stable identifier for a vault path: first 16 hex characters of the
/// SHA-256 digest of the canonical path string.
pub fn vault_id(path: &Path) -> String {
    let canonical = canonical_string(path);
    let digest = Sha256::digest(canonical.as_bytes());
    hex::encode(&digest[..8])
}

/// Fresh random 16-hex-char id, used when the derived id is already taken
/// by a different path.
fn random_id() -> String {
    let mut bytes = [0u8; 8];
    rand::fill(&mut bytes[..]);
    hex::encode(bytes)
}

fn canonical_string(path: &Path) -> String {
    fs::canonicalize(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .to_string_lossy()
        .into_owned()
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Load the host state file.
///
/// Missing file and unparseable content both yield the empty state — the
/// host may simply never have run yet. An I/O failure reading an *existing*
/// file is fatal.
pub fn load_state(path: &Path) -> Result<JsonValue> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(serde_json::from_str(&content).unwrap_or_else(|_| empty_state())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(empty_state()),
        Err(e) => Err(Error::HostStateUnreadable {
            path: path.display().to_string(),
            message: e.to_string(),
        }),
    }
}

fn empty_state() -> JsonValue {
    json!({ "vaults": {} })
}

/// Write the whole state object back.
pub fn save_state(path: &Path, state: &JsonValue) -> Result<()> {
    let unwritable = |message: String| Error::HostStateUnwritable {
        path: path.display().to_string(),
        message,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| unwritable(e.to_string()))?;
    }
    let content = serde_json::to_string(state)?;
    fs::write(path, content).map_err(|e| unwritable(e.to_string()))
}

/// Upsert `vault_path` into the parsed state object.
///
/// Returns the entry's id. Existing same-path entries are touched in place;
/// new paths get a derived id, probing random ids past a collision.
pub fn register_path(state: &mut JsonValue, vault_path: &Path) -> String {
    let canonical = canonical_string(vault_path);
    let ts = now_millis();

    if !state.is_object() {
        *state = empty_state();
    }
    let vaults = state
        .as_object_mut()
        .expect("state is an object")
        .entry("vaults")
        .or_insert_with(|| json!({}));
    if !vaults.is_object() {
        *vaults = json!({});
    }
    let vaults = vaults.as_object_mut().expect("vaults is an object");

    // Same path already registered: touch it, never duplicate.
    if let Some((id, entry)) = vaults
        .iter_mut()
        .find(|(_, entry)| entry.get("path").and_then(JsonValue::as_str) == Some(&canonical))
    {
        entry["ts"] = json!(ts);
        entry["open"] = json!(true);
        return id.clone();
    }

    let mut id = vault_id(vault_path);
    while vaults.contains_key(&id) {
        id = random_id();
    }
    vaults.insert(
        id.clone(),
        json!({ "path": canonical, "ts": ts, "open": true }),
    );
    id
}

/// Register a batch of provisioned vault paths.
///
/// One locked read-modify-write against the state file for the whole batch.
/// Returns the ids in input order.
pub fn register_batch(state_path: &Path, vault_paths: &[PathBuf]) -> Result<Vec<String>> {
    let _lock = StateLock::acquire(state_path)?;

    let mut state = load_state(state_path)?;
    let ids = vault_paths
        .iter()
        .map(|p| register_path(&mut state, p))
        .collect();
    save_state(state_path, &state)?;
    Ok(ids)
}

/// Advisory lock scoped to one host state file.
///
/// Created as a sibling `<file>.lock` with `create_new`, so exactly one
/// process wins. Acquisition retries briefly; a lock still held after the
/// bounded wait is surfaced to the user instead of being broken.
pub struct StateLock {
    lock_path: PathBuf,
}

const LOCK_ATTEMPTS: u32 = 10;
const LOCK_RETRY_DELAY: Duration = Duration::from_millis(150);

impl StateLock {
    pub fn acquire(state_path: &Path) -> Result<Self> {
        let lock_path = lock_path_for(state_path);
        if let Some(parent) = lock_path.parent() {
            fs::create_dir_all(parent)?;
        }

        for attempt in 0..LOCK_ATTEMPTS {
            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&lock_path)
            {
                Ok(_) => return Ok(Self { lock_path }),
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    if attempt + 1 < LOCK_ATTEMPTS {
                        std::thread::sleep(LOCK_RETRY_DELAY);
                    }
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(Error::HostStateLocked {
            path: state_path.display().to_string(),
        })
    }
}

impl Drop for StateLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
    }
}

fn lock_path_for(state_path: &Path) -> PathBuf {
    let mut name = state_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "state".to_string());
    name.push_str(".lock");
    state_path.with_file_name(name)
}
