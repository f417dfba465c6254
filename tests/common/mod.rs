//! Shared scripted collaborators for the integration suites.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use url::Url;

use vault_setup::error::{Error, Result};
use vault_setup::git::GitTransport;
use vault_setup::plugins::AssetFetcher;

/// Scripted git transport.
///
/// Clones materialize a minimal checkout (a `.git` directory plus one
/// content file); any operation touching a repo in the `fail` set errors.
pub struct FakeGit {
    fail: HashSet<String>,
    pub log: RefCell<Vec<String>>,
}

impl FakeGit {
    pub fn new(fail: &[&str]) -> Self {
        Self {
            fail: fail.iter().map(|s| s.to_string()).collect(),
            log: RefCell::new(Vec::new()),
        }
    }

    fn check(&self, repo: &str, op: &str) -> Result<()> {
        self.log.borrow_mut().push(format!("{} {}", op, repo));
        if self.fail.contains(repo) {
            return Err(Error::GitCommand {
                command: op.to_string(),
                vault: repo.to_string(),
                stderr: "simulated transport failure".to_string(),
            });
        }
        Ok(())
    }
}

impl GitTransport for FakeGit {
    fn clone_branch(&self, _owner: &str, repo: &str, dest: &Path, _branch: &str) -> Result<()> {
        self.check(repo, "clone")?;
        fs::create_dir_all(dest.join(".git")).unwrap();
        fs::write(dest.join("README.md"), format!("# {}\n", repo)).unwrap();
        Ok(())
    }

    fn fetch(&self, workdir: &Path, _remote: &str) -> Result<()> {
        let repo = workdir.file_name().unwrap().to_string_lossy().into_owned();
        self.check(&repo, "fetch")
    }

    fn reset_hard(&self, workdir: &Path, _refname: &str) -> Result<()> {
        let repo = workdir.file_name().unwrap().to_string_lossy().into_owned();
        self.check(&repo, "reset")
    }
}

/// Scripted asset fetcher.
///
/// In `all_plugins` mode it serves `main.js`, `manifest.json` and
/// `styles.css` for any release-asset URL; in `empty` mode every fetch
/// fails. Every call is counted, so tests can assert that idempotent runs
/// download nothing.
pub struct FakeFetcher {
    serve: bool,
    count: Cell<usize>,
}

impl FakeFetcher {
    pub fn all_plugins() -> Self {
        Self {
            serve: true,
            count: Cell::new(0),
        }
    }

    pub fn empty() -> Self {
        Self {
            serve: false,
            count: Cell::new(0),
        }
    }

    pub fn requests(&self) -> usize {
        self.count.get()
    }
}

impl AssetFetcher for FakeFetcher {
    fn fetch(&self, url: &Url) -> Result<Vec<u8>> {
        self.count.set(self.count.get() + 1);
        if !self.serve {
            return Err(Error::Network {
                url: url.to_string(),
                message: "404 Not Found".to_string(),
            });
        }
        let asset = url.path_segments().and_then(|s| s.last()).unwrap_or("");
        match asset {
            "main.js" => Ok(b"module.exports = {};".to_vec()),
            "manifest.json" => Ok(b"{\"minAppVersion\": \"1.0.0\"}".to_vec()),
            "styles.css" => Ok(b".plugin {}".to_vec()),
            other => Err(Error::Network {
                url: url.to_string(),
                message: format!("unknown asset {}", other),
            }),
        }
    }
}
