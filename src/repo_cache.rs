//! Local mirror cache for remote git repositories.
//!
//! Each `(url, branch)` pair owns one cache slot under the cache root. The
//! first [`RepoCache::ensure`] call performs a shallow single-branch clone;
//! later calls fetch the branch and hard-reset the working tree to
//! `origin/<branch>`. Local modifications in a slot are discarded on
//! update — the cache is never the source of truth.
//!
//! The git invocation sits behind the [`GitFetcher`] trait so the pipeline
//! can be exercised without network or process access. [`CommandGit`] is
//! the production implementation.

use anyhow::{bail, Context, Result};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

/// One remote repository to extract from.
#[derive(Debug, Clone)]
pub struct RepoSource {
    pub url: String,
    pub branch: String,
}

impl RepoSource {
    pub fn new(url: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            branch: branch.into(),
        }
    }
}

/// Version-control access used by [`RepoCache`].
///
/// Any non-`Ok` return is fatal for the repository being extracted; the
/// cache performs no retries (retry policy belongs to the caller).
pub trait GitFetcher {
    /// Shallow single-branch clone of `url` at `branch` into `dest`.
    fn clone_shallow(&self, url: &str, branch: &str, dest: &Path) -> Result<()>;

    /// Fetch `branch` from origin and hard-reset the tree in `repo_dir`
    /// to `origin/<branch>`.
    fn update(&self, repo_dir: &Path, branch: &str) -> Result<()>;
}

/// [`GitFetcher`] backed by the `git` binary.
#[derive(Debug, Default)]
pub struct CommandGit;

impl CommandGit {
    /// A `git` command with ambient configuration neutralized. Global or
    /// system config can rewrite HTTPS URLs to SSH (and then hang on a key
    /// prompt); pointing both at /dev/null keeps fetches deterministic and
    /// non-interactive.
    fn git() -> Command {
        let mut cmd = Command::new("git");
        cmd.env("GIT_CONFIG_GLOBAL", "/dev/null");
        cmd.env("GIT_CONFIG_SYSTEM", "/dev/null");
        cmd.env("GIT_TERMINAL_PROMPT", "0");
        cmd
    }

    fn run(mut cmd: Command, what: &str) -> Result<()> {
        let output = cmd
            .output()
            .with_context(|| format!("Failed to execute '{}'. Is git installed?", what))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("{} failed: {}", what, stderr.trim());
        }
        Ok(())
    }
}

impl GitFetcher for CommandGit {
    fn clone_shallow(&self, url: &str, branch: &str, dest: &Path) -> Result<()> {
        std::fs::create_dir_all(dest)
            .with_context(|| format!("Failed to create cache slot: {}", dest.display()))?;

        let mut cmd = Self::git();
        cmd.args(["clone", "--depth", "1", "--branch", branch, "--single-branch"]);
        cmd.arg(url);
        cmd.arg(dest);
        Self::run(cmd, "git clone")
    }

    fn update(&self, repo_dir: &Path, branch: &str) -> Result<()> {
        let mut fetch = Self::git();
        fetch.args(["fetch", "origin", branch]).current_dir(repo_dir);
        Self::run(fetch, "git fetch")?;

        let remote_ref = format!("origin/{}", branch);
        let mut reset = Self::git();
        reset
            .args(["reset", "--hard", &remote_ref])
            .current_dir(repo_dir);
        Self::run(reset, "git reset")
    }
}

/// On-disk mirror cache. Slots are created on first use and mutated in
/// place afterwards; nothing here ever deletes a slot.
#[derive(Clone)]
pub struct RepoCache {
    root: PathBuf,
    fetcher: Arc<dyn GitFetcher>,
}

impl RepoCache {
    /// Cache rooted at `root`, fetching with the `git` binary.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_fetcher(root, Arc::new(CommandGit))
    }

    /// Cache with an injected fetcher (tests substitute a double here).
    pub fn with_fetcher(root: impl Into<PathBuf>, fetcher: Arc<dyn GitFetcher>) -> Self {
        Self {
            root: root.into(),
            fetcher,
        }
    }

    /// Ensure the repository at `source` is present and up to date; returns
    /// the slot directory. Idempotent and safe to call repeatedly.
    pub fn ensure(&self, source: &RepoSource) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.root)
            .with_context(|| format!("Failed to create cache root: {}", self.root.display()))?;

        let slot = self.root.join(cache_key(&source.url, &source.branch));
        if slot.join(".git").exists() {
            self.fetcher.update(&slot, &source.branch)?;
        } else {
            self.fetcher.clone_shallow(&source.url, &source.branch, &slot)?;
        }
        Ok(slot)
    }
}

/// Slot directory name for a `(url, branch)` pair.
///
/// The repository name is kept as a readable prefix; uniqueness comes from
/// a short hash over the full URL and branch, so two different URLs that
/// share a trailing `org/name` never collide.
pub fn cache_key(url: &str, branch: &str) -> String {
    let name = url
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or("repo")
        .trim_end_matches(".git");

    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    hasher.update([0]);
    hasher.update(branch.as_bytes());
    let digest = format!("{:x}", hasher.finalize());

    format!("{}-{}", name, &digest[..12])
}
