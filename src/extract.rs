//! Repository file extraction.
//!
//! [`RepoExtractor`] composes the cache, path filter, and binary sniffer
//! into a lazy stream of [`ExtractedFile`] records. Each [`extract`]
//! call re-ensures the cache and re-walks it, so the stream is restartable
//! by calling again; traversal order follows the filesystem walk and is
//! not part of the contract.
//!
//! Per-file problems (unreadable entries, oversized files, invalid UTF-8,
//! binary-looking content) are expected conditions and are skipped, not
//! propagated. Only the cache fetch itself can fail an extraction.
//!
//! [`extract`]: RepoExtractor::extract

use anyhow::Result;
use std::path::PathBuf;
use walkdir::{DirEntry, WalkDir};

use crate::path_filter::PathFilter;
use crate::repo_cache::{RepoCache, RepoSource};
use crate::text_sniff::{looks_binary, DEFAULT_BINARY_THRESHOLD};

/// One text file surviving all extraction filters.
#[derive(Debug, Clone)]
pub struct ExtractedFile {
    pub repo_url: String,
    pub relative_path: String,
    pub content: String,
    pub size_bytes: u64,
}

/// Walks cached repositories and yields filtered text files.
pub struct RepoExtractor {
    cache: RepoCache,
    filter: PathFilter,
    max_size_bytes: u64,
    verbose: bool,
}

impl RepoExtractor {
    pub fn new(cache: RepoCache, filter: PathFilter, max_size_bytes: u64) -> Self {
        Self {
            cache,
            filter,
            max_size_bytes,
            verbose: false,
        }
    }

    /// Itemize per-file skip reasons on stderr. Off by default; skipped
    /// files otherwise surface only in aggregate counts.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Ensure the cache slot for `source` is current, then stream matching
    /// files. Fails only if the underlying fetch fails.
    pub fn extract(&self, source: &RepoSource) -> Result<ExtractIter<'_>> {
        let root = self.cache.ensure(source)?;
        let walker = WalkDir::new(&root)
            .into_iter()
            .filter_entry(not_git_dir as fn(&DirEntry) -> bool);
        Ok(ExtractIter {
            walker,
            root,
            repo_url: source.url.clone(),
            filter: &self.filter,
            max_size_bytes: self.max_size_bytes,
            verbose: self.verbose,
        })
    }
}

fn not_git_dir(entry: &DirEntry) -> bool {
    entry.file_name() != ".git"
}

/// Lazy single-pass iterator over one repository's surviving files.
pub struct ExtractIter<'a> {
    walker: walkdir::FilterEntry<walkdir::IntoIter, fn(&DirEntry) -> bool>,
    root: PathBuf,
    repo_url: String,
    filter: &'a PathFilter,
    max_size_bytes: u64,
    verbose: bool,
}

impl ExtractIter<'_> {
    // Named to avoid resolving against `Iterator::skip` inside `next`.
    fn note_skip(&self, relative_path: &str, reason: &str) {
        if self.verbose {
            eprintln!("  skip {} ({})", relative_path, reason);
        }
    }
}

impl Iterator for ExtractIter<'_> {
    type Item = ExtractedFile;

    fn next(&mut self) -> Option<ExtractedFile> {
        loop {
            let entry = match self.walker.next()? {
                Ok(entry) => entry,
                // Unreadable directory entries (permissions, races) are skipped.
                Err(_) => continue,
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let relative = path.strip_prefix(&self.root).unwrap_or(path);
            let rel_str = relative.to_string_lossy().to_string();

            // Exclusions win over inclusions.
            if self.filter.is_excluded(&rel_str) {
                self.note_skip(&rel_str, "excluded");
                continue;
            }
            if !self.filter.is_included(&rel_str) {
                continue;
            }

            let size = match entry.metadata() {
                Ok(meta) => meta.len(),
                Err(_) => continue,
            };
            if size > self.max_size_bytes {
                self.note_skip(&rel_str, "over size limit");
                continue;
            }

            let bytes = match std::fs::read(path) {
                Ok(bytes) => bytes,
                Err(_) => {
                    self.note_skip(&rel_str, "unreadable");
                    continue;
                }
            };
            let content = match String::from_utf8(bytes) {
                Ok(content) => content,
                Err(_) => {
                    self.note_skip(&rel_str, "not valid UTF-8");
                    continue;
                }
            };
            if looks_binary(&content, DEFAULT_BINARY_THRESHOLD) {
                self.note_skip(&rel_str, "looks binary");
                continue;
            }

            return Some(ExtractedFile {
                repo_url: self.repo_url.clone(),
                relative_path: rel_str,
                content,
                size_bytes: size,
            });
        }
    }
}
