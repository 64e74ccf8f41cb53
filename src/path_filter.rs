//! Include/exclude path filtering for repository extraction.
//!
//! Patterns are glob-style and evaluated against the path relative to the
//! repository root. Two widening rules keep user configuration short:
//!
//! - A pattern also matches after stripping its leading any-depth wildcard
//!   prefix, so `**/*.rs` selects `lib.rs` at the root as well as nested
//!   files.
//! - An exclude pattern additionally matches if any single path segment
//!   matches it after stripping wildcard/slash padding, so a bare `vendor`
//!   (or `**/vendor/**`) drops a `vendor` directory at any depth.
//!
//! Exclusion always wins: a path matching any exclude pattern is dropped
//! even when it also matches an include pattern.

use anyhow::Result;
use globset::{Glob, GlobMatcher};

/// Compiled include/exclude filter. Build once per extraction run.
#[derive(Debug)]
pub struct PathFilter {
    includes: Vec<GlobMatcher>,
    excludes: Vec<GlobMatcher>,
    exclude_segments: Vec<GlobMatcher>,
}

impl PathFilter {
    pub fn new(include_patterns: &[String], exclude_patterns: &[String]) -> Result<Self> {
        let mut includes = Vec::new();
        for pattern in include_patterns {
            push_with_stripped_prefix(&mut includes, pattern)?;
        }

        let mut excludes = Vec::new();
        let mut exclude_segments = Vec::new();
        for pattern in exclude_patterns {
            push_with_stripped_prefix(&mut excludes, pattern)?;
            let segment = pattern.trim_matches(|c| c == '*' || c == '/');
            if !segment.is_empty() {
                exclude_segments.push(Glob::new(segment)?.compile_matcher());
            }
        }

        Ok(Self {
            includes,
            excludes,
            exclude_segments,
        })
    }

    /// True if the relative path matches any include pattern.
    pub fn is_included(&self, relative_path: &str) -> bool {
        self.includes.iter().any(|m| m.is_match(relative_path))
    }

    /// True if the relative path, or any one of its segments, matches an
    /// exclude pattern.
    pub fn is_excluded(&self, relative_path: &str) -> bool {
        if self.excludes.iter().any(|m| m.is_match(relative_path)) {
            return true;
        }
        relative_path
            .split('/')
            .any(|part| self.exclude_segments.iter().any(|m| m.is_match(part)))
    }

    /// Full decision for one path: excluded paths are dropped before
    /// include patterns are consulted.
    pub fn selects(&self, relative_path: &str) -> bool {
        !self.is_excluded(relative_path) && self.is_included(relative_path)
    }
}

/// Compile `pattern` plus, when different, the variant with its leading
/// `*`/`/` run removed (so any-depth patterns also match flattened paths).
fn push_with_stripped_prefix(matchers: &mut Vec<GlobMatcher>, pattern: &str) -> Result<()> {
    matchers.push(Glob::new(pattern)?.compile_matcher());
    let stripped = pattern.trim_start_matches(|c| c == '*' || c == '/');
    if !stripped.is_empty() && stripped != pattern {
        matchers.push(Glob::new(stripped)?.compile_matcher());
    }
    Ok(())
}
