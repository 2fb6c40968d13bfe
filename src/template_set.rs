// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Template file resolution.
//!
//! A package's templates are split into ordered groups (upstream manifests,
//! overlays, local templates). Each group is a glob pattern relative to the
//! package's config directory; the matches of every group are concatenated,
//! in group order, into the file list handed to the renderer.

use crate::errors::HarnessError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Resolves `patterns` against `config_dir` into one ordered file list.
///
/// Matches within a group are sorted alphabetically (the order `glob`
/// yields them in). Directories that happen to match a pattern are skipped.
///
/// # Errors
///
/// Returns [`HarnessError::InvalidGlob`] for a malformed pattern and
/// [`HarnessError::GlobResolution`] if a matched path cannot be inspected.
///
/// # Example
///
/// ```rust,no_run
/// use external_dns_addon::constants::TEMPLATE_GLOB_PATTERNS;
/// use external_dns_addon::template_set::resolve_template_files;
/// use std::path::Path;
///
/// let files = resolve_template_files(Path::new("bundle/config"), &TEMPLATE_GLOB_PATTERNS)?;
/// assert!(!files.is_empty());
/// # Ok::<(), external_dns_addon::errors::HarnessError>(())
/// ```
pub fn resolve_template_files<S: AsRef<str>>(
    config_dir: &Path,
    patterns: &[S],
) -> Result<Vec<PathBuf>, HarnessError> {
    // The directory itself may contain glob metacharacters
    let escaped_dir = glob::Pattern::escape(&config_dir.to_string_lossy());

    let mut files = Vec::new();
    for pattern in patterns {
        let full_pattern = format!("{}/{}", escaped_dir.trim_end_matches('/'), pattern.as_ref());

        let matches = glob::glob(&full_pattern).map_err(|e| HarnessError::InvalidGlob {
            pattern: full_pattern.clone(),
            reason: e.to_string(),
        })?;

        let mut group = 0usize;
        for entry in matches {
            let path = entry.map_err(|e| HarnessError::GlobResolution {
                pattern: full_pattern.clone(),
                reason: e.to_string(),
            })?;
            if path.is_file() {
                files.push(path);
                group += 1;
            }
        }
        debug!("Pattern {} matched {} template(s)", full_pattern, group);
    }

    Ok(files)
}

#[cfg(test)]
#[path = "template_set_tests.rs"]
mod template_set_tests;
