//! Zettel discovery.
//!
//! Expands one or more glob patterns inside a notes directory. Several patterns
//! can be given in one string separated by `|`, e.g. `*.md|*.txt`.

use crate::error::{Result, ZkError};
use glob::Pattern;
use std::path::{Path, PathBuf};

/// Pattern used when none is configured.
pub const DEFAULT_PATTERN: &str = "*.md";

/// Separator between alternative patterns.
pub const PATTERN_SEPARATOR: char = '|';

/// List the files in `notes_dir` matching any of the `|`-separated patterns.
///
/// The result is sorted by the full path string and free of duplicates. Directories matching a pattern
/// are left out. A directory that doesn't exist yields an empty list.
pub fn list_zettels(notes_dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let escaped_dir = Pattern::escape(&notes_dir.to_string_lossy());
    let mut paths = Vec::new();

    for patt in pattern.split(PATTERN_SEPARATOR).map(str::trim) {
        if patt.is_empty() {
            continue;
        }

        let full = Path::new(&escaped_dir).join(patt);
        let entries = glob::glob(&full.to_string_lossy()).map_err(|e| ZkError::InvalidPattern {
            pattern: patt.to_string(),
            message: e.to_string(),
        })?;

        let before = paths.len();
        for entry in entries {
            match entry {
                Ok(path) if path.is_file() => paths.push(path),
                Ok(_) => {}
                Err(e) => tracing::warn!("Skipping unreadable entry: {}", e),
            }
        }
        tracing::debug!("Pattern '{}' matched {} file(s)", patt, paths.len() - before);
    }

    // String order, not component order: "a.b/x" sorts before "a/x".
    paths.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));
    paths.dedup();
    Ok(paths)
}

/// Join several patterns into the `|`-separated form accepted by [`list_zettels`].
pub fn join_patterns<S: AsRef<str>>(patterns: &[S]) -> String {
    if patterns.is_empty() {
        return DEFAULT_PATTERN.to_string();
    }
    patterns
        .iter()
        .map(|p| p.as_ref())
        .collect::<Vec<_>>()
        .join(&PATTERN_SEPARATOR.to_string())
}
