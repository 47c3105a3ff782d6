//! Path resolution against the project root.
//!
//! This is a plain join, not a sandbox: `..` segments are kept as-is and may
//! point outside the root.

use std::path::{Path, PathBuf};

/// Resolve a caller-supplied path against `root`.
///
/// Empty input resolves to the root itself. Leading separators are stripped so
/// that `/src/app.js` lands under the root instead of replacing it.
pub fn resolve(root: &Path, rel_path: &str) -> PathBuf {
    let trimmed = rel_path.trim_start_matches(&['/', '\\'][..]);
    if trimmed.is_empty() || trimmed == "." {
        return root.to_path_buf();
    }
    root.join(trimmed)
}

/// Join a caller-facing directory string and an entry name with `/`.
pub fn display_join(dir: &str, name: &str) -> String {
    let dir = dir.trim_end_matches(&['/', '\\'][..]);
    if dir.is_empty() || dir == "." {
        name.to_string()
    } else {
        format!("{dir}/{name}")
    }
}

/// Best-effort language tag from the file extension.
pub fn language_for(path: &str) -> &'static str {
    match path.rsplit_once('.').map(|(_, ext)| ext) {
        Some("js") => "javascript",
        _ => "unknown",
    }
}
