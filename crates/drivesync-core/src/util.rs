//! Shared utility functions used across multiple modules.

use std::path::{Path, PathBuf};

/// Normalize optional text by trimming whitespace and removing empties.
///
/// Returns `None` when the input is `None` or the trimmed value is empty.
pub fn normalize_text_option(value: Option<String>) -> Option<String> {
    let value = value?;
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Truncate text to at most 180 characters for error messages.
pub fn compact_text(value: &str) -> String {
    value.trim().chars().take(180).collect()
}

/// Expand a leading `~` or `~/` to the current user's home directory.
///
/// Anything else (including `~user`) is returned unchanged.
pub fn expand_home(raw: &str) -> String {
    let Some(home) = dirs::home_dir() else {
        return raw.to_string();
    };
    expand_home_with(raw, &home)
}

fn expand_home_with(raw: &str, home: &Path) -> String {
    if raw == "~" {
        return home.to_string_lossy().into_owned();
    }
    match raw.strip_prefix("~/") {
        Some(rest) => home.join(rest).to_string_lossy().into_owned(),
        None => raw.to_string(),
    }
}

/// Resolve `path` against `base` unless it is already absolute.
pub fn resolve_against(base: Option<&Path>, path: &str) -> PathBuf {
    let expanded = PathBuf::from(expand_home(path));
    match base {
        Some(base) if expanded.is_relative() => base.join(expanded),
        _ => expanded,
    }
}
