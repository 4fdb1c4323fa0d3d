//! Expansion of shell-style glob patterns into local paths.
//!
//! Patterns are matched one path component at a time. `*`, `?` and `[...]`
//! stay within a component; a `**` component matches any number of
//! directories, including none. A wildcard only matches a name starting
//! with `.` when its own component starts with `.`, and `**` never enters
//! hidden directories. Braces and backslashes are ordinary characters.
//! Symlinked directories are not descended into by `**`.

use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

use globset::{GlobBuilder, GlobMatcher};
use walkdir::WalkDir;

use crate::util::expand_home;
use crate::{Error, Result};

const GLOB_META: [char; 3] = ['*', '?', '['];

enum Segment {
    Literal(OsString),
    Recursive,
    Wildcard {
        matcher: GlobMatcher,
        matches_hidden: bool,
    },
}

/// Resolve `pattern` to the sorted list of existing paths it matches.
///
/// A pattern matching nothing yields an empty list, not an error.
pub fn resolve(pattern: &str) -> Result<Vec<PathBuf>> {
    let expanded = expand_home(pattern.trim());
    if expanded.is_empty() {
        return Err(Error::Pattern {
            pattern: pattern.to_string(),
            message: "pattern is empty".to_string(),
        });
    }

    if !has_glob_meta(&expanded) {
        let path = PathBuf::from(&expanded);
        return Ok(if path.symlink_metadata().is_ok() {
            vec![path]
        } else {
            Vec::new()
        });
    }

    let (base, segments) = split_segments(pattern, &expanded)?;
    let last = segments.len().saturating_sub(1);

    let mut current = vec![base];
    for (index, segment) in segments.iter().enumerate() {
        let is_last = index == last;
        let mut next = Vec::new();
        for parent in &current {
            match segment {
                Segment::Literal(name) => {
                    let candidate = parent.join(name);
                    let keep = if is_last {
                        candidate.symlink_metadata().is_ok()
                    } else {
                        candidate.is_dir()
                    };
                    if keep {
                        next.push(candidate);
                    }
                }
                Segment::Recursive => expand_recursive(pattern, parent, is_last, &mut next),
                Segment::Wildcard {
                    matcher,
                    matches_hidden,
                } => expand_wildcard(
                    pattern,
                    parent,
                    matcher,
                    *matches_hidden,
                    is_last,
                    &mut next,
                ),
            }
        }
        next.sort();
        next.dedup();
        current = next;
        if current.is_empty() {
            break;
        }
    }

    Ok(current)
}

/// Check pattern syntax without touching the filesystem.
pub fn validate(pattern: &str) -> Result<()> {
    let expanded = expand_home(pattern.trim());
    if has_glob_meta(&expanded) {
        split_segments(pattern, &expanded)?;
    }
    Ok(())
}

fn has_glob_meta(value: &str) -> bool {
    value.contains(GLOB_META)
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

fn dir_or_dot(path: &Path) -> &Path {
    if path.as_os_str().is_empty() {
        Path::new(".")
    } else {
        path
    }
}

/// Split a pattern into its root (if absolute) and per-component matchers.
fn split_segments(original: &str, expanded: &str) -> Result<(PathBuf, Vec<Segment>)> {
    let mut base = PathBuf::new();
    let mut segments = Vec::new();

    for component in Path::new(expanded).components() {
        match component {
            Component::Prefix(_) | Component::RootDir => base.push(component.as_os_str()),
            Component::CurDir | Component::ParentDir => {
                segments.push(Segment::Literal(component.as_os_str().to_os_string()));
            }
            Component::Normal(part) => {
                let text = part.to_string_lossy();
                let segment = if text == "**" {
                    Segment::Recursive
                } else if has_glob_meta(&text) {
                    Segment::Wildcard {
                        matcher: compile(original, &text)?,
                        matches_hidden: is_hidden(&text),
                    }
                } else {
                    Segment::Literal(part.to_os_string())
                };
                segments.push(segment);
            }
        }
    }

    Ok((base, segments))
}

fn compile(original: &str, component: &str) -> Result<GlobMatcher> {
    GlobBuilder::new(&escape_braces(component))
        .literal_separator(true)
        .backslash_escape(false)
        .build()
        .map(|glob| glob.compile_matcher())
        .map_err(|error| Error::Pattern {
            pattern: original.to_string(),
            message: error.to_string(),
        })
}

/// Wrap `{` and `}` in character classes so they match themselves.
///
/// Existing `[...]` classes are copied as written; a `]` right after the
/// opening bracket (or its negation) is part of the class.
fn escape_braces(component: &str) -> String {
    let mut escaped = String::with_capacity(component.len());
    let mut chars = component.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '[' => {
                escaped.push('[');
                let negation = chars.peek().copied().filter(|c| matches!(*c, '!' | '^'));
                if let Some(negation) = negation {
                    escaped.push(negation);
                    chars.next();
                }
                if chars.peek() == Some(&']') {
                    escaped.push(']');
                    chars.next();
                }
                for inner in chars.by_ref() {
                    escaped.push(inner);
                    if inner == ']' {
                        break;
                    }
                }
            }
            '{' | '}' => {
                escaped.push('[');
                escaped.push(ch);
                escaped.push(']');
            }
            _ => escaped.push(ch),
        }
    }

    escaped
}

fn expand_wildcard(
    pattern: &str,
    parent: &Path,
    matcher: &GlobMatcher,
    matches_hidden: bool,
    is_last: bool,
    out: &mut Vec<PathBuf>,
) {
    let entries = match std::fs::read_dir(dir_or_dot(parent)) {
        Ok(entries) => entries,
        Err(error) => {
            tracing::debug!(
                "Skipping unreadable directory {} while resolving '{}': {}",
                dir_or_dot(parent).display(),
                pattern,
                error
            );
            return;
        }
    };

    for entry in entries.flatten() {
        let name = entry.file_name();
        if !matches_hidden && is_hidden(&name.to_string_lossy()) {
            continue;
        }
        if !matcher.is_match(Path::new(&name)) {
            continue;
        }
        let candidate = parent.join(&name);
        if is_last || candidate.is_dir() {
            out.push(candidate);
        }
    }
}

/// Expand a `**` component: `parent` itself plus every non-hidden path below it.
fn expand_recursive(pattern: &str, parent: &Path, is_last: bool, out: &mut Vec<PathBuf>) {
    if !is_last || !parent.as_os_str().is_empty() {
        out.push(parent.to_path_buf());
    }

    let walk_root = dir_or_dot(parent);
    let walker = WalkDir::new(walk_root)
        .min_depth(1)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0 || !is_hidden(&entry.file_name().to_string_lossy())
        });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(error) => {
                tracing::debug!(
                    "Skipping unreadable entry while resolving '{}': {}",
                    pattern,
                    error
                );
                continue;
            }
        };
        if !is_last && !entry.file_type().is_dir() {
            continue;
        }

        let candidate = if parent.as_os_str().is_empty() {
            entry
                .path()
                .strip_prefix(walk_root)
                .map_or_else(|_| entry.path().to_path_buf(), Path::to_path_buf)
        } else {
            entry.path().to_path_buf()
        };
        out.push(candidate);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"x").unwrap();
    }

    fn pattern(root: &Path, tail: &str) -> String {
        format!("{}/{tail}", root.display())
    }

    fn names(root: &Path, paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|path| {
                path.strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .into_owned()
            })
            .collect()
    }

    #[test]
    fn single_star_stays_in_one_directory() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), ".xinitrc");
        touch(dir.path(), ".xprofile");
        touch(dir.path(), ".bashrc");
        touch(dir.path(), "sub/.xdeep");

        let resolved = resolve(&pattern(dir.path(), ".x*")).unwrap();
        assert_eq!(names(dir.path(), &resolved), vec![".xinitrc", ".xprofile"]);
    }

    #[test]
    fn double_star_recurses_including_zero_levels() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.log");
        touch(dir.path(), "x/b.log");
        touch(dir.path(), "x/y/c.log");
        touch(dir.path(), "x/y/c.txt");

        let resolved = resolve(&pattern(dir.path(), "**/*.log")).unwrap();
        assert_eq!(
            names(dir.path(), &resolved),
            vec!["a.log", "x/b.log", "x/y/c.log"]
        );
    }

    #[test]
    fn directories_are_returned_too() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "docs/readme.md");

        let resolved = resolve(&pattern(dir.path(), "d*")).unwrap();
        assert_eq!(names(dir.path(), &resolved), vec!["docs"]);
    }

    #[test]
    fn literal_pattern_resolves_to_itself_when_present() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "config.toml");

        let present = dir.path().join("config.toml");
        assert_eq!(
            resolve(&present.to_string_lossy()).unwrap(),
            vec![present.clone()]
        );
        assert!(resolve(&pattern(dir.path(), "absent.toml"))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn unmatched_pattern_is_empty_not_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(resolve(&pattern(dir.path(), "*.nothing")).unwrap().is_empty());
        assert!(resolve(&pattern(dir.path(), "missing/**/*.rs"))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let err = resolve("/tmp/[unclosed").unwrap_err();
        assert!(matches!(err, Error::Pattern { .. }));
        assert!(matches!(resolve("   ").unwrap_err(), Error::Pattern { .. }));
        assert!(validate("/tmp/[unclosed").is_err());
        assert!(validate("~/notes/**/*.md").is_ok());
    }

    #[test]
    fn wildcards_skip_hidden_names_unless_the_component_starts_with_a_dot() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "dir/.hidden");
        touch(dir.path(), "dir/visible");

        let resolved = resolve(&pattern(dir.path(), "dir/*")).unwrap();
        assert_eq!(names(dir.path(), &resolved), vec!["dir/visible"]);

        let resolved = resolve(&pattern(dir.path(), "dir/.h*")).unwrap();
        assert_eq!(names(dir.path(), &resolved), vec!["dir/.hidden"]);

        assert!(resolve(&pattern(dir.path(), "dir/?hidden")).unwrap().is_empty());
        assert!(resolve(&pattern(dir.path(), "dir/[.]hidden")).unwrap().is_empty());
    }

    #[test]
    fn double_star_does_not_enter_hidden_directories() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.log");
        touch(dir.path(), ".cache/stale.log");
        touch(dir.path(), "x/.git/objects.log");
        touch(dir.path(), "x/b.log");
        touch(dir.path(), "x/.b.log");

        let resolved = resolve(&pattern(dir.path(), "**/*.log")).unwrap();
        assert_eq!(names(dir.path(), &resolved), vec!["a.log", "x/b.log"]);

        let resolved = resolve(&pattern(dir.path(), "x/**")).unwrap();
        assert_eq!(names(dir.path(), &resolved), vec!["x", "x/b.log"]);
    }

    #[test]
    fn braces_and_backslashes_are_literal() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "notes{1}.txt");
        touch(dir.path(), "notes1.txt");
        touch(dir.path(), r"back\slash.txt");

        let literal = dir.path().join("notes{1}.txt");
        assert_eq!(resolve(&literal.to_string_lossy()).unwrap(), vec![literal]);

        let resolved = resolve(&pattern(dir.path(), "notes{1}*")).unwrap();
        assert_eq!(names(dir.path(), &resolved), vec!["notes{1}.txt"]);
        assert!(resolve(&pattern(dir.path(), "notes{1,2}*")).unwrap().is_empty());

        let resolved = resolve(&pattern(dir.path(), r"back\*")).unwrap();
        assert_eq!(names(dir.path(), &resolved), vec![r"back\slash.txt"]);

        assert!(validate("~/notes{a,b}/*.md").is_ok());
    }

    #[test]
    fn braces_are_escaped_outside_character_classes() {
        assert_eq!(escape_braces("a{b}*"), "a[{]b[}]*");
        assert_eq!(escape_braces("[{}]x"), "[{}]x");
        assert_eq!(escape_braces("[!]{]y}"), "[!]{]y[}]");
    }
}
