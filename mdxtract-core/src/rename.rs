//! Recursive renaming of files and directories by name substitution.

use regex::Regex;
use serde::Serialize;
use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum RenameError {
    #[error("Path does not exist: {0:?}")]
    Missing(PathBuf),
}

/// How a name is rewritten.
#[derive(Debug, Clone)]
pub enum Replacement {
    /// Replace the first occurrence of `search`.
    Literal { search: String, replace: String },
    /// Replace every match; `replace` may use `$1`-style captures.
    Regex { regex: Regex, replace: String },
}

impl Replacement {
    pub fn literal(search: impl Into<String>, replace: impl Into<String>) -> Self {
        Replacement::Literal {
            search: search.into(),
            replace: replace.into(),
        }
    }

    pub fn regex(pattern: &str, replace: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Replacement::Regex {
            regex: Regex::new(pattern)?,
            replace: replace.into(),
        })
    }

    pub fn apply<'a>(&self, name: &'a str) -> Cow<'a, str> {
        match self {
            Replacement::Literal { search, replace } => {
                if search.is_empty() || !name.contains(search.as_str()) {
                    Cow::Borrowed(name)
                } else {
                    Cow::Owned(name.replacen(search.as_str(), replace, 1))
                }
            }
            Replacement::Regex { regex, replace } => regex.replace_all(name, replace.as_str()),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RenameReport {
    /// `(from, to)` pairs, applied or planned.
    pub renamed: Vec<(PathBuf, PathBuf)>,
    pub failed: usize,
    pub dry_run: bool,
}

/// Rename every file and directory below `root` whose name changes under
/// `replacement`.
///
/// Contents are renamed before their directory; `root` itself keeps its
/// name. An existing destination is never overwritten. Individual failures
/// are logged and counted.
pub fn rename_recursively(
    root: &Path,
    replacement: &Replacement,
    dry_run: bool,
) -> Result<RenameReport, RenameError> {
    if !root.exists() {
        tracing::error!("Path does not exist: {:?}", root);
        return Err(RenameError::Missing(root.to_path_buf()));
    }

    let mut report = RenameReport {
        dry_run,
        ..RenameReport::default()
    };

    // Collect first so renames cannot disturb the directory listing.
    let mut entries = Vec::new();
    for entry in WalkDir::new(root).min_depth(1).contents_first(true) {
        match entry {
            Ok(entry) => entries.push(entry),
            Err(err) => {
                tracing::error!("Failed to read entry under {:?}: {}", root, err);
                report.failed += 1;
            }
        }
    }

    for entry in entries {
        let Some(name) = entry.file_name().to_str() else {
            tracing::debug!("Skipping non UTF-8 name: {:?}", entry.path());
            continue;
        };
        let new_name = replacement.apply(name);
        if new_name == name {
            continue;
        }

        let from = entry.path().to_path_buf();
        let to = from.with_file_name(&*new_name);
        let kind = if entry.file_type().is_dir() { "directory" } else { "file" };

        if dry_run {
            tracing::info!("Would rename {}: {} -> {}", kind, name, new_name);
            report.renamed.push((from, to));
            continue;
        }

        if to.exists() {
            tracing::warn!("Not renaming {} {}: {:?} already exists", kind, name, to);
            report.failed += 1;
            continue;
        }

        match fs::rename(&from, &to) {
            Ok(()) => {
                tracing::info!("Renamed {}: {} -> {}", kind, name, new_name);
                report.renamed.push((from, to));
            }
            Err(err) => {
                tracing::error!("Failed to rename {} {}: {}", kind, name, err);
                report.failed += 1;
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_literal_replaces_first_occurrence() {
        let r = Replacement::literal("old", "new");
        assert_eq!(r.apply("old-old.md"), "new-old.md");
        assert_eq!(r.apply("fresh.md"), "fresh.md");
    }

    #[test]
    fn test_regex_replaces_all() {
        let r = Replacement::regex(r"\s+", "-").unwrap();
        assert_eq!(r.apply("a b  c.md"), "a-b-c.md");
    }

    #[test]
    fn test_renames_files_and_directories() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("my docs");
        fs::create_dir_all(root.join("sub dir")).unwrap();
        fs::write(root.join("sub dir/a note.md"), "x").unwrap();
        fs::write(root.join("plain.md"), "x").unwrap();

        let r = Replacement::regex(r"\s+", "-").unwrap();
        let report = rename_recursively(&root, &r, false).unwrap();

        assert_eq!(report.renamed.len(), 2);
        assert_eq!(report.failed, 0);
        assert!(root.join("sub-dir/a-note.md").exists());
        assert!(root.join("plain.md").exists());
        // The root keeps its own name.
        assert!(root.exists());
    }

    #[test]
    fn test_dry_run_touches_nothing() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a b.md"), "x").unwrap();

        let r = Replacement::literal(" ", "_");
        let report = rename_recursively(dir.path(), &r, true).unwrap();
        assert_eq!(report.renamed.len(), 1);
        assert!(dir.path().join("a b.md").exists());
        assert!(!dir.path().join("a_b.md").exists());
    }

    #[test]
    fn test_existing_destination_is_kept() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a b.md"), "first").unwrap();
        fs::write(dir.path().join("a_b.md"), "second").unwrap();

        let r = Replacement::literal(" ", "_");
        let report = rename_recursively(dir.path(), &r, false).unwrap();
        assert_eq!(report.failed, 1);
        assert_eq!(fs::read_to_string(dir.path().join("a_b.md")).unwrap(), "second");
    }

    #[test]
    fn test_missing_root() {
        let dir = tempdir().unwrap();
        let r = Replacement::literal("a", "b");
        assert!(matches!(
            rename_recursively(&dir.path().join("nope"), &r, false),
            Err(RenameError::Missing(_))
        ));
    }
}
