//! Lazy depth-first traversal of a source tree.
//!
//! Directories holding a project marker (e.g. `package.json`) are treated as
//! foreign projects and never descended into.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const DEFAULT_PROJECT_MARKER: &str = "package.json";

/// Pre-order iterator over the files beneath a root directory.
///
/// Entries are yielded in the order the filesystem returns them. Errors for
/// individual entries (unreadable directories, symlink loops) are yielded in
/// place and do not end the walk.
pub struct SourceWalker {
    inner: walkdir::IntoIter,
    markers: Vec<String>,
}

impl SourceWalker {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self::with_markers(root, [DEFAULT_PROJECT_MARKER])
    }

    pub fn with_markers<I, S>(root: impl AsRef<Path>, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inner: WalkDir::new(root.as_ref()).follow_links(true).into_iter(),
            markers: markers.into_iter().map(Into::into).collect(),
        }
    }

    fn marker_in(&self, dir: &Path) -> Option<&str> {
        self.markers
            .iter()
            .find(|m| dir.join(m.as_str()).exists())
            .map(String::as_str)
    }
}

impl Iterator for SourceWalker {
    type Item = Result<PathBuf, walkdir::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(err) => return Some(Err(err)),
            };

            if entry.file_type().is_dir() {
                if let Some(marker) = self.marker_in(entry.path()) {
                    tracing::info!(
                        "Skipping {:?}: contains project marker {}",
                        entry.path(),
                        marker
                    );
                    self.inner.skip_current_dir();
                }
                continue;
            }

            if entry.file_type().is_file() {
                return Some(Ok(entry.into_path()));
            }
        }
    }
}
