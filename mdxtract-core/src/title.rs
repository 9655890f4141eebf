//! Canonical title derivation from source filenames.

use regex::Regex;
use std::fmt;
use std::path::Path;
use std::sync::OnceLock;

static ORDERING_PREFIX_REGEX: OnceLock<Regex> = OnceLock::new();

fn ordering_prefix_regex() -> &'static Regex {
    ORDERING_PREFIX_REGEX.get_or_init(|| Regex::new(r"\d+[.-]?\s*").unwrap())
}

/// The deduplication key for a source file, and the title/description
/// written into its frontmatter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalTitle(String);

impl CanonicalTitle {
    /// Derive a title from a filename stem by stripping every numeric
    /// ordering run (`01-`, `2.`, `3 `) anywhere in the name.
    ///
    /// # Examples
    ///
    /// ```
    /// use mdxtract_core::CanonicalTitle;
    ///
    /// assert_eq!(CanonicalTitle::from_stem("42-My Title").as_str(), "My Title");
    /// assert_eq!(CanonicalTitle::from_stem("1. Intro").as_str(), "Intro");
    /// ```
    pub fn from_stem(stem: &str) -> Self {
        Self(strip_ordering_prefixes(stem))
    }

    /// Derive a title from a path's file stem. Returns `None` for paths
    /// without a UTF-8 stem.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.file_stem()
            .and_then(|s| s.to_str())
            .map(Self::from_stem)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CanonicalTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalTitle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Remove every `digits [.|-] whitespace*` run from a name.
pub fn strip_ordering_prefixes(name: &str) -> String {
    ordering_prefix_regex().replace_all(name, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_dash_prefix() {
        assert_eq!(CanonicalTitle::from_stem("42-My Title").as_str(), "My Title");
        assert_eq!(CanonicalTitle::from_stem("01-Guide").as_str(), "Guide");
    }

    #[test]
    fn test_strip_dot_prefix_with_space() {
        assert_eq!(CanonicalTitle::from_stem("3. Setup").as_str(), "Setup");
        assert_eq!(CanonicalTitle::from_stem("3.Setup").as_str(), "Setup");
    }

    #[test]
    fn test_strip_is_global() {
        assert_eq!(
            CanonicalTitle::from_stem("01-Part 2 Advanced").as_str(),
            "Part Advanced"
        );
        assert_eq!(CanonicalTitle::from_stem("1-2-3-Deep").as_str(), "Deep");
    }

    #[test]
    fn test_no_digits_untouched() {
        assert_eq!(CanonicalTitle::from_stem("My-Notes.draft").as_str(), "My-Notes.draft");
        assert_eq!(CanonicalTitle::from_stem("快速开始").as_str(), "快速开始");
    }

    #[test]
    fn test_digits_only_is_empty() {
        assert!(CanonicalTitle::from_stem("01").is_empty());
        assert!(CanonicalTitle::from_stem("12. ").is_empty());
    }

    #[test]
    fn test_from_path() {
        let title = CanonicalTitle::from_path(Path::new("docs/02-React Hooks.md")).unwrap();
        assert_eq!(title.to_string(), "React Hooks");
    }
}
