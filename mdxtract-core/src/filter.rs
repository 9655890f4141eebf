//! Eligibility rules deciding which markdown files get extracted.
//!
//! Two policies exist: a blacklist of glob/regex patterns, and a filter that
//! only accepts files whose name contains CJK characters.

use crate::title::CanonicalTitle;
use regex::{Regex, RegexBuilder};
use std::fmt;
use std::path::Path;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PatternError {
    #[error("Invalid blacklist pattern '{pattern}': {source}")]
    Invalid {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// A single compiled blacklist entry.
///
/// `/.../` is a case-insensitive regular expression; anything else is a
/// case-insensitive glob anchored at both ends where `*` matches any run of
/// characters and `?` exactly one.
#[derive(Debug, Clone)]
pub struct BlacklistPattern {
    source: String,
    regex: Regex,
}

impl BlacklistPattern {
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        let expr = match regex_body(pattern) {
            Some(body) => body.to_string(),
            None => glob_to_regex(pattern),
        };

        let regex = RegexBuilder::new(&expr)
            .case_insensitive(true)
            .build()
            .map_err(|source| PatternError::Invalid {
                pattern: pattern.to_string(),
                source,
            })?;

        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }
}

fn regex_body(pattern: &str) -> Option<&str> {
    if pattern.len() >= 2 && pattern.starts_with('/') && pattern.ends_with('/') {
        Some(&pattern[1..pattern.len() - 1])
    } else {
        None
    }
}

fn glob_to_regex(glob: &str) -> String {
    let mut expr = String::with_capacity(glob.len() + 8);
    expr.push('^');
    for ch in glob.chars() {
        match ch {
            '*' => expr.push_str(".*"),
            '?' => expr.push('.'),
            other => expr.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
        }
    }
    expr.push('$');
    expr
}

/// An ordered list of blacklist patterns.
///
/// Malformed patterns are logged when the list is built and never match.
#[derive(Debug, Clone, Default)]
pub struct Blacklist {
    raw: Vec<String>,
    compiled: Vec<BlacklistPattern>,
}

impl Blacklist {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let raw: Vec<String> = patterns.into_iter().map(Into::into).collect();
        let mut compiled = Vec::with_capacity(raw.len());
        for pat in &raw {
            match BlacklistPattern::parse(pat) {
                Ok(p) => compiled.push(p),
                Err(err) => tracing::warn!("{}", err),
            }
        }
        Self { raw, compiled }
    }

    /// Every pattern as supplied, including malformed ones.
    pub fn patterns(&self) -> &[String] {
        &self.raw
    }

    /// Return the first pattern matching `name`, if any.
    pub fn find_match(&self, name: &str) -> Option<&BlacklistPattern> {
        self.compiled.iter().find(|p| p.is_match(name))
    }
}

static CJK_REGEX: OnceLock<Regex> = OnceLock::new();

fn cjk_regex() -> &'static Regex {
    CJK_REGEX.get_or_init(|| {
        Regex::new(r"[\p{Han}\p{Hiragana}\p{Katakana}\p{Hangul}]").unwrap()
    })
}

/// Returns true if `name` contains at least one CJK character.
pub fn contains_cjk(name: &str) -> bool {
    cjk_regex().is_match(name)
}

/// How files are selected for one extraction run.
#[derive(Debug, Clone)]
pub enum EligibilityPolicy {
    /// Reject files whose title or filename matches a blacklist pattern.
    Blacklist(Blacklist),
    /// Only accept files whose name contains CJK characters.
    CjkName,
}

impl Default for EligibilityPolicy {
    fn default() -> Self {
        EligibilityPolicy::Blacklist(Blacklist::default())
    }
}

/// The verdict for a single path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Eligibility {
    Eligible(CanonicalTitle),
    NotMarkdown,
    Blacklisted { pattern: String },
    MissingCjk,
    EmptyTitle,
}

impl Eligibility {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Eligibility::Eligible(_))
    }
}

impl fmt::Display for Eligibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Eligibility::Eligible(title) => write!(f, "eligible as '{}'", title),
            Eligibility::NotMarkdown => f.write_str("not a .md file"),
            Eligibility::Blacklisted { pattern } => write!(f, "blacklisted by '{}'", pattern),
            Eligibility::MissingCjk => f.write_str("name has no CJK characters"),
            Eligibility::EmptyTitle => f.write_str("title is empty after stripping numbering"),
        }
    }
}

/// Returns true for `.md` files, compared case-insensitively.
pub fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("md"))
        .unwrap_or(false)
}

impl EligibilityPolicy {
    pub fn blacklist<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        EligibilityPolicy::Blacklist(Blacklist::new(patterns))
    }

    /// Patterns in effect, empty for the CJK policy.
    pub fn patterns(&self) -> &[String] {
        match self {
            EligibilityPolicy::Blacklist(list) => list.patterns(),
            EligibilityPolicy::CjkName => &[],
        }
    }

    pub fn check(&self, path: &Path) -> Eligibility {
        if !is_markdown(path) {
            return Eligibility::NotMarkdown;
        }

        let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        let Some(title) = CanonicalTitle::from_path(path) else {
            return Eligibility::NotMarkdown;
        };

        match self {
            EligibilityPolicy::Blacklist(list) => {
                let hit = list
                    .find_match(title.as_str())
                    .or_else(|| list.find_match(file_name));
                if let Some(pattern) = hit {
                    return Eligibility::Blacklisted {
                        pattern: pattern.as_str().to_string(),
                    };
                }
            }
            EligibilityPolicy::CjkName => {
                let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
                if !contains_cjk(stem) {
                    return Eligibility::MissingCjk;
                }
            }
        }

        if title.is_empty() {
            return Eligibility::EmptyTitle;
        }

        Eligibility::Eligible(title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejects(policy: &EligibilityPolicy, name: &str) -> bool {
        !policy.check(Path::new(name)).is_eligible()
    }

    #[test]
    fn test_only_md_is_eligible() {
        let policy = EligibilityPolicy::default();
        assert!(policy.check(Path::new("notes.md")).is_eligible());
        assert!(policy.check(Path::new("NOTES.MD")).is_eligible());
        assert_eq!(policy.check(Path::new("notes.mdx")), Eligibility::NotMarkdown);
        assert_eq!(policy.check(Path::new("notes.txt")), Eligibility::NotMarkdown);
        assert_eq!(policy.check(Path::new("md")), Eligibility::NotMarkdown);
    }

    #[test]
    fn test_glob_star_is_case_insensitive() {
        let policy = EligibilityPolicy::blacklist(["README*"]);
        assert!(rejects(&policy, "README.md"));
        assert!(rejects(&policy, "README-old.md"));
        assert!(rejects(&policy, "readme2.md"));
        assert!(!rejects(&policy, "my-readme.md"));
    }

    #[test]
    fn test_glob_question_mark_matches_one_char() {
        let policy = EligibilityPolicy::blacklist(["draft?"]);
        assert!(rejects(&policy, "draftA.md"));
        assert!(!rejects(&policy, "draft.md"));
        assert!(!rejects(&policy, "draftAB.md"));
    }

    #[test]
    fn test_glob_escapes_literal_dots() {
        let pattern = BlacklistPattern::parse("a.b").unwrap();
        assert!(pattern.is_match("a.b"));
        assert!(!pattern.is_match("axb"));
    }

    #[test]
    fn test_regex_pattern() {
        let policy = EligibilityPolicy::blacklist(["/^temp/"]);
        assert!(rejects(&policy, "temp-notes.md"));
        assert!(rejects(&policy, "TEMP-notes.md"));
        assert!(!rejects(&policy, "my-temp.md"));
    }

    #[test]
    fn test_blacklist_checks_title_and_filename() {
        // Title "Changelog" matches the anchored glob; the filename does not.
        let policy = EligibilityPolicy::blacklist(["changelog"]);
        assert!(rejects(&policy, "01-CHANGELOG.md"));

        // Filename matches, title does not.
        let policy = EligibilityPolicy::blacklist(["*.md"]);
        assert!(rejects(&policy, "anything.md"));
    }

    #[test]
    fn test_malformed_pattern_never_matches() {
        assert!(BlacklistPattern::parse("/(unclosed/").is_err());

        let list = Blacklist::new(["/(unclosed/", "LICENSE*"]);
        assert_eq!(list.patterns().len(), 2);
        assert!(list.find_match("(unclosed").is_none());
        assert!(list.find_match("LICENSE").is_some());
    }

    #[test]
    fn test_cjk_policy() {
        let policy = EligibilityPolicy::CjkName;
        assert!(policy.check(Path::new("01-快速开始.md")).is_eligible());
        assert!(policy.check(Path::new("ひらがな.md")).is_eligible());
        assert!(policy.check(Path::new("한국어.md")).is_eligible());
        assert_eq!(policy.check(Path::new("intro.md")), Eligibility::MissingCjk);
        assert!(policy.patterns().is_empty());
    }

    #[test]
    fn test_empty_title_rejected() {
        let policy = EligibilityPolicy::default();
        assert_eq!(policy.check(Path::new("01.md")), Eligibility::EmptyTitle);
    }

    #[test]
    fn test_eligible_carries_title() {
        let policy = EligibilityPolicy::default();
        assert_eq!(
            policy.check(Path::new("dir/42-My Title.md")),
            Eligibility::Eligible(CanonicalTitle::from_stem("My Title"))
        );
    }
}
