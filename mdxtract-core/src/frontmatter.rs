//! Frontmatter synthesis and merging for extracted MDX files.
//!
//! An existing block is parsed into an ordered list of lines, the managed
//! keys are updated in place, and the block is serialized back. Lines the
//! extractor does not manage (other keys, comments, nested YAML) survive
//! byte for byte.

use chrono::NaiveDate;
use std::borrow::Cow;

pub const DELIMITER: &str = "---";

/// Values written into a frontmatter block.
#[derive(Debug, Clone, Copy)]
pub struct FrontmatterFields<'a> {
    pub title: &'a str,
    pub pub_date: NaiveDate,
    /// Only used when a new block is synthesized.
    pub category: Option<&'a str>,
}

impl<'a> FrontmatterFields<'a> {
    pub fn new(title: &'a str, pub_date: NaiveDate) -> Self {
        Self {
            title,
            pub_date,
            category: None,
        }
    }

    pub fn with_category(mut self, category: &'a str) -> Self {
        self.category = Some(category).filter(|c| !c.is_empty());
        self
    }

    fn date(&self) -> String {
        self.pub_date.format("%Y-%m-%d").to_string()
    }
}

/// Where the frontmatter of a document sits, if anywhere.
#[derive(Debug, PartialEq, Eq)]
pub enum Split<'a> {
    /// Content does not start with `---`.
    Missing,
    /// Content starts with `---` but has no closing delimiter.
    Unterminated,
    /// `inner` is the text between the delimiters, `body` everything after
    /// the closing one.
    Block { inner: &'a str, body: &'a str },
}

/// Locate the frontmatter block. The closing delimiter is the first `---`
/// at or after byte offset 3.
pub fn split_frontmatter(content: &str) -> Split<'_> {
    if !content.starts_with(DELIMITER) {
        return Split::Missing;
    }

    let start = DELIMITER.len();
    match content[start..].find(DELIMITER) {
        Some(offset) => {
            let end = start + offset;
            Split::Block {
                inner: &content[start..end],
                body: &content[end + DELIMITER.len()..],
            }
        }
        None => Split::Unterminated,
    }
}

/// An ordered frontmatter block, one entry per line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontmatterBlock {
    lines: Vec<String>,
}

impl FrontmatterBlock {
    /// Parse the text between the delimiters.
    pub fn parse(inner: &str) -> Self {
        let inner = inner
            .strip_prefix("\r\n")
            .or_else(|| inner.strip_prefix('\n'))
            .unwrap_or(inner);
        let inner = inner.strip_suffix('\n').unwrap_or(inner);
        let inner = inner.strip_suffix('\r').unwrap_or(inner);

        if inner.is_empty() {
            return Self::default();
        }

        Self {
            lines: inner
                .split('\n')
                .map(|l| l.strip_suffix('\r').unwrap_or(l).to_string())
                .collect(),
        }
    }

    /// A fresh block with every field a new post needs.
    pub fn synthesize(fields: &FrontmatterFields<'_>) -> Self {
        let title = yaml_value(fields.title);
        let mut lines = vec![
            format!("title: {}", title),
            format!("description: {}", title),
            format!("pubDate: {}", fields.date()),
            "toc: true".to_string(),
            "ogImage: true".to_string(),
        ];
        if let Some(category) = fields.category {
            lines.push(format!("category: {}", yaml_value(category)));
        }
        Self { lines }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.lines.iter().position(|l| line_key(l) == Some(key))
    }

    /// Raw value of the first `key:` line, without surrounding whitespace.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.position(key).map(|idx| {
            let line = &self.lines[idx];
            line[key.len() + 1..].trim()
        })
    }

    /// Replace or insert each key in turn.
    ///
    /// An existing `key:` line keeps its position. A missing key goes right
    /// after the previously handled key, or at the top for the first one.
    pub fn upsert_in_order(&mut self, fields: &[(&str, &str)]) {
        let mut cursor = 0;
        for (key, value) in fields {
            let line = format!("{}: {}", key, value);
            match self.position(key) {
                Some(idx) => {
                    self.lines[idx] = line;
                    cursor = idx + 1;
                }
                None => {
                    self.lines.insert(cursor, line);
                    cursor += 1;
                }
            }
        }
    }

    /// Update the managed keys. `category` is never touched here.
    pub fn merge(&mut self, fields: &FrontmatterFields<'_>) {
        let title = yaml_value(fields.title);
        let date = fields.date();
        self.upsert_in_order(&[
            ("title", &*title),
            ("description", &*title),
            ("pubDate", date.as_str()),
        ]);
    }

    /// Serialize including both delimiters, without a trailing newline.
    pub fn render(&self) -> String {
        let mut out = String::from(DELIMITER);
        out.push('\n');
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out.push_str(DELIMITER);
        out
    }
}

/// Key of a top-level `key: value` line.
fn line_key(line: &str) -> Option<&str> {
    let (key, _) = line.split_once(':')?;
    let first = key.chars().next()?;
    if first == '-' || !key.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-') {
        return None;
    }
    Some(key)
}

/// Produce `content` with a correct frontmatter block.
///
/// Content without a block gets a synthesized one. An existing block has
/// `title`, `description` and `pubDate` forced to the supplied values. An
/// unterminated block is treated as body text and a fresh block is prepended.
pub fn apply_frontmatter(content: &str, fields: &FrontmatterFields<'_>) -> String {
    match split_frontmatter(content) {
        Split::Block { inner, body } => {
            let mut block = FrontmatterBlock::parse(inner);
            block.merge(fields);
            let mut out = block.render();
            out.push_str(body);
            out
        }
        split => {
            if split == Split::Unterminated {
                tracing::warn!("Unterminated frontmatter for '{}', writing a new block", fields.title);
            }
            let mut out = FrontmatterBlock::synthesize(fields).render();
            out.push('\n');
            out.push_str(content);
            out
        }
    }
}

/// Render a string as a YAML scalar, quoting only when a plain scalar would
/// change meaning or break the block.
pub fn yaml_value(value: &str) -> Cow<'_, str> {
    if is_plain_safe(value) {
        return Cow::Borrowed(value);
    }

    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for ch in value.chars() {
        match ch {
            '\\' => quoted.push_str("\\\\"),
            '"' => quoted.push_str("\\\""),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            other => quoted.push(other),
        }
    }
    quoted.push('"');
    Cow::Owned(quoted)
}

fn is_plain_safe(value: &str) -> bool {
    const INDICATORS: &[char] = &[
        '-', '?', ':', ',', '[', ']', '{', '}', '#', '&', '*', '!', '|', '>', '\'', '"', '%',
        '@', '`',
    ];
    const RESERVED: &[&str] = &["true", "false", "null", "yes", "no", "on", "off", "~"];

    let Some(first) = value.chars().next() else {
        return false;
    };

    !(value.trim() != value
        || INDICATORS.contains(&first)
        || value.ends_with(':')
        || value.contains(": ")
        || value.contains(" #")
        || value.chars().any(char::is_control)
        || RESERVED.contains(&value.to_ascii_lowercase().as_str())
        || value.parse::<f64>().is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    #[test]
    fn test_synthesize_without_category() {
        let fields = FrontmatterFields::new("My Title", date());
        let out = apply_frontmatter("Body text", &fields);
        insta::assert_snapshot!(out, @r"
        ---
        title: My Title
        description: My Title
        pubDate: 2025-03-14
        toc: true
        ogImage: true
        ---
        Body text
        ");
    }

    #[test]
    fn test_synthesize_with_category() {
        let fields = FrontmatterFields::new("Hooks", date()).with_category("React Native");
        let out = apply_frontmatter("Body", &fields);
        assert_eq!(
            out,
            "---\ntitle: Hooks\ndescription: Hooks\npubDate: 2025-03-14\ntoc: true\nogImage: true\ncategory: React Native\n---\nBody"
        );
    }

    #[test]
    fn test_empty_category_is_omitted() {
        let fields = FrontmatterFields::new("Hooks", date()).with_category("");
        assert!(!apply_frontmatter("Body", &fields).contains("category"));
    }

    #[test]
    fn test_merge_existing_block() {
        let fields = FrontmatterFields::new("New", date()).with_category("Ignored");
        let out = apply_frontmatter("---\ntitle: Old\n---\nBody", &fields);
        assert_eq!(
            out,
            "---\ntitle: New\ndescription: New\npubDate: 2025-03-14\n---\nBody"
        );
    }

    #[test]
    fn test_merge_keeps_unmanaged_lines() {
        let fields = FrontmatterFields::new("New", date());
        let content = "---\nlayout: post\ntags:\n  - rust\npubDate: 2001-01-01\ndescription: old\n---\n\nBody\n";
        let out = apply_frontmatter(content, &fields);
        assert_eq!(
            out,
            "---\ntitle: New\nlayout: post\ntags:\n  - rust\npubDate: 2025-03-14\ndescription: New\n---\n\nBody\n"
        );
    }

    #[test]
    fn test_merge_does_not_match_prefixed_keys() {
        let fields = FrontmatterFields::new("New", date());
        let out = apply_frontmatter("---\nsubtitle: keep\n---\n", &fields);
        let block = match split_frontmatter(&out) {
            Split::Block { inner, .. } => FrontmatterBlock::parse(inner),
            other => panic!("expected block, got {:?}", other),
        };
        assert_eq!(block.get("subtitle"), Some("keep"));
        assert_eq!(block.get("title"), Some("New"));
        assert_eq!(
            block.lines(),
            &["title: New", "description: New", "pubDate: 2025-03-14", "subtitle: keep"]
        );
    }

    #[test]
    fn test_merge_empty_block() {
        let fields = FrontmatterFields::new("T", date());
        let out = apply_frontmatter("---\n---\nBody", &fields);
        assert_eq!(out, "---\ntitle: T\ndescription: T\npubDate: 2025-03-14\n---\nBody");
    }

    #[test]
    fn test_unterminated_block_is_replaced() {
        let fields = FrontmatterFields::new("T", date());
        let content = "---\ntitle: broken\nno closing";
        let out = apply_frontmatter(content, &fields);
        assert!(out.starts_with("---\ntitle: T\n"));
        assert!(out.ends_with("---\n---\ntitle: broken\nno closing"));
    }

    #[test]
    fn test_split_variants() {
        assert_eq!(split_frontmatter("Body"), Split::Missing);
        assert_eq!(split_frontmatter("---\na: b"), Split::Unterminated);
        assert_eq!(
            split_frontmatter("---\na: b\n---\nrest"),
            Split::Block {
                inner: "\na: b\n",
                body: "\nrest"
            }
        );
    }

    #[test]
    fn test_crlf_block() {
        let block = FrontmatterBlock::parse("\r\ntitle: A\r\nfoo: bar\r\n");
        assert_eq!(block.lines(), &["title: A", "foo: bar"]);
    }

    #[test]
    fn test_yaml_value_quoting() {
        assert_eq!(yaml_value("My Title"), "My Title");
        assert_eq!(yaml_value("快速开始"), "快速开始");
        assert_eq!(yaml_value("Rust: The Book"), "\"Rust: The Book\"");
        assert_eq!(yaml_value(" padded"), "\" padded\"");
        assert_eq!(yaml_value("#hashtag"), "\"#hashtag\"");
        assert_eq!(yaml_value("say \"hi\": now"), "\"say \\\"hi\\\": now\"");
        assert_eq!(yaml_value("true"), "\"true\"");
        assert_eq!(yaml_value("3.14"), "\"3.14\"");
        assert_eq!(yaml_value(""), "\"\"");
    }

    #[test]
    fn test_quoted_title_is_valid_yaml() {
        let fields = FrontmatterFields::new("Rust: The Book", date());
        let out = apply_frontmatter("Body", &fields);
        let inner = match split_frontmatter(&out) {
            Split::Block { inner, .. } => inner,
            other => panic!("expected block, got {:?}", other),
        };
        let value: serde_yaml::Value = serde_yaml::from_str(inner).unwrap();
        assert_eq!(value["title"].as_str(), Some("Rust: The Book"));
        assert_eq!(value["description"].as_str(), Some("Rust: The Book"));
    }
}
