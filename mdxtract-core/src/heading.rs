//! Removal of a leading title heading that duplicates the frontmatter title.

use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;

static H1_REGEX: OnceLock<Regex> = OnceLock::new();

fn h1_regex() -> &'static Regex {
    H1_REGEX.get_or_init(|| Regex::new(r"(?m)^#\s+(.+)$").unwrap())
}

/// Drop the first `# heading` line when its text equals `title`.
///
/// When the heading is removed the remaining content is trimmed; otherwise
/// the content is returned untouched.
pub fn strip_title_heading<'a>(content: &'a str, title: &str) -> Cow<'a, str> {
    let Some(caps) = h1_regex().captures(content) else {
        return Cow::Borrowed(content);
    };
    let (Some(line), Some(text)) = (caps.get(0), caps.get(1)) else {
        return Cow::Borrowed(content);
    };

    if text.as_str().trim() != title {
        return Cow::Borrowed(content);
    }

    tracing::debug!("Removed duplicate title heading: {}", text.as_str().trim());
    let mut stripped = String::with_capacity(content.len());
    stripped.push_str(&content[..line.start()]);
    stripped.push_str(&content[line.end()..]);
    Cow::Owned(stripped.trim().to_string())
}
