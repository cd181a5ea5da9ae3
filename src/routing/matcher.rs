//! URL pattern parsing and matching.
//!
//! # Responsibilities
//! - Validate url patterns (`host[/path]`)
//! - Expand and strip localization placeholders
//! - Prefix-match candidate urls against literal and wildcard patterns
//!
//! # Design Decisions
//! - Matching is case-sensitive and byte-exact, candidate urls are not re-encoded
//! - `*` matches one or more characters of a single host label
//! - No regex, patterns are scanned char by char

use thiserror::Error;

use crate::site::Localization;

const PLACEHOLDERS: [&str; 3] = ["localization", "language", "country"];

/// Why a url pattern was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("pattern is empty")]
    Empty,
    #[error("pattern contains whitespace")]
    Whitespace,
    #[error("pattern must not contain a scheme")]
    Scheme,
    #[error("unbalanced placeholder braces")]
    UnbalancedBraces,
    #[error("unknown placeholder `{{{0}}}`")]
    UnknownPlaceholder(String),
    #[error("wildcard is only allowed in the host part")]
    WildcardInPath,
    #[error("consecutive wildcards")]
    DoubleWildcard,
}

/// Shape of a validated pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PatternShape {
    pub wildcard: bool,
    pub placeholder: bool,
}

/// Validate a url pattern and report its shape.
pub fn parse_pattern(pattern: &str) -> Result<PatternShape, PatternError> {
    if pattern.is_empty() {
        return Err(PatternError::Empty);
    }
    if pattern.chars().any(char::is_whitespace) {
        return Err(PatternError::Whitespace);
    }
    if pattern.contains("://") {
        return Err(PatternError::Scheme);
    }

    let mut shape = PatternShape::default();
    let mut in_path = false;
    let mut previous = None;
    let mut chars = pattern.char_indices();

    while let Some((i, c)) = chars.next() {
        match c {
            '/' => in_path = true,
            '*' => {
                if in_path {
                    return Err(PatternError::WildcardInPath);
                }
                if previous == Some('*') {
                    return Err(PatternError::DoubleWildcard);
                }
                shape.wildcard = true;
            }
            '{' => {
                let rest = &pattern[i + 1..];
                let end = rest.find('}').ok_or(PatternError::UnbalancedBraces)?;
                let name = &rest[..end];
                if name.contains('{') {
                    return Err(PatternError::UnbalancedBraces);
                }
                if !PLACEHOLDERS.contains(&name) {
                    return Err(PatternError::UnknownPlaceholder(name.to_string()));
                }
                shape.placeholder = true;
                // Skip over the placeholder name and closing brace
                for _ in 0..=name.chars().count() {
                    chars.next();
                }
                previous = Some('}');
                continue;
            }
            '}' => return Err(PatternError::UnbalancedBraces),
            _ => {}
        }
        previous = Some(c);
    }

    Ok(shape)
}

/// Replace placeholders with the parts of `localization`.
pub fn expand(pattern: &str, localization: &Localization) -> String {
    let expanded = pattern
        .replace("{localization}", &localization.url_segment())
        .replace("{language}", &localization.language)
        .replace("{country}", localization.country.as_deref().unwrap_or_default());
    tidy(&expanded)
}

/// Remove placeholders, leaving the url a partial match resolves to.
pub fn strip_placeholders(pattern: &str) -> String {
    let stripped = PLACEHOLDERS
        .iter()
        .fold(pattern.to_string(), |acc, name| acc.replace(&format!("{{{name}}}"), ""));
    tidy(&stripped)
}

/// Collapse separators left behind by empty placeholder values.
fn tidy(url: &str) -> String {
    let (host, path) = match url.find('/') {
        Some(i) => url.split_at(i),
        None => (url, ""),
    };

    let host = host
        .split('.')
        .filter(|label| !label.is_empty())
        .collect::<Vec<_>>()
        .join(".");
    let path = path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/");

    if path.is_empty() {
        host
    } else {
        format!("{host}/{path}")
    }
}

/// Returns true if `pattern` matches the beginning of `url`.
pub fn matches_prefix(pattern: &str, url: &str) -> bool {
    if !pattern.contains('*') {
        return url.starts_with(pattern);
    }

    let pattern: Vec<char> = pattern.chars().collect();
    let url: Vec<char> = url.chars().collect();
    match_chars(&pattern, &url)
}

fn match_chars(pattern: &[char], url: &[char]) -> bool {
    match pattern.split_first() {
        None => true,
        Some(('*', rest)) => {
            let label_len = url
                .iter()
                .take_while(|c| !matches!(c, '.' | '/' | '?'))
                .count();
            (1..=label_len).any(|taken| match_chars(rest, &url[taken..]))
        }
        Some((expected, rest)) => url
            .split_first()
            .is_some_and(|(actual, tail)| actual == expected && match_chars(rest, tail)),
    }
}
