//! Canonical url generation for custom urls.

use crate::custom_url::model::DomainParts;

/// Fill the `*` placeholders of `base_domain` from `parts`.
///
/// Each `*` takes the next suffix part in order. A non-empty prefix becomes
/// the first path segment. Returns `None` when there are fewer parts than
/// placeholders.
pub fn generate(base_domain: &str, parts: &DomainParts) -> Option<String> {
    let mut suffix = parts.suffix.iter();
    let mut url = String::with_capacity(base_domain.len() + 16);

    for c in base_domain.chars() {
        if c == '*' {
            url.push_str(suffix.next()?);
        } else {
            url.push(c);
        }
    }

    let prefix = parts.prefix.trim_matches('/');
    if !prefix.is_empty() {
        url = match url.split_once('/') {
            Some((host, path)) => format!("{host}/{prefix}/{path}"),
            None => format!("{url}/{prefix}"),
        };
    }

    Some(url.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(prefix: &str, suffix: &[&str]) -> DomainParts {
        DomainParts {
            prefix: prefix.into(),
            suffix: suffix.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_fills_wildcards_in_order() {
        assert_eq!(generate("sulu.io/*", &parts("", &["test-1"])).as_deref(), Some("sulu.io/test-1"));
        assert_eq!(
            generate("*.sulu.io/*", &parts("", &["blog", "post"])).as_deref(),
            Some("blog.sulu.io/post")
        );
    }

    #[test]
    fn test_prefix_goes_before_path() {
        assert_eq!(generate("sulu.io/*", &parts("de", &["test"])).as_deref(), Some("sulu.io/de/test"));
        assert_eq!(generate("sulu.io", &parts("/de/", &[])).as_deref(), Some("sulu.io/de"));
    }

    #[test]
    fn test_missing_parts() {
        assert_eq!(generate("*.sulu.io/*", &parts("", &["blog"])), None);
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        assert_eq!(generate("sulu.io/*", &parts("", &[""])).as_deref(), Some("sulu.io"));
    }
}
