//! Request boundary types.
//!
//! # Responsibilities
//! - Extract routing-relevant information (host, path, query string)
//! - Carry attributes resolved for a request between processing stages
//!
//! # Design Decisions
//! - Percent escapes in the path are decoded once, nothing else is rewritten
//! - The port is dropped from the host, portals bind to host names only

use axum::http::{header, Request};
use percent_encoding::percent_decode_str;
use serde::Serialize;
use std::borrow::Cow;

use crate::collection::UrlEntry;
use crate::custom_url::CustomUrlAttribute;

/// The parts of a request the routing core looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestInfo {
    pub host: String,
    pub path: String,
    pub query_string: Option<String>,
}

impl RequestInfo {
    pub fn new(host: impl Into<String>, path: impl Into<String>, query_string: Option<&str>) -> Self {
        Self {
            host: host.into(),
            path: path.into(),
            query_string: query_string.map(str::to_string),
        }
    }

    /// Read host, path and query from an HTTP request.
    ///
    /// The `Host` header wins over the URI authority.
    pub fn from_http<B>(req: &Request<B>) -> Self {
        let host = req
            .headers()
            .get(header::HOST)
            .and_then(|h| h.to_str().ok())
            .or_else(|| req.uri().host())
            .unwrap_or_default();
        let host = host.rsplit_once(':').map_or(host, |(name, port)| {
            if port.chars().all(|c| c.is_ascii_digit()) { name } else { host }
        });

        let path = decode_path(req.uri().path());
        Self::new(host, path, req.uri().query())
    }

    /// `host + path`, the form url entries are matched against.
    pub fn url(&self) -> String {
        format!("{}{}", self.host, self.path)
    }
}

/// Attributes attached to a request while it is being resolved.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RequestAttributes {
    /// Key of the site the request belongs to.
    pub site_key: Option<String>,
    /// Locale the request is served in.
    pub locale: Option<String>,
    /// Url entry the request matched.
    pub portal: Option<UrlEntry>,
    custom_url: Option<CustomUrlAttribute>,
}

impl RequestAttributes {
    pub fn new(site_key: impl Into<String>, locale: impl Into<String>) -> Self {
        Self {
            site_key: Some(site_key.into()),
            locale: Some(locale.into()),
            ..Self::default()
        }
    }

    /// Attributes derived from the url entry a request matched.
    pub fn from_entry(entry: &UrlEntry) -> Self {
        Self {
            site_key: Some(entry.site_key.clone()),
            locale: entry.localization.as_ref().map(ToString::to_string),
            portal: Some(entry.clone()),
            custom_url: None,
        }
    }

    /// The resolved custom url route, if one was attached.
    pub fn custom_url(&self) -> Option<&CustomUrlAttribute> {
        self.custom_url.as_ref()
    }

    pub(crate) fn set_custom_url(&mut self, attribute: CustomUrlAttribute) {
        self.custom_url = Some(attribute);
    }
}

/// Decode `%XX` escapes so stored urls can be compared with what the
/// client typed. Invalid UTF-8 leaves the path as it was.
fn decode_path(path: &str) -> String {
    percent_decode_str(path)
        .decode_utf8()
        .map(Cow::into_owned)
        .unwrap_or_else(|_| path.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn test_from_http_uses_host_header_without_port() {
        let req = Request::builder()
            .uri("/test.html?search=test")
            .header("Host", "sulu.io:8080")
            .body(Body::empty())
            .unwrap();

        let info = RequestInfo::from_http(&req);
        assert_eq!(info, RequestInfo::new("sulu.io", "/test.html", Some("search=test")));
        assert_eq!(info.url(), "sulu.io/test.html");
    }

    #[test]
    fn test_from_http_decodes_path() {
        let req = Request::builder()
            .uri("http://sulu.io/t%C3%A4st")
            .body(Body::empty())
            .unwrap();

        let info = RequestInfo::from_http(&req);
        assert_eq!(info.host, "sulu.io");
        assert_eq!(info.path, "/täst");
        assert_eq!(info.query_string, None);
    }

    #[test]
    fn test_decode_path_edge_cases() {
        assert_eq!(decode_path("/100%"), "/100%");
        assert_eq!(decode_path("/a%zzb"), "/a%zzb");
        assert_eq!(decode_path("/a%20b"), "/a b");
        assert_eq!(decode_path("/trailing%20"), "/trailing ");
        assert_eq!(decode_path("/bad%FF"), "/bad%FF");
    }

    #[test]
    fn test_attributes_from_entry() {
        use crate::collection::MatchType;

        let entry = UrlEntry::new(MatchType::Full, "sulu_io", "sulu.io/de")
            .with_localization("de".parse().unwrap());
        let attrs = RequestAttributes::from_entry(&entry);
        assert_eq!(attrs.site_key.as_deref(), Some("sulu_io"));
        assert_eq!(attrs.locale.as_deref(), Some("de"));
        assert!(attrs.custom_url().is_none());
    }
}
