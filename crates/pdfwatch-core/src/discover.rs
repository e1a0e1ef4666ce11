//! Discovery capability: locate the document link on the source page.

use scraper::{Html, Selector};
use url::Url;

/// Default suffix for the tracked document link.
pub const DEFAULT_SUFFIX: &str = ".pdf";

/// Given page markup and the URL it came from, returns the document locator.
pub trait Discover {
    fn discover(&self, markup: &str, base: &Url) -> Option<Url>;

    /// Human-readable description of what is searched for (used in errors).
    fn describe(&self) -> String;
}

/// First `<a href>` ending in `suffix` (ASCII case-insensitive). Either the
/// raw href or the resolved URL path may carry the suffix, so both
/// `/files/map.pdf?v=2` and `/download?file=map.pdf` match.
#[derive(Debug, Clone)]
pub struct SuffixLinkDiscovery {
    suffix: String,
}

impl SuffixLinkDiscovery {
    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
        }
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    fn matches(&self, href: &str, url: &Url) -> bool {
        ends_with_ignore_case(href, &self.suffix) || ends_with_ignore_case(url.path(), &self.suffix)
    }
}

impl Default for SuffixLinkDiscovery {
    fn default() -> Self {
        Self::new(DEFAULT_SUFFIX)
    }
}

impl Discover for SuffixLinkDiscovery {
    fn discover(&self, markup: &str, base: &Url) -> Option<Url> {
        let Ok(selector) = Selector::parse("a[href]") else {
            return None;
        };
        let document = Html::parse_document(markup);

        document
            .select(&selector)
            .filter_map(|el| el.value().attr("href"))
            .map(str::trim)
            .filter(|href| !is_non_navigable(href))
            .filter_map(|href| base.join(href).ok().map(|url| (href, url)))
            .find(|(href, url)| self.matches(href, url))
            .map(|(_, url)| url)
    }

    fn describe(&self) -> String {
        self.suffix.clone()
    }
}

fn ends_with_ignore_case(s: &str, suffix: &str) -> bool {
    let (s, suffix) = (s.as_bytes(), suffix.as_bytes());
    s.len() >= suffix.len() && s[s.len() - suffix.len()..].eq_ignore_ascii_case(suffix)
}

fn is_non_navigable(href: &str) -> bool {
    let lower = href.to_ascii_lowercase();
    href.is_empty()
        || href.starts_with('#')
        || lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
}
