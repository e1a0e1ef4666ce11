//! Change detection: fetch the page, follow its document link, fingerprint
//! the document and compare against the caller's prior fingerprint.
//!
//! The detector never writes state. Persisting the new fingerprint (and
//! deciding whether to notify first) belongs to the caller.

use crate::discover::Discover;
use crate::error::WatchError;
use crate::fetch::Fetch;
use crate::fingerprint::Fingerprint;
use url::Url;

/// Outcome of one [`ChangeDetectingFetcher::check`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchResult {
    Unchanged,
    Changed {
        /// Exactly the fetched document bytes.
        bytes: Vec<u8>,
        fingerprint: Fingerprint,
        size: u64,
        /// Resolved document location (after discovery, before redirects).
        document_url: Url,
    },
}

impl FetchResult {
    pub fn is_changed(&self) -> bool {
        matches!(self, FetchResult::Changed { .. })
    }
}

pub struct ChangeDetectingFetcher<F, D> {
    page_url: Url,
    fetcher: F,
    discovery: D,
}

impl<F: Fetch, D: Discover> ChangeDetectingFetcher<F, D> {
    pub fn new(page_url: Url, fetcher: F, discovery: D) -> Self {
        Self {
            page_url,
            fetcher,
            discovery,
        }
    }

    pub fn page_url(&self) -> &Url {
        &self.page_url
    }

    /// Locate the current document URL on the source page.
    pub fn locate(&self) -> Result<Url, WatchError> {
        let page = self.fetcher.fetch(&self.page_url)?;
        tracing::info!(page = %self.page_url, "connected to source page");

        let markup = String::from_utf8_lossy(&page);
        self.discovery
            .discover(&markup, &self.page_url)
            .ok_or_else(|| WatchError::NotFound {
                page: self.page_url.to_string(),
                suffix: self.discovery.describe(),
            })
    }

    /// Single-shot comparison. `prior` is `None` on the first run.
    pub fn check(&self, prior: Option<&Fingerprint>) -> Result<FetchResult, WatchError> {
        let document_url = self.locate()?;
        tracing::info!(document = %document_url, "downloading document");

        let bytes = self.fetcher.fetch(&document_url)?;
        let size = bytes.len() as u64;
        let fingerprint = Fingerprint::of(&bytes);
        tracing::info!(size, fingerprint = %fingerprint, "document fetched");

        if prior == Some(&fingerprint) {
            tracing::info!("hashes are equal, document unchanged");
            return Ok(FetchResult::Unchanged);
        }

        tracing::info!(
            previous = prior.map(Fingerprint::as_str).unwrap_or("none"),
            "document changed"
        );
        Ok(FetchResult::Changed {
            bytes,
            fingerprint,
            size,
            document_url,
        })
    }
}
