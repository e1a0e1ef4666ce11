//! Fetch capability: full-body HTTP GET.
//!
//! [`CurlFetcher`] uses a libcurl easy handle (via the `curl` crate), follows
//! redirects and refuses to hand back a body shorter or longer than the
//! server announced.

mod headers;

use crate::error::FetchError;
use std::str;
use std::time::Duration;
use url::Url;

/// Default total request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_REDIRECTS: u32 = 10;

/// Retrieves the complete byte content of a URL or fails explicitly.
pub trait Fetch {
    fn fetch(&self, url: &Url) -> Result<Vec<u8>, FetchError>;
}

impl<F: Fetch + ?Sized> Fetch for &F {
    fn fetch(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        (**self).fetch(url)
    }
}

/// Blocking GET over libcurl. Runs in the current thread.
#[derive(Debug, Clone)]
pub struct CurlFetcher {
    timeout: Duration,
    user_agent: String,
}

impl Default for CurlFetcher {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl CurlFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            user_agent: concat!("pdfwatch/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Fetch for CurlFetcher {
    fn fetch(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        let mut body: Vec<u8> = Vec::new();
        let mut header_lines: Vec<String> = Vec::new();

        let mut easy = curl::easy::Easy::new();
        easy.url(url.as_str())?;
        easy.follow_location(true)?;
        easy.max_redirections(MAX_REDIRECTS)?;
        easy.useragent(&self.user_agent)?;
        easy.connect_timeout(CONNECT_TIMEOUT)?;
        easy.timeout(self.timeout)?;

        {
            let mut transfer = easy.transfer();
            transfer.header_function(|data| {
                if let Ok(s) = str::from_utf8(data) {
                    header_lines.push(s.trim_end().to_string());
                }
                true
            })?;
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let status = easy.response_code()?;
        if !(200..300).contains(&status) {
            return Err(FetchError::Http {
                url: url.to_string(),
                status,
            });
        }

        let headers = headers::parse_headers(&header_lines);
        let received = body.len() as u64;
        if let Some(expected) = headers.content_length {
            if expected != received {
                return Err(FetchError::PartialTransfer {
                    url: url.to_string(),
                    expected,
                    received,
                });
            }
        }

        tracing::debug!(
            url = %url,
            bytes = received,
            content_type = headers.content_type.as_deref().unwrap_or("-"),
            "GET complete"
        );
        Ok(body)
    }
}
