//! `pdfwatch check` – compare the current document against the stored fingerprint.

use anyhow::Result;
use pdfwatch_core::config::WatchConfig;
use pdfwatch_core::detector::{ChangeDetectingFetcher, FetchResult};
use pdfwatch_core::discover::SuffixLinkDiscovery;
use pdfwatch_core::fetch::CurlFetcher;
use pdfwatch_core::state::HashStore;

/// Prints `unchanged` or `changed <fingerprint> <size> <document-url>`.
/// Never mails and never writes the state file.
pub fn run_check(cfg: &WatchConfig) -> Result<()> {
    cfg.validate_target()?;
    let store = HashStore::at(cfg.state_path()?);
    let prior = store.load()?;
    let detector = ChangeDetectingFetcher::new(
        cfg.page_url()?,
        CurlFetcher::new(cfg.request_timeout()),
        SuffixLinkDiscovery::new(cfg.link_suffix.clone()),
    );

    match detector.check(prior.fingerprint.as_ref())? {
        FetchResult::Unchanged => println!("unchanged"),
        FetchResult::Changed {
            fingerprint,
            size,
            document_url,
            ..
        } => println!("changed {} {} {}", fingerprint, size, document_url),
    }
    Ok(())
}
