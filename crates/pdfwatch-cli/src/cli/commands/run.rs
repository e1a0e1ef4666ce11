//! `pdfwatch run` – check, mail on change, persist; once or on an interval.

use anyhow::{Context, Result};
use pdfwatch_core::config::WatchConfig;
use pdfwatch_core::detector::ChangeDetectingFetcher;
use pdfwatch_core::discover::SuffixLinkDiscovery;
use pdfwatch_core::fetch::CurlFetcher;
use pdfwatch_core::notify::SmtpNotifier;
use pdfwatch_core::state::HashStore;
use pdfwatch_core::watch::{WatchOptions, Watcher};

pub fn run_watch(cfg: &WatchConfig) -> Result<()> {
    cfg.validate()?;

    let store = HashStore::at(cfg.state_path()?);
    let options = WatchOptions {
        repeat: cfg.repeat,
        interval: cfg.interval(),
        recipients: cfg.recipients.clone(),
        label: cfg.label.clone(),
        save_dir: cfg.save_dir.clone(),
    };
    tracing::info!(
        url = %cfg.url,
        state = %store.path().display(),
        repeat = cfg.repeat,
        interval_mins = cfg.interval_mins,
        "starting watch"
    );

    let notifier = if cfg.send {
        Some(SmtpNotifier::new(&cfg.smtp_account()).context("set up smtp transport")?)
    } else {
        None
    };
    let detector = ChangeDetectingFetcher::new(
        cfg.page_url()?,
        CurlFetcher::new(cfg.request_timeout()),
        SuffixLinkDiscovery::new(cfg.link_suffix.clone()),
    );
    let mut watcher = Watcher::new(detector, notifier, store, options);
    watcher.run()?;
    Ok(())
}
