//! `pdfwatch reset` – drop the stored fingerprint.

use anyhow::Result;
use pdfwatch_core::config::WatchConfig;
use pdfwatch_core::state::HashStore;

pub fn run_reset(cfg: &WatchConfig) -> Result<()> {
    let store = HashStore::at(cfg.state_path()?);
    store.clear()?;
    tracing::info!(path = %store.path().display(), "fingerprint cleared");
    println!("Cleared {}", store.path().display());
    Ok(())
}
