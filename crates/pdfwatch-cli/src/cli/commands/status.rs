//! `pdfwatch status` – show where the fingerprint lives and what it is.

use anyhow::Result;
use pdfwatch_core::config::WatchConfig;
use pdfwatch_core::state::HashStore;

pub fn run_status(cfg: &WatchConfig) -> Result<()> {
    let store = HashStore::at(cfg.state_path()?);
    let state = store.load()?;
    println!("{:<12} {}", "URL", cfg.url);
    println!("{:<12} {}", "STATE", store.path().display());
    println!(
        "{:<12} {}",
        "FINGERPRINT",
        state
            .fingerprint
            .as_ref()
            .map(|f| f.as_str())
            .unwrap_or("none")
    );
    Ok(())
}
