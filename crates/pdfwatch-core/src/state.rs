//! Persisted fingerprint: a single hex string in a file under the XDG state dir.
//!
//! The file holds nothing but the last fingerprint, so it stays readable with
//! `cat` and interchangeable with hand-written values.

use anyhow::Result;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::WatchError;
use crate::fingerprint::Fingerprint;

/// Last-known fingerprint of the tracked document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistedState {
    pub fingerprint: Option<Fingerprint>,
}

impl PersistedState {
    pub fn new(fingerprint: Fingerprint) -> Self {
        Self {
            fingerprint: Some(fingerprint),
        }
    }
}

/// File-backed store for [`PersistedState`]. One writer at a time.
#[derive(Debug, Clone)]
pub struct HashStore {
    path: PathBuf,
}

impl HashStore {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default path: `~/.local/state/pdfwatch/last_hash`.
    pub fn default_path() -> Result<PathBuf> {
        let xdg_dirs = xdg::BaseDirectories::with_prefix("pdfwatch")?;
        Ok(xdg_dirs.get_state_home().join("last_hash"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored fingerprint. A missing or empty file is the first run.
    pub fn load(&self) -> Result<PersistedState, WatchError> {
        let data = match fs::read_to_string(&self.path) {
            Ok(s) => s,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(PersistedState::default()),
            Err(e) => return Err(WatchError::persistence(&self.path, e)),
        };
        Ok(PersistedState {
            fingerprint: Fingerprint::from_hex(&data),
        })
    }

    /// Overwrite the stored fingerprint (write `.part`, then rename over the target).
    pub fn save(&self, state: &PersistedState) -> Result<(), WatchError> {
        self.write(state)
            .map_err(|e| WatchError::persistence(&self.path, e))?;
        tracing::debug!(path = %self.path.display(), "fingerprint persisted");
        Ok(())
    }

    /// Forget the stored fingerprint so the next cycle reports a change.
    pub fn clear(&self) -> Result<(), WatchError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(WatchError::persistence(&self.path, e)),
        }
    }

    fn write(&self, state: &PersistedState) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let contents = state
            .fingerprint
            .as_ref()
            .map(Fingerprint::as_str)
            .unwrap_or("");

        let tmp = crate::storage::temp_path(&self.path);
        {
            let mut f = private_file(&tmp)?;
            f.write_all(contents.as_bytes())?;
            f.sync_all()?;
        }
        fs::rename(&tmp, &self.path)
    }
}

#[cfg(unix)]
fn private_file(path: &Path) -> io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;
    fs::File::options()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn private_file(path: &Path) -> io::Result<fs::File> {
    fs::File::options()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}
