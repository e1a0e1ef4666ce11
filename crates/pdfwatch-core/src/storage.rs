//! Document archive: keep a copy of every changed document on disk.
//!
//! Files are written to `<name>.part`, synced, then atomically renamed, so a
//! reader never sees a half-written document.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `map.pdf` → `map.pdf.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// Write `bytes` to `dir/filename`, replacing any previous copy. Returns the final path.
pub fn save_document(dir: &Path, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).with_context(|| format!("create dir: {}", dir.display()))?;
    let final_path = dir.join(filename);
    let tmp = temp_path(&final_path);

    {
        let mut f = File::create(&tmp)
            .with_context(|| format!("failed to create temp file: {}", tmp.display()))?;
        f.write_all(bytes)
            .with_context(|| format!("write {}", tmp.display()))?;
        f.sync_all().context("storage sync failed")?;
    }

    std::fs::rename(&tmp, &final_path).with_context(|| {
        format!(
            "failed to rename {} to {}",
            tmp.display(),
            final_path.display()
        )
    })?;
    tracing::info!(path = %final_path.display(), bytes = bytes.len(), "document archived");
    Ok(final_path)
}
