//! Error taxonomy for a watch cycle.
//!
//! Every variant is terminal for the cycle that produced it; the caller
//! decides whether that ends the process or just waits for the next cycle.

use std::path::PathBuf;

use thiserror::Error;

/// Failure of the fetch capability. Never a silently truncated body.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Curl reported an error (timeout, connection, TLS, etc.).
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// Final response had a non-2xx status.
    #[error("GET {url} returned HTTP {status}")]
    Http { url: String, status: u32 },
    /// Body length disagrees with the announced `Content-Length`.
    #[error("partial transfer from {url}: expected {expected} bytes, got {received}")]
    PartialTransfer {
        url: String,
        expected: u64,
        received: u64,
    },
}

/// Failure of the notification capability.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("invalid mail address {address:?}: {source}")]
    Address {
        address: String,
        #[source]
        source: lettre::address::AddressError,
    },
    #[error("no recipients configured")]
    NoRecipients,
    #[error("invalid attachment content type {0:?}")]
    ContentType(String),
    #[error("build message: {0}")]
    Build(#[from] lettre::error::Error),
    #[error("smtp: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

/// Error returned by one cycle (check, notify, persist).
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("no link ending in {suffix:?} found at {page}")]
    NotFound { page: String, suffix: String },
    #[error("fingerprint store {}: {source}", .path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("notification failed: {0}")]
    Notification(#[from] NotifyError),
}

impl WatchError {
    pub(crate) fn persistence(path: &std::path::Path, source: std::io::Error) -> Self {
        WatchError::Persistence {
            path: path.to_path_buf(),
            source,
        }
    }
}
