pub mod config;
pub mod logging;

// Cycle building blocks
pub mod detector;
pub mod discover;
pub mod error;
pub mod fetch;
pub mod fingerprint;
pub mod notify;
pub mod state;
pub mod storage;
pub mod url_model;
pub mod watch;

pub use detector::{ChangeDetectingFetcher, FetchResult};
pub use error::{FetchError, NotifyError, WatchError};
pub use fingerprint::Fingerprint;
pub use state::{HashStore, PersistedState};
