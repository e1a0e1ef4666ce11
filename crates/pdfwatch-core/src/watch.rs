//! The cycle driver: check → notify → persist, once or on a fixed interval.
//!
//! The detector reports; this module decides. A fingerprint is persisted only
//! once the change has been handled (mailed, or mail disabled), so a failed
//! delivery is retried by the next scheduled cycle and never by this one.

use chrono::{DateTime, Local};
use std::path::PathBuf;
use std::time::Duration;

use crate::detector::{ChangeDetectingFetcher, FetchResult};
use crate::discover::Discover;
use crate::error::WatchError;
use crate::fetch::Fetch;
use crate::fingerprint::Fingerprint;
use crate::notify::compose::{self, BodyStats};
use crate::notify::{Attachment, Notification, Notifier};
use crate::state::{HashStore, PersistedState};
use crate::url_model;

/// Caller-side policy for a watcher.
#[derive(Debug, Clone)]
pub struct WatchOptions {
    pub repeat: bool,
    pub interval: Duration,
    pub recipients: Vec<String>,
    pub label: String,
    pub save_dir: Option<PathBuf>,
}

/// What one cycle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    Unchanged,
    Notified { fingerprint: Fingerprint, size: u64 },
    NotifySkipped { fingerprint: Fingerprint, size: u64 },
}

/// In-memory facts reported in the mail body; only the fingerprint is durable.
#[derive(Debug, Clone)]
pub struct WatchSession {
    pub last_checked: DateTime<Local>,
    pub last_fingerprint: Option<Fingerprint>,
}

impl WatchSession {
    fn start() -> Self {
        Self {
            last_checked: Local::now(),
            last_fingerprint: None,
        }
    }
}

/// Drives cycles. Without a notifier, changes are persisted but never mailed.
pub struct Watcher<F, D, N> {
    detector: ChangeDetectingFetcher<F, D>,
    notifier: Option<N>,
    store: HashStore,
    options: WatchOptions,
    session: WatchSession,
}

impl<F: Fetch, D: Discover, N: Notifier> Watcher<F, D, N> {
    pub fn new(
        detector: ChangeDetectingFetcher<F, D>,
        notifier: Option<N>,
        store: HashStore,
        options: WatchOptions,
    ) -> Self {
        Self {
            detector,
            notifier,
            store,
            options,
            session: WatchSession::start(),
        }
    }

    pub fn session(&self) -> &WatchSession {
        &self.session
    }

    /// One fetch-compare-notify-persist sequence.
    pub fn run_once(&mut self) -> Result<CycleOutcome, WatchError> {
        let state = self.store.load()?;
        let prior = state.fingerprint;
        if self.session.last_fingerprint.is_none() {
            self.session.last_fingerprint = prior.clone();
        }

        let (bytes, fingerprint, size, document_url) = match self.detector.check(prior.as_ref())? {
            FetchResult::Unchanged => {
                self.session.last_checked = Local::now();
                return Ok(CycleOutcome::Unchanged);
            }
            FetchResult::Changed {
                bytes,
                fingerprint,
                size,
                document_url,
            } => (bytes, fingerprint, size, document_url),
        };

        let filename = url_model::attachment_filename(&document_url);
        if let Some(dir) = &self.options.save_dir {
            // Archive failures do not block the notification.
            if let Err(e) = crate::storage::save_document(dir, &filename, &bytes) {
                tracing::warn!("could not archive document: {:#}", e);
            }
        }

        let outcome = if let Some(notifier) = &self.notifier {
            let now = Local::now();
            let stats = BodyStats {
                page_url: self.detector.page_url().as_str(),
                document_url: document_url.as_str(),
                last_checked: self.session.last_checked,
                last_fingerprint: self
                    .session
                    .last_fingerprint
                    .as_ref()
                    .map(Fingerprint::as_str),
                this_fingerprint: fingerprint.as_str(),
                size,
            };
            let notification = Notification {
                recipients: self.options.recipients.clone(),
                subject: compose::subject(&self.options.label, &now),
                html_body: compose::body(&self.options.label, &stats),
                attachment: Attachment {
                    content_type: url_model::content_type_for(&filename).to_string(),
                    filename,
                    bytes,
                },
            };
            notifier.send(&notification)?;
            CycleOutcome::Notified {
                fingerprint: fingerprint.clone(),
                size,
            }
        } else {
            tracing::info!("mail skipped");
            CycleOutcome::NotifySkipped {
                fingerprint: fingerprint.clone(),
                size,
            }
        };

        self.store.save(&PersistedState::new(fingerprint.clone()))?;
        self.session.last_fingerprint = Some(fingerprint);
        self.session.last_checked = Local::now();
        Ok(outcome)
    }

    /// One cycle in repeating mode: a failure is logged and the next cycle
    /// proceeds as usual.
    pub fn tick(&mut self) -> Option<CycleOutcome> {
        match self.run_once() {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                tracing::error!("cycle failed: {}", e);
                None
            }
        }
    }

    /// Run once, or forever on the configured interval.
    ///
    /// Single-run mode propagates the cycle's error. Repeating mode logs it
    /// and waits for the next cycle.
    pub fn run(&mut self) -> Result<(), WatchError> {
        if !self.options.repeat {
            self.run_once()?;
            return Ok(());
        }
        loop {
            self.tick();
            let wake = Local::now()
                + chrono::Duration::from_std(self.options.interval)
                    .unwrap_or_else(|_| chrono::Duration::zero());
            tracing::info!("sleeping till: {}", wake.format(compose::FULL_DATE_FORMAT));
            std::thread::sleep(self.options.interval);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::tests::{detector, StubFetch, DOC};
    use crate::discover::SuffixLinkDiscovery;
    use crate::notify::tests::RecordingNotifier;

    fn options() -> WatchOptions {
        WatchOptions {
            repeat: false,
            interval: Duration::from_secs(60),
            recipients: vec!["a@example.com".to_string()],
            label: "Maps".to_string(),
            save_dir: None,
        }
    }

    fn watcher<'n>(
        doc: &[u8],
        notifier: Option<&'n RecordingNotifier>,
        store: HashStore,
        opts: WatchOptions,
    ) -> Watcher<StubFetch, SuffixLinkDiscovery, &'n RecordingNotifier> {
        Watcher::new(detector(StubFetch::serving(doc)), notifier, store, opts)
    }

    #[test]
    fn first_cycle_notifies_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let store = HashStore::at(dir.path().join("last_hash"));
        let notifier = RecordingNotifier::default();
        let mut w = watcher(b"PDF-A", Some(&notifier), store.clone(), options());

        let outcome = w.run_once().unwrap();
        assert_eq!(
            outcome,
            CycleOutcome::Notified {
                fingerprint: Fingerprint::of(b"PDF-A"),
                size: 5
            }
        );
        let sent = notifier.sent.borrow();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].attachment.bytes, b"PDF-A");
        assert_eq!(sent[0].attachment.filename, "map.pdf");
        assert_eq!(sent[0].attachment.content_type, "application/pdf");
        assert_eq!(sent[0].recipients, vec!["a@example.com".to_string()]);
        assert!(sent[0].subject.starts_with("Maps download from ("));
        assert!(sent[0].html_body.contains(Fingerprint::of(b"PDF-A").as_str()));
        assert!(sent[0].html_body.contains(DOC));
        assert_eq!(
            store.load().unwrap().fingerprint,
            Some(Fingerprint::of(b"PDF-A"))
        );
        assert_eq!(
            w.session().last_fingerprint,
            Some(Fingerprint::of(b"PDF-A"))
        );
    }

    #[test]
    fn second_cycle_with_same_bytes_is_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let store = HashStore::at(dir.path().join("last_hash"));
        let notifier = RecordingNotifier::default();
        let mut w = watcher(b"PDF-A", Some(&notifier), store, options());

        w.run_once().unwrap();
        assert_eq!(w.run_once().unwrap(), CycleOutcome::Unchanged);
        assert_eq!(notifier.sent.borrow().len(), 1);
    }

    #[test]
    fn stored_fingerprint_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let store = HashStore::at(dir.path().join("last_hash"));
        store
            .save(&PersistedState::new(Fingerprint::of(b"PDF-A")))
            .unwrap();
        let notifier = RecordingNotifier::default();
        let mut w = watcher(b"PDF-A", Some(&notifier), store, options());
        assert_eq!(w.run_once().unwrap(), CycleOutcome::Unchanged);
        assert!(notifier.sent.borrow().is_empty());
    }

    #[test]
    fn failed_delivery_does_not_persist() {
        let dir = tempfile::tempdir().unwrap();
        let store = HashStore::at(dir.path().join("last_hash"));
        let notifier = RecordingNotifier::default();
        notifier.fail.set(true);
        let mut w = watcher(b"PDF-A", Some(&notifier), store.clone(), options());

        let err = w.run_once().unwrap_err();
        assert!(matches!(err, WatchError::Notification(_)));
        assert!(store.load().unwrap().fingerprint.is_none());

        // Next cycle tries again and succeeds.
        notifier.fail.set(false);
        assert!(matches!(
            w.run_once().unwrap(),
            CycleOutcome::Notified { .. }
        ));
        assert!(store.load().unwrap().fingerprint.is_some());
    }

    #[test]
    fn send_disabled_still_persists() {
        let dir = tempfile::tempdir().unwrap();
        let store = HashStore::at(dir.path().join("last_hash"));
        let mut w = watcher(b"PDF-A", None, store.clone(), options());

        assert_eq!(
            w.run_once().unwrap(),
            CycleOutcome::NotifySkipped {
                fingerprint: Fingerprint::of(b"PDF-A"),
                size: 5
            }
        );
        assert_eq!(
            store.load().unwrap().fingerprint,
            Some(Fingerprint::of(b"PDF-A"))
        );
    }

    #[test]
    fn changed_document_is_archived() {
        let dir = tempfile::tempdir().unwrap();
        let store = HashStore::at(dir.path().join("last_hash"));
        let notifier = RecordingNotifier::default();
        let mut opts = options();
        opts.save_dir = Some(dir.path().join("archive"));
        let mut w = watcher(b"PDF-A", Some(&notifier), store, opts);

        w.run_once().unwrap();
        let archived = dir.path().join("archive").join("map.pdf");
        assert_eq!(std::fs::read(archived).unwrap(), b"PDF-A");
    }

    #[test]
    fn fetch_failure_leaves_state_alone() {
        let dir = tempfile::tempdir().unwrap();
        let store = HashStore::at(dir.path().join("last_hash"));
        store
            .save(&PersistedState::new(Fingerprint::of(b"old")))
            .unwrap();
        let notifier = RecordingNotifier::default();
        let mut w = Watcher::new(
            detector(StubFetch::default()),
            Some(&notifier),
            store.clone(),
            options(),
        );
        assert!(matches!(w.run_once().unwrap_err(), WatchError::Fetch(_)));
        assert_eq!(
            store.load().unwrap().fingerprint,
            Some(Fingerprint::of(b"old"))
        );
    }

    #[test]
    fn single_run_propagates_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = HashStore::at(dir.path().join("last_hash"));
        let notifier = RecordingNotifier::default();
        let mut w = Watcher::new(
            detector(StubFetch::default()),
            Some(&notifier),
            store,
            options(),
        );
        assert!(w.run().is_err());
    }

    #[test]
    fn unreadable_state_is_persistence_error() {
        let dir = tempfile::tempdir().unwrap();
        let notifier = RecordingNotifier::default();
        let mut w = watcher(
            b"PDF-A",
            Some(&notifier),
            HashStore::at(dir.path()),
            options(),
        );
        assert!(matches!(
            w.run_once().unwrap_err(),
            WatchError::Persistence { .. }
        ));
        assert!(notifier.sent.borrow().is_empty());
    }

    #[test]
    fn repeating_cycle_recovers_after_fetch_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = HashStore::at(dir.path().join("last_hash"));
        let notifier = RecordingNotifier::default();
        let fetch = StubFetch::serving(b"PDF-A");
        fetch.failures.set(1);
        let mut opts = options();
        opts.repeat = true;
        let mut w = Watcher::new(detector(fetch), Some(&notifier), store.clone(), opts);

        assert_eq!(w.tick(), None);
        assert!(store.load().unwrap().fingerprint.is_none());
        assert!(notifier.sent.borrow().is_empty());

        assert_eq!(
            w.tick(),
            Some(CycleOutcome::Notified {
                fingerprint: Fingerprint::of(b"PDF-A"),
                size: 5
            })
        );
        assert_eq!(notifier.sent.borrow().len(), 1);
        assert_eq!(w.tick(), Some(CycleOutcome::Unchanged));
    }
}
