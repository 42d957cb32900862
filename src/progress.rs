//! Progress and notice callbacks for export runs.
//!
//! Inject an [`Arc<dyn ExportProgressCallback>`] via
//! [`crate::Exporter::with_progress`] to receive user-facing notices
//! (warnings about unresolved links, success and failure messages) and
//! per-document batch events.
//!
//! The library never prints. Everything a user should see goes through this
//! trait, so a terminal front-end can render a progress bar while a test can
//! simply record the events.
//!
//! # Example
//!
//! ```rust
//! use vault2hugo::{ExportProgressCallback, NoticeLevel};
//! use std::sync::{Arc, Mutex};
//!
//! #[derive(Default)]
//! struct Collect(Mutex<Vec<String>>);
//!
//! impl ExportProgressCallback for Collect {
//!     fn on_notice(&self, level: NoticeLevel, message: String) {
//!         self.0.lock().unwrap().push(format!("{level:?}: {message}"));
//!     }
//! }
//!
//! let cb: Arc<dyn ExportProgressCallback> = Arc::new(Collect::default());
//! cb.on_notice(NoticeLevel::Info, "hello".into());
//! ```

use crate::output::{BatchSummary, ExportOutcome};
use std::sync::Arc;

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Receives notices and batch progress from the exporter.
///
/// All methods default to no-ops so callers only override what they need.
/// Implementations must be `Send + Sync`; the exporter holds them in an `Arc`.
pub trait ExportProgressCallback: Send + Sync {
    /// A message the user should see.
    fn on_notice(&self, level: NoticeLevel, message: String) {
        let _ = (level, message);
    }

    /// Called once before the first document of a batch.
    fn on_batch_start(&self, total: usize) {
        let _ = total;
    }

    /// Called before each document of a batch.
    ///
    /// # Arguments
    /// * `index`: 1-indexed position in the batch
    /// * `total`: number of notes in the batch
    /// * `name` : note basename
    fn on_document_start(&self, index: usize, total: usize, name: &str) {
        let _ = (index, total, name);
    }

    /// Called after each document of a batch with its outcome.
    fn on_document_complete(
        &self,
        index: usize,
        total: usize,
        name: &str,
        outcome: &ExportOutcome,
    ) {
        let _ = (index, total, name, outcome);
    }

    /// Called once after every document has been attempted.
    fn on_batch_complete(&self, summary: &BatchSummary) {
        let _ = summary;
    }
}

/// A no-op implementation; the default when no callback is configured.
pub struct NoopProgressCallback;

impl ExportProgressCallback for NoopProgressCallback {}

/// Convenience alias for the type stored in [`crate::Exporter`].
pub type ProgressCallback = Arc<dyn ExportProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counting {
        notices: AtomicUsize,
        started: AtomicUsize,
        completed: AtomicUsize,
    }

    impl ExportProgressCallback for Counting {
        fn on_notice(&self, _level: NoticeLevel, _message: String) {
            self.notices.fetch_add(1, Ordering::SeqCst);
        }

        fn on_document_start(&self, _index: usize, _total: usize, _name: &str) {
            self.started.fetch_add(1, Ordering::SeqCst);
        }

        fn on_document_complete(
            &self,
            _index: usize,
            _total: usize,
            _name: &str,
            _outcome: &ExportOutcome,
        ) {
            self.completed.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_notice(NoticeLevel::Warning, "x".into());
        cb.on_batch_start(2);
        cb.on_document_start(1, 2, "a");
        cb.on_document_complete(1, 2, "a", &ExportOutcome::MissingSlug);
        cb.on_batch_complete(&BatchSummary::default());
    }

    #[test]
    fn counting_callback_receives_events() {
        let cb = Counting::default();
        cb.on_document_start(1, 2, "a");
        cb.on_document_complete(1, 2, "a", &ExportOutcome::MissingSlug);
        cb.on_document_start(2, 2, "b");
        cb.on_notice(NoticeLevel::Error, "boom".into());
        assert_eq!(cb.started.load(Ordering::SeqCst), 2);
        assert_eq!(cb.completed.load(Ordering::SeqCst), 1);
        assert_eq!(cb.notices.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_batch_start(10);
    }
}
