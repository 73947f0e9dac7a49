//! Progress-callback trait for per-document batch events.
//!
//! Inject an [`Arc<dyn BatchProgressCallback>`] via
//! [`crate::config::BatchConfigBuilder::progress`] to receive real-time
//! events as the batch works through its documents.
//!
//! # Why callbacks instead of channels?
//!
//! The callback approach is the least-invasive integration point: callers can
//! forward events to a Tokio broadcast channel, a GUI event loop, a database
//! record, or a terminal progress bar, without the library knowing anything
//! about how the host application communicates. Marshalling onto a UI thread
//! is the caller's concern.
//!
//! # Example
//!
//! ```rust
//! use docmill::{BatchProgressCallback, BatchConfig};
//! use std::path::Path;
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     completed: Arc<AtomicUsize>,
//! }
//!
//! impl BatchProgressCallback for CountingCallback {
//!     fn on_job_complete(&self, job_num: usize, total_jobs: usize, output: &Path) {
//!         self.completed.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("Job {}/{} done → {}", job_num, total_jobs, output.display());
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback {
//!     completed: Arc::new(AtomicUsize::new(0)),
//! });
//!
//! let config = BatchConfig::builder()
//!     .progress(counter as Arc<dyn BatchProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::path::Path;
use std::sync::Arc;

/// Called by the batch loop as it processes each document.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
///
/// # Thread safety
///
/// Documents are processed one at a time, so events fire sequentially and in
/// input order, never concurrently. Implementations still must be
/// `Send + Sync` because the batch may run on any runtime worker thread.
pub trait BatchProgressCallback: Send + Sync {
    /// Called once before any document is converted.
    ///
    /// # Arguments
    /// * `total_jobs` — number of documents in the batch
    fn on_batch_start(&self, total_jobs: usize) {
        let _ = total_jobs;
    }

    /// Called just before a document is handed to the conversion engine.
    ///
    /// # Arguments
    /// * `job_num`    — 1-indexed position within the batch
    /// * `total_jobs` — total documents in the batch
    /// * `input`      — the document about to be converted
    fn on_job_start(&self, job_num: usize, total_jobs: usize, input: &Path) {
        let _ = (job_num, total_jobs, input);
    }

    /// Called when a document is successfully converted.
    ///
    /// # Arguments
    /// * `job_num`    — 1-indexed position within the batch
    /// * `total_jobs` — total documents
    /// * `output`     — path of the produced PDF
    fn on_job_complete(&self, job_num: usize, total_jobs: usize, output: &Path) {
        let _ = (job_num, total_jobs, output);
    }

    /// Called when a document fails to convert. The batch continues.
    ///
    /// # Arguments
    /// * `job_num`    — 1-indexed position within the batch
    /// * `total_jobs` — total documents
    /// * `error`      — human-readable error description
    fn on_job_error(&self, job_num: usize, total_jobs: usize, error: &str) {
        let _ = (job_num, total_jobs, error);
    }

    /// Called once when a cancel request halts the batch early.
    ///
    /// Not followed by [`on_batch_complete`](Self::on_batch_complete).
    ///
    /// # Arguments
    /// * `completed`  — documents that reached a terminal state before the halt
    /// * `total_jobs` — total documents in the batch
    fn on_batch_cancelled(&self, completed: usize, total_jobs: usize) {
        let _ = (completed, total_jobs);
    }

    /// Called once after the last document has been attempted.
    ///
    /// # Arguments
    /// * `total_jobs`    — total documents in the batch
    /// * `success_count` — documents that converted without error
    fn on_batch_complete(&self, total_jobs: usize, success_count: usize) {
        let _ = (total_jobs, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
///
/// This is the default when no callback is configured.
pub struct NoopProgressCallback;

impl BatchProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::BatchConfig`].
pub type ProgressCallback = Arc<dyn BatchProgressCallback>;
