//! Error types for the docmill library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`BatchError`] — **Fatal**: the batch cannot start at all (no inputs
//!   selected, a selected file has vanished, a second batch on a busy
//!   converter), or an auxiliary operation (directory scan, save-as copy)
//!   failed. Returned as `Err(BatchError)` from the top-level entry points.
//!
//! * [`ConvertError`] — **Non-fatal**: a single document failed to convert
//!   (engine exited non-zero, engine binary missing, no output produced) but
//!   the rest of the batch is fine. Stored inside
//!   [`crate::output::ConversionJob`] so callers can inspect partial success
//!   rather than losing the whole batch to one bad file.
//!
//! The separation keeps the contract crisp: validation failures stop
//! everything before any side effect; per-document failures are captured in
//! the job record and the batch moves on to the next file.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the docmill library.
///
/// Per-document failures use [`ConvertError`] and are stored in
/// [`crate::output::ConversionJob`] rather than propagated here.
#[derive(Debug, Error)]
pub enum BatchError {
    // ── Validation errors ─────────────────────────────────────────────────
    /// The batch contained no input paths.
    #[error("No input documents were selected")]
    EmptyBatch,

    /// A selected path no longer references an existing file.
    #[error("Input file not found: '{path}'\nCheck the path exists and is a regular file.")]
    MissingFile { path: PathBuf },

    // ── Lifecycle errors ──────────────────────────────────────────────────
    /// A second batch was started while this converter instance was busy.
    ///
    /// One converter instance runs at most one batch at a time. Wait for the
    /// running batch to finish, or create a separate instance.
    #[error("A batch is already running on this converter instance")]
    BatchInFlight,

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Directory discovery could not read an entry.
    #[error("Failed to scan directory '{path}': {source}")]
    ScanFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not copy a converted document during the save-as step.
    #[error("Failed to export '{path}': {source}")]
    ExportFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single document.
///
/// Stored alongside the failed [`crate::output::ConversionJob`]. The batch
/// continues with the next document.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum ConvertError {
    /// The conversion engine ran but reported failure.
    #[error("'{engine}' failed: {detail}")]
    EngineFailed { engine: String, detail: String },

    /// The conversion engine could not be started at all.
    #[error("'{engine}' could not be started: {detail}")]
    EngineUnavailable { engine: String, detail: String },

    /// The engine reported success but the output file never appeared.
    #[error("No output produced at '{path}'")]
    OutputMissing { path: PathBuf },

    /// The conversion task was torn down before completing.
    ///
    /// Panics inside the engine call are normalised to this variant at the
    /// item boundary; they never propagate out of the batch loop.
    #[error("Conversion aborted: {detail}")]
    Aborted { detail: String },
}
