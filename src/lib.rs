//! # docmill
//!
//! Batch-convert Word documents to PDF with per-file progress, cooperative
//! cancellation, and a summary report.
//!
//! ## Why this crate?
//!
//! Converting one document is a single subprocess call. Converting a folder
//! of them well is not: one corrupt file must not sink the other forty-nine,
//! a UI needs per-file progress while the engine grinds, the user may change
//! their mind halfway through, and at the end somebody has to say exactly
//! what was produced where. This crate owns that orchestration and treats
//! the format conversion itself as an injected, replaceable engine
//! (LibreOffice in headless mode by default).
//!
//! ## Pipeline Overview
//!
//! ```text
//! inputs
//!  │
//!  ├─ 1. Validate  every path must be an existing file, or nothing runs
//!  ├─ 2. Derive    output paths fixed up front ({stem}_converted.pdf)
//!  ├─ 3. Convert   one document at a time via the engine (spawn_blocking)
//!  │               · progress events per document, in input order
//!  │               · cancellation polled between documents
//!  │               · a failed document is recorded, the batch continues
//!  └─ 4. Report    BatchResult: every job's status + aggregate stats
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docmill::{convert_all, BatchConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Engine resolved from the config, DOCMILL_CONVERTER, or PATH
//!     let config = BatchConfig::default();
//!     let result = convert_all(&["a.docx", "b.docx"], &config).await?;
//!     println!("{}", result.summary());
//!     eprintln!(
//!         "{}/{} converted",
//!         result.stats.succeeded, result.stats.total
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `docmill` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! docmill = { version = "0.3", default-features = false }
//! ```
//!
//! ## Failure model
//!
//! Two kinds of failure, two types:
//!
//! * a batch that cannot start (empty selection, vanished input) is an
//!   [`Err(BatchError)`](BatchError) before any side effect;
//! * a document that fails to convert is a [`ConversionJob`] with
//!   [`JobStatus::Failed`] and a [`ConvertError`] inside an `Ok` result, and
//!   the remaining documents still run.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod cancel;
pub mod config;
pub mod convert;
pub mod converter;
pub mod discover;
pub mod error;
pub mod export;
pub mod naming;
pub mod output;
pub mod progress;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use cancel::CancelToken;
pub use config::{BatchConfig, BatchConfigBuilder};
pub use convert::{convert_all, convert_all_sync, validate, BatchConverter};
pub use converter::{DocumentConverter, FnConverter, LibreOfficeConverter};
pub use discover::find_documents;
pub use error::{BatchError, ConvertError};
pub use export::export_output;
pub use naming::{derive_output_path, OUTPUT_SUFFIX};
pub use output::{BatchResult, BatchStats, ConversionJob, JobStatus};
pub use progress::{BatchProgressCallback, NoopProgressCallback, ProgressCallback};
pub use stream::{convert_stream, JobStream};
