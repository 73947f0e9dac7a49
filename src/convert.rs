//! Eager (whole-batch) conversion entry points.
//!
//! ## Why eager vs. streaming?
//!
//! This module provides the simpler API: run every document, then return.
//! It collects every [`ConversionJob`] into memory and tallies the final
//! [`BatchResult`] before returning. Use [`crate::stream::convert_stream`]
//! instead when you want per-document results progressively, e.g. to feed a
//! UI without waiting for the whole batch.

use crate::config::BatchConfig;
use crate::converter::{DocumentConverter, LibreOfficeConverter};
use crate::error::{BatchError, ConvertError};
use crate::naming;
use crate::output::{BatchResult, ConversionJob, JobStatus};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Check that a batch is runnable before any side effect happens.
///
/// All-or-nothing: either every path references an existing regular file and
/// the batch may start, or the first offender is reported and nothing has
/// been converted.
///
/// # Errors
/// - [`BatchError::EmptyBatch`] when `paths` is empty.
/// - [`BatchError::MissingFile`] for the first path that is not an existing
///   regular file (vanished since selection, or a directory).
pub fn validate<P: AsRef<Path>>(paths: &[P]) -> Result<(), BatchError> {
    if paths.is_empty() {
        return Err(BatchError::EmptyBatch);
    }
    for p in paths {
        let path = p.as_ref();
        if !path.is_file() {
            return Err(BatchError::MissingFile {
                path: path.to_path_buf(),
            });
        }
    }
    Ok(())
}

/// Convert a batch of documents to PDF.
///
/// This is the primary entry point for the library.
///
/// # Arguments
/// * `paths`  — Input documents, converted in this order
/// * `config` — Batch configuration
///
/// # Returns
/// `Ok(BatchResult)` once every document has been attempted, even if some
/// failed (check `result.stats.failed`). A cancelled batch also returns
/// `Ok`, with the unprocessed jobs still pending and
/// `result.stats.cancelled` set.
///
/// # Errors
/// Returns `Err(BatchError)` only for fatal errors that stop the batch
/// before any conversion: empty input, a missing input file.
pub async fn convert_all<P: AsRef<Path>>(
    paths: &[P],
    config: &BatchConfig,
) -> Result<BatchResult, BatchError> {
    run_batch(paths, config).await
}

/// Synchronous wrapper around [`convert_all`].
///
/// Creates a temporary tokio runtime internally. For callers without an
/// async context, such as a desktop shell's worker thread.
pub fn convert_all_sync<P: AsRef<Path>>(
    paths: &[P],
    config: &BatchConfig,
) -> Result<BatchResult, BatchError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| BatchError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert_all(paths, config))
}

/// A reusable batch converter enforcing the one-batch-at-a-time discipline.
///
/// [`convert_all`] as a free function runs each call on its own implicit
/// instance; construct a `BatchConverter` when several parts of an
/// application share one converter and overlapping runs must be rejected
/// rather than interleaved.
pub struct BatchConverter {
    config: BatchConfig,
    in_flight: AtomicBool,
}

impl BatchConverter {
    /// A converter that runs batches with `config`.
    pub fn new(config: BatchConfig) -> Self {
        Self {
            config,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Convert a batch of documents, rejecting overlap.
    ///
    /// Semantics are those of the free [`convert_all`], plus the
    /// single-flight rule: while one call is running on this instance, any
    /// further call returns [`BatchError::BatchInFlight`] immediately. The
    /// slot is released on every exit path, including fatal errors and
    /// cancellation.
    pub async fn convert_all<P: AsRef<Path>>(
        &self,
        paths: &[P],
    ) -> Result<BatchResult, BatchError> {
        let _guard = InFlightGuard::acquire(&self.in_flight)?;
        run_batch(paths, &self.config).await
    }

    /// The configuration this instance runs with.
    pub fn config(&self) -> &BatchConfig {
        &self.config
    }
}

/// Releases the single-flight slot when dropped, so an early `?` return or
/// a cancelled batch never leaves the instance stuck busy.
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, BatchError> {
        if flag
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            return Err(BatchError::BatchInFlight);
        }
        Ok(Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// The batch loop shared by the eager and instance entry points.
async fn run_batch<P: AsRef<Path>>(
    paths: &[P],
    config: &BatchConfig,
) -> Result<BatchResult, BatchError> {
    let batch_start = Instant::now();
    info!("Starting batch of {} documents", paths.len());

    // ── Step 1: Validate inputs ──────────────────────────────────────────
    validate(paths)?;

    // ── Step 2: Resolve the conversion engine ────────────────────────────
    let converter = resolve_converter(config);
    debug!("Using conversion engine '{}'", converter.name());

    // ── Step 3: Derive every output path up front ────────────────────────
    let mut jobs: Vec<ConversionJob> = paths
        .iter()
        .map(|p| {
            let input = p.as_ref().to_path_buf();
            let output = naming::derive_output_path(
                &input,
                config.output_dir.as_deref(),
                config.fallback_dir.as_deref(),
            );
            ConversionJob::pending(input, output)
        })
        .collect();
    let total = jobs.len();

    if let Some(ref cb) = config.progress {
        cb.on_batch_start(total);
    }

    // ── Step 4: Convert, one document at a time ──────────────────────────
    let mut cancelled = false;
    for i in 0..total {
        if let Some(ref cb) = config.progress {
            cb.on_job_start(i + 1, total, &jobs[i].input_path);
        }

        // Polled between documents only; an in-flight engine call always
        // runs to completion.
        if let Some(ref token) = config.cancel {
            if token.is_cancelled() {
                cancelled = true;
                warn!("Batch cancelled after {} of {} documents", i, total);
                if let Some(ref cb) = config.progress {
                    cb.on_batch_cancelled(i, total);
                }
                break;
            }
        }

        jobs[i].status = JobStatus::Converting;
        debug!(
            "Converting {}/{}: '{}'",
            i + 1,
            total,
            jobs[i].input_path.display()
        );

        let job_start = Instant::now();
        let outcome = run_engine(&converter, &jobs[i].input_path, &jobs[i].output_path).await;
        jobs[i].duration_ms = job_start.elapsed().as_millis() as u64;

        match outcome {
            Ok(()) => {
                jobs[i].status = JobStatus::Succeeded;
                debug!(
                    "Converted '{}' in {}ms",
                    jobs[i].input_path.display(),
                    jobs[i].duration_ms
                );
                if let Some(ref cb) = config.progress {
                    cb.on_job_complete(i + 1, total, &jobs[i].output_path);
                }
            }
            Err(e) => {
                warn!(
                    "Conversion failed for '{}': {}",
                    jobs[i].input_path.display(),
                    e
                );
                if let Some(ref cb) = config.progress {
                    cb.on_job_error(i + 1, total, &e.to_string());
                }
                jobs[i].status = JobStatus::Failed;
                jobs[i].error = Some(e);
            }
        }
    }

    // ── Step 5: Tally and report ─────────────────────────────────────────
    let result = BatchResult::new(jobs, cancelled);
    if !cancelled {
        if let Some(ref cb) = config.progress {
            cb.on_batch_complete(total, result.stats.succeeded);
        }
    }

    info!(
        "Batch complete: {}/{} documents, {}ms total",
        result.stats.succeeded,
        total,
        batch_start.elapsed().as_millis()
    );
    Ok(result)
}

/// Run one engine call off the async control task.
///
/// The converter is allowed to block (subprocess wait), so it goes through
/// `spawn_blocking`. A panic inside the engine fails its own job only; the
/// batch moves on to the next document.
pub(crate) async fn run_engine(
    converter: &Arc<dyn DocumentConverter>,
    input: &Path,
    output: &Path,
) -> Result<(), ConvertError> {
    let converter = Arc::clone(converter);
    let input = input.to_path_buf();
    let output = output.to_path_buf();
    match tokio::task::spawn_blocking(move || converter.convert(&input, &output)).await {
        Ok(result) => result,
        Err(e) => Err(ConvertError::Aborted {
            detail: if e.is_panic() {
                "conversion task panicked".to_string()
            } else {
                e.to_string()
            },
        }),
    }
}

/// Resolve the conversion engine, from most-specific to least-specific.
///
/// The four-level fallback chain lets library users and CLI users each set
/// exactly as much or as little as they need:
///
/// 1. **Pre-built engine** (`config.converter`) — the caller constructed the
///    engine entirely; we use it as-is. Useful in tests or when the caller
///    wraps an engine with middleware (caching, instrumentation).
///
/// 2. **Named program** (`config.converter_program`) — the caller named a
///    binary (e.g. `"soffice"`); we shell out to it through the stock
///    LibreOffice invocation.
///
/// 3. **Environment** (`DOCMILL_CONVERTER`) — the binary was chosen at the
///    execution-environment level (shell profile, CI, container image).
///
/// 4. **Stock engine** — `libreoffice` from `PATH`. Convenient for
///    `docmill report.docx` with no other configuration.
pub(crate) fn resolve_converter(config: &BatchConfig) -> Arc<dyn DocumentConverter> {
    // 1) User-provided engine takes priority
    if let Some(ref converter) = config.converter {
        return Arc::clone(converter);
    }

    // 2) Program named in the config
    if let Some(ref program) = config.converter_program {
        return Arc::new(LibreOfficeConverter::with_program(program.clone()));
    }

    // 3) Program named in the environment
    if let Ok(program) = std::env::var("DOCMILL_CONVERTER") {
        if !program.is_empty() {
            return Arc::new(LibreOfficeConverter::with_program(program));
        }
    }

    // 4) Stock engine from PATH
    Arc::new(LibreOfficeConverter::new())
}
