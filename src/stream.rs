//! Streaming conversion API: emit job records as they complete.
//!
//! ## Why stream?
//!
//! Large batches take minutes. A streams-based API lets callers display each
//! document's outcome immediately, feed a UI list, or persist records
//! incrementally instead of waiting for the whole [`crate::BatchResult`].
//!
//! Unlike the eager [`crate::convert::convert_all`] which returns only after
//! every document has been attempted, [`convert_stream`] yields one
//! [`ConversionJob`] per input as it reaches a terminal status. Documents are
//! processed one at a time, so jobs always arrive in input order.

use crate::config::BatchConfig;
use crate::convert::{resolve_converter, run_engine, validate};
use crate::converter::DocumentConverter;
use crate::error::BatchError;
use crate::naming;
use crate::output::{ConversionJob, JobStatus};
use futures::stream;
use std::collections::VecDeque;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;
use tokio_stream::Stream;
use tracing::{info, warn};

/// A boxed stream of per-document job records.
pub type JobStream = Pin<Box<dyn Stream<Item = ConversionJob> + Send>>;

/// Per-stream loop state threaded through `unfold`.
struct StreamState {
    queue: VecDeque<ConversionJob>,
    next_num: usize,
    total: usize,
    succeeded: usize,
    config: BatchConfig,
    converter: Arc<dyn DocumentConverter>,
}

/// Convert a batch of documents, streaming each job as it finishes.
///
/// Validation and output-path derivation happen eagerly, before the stream
/// is returned, so the fatal errors are the same as for
/// [`crate::convert::convert_all`]. Progress callbacks fire exactly as in
/// the eager API. A cancel request observed between documents ends the
/// stream early; the unprocessed jobs are simply never yielded.
///
/// # Returns
/// - `Ok(JobStream)` — a stream of [`ConversionJob`], in input order
/// - `Err(BatchError)` — fatal error (empty batch, missing input file)
///
/// # Example
/// ```rust,no_run
/// use docmill::{convert_stream, BatchConfig};
/// use futures::StreamExt;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = BatchConfig::default();
/// let mut jobs = convert_stream(&["a.docx", "b.docx"], &config).await?;
/// while let Some(job) = jobs.next().await {
///     println!("{}", job.summary_line());
/// }
/// # Ok(())
/// # }
/// ```
pub async fn convert_stream<P: AsRef<Path>>(
    paths: &[P],
    config: &BatchConfig,
) -> Result<JobStream, BatchError> {
    info!("Starting streaming batch of {} documents", paths.len());

    // ── Validate and derive up front ─────────────────────────────────────
    validate(paths)?;
    let converter = resolve_converter(config);
    let queue: VecDeque<ConversionJob> = paths
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
    let total = queue.len();

    if let Some(ref cb) = config.progress {
        cb.on_batch_start(total);
    }

    // ── Build the stream ─────────────────────────────────────────────────
    let state = StreamState {
        queue,
        next_num: 1,
        total,
        succeeded: 0,
        config: config.clone(),
        converter,
    };

    let s = stream::unfold(state, |mut st| async move {
        let mut job = st.queue.pop_front()?;
        let num = st.next_num;
        st.next_num += 1;

        if let Some(ref cb) = st.config.progress {
            cb.on_job_start(num, st.total, &job.input_path);
        }

        // Same discipline as the eager loop: polled between documents only.
        if let Some(ref token) = st.config.cancel {
            if token.is_cancelled() {
                warn!("Batch cancelled after {} of {} documents", num - 1, st.total);
                if let Some(ref cb) = st.config.progress {
                    cb.on_batch_cancelled(num - 1, st.total);
                }
                return None;
            }
        }

        job.status = JobStatus::Converting;
        let start = Instant::now();
        let outcome = run_engine(&st.converter, &job.input_path, &job.output_path).await;
        job.duration_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Ok(()) => {
                job.status = JobStatus::Succeeded;
                st.succeeded += 1;
                if let Some(ref cb) = st.config.progress {
                    cb.on_job_complete(num, st.total, &job.output_path);
                }
            }
            Err(e) => {
                warn!("Conversion failed for '{}': {}", job.input_path.display(), e);
                if let Some(ref cb) = st.config.progress {
                    cb.on_job_error(num, st.total, &e.to_string());
                }
                job.status = JobStatus::Failed;
                job.error = Some(e);
            }
        }

        // The last yielded job closes the batch; a later poll may never come.
        if num == st.total {
            if let Some(ref cb) = st.config.progress {
                cb.on_batch_complete(st.total, st.succeeded);
            }
        }

        Some((job, st))
    });

    Ok(Box::pin(s))
}
