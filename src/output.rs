//! Result types for a conversion batch.
//!
//! A batch run produces one [`ConversionJob`] per input document, collected
//! into a [`BatchResult`] together with aggregate [`BatchStats`]. Jobs appear
//! in input order, always all of them: a failed or skipped document is a job
//! record, not a missing entry.
//!
//! All types here serialise to JSON so the CLI's `--json` mode and any
//! embedding application can persist or transmit a run's outcome verbatim.

use crate::error::ConvertError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Lifecycle state of a single document within a batch.
///
/// Transitions are strictly forward: `Pending → Converting → Succeeded` or
/// `Pending → Converting → Failed`. A cancelled batch leaves every
/// unprocessed job `Pending`; there is no separate cancelled state, the
/// early halt is recorded once on [`BatchStats::cancelled`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    /// Not yet picked up by the batch loop.
    Pending,
    /// Handed to the conversion engine.
    Converting,
    /// Output file produced at `output_path`.
    Succeeded,
    /// Engine failed; see [`ConversionJob::error`].
    Failed,
}

impl JobStatus {
    /// Whether the job has reached an end state.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Succeeded | JobStatus::Failed)
    }
}

/// One document's journey through the batch.
///
/// The output path is derived before conversion starts, so the record is
/// complete even when the job never runs (validation failure elsewhere,
/// cancellation).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionJob {
    /// The source document as selected by the caller.
    pub input_path: PathBuf,
    /// Where the converted PDF lands (or would have landed).
    pub output_path: PathBuf,
    /// Current lifecycle state.
    pub status: JobStatus,
    /// Set iff `status` is [`JobStatus::Failed`].
    pub error: Option<ConvertError>,
    /// Wall-clock time spent in the engine call. Zero unless terminal.
    pub duration_ms: u64,
}

impl ConversionJob {
    /// A fresh job, not yet started.
    pub fn pending(input_path: PathBuf, output_path: PathBuf) -> Self {
        Self {
            input_path,
            output_path,
            status: JobStatus::Pending,
            error: None,
            duration_ms: 0,
        }
    }

    /// File name of the input, for display.
    pub fn input_name(&self) -> String {
        display_name(&self.input_path)
    }

    /// File name of the output, for display.
    pub fn output_name(&self) -> String {
        display_name(&self.output_path)
    }

    /// One report line for this job.
    ///
    /// `✓ report.docx → report_converted.pdf` for a success,
    /// `✗ report.docx: <error>` for a failure,
    /// `• report.docx (not converted)` for a job the batch never reached.
    pub fn summary_line(&self) -> String {
        match self.status {
            JobStatus::Succeeded => {
                format!("✓ {} → {}", self.input_name(), self.output_name())
            }
            JobStatus::Failed => {
                let detail = self
                    .error
                    .as_ref()
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "unknown error".into());
                format!("✗ {}: {}", self.input_name(), detail)
            }
            JobStatus::Pending | JobStatus::Converting => {
                format!("• {} (not converted)", self.input_name())
            }
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Aggregate counts for a batch run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchStats {
    /// Number of input documents.
    pub total: usize,
    /// Jobs that produced an output file.
    pub succeeded: usize,
    /// Jobs whose engine call failed.
    pub failed: usize,
    /// Jobs never reached, only non-zero after cancellation.
    pub pending: usize,
    /// Whether the batch was halted early by a cancel request.
    pub cancelled: bool,
    /// Sum of per-job engine durations in milliseconds.
    pub total_duration_ms: u64,
}

impl BatchStats {
    /// Tally counts from a finished job list.
    pub fn tally(jobs: &[ConversionJob], cancelled: bool) -> Self {
        let mut stats = BatchStats {
            total: jobs.len(),
            cancelled,
            ..Default::default()
        };
        for job in jobs {
            match job.status {
                JobStatus::Succeeded => stats.succeeded += 1,
                JobStatus::Failed => stats.failed += 1,
                JobStatus::Pending | JobStatus::Converting => stats.pending += 1,
            }
            stats.total_duration_ms += job.duration_ms;
        }
        stats
    }
}

/// Outcome of a whole batch: every job in input order, plus the tallies.
///
/// Returned by [`crate::convert_all`] once the loop has finished or been
/// cancelled. Immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult {
    /// Per-document records, in input order.
    pub jobs: Vec<ConversionJob>,
    /// Aggregate counts.
    pub stats: BatchStats,
}

impl BatchResult {
    /// Assemble a result, tallying stats from the job list.
    pub fn new(jobs: Vec<ConversionJob>, cancelled: bool) -> Self {
        let stats = BatchStats::tally(&jobs, cancelled);
        Self { jobs, stats }
    }

    /// Whether every job produced an output file.
    pub fn all_succeeded(&self) -> bool {
        self.stats.succeeded == self.stats.total
    }

    /// The textual report: one [`ConversionJob::summary_line`] per job,
    /// newline-joined, in input order.
    pub fn summary(&self) -> String {
        self.jobs
            .iter()
            .map(ConversionJob::summary_line)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
