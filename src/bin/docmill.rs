//! CLI binary for docmill.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `BatchConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use docmill::{
    convert_all, export_output, find_documents, validate, BatchConfig, BatchProgressCallback,
    CancelToken, JobStatus, ProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: renders a live progress bar and per-document
/// log lines using [indicatif]. Documents run one at a time, so a single
/// start-time slot is enough for elapsed reporting.
struct CliProgressCallback {
    /// The single progress bar anchored at the bottom of the terminal.
    bar: ProgressBar,
    /// Start time of the document currently converting.
    start_time: Mutex<Option<Instant>>,
}

impl CliProgressCallback {
    /// Create a callback whose progress-bar length is set dynamically
    /// by `on_batch_start` (called once validation has passed).
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_batch_start

        // Initial style: spinner only (no counter until the batch starts).
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Checking inputs…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            start_time: Mutex::new(None),
        })
    }

    /// Switch to the full progress-bar style once we know `total`.
    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} documents  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Converting");
        self.bar.reset_eta();
    }

    fn take_elapsed_ms(&self) -> u128 {
        self.start_time
            .lock()
            .unwrap()
            .take()
            .map(|t| t.elapsed().as_millis())
            .unwrap_or(0)
    }
}

impl BatchProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_jobs: usize) {
        // Switch from spinner-only style to full progress bar now that the
        // batch has passed validation.
        self.activate_bar(total_jobs);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Starting batch of {total_jobs} documents…"))
        ));
    }

    fn on_job_start(&self, _job_num: usize, _total_jobs: usize, input: &Path) {
        *self.start_time.lock().unwrap() = Some(Instant::now());
        self.bar.set_message(display_name(input));
    }

    fn on_job_complete(&self, job_num: usize, total_jobs: usize, output: &Path) {
        let elapsed_ms = self.take_elapsed_ms();

        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}  {}",
            green("✓"),
            job_num,
            total_jobs,
            display_name(output),
            dim(&format!("{:.1}s", elapsed_ms as f64 / 1000.0)),
        ));
        self.bar.inc(1);
    }

    fn on_job_error(&self, job_num: usize, total_jobs: usize, error: &str) {
        let elapsed_ms = self.take_elapsed_ms();

        // Truncate very long error messages to keep output tidy.
        let msg = if error.chars().count() > 80 {
            let head: String = error.chars().take(79).collect();
            format!("{head}\u{2026}")
        } else {
            error.to_string()
        };

        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}  {}",
            red("✗"),
            job_num,
            total_jobs,
            red(&msg),
            dim(&format!("{:.1}s", elapsed_ms as f64 / 1000.0)),
        ));
        self.bar.inc(1);
    }

    fn on_batch_cancelled(&self, completed: usize, total_jobs: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} Cancelled after {}/{} documents  (finished files are kept)",
            cyan("⚠"),
            bold(&completed.to_string()),
            total_jobs,
        );
    }

    fn on_batch_complete(&self, total_jobs: usize, success_count: usize) {
        let failed = total_jobs.saturating_sub(success_count);
        self.bar.finish_and_clear();

        if failed == 0 {
            eprintln!(
                "{} {} documents converted successfully",
                green("✔"),
                bold(&success_count.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} documents converted  ({} failed)",
                if failed == total_jobs {
                    red("✘")
                } else {
                    cyan("⚠")
                },
                bold(&success_count.to_string()),
                total_jobs,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert two documents (outputs land next to the inputs)
  docmill report.docx letter.doc

  # Whole folder, recursively, outputs collected in one directory
  docmill --dir ~/Documents/contracts --recursive --outdir ./pdf

  # Only .docx, then copy the produced PDFs to a share
  docmill --dir ./inbox --ext docx --copy-to /mnt/share/outbox

  # Validate a selection without converting anything
  docmill --check *.docx

  # Machine-readable result
  docmill --json report.docx > result.json

  # Use a specific LibreOffice binary
  docmill --converter /opt/libreoffice/program/soffice report.docx

THE CONVERSION ENGINE:
  Conversion shells out to LibreOffice in headless mode:
    libreoffice --headless --convert-to pdf:writer_pdf_Export --outdir <staging> <input>
  Install LibreOffice and make sure the binary is on PATH, or point
  --converter (or DOCMILL_CONVERTER) at it. A running LibreOffice desktop
  instance can hold the user-profile lock; close it before large batches.

OUTPUT NAMING:
  Each input produces {stem}_converted.pdf in the input's own directory, or
  in --outdir when given. Re-running a batch overwrites the same files; a
  bare filename input falls back to the system temp directory.

BEHAVIOUR:
  Documents are converted one at a time, in the order given. A document
  that fails is reported and the batch continues. Ctrl-C cancels between
  documents: the file being converted finishes, the rest stay untouched.

ENVIRONMENT VARIABLES:
  DOCMILL_CONVERTER    Conversion engine binary (default: libreoffice)
  DOCMILL_OUTDIR       Default --outdir
  DOCMILL_COPY_TO      Default --copy-to
  DOCMILL_EXT          Default --ext list
  DOCMILL_NO_PROGRESS  Disable the progress bar

EXIT CODES:
  0  every document converted
  1  at least one document failed, or the batch was cancelled
  2  the batch could not start (empty selection, missing input, bad config)
"#;

/// Batch-convert Word documents to PDF.
#[derive(Parser, Debug)]
#[command(
    name = "docmill",
    version,
    about = "Batch-convert Word documents to PDF via a headless engine",
    long_about = "Convert Word documents (.doc, .docx) to PDF in batch: sequential processing, \
per-document progress, cooperative cancellation (Ctrl-C), and a summary of exactly what was \
produced where. The format conversion itself is delegated to LibreOffice running headless.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Word documents to convert, in batch order.
    #[arg(required_unless_present = "dir")]
    inputs: Vec<PathBuf>,

    /// Convert every matching document in this directory (see --ext).
    #[arg(short, long, env = "DOCMILL_DIR")]
    dir: Option<PathBuf>,

    /// Recurse into subdirectories of --dir.
    #[arg(short, long, requires = "dir")]
    recursive: bool,

    /// File extensions collected by --dir.
    #[arg(
        long,
        env = "DOCMILL_EXT",
        default_value = "doc,docx",
        value_delimiter = ','
    )]
    ext: Vec<String>,

    /// Collect every output here instead of next to each input.
    #[arg(short, long, env = "DOCMILL_OUTDIR")]
    outdir: Option<PathBuf>,

    /// Conversion engine binary (e.g. soffice, or a full path).
    #[arg(
        long,
        env = "DOCMILL_CONVERTER",
        long_help = "Conversion engine binary. The engine is invoked as\n\
          <PROGRAM> --headless --convert-to pdf:writer_pdf_Export --outdir <staging> <input>\n\
          Default: libreoffice from PATH."
    )]
    converter: Option<String>,

    /// After the batch, copy each produced PDF into this directory.
    #[arg(long, env = "DOCMILL_COPY_TO")]
    copy_to: Option<PathBuf>,

    /// Output the batch result as pretty JSON instead of the textual summary.
    #[arg(long, env = "DOCMILL_JSON")]
    json: bool,

    /// Validate the selection and exit without converting anything.
    #[arg(long)]
    check: bool,

    /// Disable the progress bar.
    #[arg(long, env = "DOCMILL_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DOCMILL_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "DOCMILL_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.quiet || show_progress {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    // In verbose mode we always want all logs regardless of progress.
    let filter = if cli.verbose { "debug" } else { filter };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Collect inputs ───────────────────────────────────────────────────
    let mut inputs = cli.inputs.clone();
    if let Some(ref dir) = cli.dir {
        match find_documents(dir, cli.recursive, &cli.ext) {
            Ok(mut found) => inputs.append(&mut found),
            Err(e) => {
                eprintln!("{} {e}", red("✘"));
                std::process::exit(2);
            }
        }
    }

    // ── Check-only mode ──────────────────────────────────────────────────
    if cli.check {
        match validate(&inputs) {
            Ok(()) => {
                if !cli.quiet {
                    println!(
                        "{} {} ready to convert",
                        green("✔"),
                        bold(&format!("{} documents", inputs.len()))
                    );
                }
                return Ok(());
            }
            Err(e) => {
                eprintln!("{} {e}", red("✘"));
                std::process::exit(2);
            }
        }
    }

    // ── Ctrl-C cancels between documents ─────────────────────────────────
    let cancel = CancelToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    // ── Build config ─────────────────────────────────────────────────────
    // The progress bar starts as a spinner (validation may still reject the
    // batch); `on_batch_start` resizes it to the real total.
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn BatchProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb, cancel)?;

    // ── Run the batch ────────────────────────────────────────────────────
    let result = match convert_all(&inputs, &config).await {
        Ok(result) => result,
        Err(e) => {
            eprintln!("{} {e}", red("✘"));
            std::process::exit(2);
        }
    };

    // ── Report ───────────────────────────────────────────────────────────
    if cli.json {
        let json = serde_json::to_string_pretty(&result).context("Failed to serialise result")?;
        println!("{json}");
    } else if !show_progress && !cli.quiet {
        // The live callback already reported each document; without it,
        // print the plain per-file report.
        println!("{}", result.summary());
        eprintln!(
            "Converted {}/{} documents in {}ms",
            result.stats.succeeded, result.stats.total, result.stats.total_duration_ms
        );
        if result.stats.cancelled {
            eprintln!("  cancelled, {} documents not converted", result.stats.pending);
        }
    }

    // ── Save-as: copy produced PDFs ──────────────────────────────────────
    let mut export_failures = 0usize;
    if let Some(ref dest) = cli.copy_to {
        for job in result.jobs.iter().filter(|j| j.status == JobStatus::Succeeded) {
            match export_output(&job.output_path, dest).await {
                Ok(copied) => {
                    if !cli.quiet {
                        eprintln!(
                            "  {} {}",
                            dim("⇒"),
                            dim(&format!(
                                "{} → {}",
                                job.output_name(),
                                copied.display()
                            )),
                        );
                    }
                }
                Err(e) => {
                    export_failures += 1;
                    eprintln!("  {} {e}", red("✘"));
                }
            }
        }
    }

    if export_failures > 0 || !result.all_succeeded() {
        std::process::exit(1);
    }
    Ok(())
}

/// Map CLI args to `BatchConfig`.
fn build_config(
    cli: &Cli,
    progress: Option<ProgressCallback>,
    cancel: CancelToken,
) -> Result<BatchConfig> {
    let mut builder = BatchConfig::builder().cancel(cancel);

    if let Some(ref outdir) = cli.outdir {
        builder = builder.output_dir(outdir.clone());
    }
    if let Some(ref program) = cli.converter {
        builder = builder.converter_program(program.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress(cb);
    }

    builder.build().context("Invalid configuration")
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
