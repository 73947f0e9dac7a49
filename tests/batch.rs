//! Integration tests for the batch loop, driven by mock engines.
//!
//! No LibreOffice required: conversions go through [`FnConverter`] closures
//! that write stub files (or fail, or panic) on demand. Real-engine coverage
//! lives in `tests/e2e.rs` behind the `DOCMILL_E2E` gate.

use docmill::{
    convert_all, convert_all_sync, convert_stream, derive_output_path, BatchConfig,
    BatchConverter, BatchError, BatchProgressCallback, CancelToken, ConvertError, FnConverter,
    JobStatus,
};
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Lay out stub documents in a fresh temp directory.
fn stage_documents(names: &[&str]) -> (TempDir, Vec<PathBuf>) {
    let dir = tempfile::tempdir().expect("tempdir");
    let paths = names
        .iter()
        .map(|name| {
            let path = dir.path().join(name);
            std::fs::write(&path, b"stub document").expect("write fixture");
            path
        })
        .collect();
    (dir, paths)
}

/// An engine that counts its calls and writes a stub PDF at the output path.
fn stub_engine(
    calls: Arc<AtomicUsize>,
) -> Arc<FnConverter<impl Fn(&Path, &Path) -> Result<(), ConvertError> + Send + Sync>> {
    Arc::new(FnConverter::new("stub", move |_input: &Path, output: &Path| {
        calls.fetch_add(1, Ordering::SeqCst);
        write_stub(output)
    }))
}

fn write_stub(output: &Path) -> Result<(), ConvertError> {
    std::fs::write(output, b"%PDF-1.4 stub").map_err(|e| ConvertError::EngineFailed {
        engine: "stub".into(),
        detail: e.to_string(),
    })
}

/// Records every progress event as a compact line, in arrival order.
#[derive(Default)]
struct RecordingCallback {
    events: Mutex<Vec<String>>,
}

impl RecordingCallback {
    fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn push(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

impl BatchProgressCallback for RecordingCallback {
    fn on_batch_start(&self, total_jobs: usize) {
        self.push(format!("batch_start {total_jobs}"));
    }

    fn on_job_start(&self, job_num: usize, _total_jobs: usize, _input: &Path) {
        self.push(format!("job_start {job_num}"));
    }

    fn on_job_complete(&self, job_num: usize, _total_jobs: usize, _output: &Path) {
        self.push(format!("job_complete {job_num}"));
    }

    fn on_job_error(&self, job_num: usize, _total_jobs: usize, _error: &str) {
        self.push(format!("job_error {job_num}"));
    }

    fn on_batch_cancelled(&self, completed: usize, total_jobs: usize) {
        self.push(format!("batch_cancelled {completed}/{total_jobs}"));
    }

    fn on_batch_complete(&self, total_jobs: usize, success_count: usize) {
        self.push(format!("batch_complete {total_jobs} {success_count}"));
    }
}

// ── Happy path ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn all_success_preserves_order_and_counts() {
    let (_dir, paths) = stage_documents(&["a.docx", "b.docx", "c.docx"]);
    let calls = Arc::new(AtomicUsize::new(0));
    let config = BatchConfig::builder()
        .converter(stub_engine(Arc::clone(&calls)))
        .build()
        .expect("config");

    let result = convert_all(&paths, &config).await.expect("batch runs");

    assert_eq!(result.stats.total, 3);
    assert_eq!(result.stats.succeeded, 3);
    assert_eq!(result.stats.failed, 0);
    assert!(result.all_succeeded());
    assert!(!result.stats.cancelled);
    assert_eq!(calls.load(Ordering::SeqCst), 3);

    for (job, input) in result.jobs.iter().zip(&paths) {
        assert_eq!(&job.input_path, input, "jobs stay in input order");
        assert_eq!(job.status, JobStatus::Succeeded);
        assert!(job.error.is_none());
        // Output lands next to the input with the fixed suffix.
        assert_eq!(job.output_path.parent(), input.parent());
        assert!(job.output_path.is_file(), "stub PDF written to disk");
    }
    assert!(result.jobs[0].output_path.ends_with("a_converted.pdf"));
}

#[test]
fn sync_wrapper_runs_the_same_batch() {
    let (_dir, paths) = stage_documents(&["a.docx"]);
    let calls = Arc::new(AtomicUsize::new(0));
    let config = BatchConfig::builder()
        .converter(stub_engine(Arc::clone(&calls)))
        .build()
        .expect("config");

    let result = convert_all_sync(&paths, &config).expect("batch runs");
    assert_eq!(result.stats.succeeded, 1);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

// ── Validation ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn empty_batch_is_rejected_before_any_work() {
    let calls = Arc::new(AtomicUsize::new(0));
    let config = BatchConfig::builder()
        .converter(stub_engine(Arc::clone(&calls)))
        .build()
        .expect("config");

    let err = convert_all(&[] as &[PathBuf], &config)
        .await
        .expect_err("empty selection");
    assert!(matches!(err, BatchError::EmptyBatch));
    assert_eq!(calls.load(Ordering::SeqCst), 0, "engine never invoked");
}

#[tokio::test]
async fn missing_file_stops_the_whole_batch() {
    let (dir, mut paths) = stage_documents(&["a.docx"]);
    let gone = dir.path().join("gone.docx");
    paths.push(gone.clone());

    let calls = Arc::new(AtomicUsize::new(0));
    let recorder = Arc::new(RecordingCallback::default());
    let config = BatchConfig::builder()
        .converter(stub_engine(Arc::clone(&calls)))
        .progress(Arc::clone(&recorder) as Arc<dyn BatchProgressCallback>)
        .build()
        .expect("config");

    let err = convert_all(&paths, &config).await.expect_err("gone.docx");
    match &err {
        BatchError::MissingFile { path } => assert_eq!(path, &gone),
        other => panic!("expected MissingFile, got {other:?}"),
    }
    assert!(err.to_string().contains("gone.docx"), "message names the file");

    // All-or-nothing: even the existing document was not touched.
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(recorder.events().is_empty(), "no progress before validation");
}

// ── Per-document failure isolation ───────────────────────────────────────────

#[tokio::test]
async fn one_failure_does_not_abort_the_batch() {
    let (_dir, paths) = stage_documents(&["a.docx", "b.docx", "c.docx"]);
    let calls = Arc::new(AtomicUsize::new(0));
    let calls_in_engine = Arc::clone(&calls);
    let converter = Arc::new(FnConverter::new(
        "picky",
        move |input: &Path, output: &Path| {
            calls_in_engine.fetch_add(1, Ordering::SeqCst);
            if input.file_name().is_some_and(|n| n.to_string_lossy().starts_with('b')) {
                return Err(ConvertError::EngineFailed {
                    engine: "picky".into(),
                    detail: "deliberate failure".into(),
                });
            }
            write_stub(output)
        },
    ));
    let config = BatchConfig::builder()
        .converter(converter)
        .build()
        .expect("config");

    let result = convert_all(&paths, &config).await.expect("batch runs");

    let statuses: Vec<JobStatus> = result.jobs.iter().map(|j| j.status).collect();
    assert_eq!(
        statuses,
        vec![JobStatus::Succeeded, JobStatus::Failed, JobStatus::Succeeded]
    );
    assert_eq!(result.stats.succeeded, 2);
    assert_eq!(result.stats.failed, 1);
    assert_eq!(calls.load(Ordering::SeqCst), 3, "later documents still ran");

    let failure = result.jobs[1].error.as_ref().expect("error recorded");
    assert!(failure.to_string().contains("deliberate failure"));
}

#[tokio::test]
async fn a_panicking_engine_fails_only_its_own_document() {
    let (_dir, paths) = stage_documents(&["a.docx", "b.docx", "c.docx"]);
    let converter = Arc::new(FnConverter::new(
        "unstable",
        move |input: &Path, output: &Path| {
            if input.file_name().is_some_and(|n| n.to_string_lossy().starts_with('b')) {
                panic!("engine blew up");
            }
            write_stub(output)
        },
    ));
    let config = BatchConfig::builder()
        .converter(converter)
        .build()
        .expect("config");

    let result = convert_all(&paths, &config).await.expect("batch survives");

    assert_eq!(result.jobs[0].status, JobStatus::Succeeded);
    assert_eq!(result.jobs[1].status, JobStatus::Failed);
    assert_eq!(result.jobs[2].status, JobStatus::Succeeded);
    match result.jobs[1].error.as_ref().expect("error recorded") {
        ConvertError::Aborted { detail } => {
            assert!(detail.contains("panicked"), "got: {detail}");
        }
        other => panic!("expected Aborted, got {other:?}"),
    }
}

// ── Cancellation ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn cancel_between_documents_leaves_the_rest_pending() {
    let (_dir, paths) = stage_documents(&["a.docx", "b.docx", "c.docx"]);
    let cancel = CancelToken::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let recorder = Arc::new(RecordingCallback::default());

    // The engine itself requests cancellation while converting the first
    // document, so the request is observably "mid-batch".
    let cancel_in_engine = cancel.clone();
    let calls_in_engine = Arc::clone(&calls);
    let converter = Arc::new(FnConverter::new(
        "self-cancelling",
        move |_input: &Path, output: &Path| {
            calls_in_engine.fetch_add(1, Ordering::SeqCst);
            cancel_in_engine.cancel();
            write_stub(output)
        },
    ));

    let config = BatchConfig::builder()
        .converter(converter)
        .cancel(cancel)
        .progress(Arc::clone(&recorder) as Arc<dyn BatchProgressCallback>)
        .build()
        .expect("config");

    let result = convert_all(&paths, &config).await.expect("batch returns Ok");

    let statuses: Vec<JobStatus> = result.jobs.iter().map(|j| j.status).collect();
    assert_eq!(
        statuses,
        vec![JobStatus::Succeeded, JobStatus::Pending, JobStatus::Pending]
    );
    assert!(result.stats.cancelled);
    assert_eq!(result.stats.succeeded, 1);
    assert_eq!(result.stats.pending, 2);
    assert_eq!(calls.load(Ordering::SeqCst), 1, "no engine call after cancel");

    // The second document's start event fires, then the poll halts the batch;
    // no completion event for a cancelled run.
    assert_eq!(
        recorder.events(),
        vec![
            "batch_start 3",
            "job_start 1",
            "job_complete 1",
            "job_start 2",
            "batch_cancelled 1/3",
        ]
    );
}

// ── Progress ordering ────────────────────────────────────────────────────────

#[tokio::test]
async fn progress_events_fire_in_input_order() {
    let (_dir, paths) = stage_documents(&["a.docx", "b.docx"]);
    let recorder = Arc::new(RecordingCallback::default());
    let converter = Arc::new(FnConverter::new(
        "picky",
        move |input: &Path, output: &Path| {
            if input.file_name().is_some_and(|n| n.to_string_lossy().starts_with('b')) {
                return Err(ConvertError::EngineFailed {
                    engine: "picky".into(),
                    detail: "deliberate failure".into(),
                });
            }
            write_stub(output)
        },
    ));
    let config = BatchConfig::builder()
        .converter(converter)
        .progress(Arc::clone(&recorder) as Arc<dyn BatchProgressCallback>)
        .build()
        .expect("config");

    convert_all(&paths, &config).await.expect("batch runs");

    assert_eq!(
        recorder.events(),
        vec![
            "batch_start 2",
            "job_start 1",
            "job_complete 1",
            "job_start 2",
            "job_error 2",
            "batch_complete 2 1",
        ]
    );
}

// ── Output naming ────────────────────────────────────────────────────────────

#[test]
fn derived_paths_follow_the_documented_scheme() {
    assert_eq!(
        derive_output_path(Path::new("/docs/report.docx"), None, None),
        PathBuf::from("/docs/report_converted.pdf")
    );
    // A bare filename has no directory to write into; the system temp
    // directory stands in, keeping the same name transformation.
    assert_eq!(
        derive_output_path(Path::new("report.docx"), None, None),
        std::env::temp_dir().join("report_converted.pdf")
    );
}

#[tokio::test]
async fn outputs_collect_into_the_configured_directory() {
    let (_dir, paths) = stage_documents(&["a.docx", "b.docx"]);
    let out = tempfile::tempdir().expect("outdir");
    let calls = Arc::new(AtomicUsize::new(0));
    let config = BatchConfig::builder()
        .converter(stub_engine(calls))
        .output_dir(out.path())
        .build()
        .expect("config");

    let result = convert_all(&paths, &config).await.expect("batch runs");

    for job in &result.jobs {
        assert_eq!(job.output_path.parent(), Some(out.path()));
        assert!(job.output_path.is_file());
    }
}

#[tokio::test]
async fn re_running_a_batch_overwrites_the_same_outputs() {
    let (dir, paths) = stage_documents(&["a.docx"]);
    let calls = Arc::new(AtomicUsize::new(0));
    let config = BatchConfig::builder()
        .converter(stub_engine(calls))
        .build()
        .expect("config");

    let first = convert_all(&paths, &config).await.expect("first run");
    let second = convert_all(&paths, &config).await.expect("second run");

    assert_eq!(
        first.jobs[0].output_path, second.jobs[0].output_path,
        "derivation is deterministic"
    );

    // Exactly one artifact per input, not an accumulating series.
    let produced: Vec<_> = std::fs::read_dir(dir.path())
        .expect("read dir")
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with("_converted.pdf"))
        .collect();
    assert_eq!(produced.len(), 1);
}

// ── Single-flight ────────────────────────────────────────────────────────────

#[tokio::test]
async fn second_batch_on_a_busy_instance_is_rejected() {
    let (_dir, paths) = stage_documents(&["a.docx"]);
    let (started_tx, started_rx) = std::sync::mpsc::channel::<()>();
    let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();
    let release_rx = Mutex::new(release_rx);

    let converter = Arc::new(FnConverter::new(
        "gated",
        move |_input: &Path, output: &Path| {
            started_tx.send(()).ok();
            release_rx.lock().unwrap().recv().ok();
            write_stub(output)
        },
    ));
    let instance = Arc::new(BatchConverter::new(
        BatchConfig::builder()
            .converter(converter)
            .build()
            .expect("config"),
    ));

    let runner = Arc::clone(&instance);
    let first_paths = paths.clone();
    let first = tokio::spawn(async move { runner.convert_all(&first_paths).await });

    // Wait until the first batch is inside the engine call.
    tokio::task::spawn_blocking(move || started_rx.recv())
        .await
        .expect("join")
        .expect("first batch started");

    let err = instance
        .convert_all(&paths)
        .await
        .expect_err("instance is busy");
    assert!(matches!(err, BatchError::BatchInFlight));

    release_tx.send(()).expect("release the engine");
    let result = first.await.expect("join").expect("first batch finishes");
    assert_eq!(result.stats.succeeded, 1);

    // The slot frees up once the batch returns.
    release_tx.send(()).ok();
    let again = instance.convert_all(&paths).await.expect("slot released");
    assert_eq!(again.stats.succeeded, 1);
}

// ── Reporting ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn summary_and_json_reflect_the_run() {
    let (_dir, paths) = stage_documents(&["a.docx", "b.docx"]);
    let converter = Arc::new(FnConverter::new(
        "picky",
        move |input: &Path, output: &Path| {
            if input.file_name().is_some_and(|n| n.to_string_lossy().starts_with('b')) {
                return Err(ConvertError::EngineFailed {
                    engine: "picky".into(),
                    detail: "deliberate failure".into(),
                });
            }
            write_stub(output)
        },
    ));
    let config = BatchConfig::builder()
        .converter(converter)
        .build()
        .expect("config");

    let result = convert_all(&paths, &config).await.expect("batch runs");

    let summary = result.summary();
    let lines: Vec<&str> = summary.lines().collect();
    assert_eq!(lines[0], "✓ a.docx → a_converted.pdf");
    assert!(lines[1].starts_with("✗ b.docx: "), "got: {}", lines[1]);
    assert!(lines[1].contains("deliberate failure"));

    // The whole result survives a JSON round trip.
    let json = serde_json::to_string(&result).expect("serialise");
    let back: docmill::BatchResult = serde_json::from_str(&json).expect("deserialise");
    assert_eq!(back.stats.succeeded, 1);
    assert_eq!(back.stats.failed, 1);
    assert_eq!(back.summary(), summary);
}

// ── Streaming ────────────────────────────────────────────────────────────────

#[test]
fn stream_yields_jobs_in_input_order() {
    let (_dir, paths) = stage_documents(&["a.docx", "b.docx", "c.docx"]);
    let calls = Arc::new(AtomicUsize::new(0));
    let config = BatchConfig::builder()
        .converter(stub_engine(Arc::clone(&calls)))
        .build()
        .expect("config");

    let jobs: Vec<_> = tokio_test::block_on(async {
        let stream = convert_stream(&paths, &config).await.expect("stream opens");
        stream.collect().await
    });

    assert_eq!(jobs.len(), 3);
    for (job, input) in jobs.iter().zip(&paths) {
        assert_eq!(&job.input_path, input);
        assert_eq!(job.status, JobStatus::Succeeded);
    }
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn cancelled_stream_ends_without_the_remaining_jobs() {
    let (_dir, paths) = stage_documents(&["a.docx", "b.docx", "c.docx"]);
    let cancel = CancelToken::new();
    let recorder = Arc::new(RecordingCallback::default());

    let cancel_in_engine = cancel.clone();
    let converter = Arc::new(FnConverter::new(
        "self-cancelling",
        move |_input: &Path, output: &Path| {
            cancel_in_engine.cancel();
            write_stub(output)
        },
    ));
    let config = BatchConfig::builder()
        .converter(converter)
        .cancel(cancel)
        .progress(Arc::clone(&recorder) as Arc<dyn BatchProgressCallback>)
        .build()
        .expect("config");

    let stream = convert_stream(&paths, &config).await.expect("stream opens");
    let jobs: Vec<_> = stream.collect().await;

    assert_eq!(jobs.len(), 1, "only the first document is yielded");
    assert_eq!(jobs[0].status, JobStatus::Succeeded);
    assert_eq!(
        recorder.events().last().map(String::as_str),
        Some("batch_cancelled 1/3")
    );
}
