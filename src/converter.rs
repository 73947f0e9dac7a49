//! The document-conversion capability.
//!
//! The batch loop never renders documents itself; it drives a
//! [`DocumentConverter`] injected through
//! [`crate::config::BatchConfig`]. The production implementation shells out
//! to LibreOffice in headless mode; tests and embedders plug in
//! [`FnConverter`] closures.
//!
//! A converter call is allowed to block (subprocess wait, CPU-bound work).
//! The orchestrator runs it via `tokio::task::spawn_blocking`, so
//! implementations should not assume an async context.

use crate::error::ConvertError;
use std::path::Path;
use std::process::Command;

/// Converts one document to PDF at the requested output path.
///
/// Implementations must be `Send + Sync`; the orchestrator shares the
/// converter across blocking tasks. A call either produces a readable file
/// at `output` or returns a [`ConvertError`] describing why it could not.
pub trait DocumentConverter: Send + Sync {
    /// Convert `input` into a PDF at `output`. Blocking is fine.
    fn convert(&self, input: &Path, output: &Path) -> Result<(), ConvertError>;

    /// Short engine name for logs and error messages, e.g. `"libreoffice"`.
    fn name(&self) -> &str;
}

/// Adapter turning a closure into a [`DocumentConverter`].
///
/// Useful in tests and for embedders with an in-process engine:
///
/// ```rust
/// use docmill::{DocumentConverter, FnConverter};
///
/// let converter = FnConverter::new("copy", |input, output| {
///     std::fs::copy(input, output).map_err(|e| {
///         docmill::ConvertError::EngineFailed {
///             engine: "copy".into(),
///             detail: e.to_string(),
///         }
///     })?;
///     Ok(())
/// });
/// assert_eq!(converter.name(), "copy");
/// ```
pub struct FnConverter<F> {
    name: String,
    f: F,
}

impl<F> FnConverter<F>
where
    F: Fn(&Path, &Path) -> Result<(), ConvertError> + Send + Sync,
{
    /// Wrap `f` as a converter reporting `name` in logs and errors.
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> DocumentConverter for FnConverter<F>
where
    F: Fn(&Path, &Path) -> Result<(), ConvertError> + Send + Sync,
{
    fn convert(&self, input: &Path, output: &Path) -> Result<(), ConvertError> {
        (self.f)(input, output)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// The production engine: LibreOffice in headless batch mode.
///
/// Runs `<program> --headless --convert-to pdf:writer_pdf_Export --outdir
/// <staging> <input>`. LibreOffice chooses the output file name itself
/// (input stem plus `.pdf`), so the conversion is staged into a scratch
/// directory and the produced file is then copied to the requested path.
///
/// A running LibreOffice desktop instance can hold the user-profile lock and
/// make headless conversion fail; run batches with the desktop application
/// closed.
pub struct LibreOfficeConverter {
    program: String,
}

impl Default for LibreOfficeConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl LibreOfficeConverter {
    /// Engine using the `libreoffice` binary from `PATH`.
    pub fn new() -> Self {
        Self::with_program("libreoffice")
    }

    /// Engine using an explicit binary, e.g. `soffice` or a full path.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl DocumentConverter for LibreOfficeConverter {
    fn convert(&self, input: &Path, output: &Path) -> Result<(), ConvertError> {
        let staging = tempfile::tempdir().map_err(|e| ConvertError::EngineUnavailable {
            engine: self.program.clone(),
            detail: format!("could not create staging directory: {e}"),
        })?;

        let result = Command::new(&self.program)
            .args(["--headless", "--convert-to", "pdf:writer_pdf_Export", "--outdir"])
            .arg(staging.path())
            .arg(input)
            .output()
            .map_err(|e| ConvertError::EngineUnavailable {
                engine: self.program.clone(),
                detail: e.to_string(),
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(ConvertError::EngineFailed {
                engine: self.program.clone(),
                detail: format!("{}: {}", result.status, stderr.trim()),
            });
        }

        // LibreOffice names the staged file after the input stem.
        let mut staged_name = input.file_stem().unwrap_or_default().to_os_string();
        staged_name.push(".pdf");
        let staged = staging.path().join(staged_name);
        if !staged.exists() {
            return Err(ConvertError::OutputMissing {
                path: output.to_path_buf(),
            });
        }

        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| ConvertError::EngineFailed {
                    engine: self.program.clone(),
                    detail: format!(
                        "could not create output directory '{}': {e}",
                        parent.display()
                    ),
                })?;
            }
        }
        std::fs::copy(&staged, output).map_err(|e| ConvertError::EngineFailed {
            engine: self.program.clone(),
            detail: format!("could not place output at '{}': {e}", output.display()),
        })?;

        Ok(())
    }

    fn name(&self) -> &str {
        &self.program
    }
}
