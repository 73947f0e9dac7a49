//! Configuration types for batch document conversion.
//!
//! All batch behaviour is controlled through [`BatchConfig`], built via its
//! [`BatchConfigBuilder`]. Keeping every knob in one struct makes it trivial
//! to share configs across threads and to reuse one setup for many batches.
//!
//! # Design choice: builder over constructor
//! The builder pattern lets callers set only what they care about and rely on
//! well-documented defaults for the rest.

use crate::cancel::CancelToken;
use crate::converter::DocumentConverter;
use crate::error::BatchError;
use crate::progress::BatchProgressCallback;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Configuration for a conversion batch.
///
/// Built via [`BatchConfig::builder()`] or using
/// [`BatchConfig::default()`].
///
/// # Example
/// ```rust
/// use docmill::BatchConfig;
///
/// let config = BatchConfig::builder()
///     .converter_program("soffice")
///     .output_dir("/tmp/converted")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone, Default)]
pub struct BatchConfig {
    /// Pre-constructed conversion engine. Takes precedence over
    /// `converter_program`.
    pub converter: Option<Arc<dyn DocumentConverter>>,

    /// Engine binary to shell out to (e.g. `"libreoffice"`, `"soffice"`,
    /// or a full path). If `None` along with `converter`, the
    /// `DOCMILL_CONVERTER` environment variable is consulted, then the
    /// stock `libreoffice` engine is used.
    pub converter_program: Option<String>,

    /// Collect every output in this directory instead of each input's own.
    ///
    /// When `None` (the default), a converted file lands next to its input,
    /// which is what desktop users expect when they pick files by hand.
    pub output_dir: Option<PathBuf>,

    /// Where outputs go when an input path has no usable directory (a bare
    /// filename). Defaults to [`std::env::temp_dir`].
    pub fallback_dir: Option<PathBuf>,

    /// Progress event sink. `None` means no events are delivered.
    pub progress: Option<Arc<dyn BatchProgressCallback>>,

    /// Cooperative cancellation handle, polled between documents.
    pub cancel: Option<CancelToken>,
}

impl fmt::Debug for BatchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchConfig")
            .field(
                "converter",
                &self.converter.as_ref().map(|c| c.name().to_string()),
            )
            .field("converter_program", &self.converter_program)
            .field("output_dir", &self.output_dir)
            .field("fallback_dir", &self.fallback_dir)
            .field(
                "progress",
                &self.progress.as_ref().map(|_| "<dyn BatchProgressCallback>"),
            )
            .field("cancel", &self.cancel)
            .finish()
    }
}

impl BatchConfig {
    /// Create a new builder for `BatchConfig`.
    pub fn builder() -> BatchConfigBuilder {
        BatchConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`BatchConfig`].
#[derive(Debug)]
pub struct BatchConfigBuilder {
    config: BatchConfig,
}

impl BatchConfigBuilder {
    /// Inject a pre-constructed engine. Takes precedence over
    /// [`converter_program`](Self::converter_program).
    pub fn converter(mut self, converter: Arc<dyn DocumentConverter>) -> Self {
        self.config.converter = Some(converter);
        self
    }

    /// Shell out to this binary for conversions.
    pub fn converter_program(mut self, program: impl Into<String>) -> Self {
        self.config.converter_program = Some(program.into());
        self
    }

    /// Collect all outputs in one directory.
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = Some(dir.into());
        self
    }

    /// Where bare-filename inputs place their output.
    pub fn fallback_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.fallback_dir = Some(dir.into());
        self
    }

    /// Receive progress events during the batch.
    pub fn progress(mut self, callback: Arc<dyn BatchProgressCallback>) -> Self {
        self.config.progress = Some(callback);
        self
    }

    /// Attach a cancellation handle.
    pub fn cancel(mut self, token: CancelToken) -> Self {
        self.config.cancel = Some(token);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<BatchConfig, BatchError> {
        let c = &self.config;
        if let Some(program) = &c.converter_program {
            if program.trim().is_empty() {
                return Err(BatchError::InvalidConfig(
                    "Converter program must not be empty".into(),
                ));
            }
        }
        Ok(self.config)
    }
}
