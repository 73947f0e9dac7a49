//! Save-as: copy a converted artifact into a destination folder.
//!
//! The batch writes outputs next to their inputs (or into the configured
//! output directory); exporting is the separate, explicit act of copying a
//! produced PDF somewhere else, one file at a time. A failed export affects
//! only that file.

use crate::error::BatchError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Copy `output` into `dest_dir`, creating the directory if needed.
///
/// Keeps the file name. Returns the destination path. An existing file of
/// the same name is overwritten.
///
/// # Errors
/// [`BatchError::ExportFailed`] when the directory cannot be created or the
/// copy fails.
pub async fn export_output(output: &Path, dest_dir: &Path) -> Result<PathBuf, BatchError> {
    let file_name = output.file_name().ok_or_else(|| BatchError::ExportFailed {
        path: output.to_path_buf(),
        source: std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "output path has no file name",
        ),
    })?;
    let dest = dest_dir.join(file_name);

    tokio::fs::create_dir_all(dest_dir)
        .await
        .map_err(|e| BatchError::ExportFailed {
            path: dest_dir.to_path_buf(),
            source: e,
        })?;

    tokio::fs::copy(output, &dest)
        .await
        .map_err(|e| BatchError::ExportFailed {
            path: output.to_path_buf(),
            source: e,
        })?;

    debug!("Exported '{}' to '{}'", output.display(), dest.display());
    Ok(dest)
}
