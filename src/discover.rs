//! Directory discovery: turn a folder into a batch.
//!
//! The CLI's `--dir` mode and embedders that batch whole folders use
//! [`find_documents`] to collect input paths. Results are sorted so the same
//! folder always produces the same batch order.

use crate::error::BatchError;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Collect document paths under `dir`.
///
/// Walks direct children only, or the whole tree when `recursive` is set.
/// `extensions` filters by file extension, case-insensitively and with or
/// without a leading dot (`"docx"` and `".DOCX"` both match `a.docx`); an
/// empty list collects every regular file. The result is sorted.
///
/// # Errors
/// [`BatchError::ScanFailed`] when `dir` or an entry under it cannot be
/// read. Discovery is a batch-start operation, so unlike per-document
/// conversion it fails loudly instead of skipping.
pub fn find_documents<S: AsRef<str>>(
    dir: &Path,
    recursive: bool,
    extensions: &[S],
) -> Result<Vec<PathBuf>, BatchError> {
    let wanted: Vec<String> = extensions
        .iter()
        .map(|e| e.as_ref().trim_start_matches('.').to_ascii_lowercase())
        .collect();

    let mut walker = WalkDir::new(dir);
    if !recursive {
        walker = walker.max_depth(1);
    }

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| {
            let at = e
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| dir.to_path_buf());
            BatchError::ScanFailed {
                path: at,
                source: e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("walk error")),
            }
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        if wanted.is_empty() || matches_extension(entry.path(), &wanted) {
            files.push(entry.into_path());
        }
    }

    files.sort();
    Ok(files)
}

fn matches_extension(path: &Path, wanted: &[String]) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .is_some_and(|ext| wanted.iter().any(|w| *w == ext))
}
