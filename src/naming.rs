//! Output path derivation.
//!
//! Every input maps to exactly one output path, computed before any
//! conversion starts: same directory, same stem, `_converted.pdf` appended.
//! The mapping is deterministic, so re-running a batch overwrites the same
//! files instead of accumulating copies.

use std::path::{Path, PathBuf};

/// Appended to the input's file stem. Fixed, not configurable.
pub const OUTPUT_SUFFIX: &str = "_converted";

/// Compute where the converted PDF for `input` goes.
///
/// Precedence:
/// 1. `output_dir`, when set, collects all outputs in one place.
/// 2. Otherwise the input's own directory.
/// 3. A bare filename has no usable directory; fall back to `fallback_dir`,
///    defaulting to [`std::env::temp_dir`].
///
/// Collisions (two inputs with the same stem mapping into the same
/// directory) are not deduplicated; the later conversion overwrites.
pub fn derive_output_path(
    input: &Path,
    output_dir: Option<&Path>,
    fallback_dir: Option<&Path>,
) -> PathBuf {
    let mut name = input.file_stem().unwrap_or_default().to_os_string();
    name.push(OUTPUT_SUFFIX);
    name.push(".pdf");

    if let Some(dir) = output_dir {
        return dir.join(name);
    }
    match input.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join(name),
        _ => fallback_dir
            .map(Path::to_path_buf)
            .unwrap_or_else(std::env::temp_dir)
            .join(name),
    }
}
