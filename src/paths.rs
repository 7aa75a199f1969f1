//! File-system helpers: input discovery, output-path derivation and writes.

use crate::error::ConvertError;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Directory created next to an input PDF when no output directory is set.
pub const DEFAULT_OUTPUT_SUBDIR: &str = "markdown";

/// Expand CLI inputs into a sorted, de-duplicated list of files to convert.
///
/// * Directories contribute their `*.pdf` files (case-insensitive
///   extension), descending into subdirectories only when `recursive`.
/// * Every other argument is passed through untouched, even when it does not
///   exist or is not a PDF, so the conversion step can report it.
pub fn discover_inputs<P: AsRef<Path>>(inputs: &[P], recursive: bool) -> Vec<PathBuf> {
    let mut found = BTreeSet::new();

    for input in inputs {
        let input = input.as_ref();
        if input.is_dir() {
            let walker = WalkDir::new(input)
                .follow_links(true)
                .max_depth(if recursive { usize::MAX } else { 1 });
            for entry in walker.into_iter() {
                match entry {
                    Ok(entry) if entry.file_type().is_file() && has_pdf_extension(entry.path()) => {
                        found.insert(entry.into_path());
                    }
                    Ok(_) => {}
                    Err(e) => warn!("Skipping unreadable directory entry: {}", e),
                }
            }
        } else {
            found.insert(input.to_path_buf());
        }
    }

    debug!("Discovered {} input file(s)", found.len());
    found.into_iter().collect()
}

/// True when the path ends in `.pdf`, ignoring case.
pub fn has_pdf_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

/// Derive the Markdown path for `pdf_path`.
///
/// `<output_dir>/<stem>.md` when an output directory is configured, otherwise
/// `<pdf dir>/markdown/<stem>.md`.
pub fn output_path_for(pdf_path: &Path, output_dir: Option<&Path>) -> PathBuf {
    let stem = pdf_path
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| "output".into());
    let mut file_name = stem;
    file_name.push(".md");

    match output_dir {
        Some(dir) => dir.join(file_name),
        None => pdf_path
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(DEFAULT_OUTPUT_SUBDIR)
            .join(file_name),
    }
}

/// True when an existing output should be left alone.
pub fn should_skip(output_path: &Path, skip_existing: bool) -> bool {
    skip_existing && output_path.exists()
}

/// Create `dir` and any missing parents.
pub fn ensure_directory(dir: &Path) -> Result<(), ConvertError> {
    if dir.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(dir).map_err(|e| ConvertError::OutputWriteFailed {
        path: dir.to_path_buf(),
        source: e,
    })
}

/// Write `contents` to `path` atomically: temp file in the same directory,
/// then rename over the target so readers never see a partial file.
pub fn write_atomic(path: &Path, contents: &str) -> Result<(), ConvertError> {
    let write_err = |e: std::io::Error| ConvertError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    let parent = path.parent().unwrap_or_else(|| Path::new(""));
    ensure_directory(parent)?;

    let tmp_path = path.with_extension("md.tmp");
    std::fs::write(&tmp_path, contents).map_err(write_err)?;
    std::fs::rename(&tmp_path, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp_path);
        write_err(e)
    })
}
