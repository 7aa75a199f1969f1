//! pdfium binding: locate the shared library and load it.
//!
//! Lookup order:
//!
//! 1. `PDFIUM_LIB_PATH`: a library file, or a directory containing one.
//! 2. The current working directory.
//! 3. The directory holding the running executable.
//! 4. The system library search path.
//!
//! The first path that binds is remembered for the rest of the process.

use crate::error::ConvertError;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::debug;

/// Environment variable pointing at an existing libpdfium.
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

static RESOLVED_LIBRARY: OnceLock<Option<PathBuf>> = OnceLock::new();

/// Bind to pdfium, returning a ready-to-use [`Pdfium`] instance.
pub fn bind_pdfium() -> Result<Pdfium, ConvertError> {
    if let Some(Some(path)) = RESOLVED_LIBRARY.get() {
        return bind_from_path(path);
    }
    if let Some(None) = RESOLVED_LIBRARY.get() {
        return bind_system();
    }

    let mut last_error = None;
    for candidate in candidate_libraries() {
        match bind_from_path(&candidate) {
            Ok(pdfium) => {
                debug!("Bound pdfium from {}", candidate.display());
                let _ = RESOLVED_LIBRARY.set(Some(candidate));
                return Ok(pdfium);
            }
            Err(e) => last_error = Some(e),
        }
    }

    match bind_system() {
        Ok(pdfium) => {
            debug!("Bound pdfium from the system library path");
            let _ = RESOLVED_LIBRARY.set(None);
            Ok(pdfium)
        }
        Err(e) => Err(last_error.unwrap_or(e)),
    }
}

fn bind_from_path(path: &Path) -> Result<Pdfium, ConvertError> {
    Pdfium::bind_to_library(path)
        .map(Pdfium::new)
        .map_err(|e| ConvertError::PdfiumBindingFailed(format!("{}: {}", path.display(), e)))
}

fn bind_system() -> Result<Pdfium, ConvertError> {
    Pdfium::bind_to_system_library()
        .map(Pdfium::new)
        .map_err(|e| ConvertError::PdfiumBindingFailed(format!("system library: {}", e)))
}

/// Library files worth trying, most specific first. Only existing files are returned.
fn candidate_libraries() -> Vec<PathBuf> {
    let mut dirs_or_files: Vec<PathBuf> = Vec::new();

    if let Ok(p) = std::env::var(PDFIUM_LIB_PATH_ENV) {
        if !p.is_empty() {
            dirs_or_files.push(PathBuf::from(p));
        }
    }
    dirs_or_files.push(PathBuf::from("."));
    if let Some(exe_dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        dirs_or_files.push(exe_dir);
    }

    dirs_or_files
        .into_iter()
        .map(|p| {
            if p.is_dir() {
                Pdfium::pdfium_platform_library_name_at_path(&p)
            } else {
                p
            }
        })
        .filter(|p| p.is_file())
        .collect()
}
