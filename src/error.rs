//! Error types for the markdown-convert library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ConvertError`]: **Fatal for one file**: that file cannot be converted
//!   (missing input, not a PDF, pdfium unavailable, write failure). Returned
//!   as `Err(ConvertError)` from the `convert*` functions. A batch records it
//!   and moves on to the next file.
//!
//! * [`PageError`]: **Non-fatal**: a single page failed to render or be
//!   recognised, but the rest of the document is fine. Stored inside
//!   [`crate::output::PageResult`] so a scanned document with one smudged
//!   page still produces Markdown for the others.

use std::path::PathBuf;
use thiserror::Error;

/// All per-file errors returned by the markdown-convert library.
///
/// Page-level failures use [`PageError`] and are stored in
/// [`crate::output::PageResult`] rather than propagated here.
#[derive(Debug, Error)]
pub enum ConvertError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// Input is a directory, a device, or carries a non-PDF extension.
    #[error("Unsupported input '{path}': {reason}")]
    UnsupportedFileType { path: PathBuf, reason: String },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt or unreadable: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF is encrypted; password-protected documents are not supported.
    #[error("PDF '{path}' is encrypted and requires a password.")]
    PasswordRequired { path: PathBuf },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Install libpdfium on the library search path, place it next to the\n\
executable, or set PDFIUM_LIB_PATH=/path/to/libpdfium.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Extraction errors ─────────────────────────────────────────────────
    /// Extraction ran to completion but produced no usable text.
    #[error("No text could be extracted from '{path}'")]
    NoTextExtracted { path: PathBuf },

    /// The OCR engine executable is missing or not runnable.
    #[error(
        "OCR engine '{command}' is not available: {detail}\n\
Install tesseract-ocr or point --tesseract-cmd at the executable."
    )]
    OcrUnavailable { command: String, detail: String },

    /// Every page failed during OCR; output would be empty.
    #[error("All {total} pages of '{path}' failed.\nFirst error: {first_error}")]
    AllPagesFailed {
        path: PathBuf,
        total: usize,
        first_error: String,
    },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create or write the output Markdown file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ConvertError {
    /// True when a direct-text conversion should be retried with OCR.
    pub fn wants_ocr_fallback(&self) -> bool {
        matches!(self, ConvertError::NoTextExtracted { .. })
    }
}

/// A non-fatal error for a single page.
///
/// Stored alongside [`crate::output::PageResult`] when a page fails.
/// The conversion continues unless ALL pages fail.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum PageError {
    /// Page rasterisation failed.
    #[error("Page {page}: rasterisation failed: {detail}")]
    RenderFailed { page: usize, detail: String },

    /// Tesseract exited with an error or produced unreadable output.
    #[error("Page {page}: OCR failed: {detail}")]
    OcrFailed { page: usize, detail: String },

    /// The page's text layer could not be read.
    #[error("Page {page}: text extraction failed: {detail}")]
    TextFailed { page: usize, detail: String },
}

impl PageError {
    /// 1-indexed page number the error belongs to.
    pub fn page(&self) -> usize {
        match self {
            PageError::RenderFailed { page, .. }
            | PageError::OcrFailed { page, .. }
            | PageError::TextFailed { page, .. } => *page,
        }
    }
}
