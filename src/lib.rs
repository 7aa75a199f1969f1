//! # markdown-convert
//!
//! Convert PDF documents to Markdown, reading the embedded text layer when
//! the PDF has one and falling back to OCR when it does not.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input    validate path and %PDF magic bytes
//!  ├─ 2. Select   sample the first pages' text layer → direct text or OCR
//!  ├─ 3. Extract  direct: pdfium text + font sizes → headings, bullets, paragraphs
//!  │              ocr:    pdfium render → PNG → tesseract, one page at a time
//!  ├─ 4. Polish   deterministic Markdown cleanup per page
//!  └─ 5. Output   <output_dir>/<stem>.md (skipped when it already exists)
//! ```
//!
//! If direct extraction finds no text at all, the file is retried with OCR.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use markdown_convert::{convert, ConverterConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConverterConfig::builder()
//!         .output_dir("markdown")
//!         .max_pages(20)
//!         .build()?;
//!     let outcome = convert("document.pdf", &config).await?;
//!     println!("{}", outcome.output_path().display());
//!     Ok(())
//! }
//! ```
//!
//! ## Runtime Requirements
//!
//! * **libpdfium** on the library search path, next to the executable, or
//!   named by `PDFIUM_LIB_PATH`.
//! * **tesseract** on `PATH` (or configured via
//!   [`ConverterConfigBuilder::tesseract_cmd`]) for scanned documents.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `mdconvert` binary (clap + indicatif + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! markdown-convert = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod converter;
pub mod error;
pub mod output;
pub mod paths;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConverterConfig, ConverterConfigBuilder, PageSeparator};
pub use convert::{convert, convert_batch, convert_sync, inspect, inspect_sync};
pub use converter::{select_converter, Converter, DirectTextConverter, OcrConverter};
pub use error::{ConvertError, PageError};
pub use output::{
    BatchReport, ConversionOutcome, ConversionStats, ConverterKind, DocumentMetadata,
    Extraction, FileReport, FileStatus, Inspection, PageResult, TextLayerSample,
};
pub use paths::discover_inputs;
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
