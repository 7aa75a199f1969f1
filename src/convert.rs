//! Top-level conversion entry points.
//!
//! The pipeline itself is blocking (pdfium and tesseract are both
//! synchronous). [`convert_sync`] runs it on the calling thread; the async
//! functions move it onto tokio's blocking pool so they can be awaited from
//! a runtime without stalling its workers.
//!
//! ## Fallback
//!
//! When the selection policy picks direct text extraction but the text layer
//! turns out to hold nothing usable, the file is converted again with OCR.
//! Any other error is final for that file.

use crate::config::ConverterConfig;
use crate::converter::factory;
use crate::error::ConvertError;
use crate::output::{
    BatchReport, ConversionOutcome, ConverterKind, FileReport, Inspection,
};
use crate::paths;
use crate::pipeline::{engine, extract, input};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info, warn};

/// Convert one PDF to Markdown.
///
/// Picks a converter for the file, writes `<stem>.md` to the configured
/// output location and returns what happened. An existing output is left
/// alone when `config.skip_existing` is set.
///
/// # Errors
/// Returns `Err(ConvertError)` when this file cannot be converted: missing
/// or non-PDF input, pdfium or tesseract unavailable, no text on any page,
/// or the output cannot be written.
///
/// # Example
/// ```rust,no_run
/// use markdown_convert::{convert, ConverterConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = ConverterConfig::builder().output_dir("out").build()?;
///     let outcome = convert("report.pdf", &config).await?;
///     println!("wrote {}", outcome.output_path().display());
///     Ok(())
/// }
/// ```
pub async fn convert(
    pdf_path: impl AsRef<Path>,
    config: &ConverterConfig,
) -> Result<ConversionOutcome, ConvertError> {
    let pdf_path = pdf_path.as_ref().to_path_buf();
    let config = config.clone();

    tokio::task::spawn_blocking(move || convert_sync(&pdf_path, &config))
        .await
        .map_err(|e| ConvertError::Internal(format!("conversion task failed: {}", e)))?
}

/// Blocking version of [`convert`].
///
/// An existing output is detected before pdfium is loaded, so a skipped file
/// costs one `stat` and succeeds even when the document cannot be opened.
pub fn convert_sync(
    pdf_path: impl AsRef<Path>,
    config: &ConverterConfig,
) -> Result<ConversionOutcome, ConvertError> {
    let pdf_path = pdf_path.as_ref();
    info!("Starting conversion: {}", pdf_path.display());

    input::validate_pdf(pdf_path)?;
    let output_path = paths::output_path_for(pdf_path, config.output_dir.as_deref());
    if paths::should_skip(&output_path, config.skip_existing) {
        info!(
            "Output file already exists, skipping: {} (enable overwrite to replace it)",
            output_path.display()
        );
        return Ok(ConversionOutcome::Skipped { output_path });
    }

    let converter = factory::select_converter(pdf_path, config)?;
    match converter.convert(pdf_path) {
        Err(e) if falls_back_to_ocr(converter.kind(), &e) => {
            warn!(
                "Text layer of {} produced no usable text, falling back to OCR",
                pdf_path.display()
            );
            factory::create(ConverterKind::Ocr, config).convert(pdf_path)
        }
        result => result,
    }
}

/// Only an empty text layer found by the direct converter is retried with OCR.
fn falls_back_to_ocr(kind: ConverterKind, err: &ConvertError) -> bool {
    kind == ConverterKind::DirectText && err.wants_ocr_fallback()
}

/// Convert every path in `inputs`, one after another.
///
/// A failing file is recorded in the report and the batch moves on; this
/// function itself never fails. Progress callbacks receive
/// `on_batch_start` once and `on_file_complete` per input.
pub async fn convert_batch<P: AsRef<Path>>(inputs: &[P], config: &ConverterConfig) -> BatchReport {
    let start = Instant::now();
    let cb = config.progress_callback.clone();

    info!("Converting {} file(s)", inputs.len());
    if let Some(ref cb) = cb {
        cb.on_batch_start(inputs.len());
    }

    let mut files = Vec::with_capacity(inputs.len());
    for (i, path) in inputs.iter().enumerate() {
        let path: PathBuf = path.as_ref().to_path_buf();
        info!("[{}/{}] {}", i + 1, inputs.len(), path.display());

        let report = match convert(&path, config).await {
            Ok(outcome) => FileReport::from_outcome(path.clone(), outcome),
            Err(e) => {
                error!("Failed to convert {}: {}", path.display(), e);
                FileReport::failed(path.clone(), &e)
            }
        };

        if let Some(ref cb) = cb {
            cb.on_file_complete(&path, report.error.is_none());
        }
        files.push(report);
    }

    let report = BatchReport {
        files,
        duration_ms: start.elapsed().as_millis() as u64,
    };
    info!(
        "Batch finished: {} converted, {} skipped, {} failed in {}ms",
        report.converted(),
        report.skipped(),
        report.failed(),
        report.duration_ms
    );
    report
}

/// Describe a PDF without converting it: metadata, text-layer sample, and
/// which converter would be used.
pub async fn inspect(
    pdf_path: impl AsRef<Path>,
    config: &ConverterConfig,
) -> Result<Inspection, ConvertError> {
    let pdf_path = pdf_path.as_ref().to_path_buf();
    let config = config.clone();

    tokio::task::spawn_blocking(move || inspect_sync(&pdf_path, &config))
        .await
        .map_err(|e| ConvertError::Internal(format!("inspect task failed: {}", e)))?
}

/// Blocking version of [`inspect`].
pub fn inspect_sync(
    pdf_path: impl AsRef<Path>,
    config: &ConverterConfig,
) -> Result<Inspection, ConvertError> {
    let pdf_path = pdf_path.as_ref();
    input::validate_pdf(pdf_path)?;

    let pdfium = engine::bind_pdfium()?;
    let document = extract::open_document(&pdfium, pdf_path)?;

    let metadata = extract::read_metadata(&document);
    let sample_pages = config
        .max_pages
        .map_or(config.text_sample_pages, |m| m.min(config.text_sample_pages));
    let sample = extract::sample_text_layer(&document, sample_pages);
    let converter = factory::choose_kind(config.force_ocr, &sample, config.min_text_chars);

    Ok(Inspection {
        path: pdf_path.to_path_buf(),
        metadata,
        sample,
        converter,
        output_path: paths::output_path_for(pdf_path, config.output_dir.as_deref()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::FileStatus;

    #[test]
    fn convert_sync_missing_file() {
        let err = convert_sync("/no/such/dir/report.pdf", &ConverterConfig::default()).unwrap_err();
        assert!(matches!(err, ConvertError::FileNotFound { .. }));
    }

    #[test]
    fn existing_output_skips_before_opening_the_document() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("report.pdf");
        std::fs::write(&pdf, b"%PDF-1.4\ngarbage").unwrap();
        std::fs::create_dir(dir.path().join("markdown")).unwrap();
        std::fs::write(dir.path().join("markdown/report.md"), "kept").unwrap();

        let outcome = convert_sync(&pdf, &ConverterConfig::default()).unwrap();

        assert!(outcome.is_skipped());
        assert_eq!(outcome.output_path(), dir.path().join("markdown/report.md").as_path());
    }

    #[test]
    fn only_empty_direct_extraction_falls_back() {
        let empty = ConvertError::NoTextExtracted {
            path: PathBuf::from("scan.pdf"),
        };
        let all_failed = ConvertError::AllPagesFailed {
            path: PathBuf::from("scan.pdf"),
            total: 2,
            first_error: "boom".into(),
        };

        assert!(falls_back_to_ocr(ConverterKind::DirectText, &empty));
        assert!(!falls_back_to_ocr(ConverterKind::Ocr, &empty));
        assert!(!falls_back_to_ocr(ConverterKind::DirectText, &all_failed));
    }

    #[test]
    fn inspect_rejects_non_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "hello").unwrap();

        let err = inspect_sync(&path, &ConverterConfig::default()).unwrap_err();
        assert!(matches!(err, ConvertError::UnsupportedFileType { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn batch_continues_past_failures() {
        let dir = tempfile::tempdir().unwrap();
        let not_pdf = dir.path().join("fake.pdf");
        std::fs::write(&not_pdf, "just text").unwrap();
        let missing = dir.path().join("missing.pdf");

        let report = convert_batch(&[&not_pdf, &missing], &ConverterConfig::default()).await;

        assert_eq!(report.files.len(), 2);
        assert_eq!(report.failed(), 2);
        assert!(!report.all_succeeded());
        assert!(report.files.iter().all(|f| f.status == FileStatus::Failed));
        assert_eq!(report.files[0].input, not_pdf);
        assert!(report.files[1].error.as_deref().unwrap_or("").contains("not found"));
    }

    #[tokio::test]
    async fn empty_batch_is_trivially_successful() {
        let inputs: [&Path; 0] = [];
        let report = convert_batch(&inputs, &ConverterConfig::default()).await;
        assert!(report.files.is_empty());
        assert!(report.all_succeeded());
    }
}
