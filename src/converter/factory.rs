//! Converter selection.
//!
//! Sample the text layer of the first few pages and use it directly when it
//! carries at least `min_text_chars` visible characters, otherwise OCR.
//! `force_ocr` bypasses sampling.

use super::{Converter, DirectTextConverter, OcrConverter};
use crate::config::ConverterConfig;
use crate::error::ConvertError;
use crate::output::{ConverterKind, TextLayerSample};
use crate::pipeline::{engine, extract, input};
use std::path::Path;
use tracing::info;

/// Build the converter the selection policy picks for `pdf_path`.
///
/// Unreadable or non-PDF inputs are errors; they never fall through to a
/// guessed converter.
pub fn select_converter(
    pdf_path: &Path,
    config: &ConverterConfig,
) -> Result<Box<dyn Converter>, ConvertError> {
    let kind = select_kind(pdf_path, config)?;
    Ok(create(kind, config))
}

/// Decide which converter variant handles `pdf_path`.
pub fn select_kind(pdf_path: &Path, config: &ConverterConfig) -> Result<ConverterKind, ConvertError> {
    input::validate_pdf(pdf_path)?;

    if config.force_ocr {
        info!("OCR forced for {}", pdf_path.display());
        return Ok(ConverterKind::Ocr);
    }

    let sample = read_text_sample(pdf_path, config)?;
    let kind = choose_kind(false, &sample, config.min_text_chars);
    info!(
        "{}: {} text chars on {} sampled pages → {} converter",
        pdf_path.display(),
        sample.text_chars,
        sample.pages_sampled,
        kind
    );
    Ok(kind)
}

/// Construct a converter of the given kind.
pub fn create(kind: ConverterKind, config: &ConverterConfig) -> Box<dyn Converter> {
    match kind {
        ConverterKind::DirectText => Box::new(DirectTextConverter::new(config.clone())),
        ConverterKind::Ocr => Box::new(OcrConverter::new(config.clone())),
    }
}

/// The pure selection rule.
pub fn choose_kind(force_ocr: bool, sample: &TextLayerSample, min_text_chars: usize) -> ConverterKind {
    if !force_ocr && has_usable_text(sample, min_text_chars) {
        ConverterKind::DirectText
    } else {
        ConverterKind::Ocr
    }
}

/// A sample is usable when it has at least `min_text_chars` characters (never fewer than one).
pub fn has_usable_text(sample: &TextLayerSample, min_text_chars: usize) -> bool {
    sample.text_chars >= min_text_chars.max(1)
}

/// Open `pdf_path` and sample its text layer.
///
/// At most `text_sample_pages` pages are read, and never more than
/// `max_pages`.
pub fn read_text_sample(pdf_path: &Path, config: &ConverterConfig) -> Result<TextLayerSample, ConvertError> {
    let pdfium = engine::bind_pdfium()?;
    let document = extract::open_document(&pdfium, pdf_path)?;
    let pages = config
        .max_pages
        .map_or(config.text_sample_pages, |m| m.min(config.text_sample_pages));
    Ok(extract::sample_text_layer(&document, pages))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(text_chars: usize) -> TextLayerSample {
        TextLayerSample {
            pages_sampled: 3,
            text_chars,
        }
    }

    #[test]
    fn text_layer_selects_direct() {
        assert_eq!(choose_kind(false, &sample(500), 16), ConverterKind::DirectText);
        assert_eq!(choose_kind(false, &sample(16), 16), ConverterKind::DirectText);
    }

    #[test]
    fn sparse_text_selects_ocr() {
        assert_eq!(choose_kind(false, &sample(15), 16), ConverterKind::Ocr);
        assert_eq!(choose_kind(false, &sample(0), 16), ConverterKind::Ocr);
    }

    #[test]
    fn force_ocr_wins() {
        assert_eq!(choose_kind(true, &sample(10_000), 16), ConverterKind::Ocr);
    }

    #[test]
    fn zero_threshold_still_needs_one_char() {
        assert!(!has_usable_text(&sample(0), 0));
        assert!(has_usable_text(&sample(1), 0));
    }

    #[test]
    fn unreadable_file_is_an_error() {
        let err = select_kind(Path::new("/no/such/file.pdf"), &ConverterConfig::default()).unwrap_err();
        assert!(matches!(err, ConvertError::FileNotFound { .. }));
    }

    #[test]
    fn non_pdf_is_an_error_even_when_forced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.pdf");
        std::fs::write(&path, b"\x89PNG\r\n\x1a\n").unwrap();

        let config = ConverterConfig::builder().force_ocr(true).build().unwrap();
        let err = select_kind(&path, &config).unwrap_err();
        assert!(matches!(err, ConvertError::NotAPdf { .. }), "got {err:?}");
    }

    #[test]
    fn forced_ocr_skips_sampling() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.pdf");
        std::fs::write(&path, b"%PDF-1.4\n").unwrap();

        let config = ConverterConfig::builder().force_ocr(true).build().unwrap();
        assert_eq!(select_kind(&path, &config).unwrap(), ConverterKind::Ocr);
        assert_eq!(create(ConverterKind::Ocr, &config).kind(), ConverterKind::Ocr);
    }
}
