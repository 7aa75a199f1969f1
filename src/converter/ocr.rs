//! OCR conversion: rasterise each page and run tesseract on it.

use super::{assemble_document, report_page, Converter};
use crate::config::{page_limit, ConverterConfig};
use crate::error::{ConvertError, PageError};
use crate::output::{ConverterKind, Extraction, PageResult};
use crate::pipeline::{engine, extract, input, ocr::Tesseract, postprocess, render};
use pdfium_render::prelude::PdfDocument;
use std::path::Path;
use tracing::{debug, info};

/// Renders pages to images and recognises them with tesseract.
///
/// Each page's text is prefixed with a `# Page N` heading. A page that fails
/// to render or recognise is recorded and skipped; the file only fails when
/// every page does.
pub struct OcrConverter {
    config: ConverterConfig,
    engine: Tesseract,
}

impl OcrConverter {
    pub fn new(config: ConverterConfig) -> Self {
        let engine = Tesseract::new(config.tesseract_cmd.clone(), config.ocr_language.clone());
        Self { config, engine }
    }

    /// Render, recognise and clean one page. The PNG is written to `scratch`
    /// and removed again before returning.
    fn ocr_page(
        &self,
        document: &PdfDocument<'_>,
        idx: usize,
        scratch: &Path,
    ) -> Result<(String, usize), PageError> {
        let page_num = idx + 1;

        let image = render::render_page(
            document,
            idx,
            self.config.ocr_scale,
            self.config.max_rendered_pixels,
        )
        .map_err(|e| PageError::RenderFailed {
            page: page_num,
            detail: e.to_string(),
        })?;

        let image_path = scratch.join(format!("page-{:04}.png", page_num));
        render::save_png(&image, &image_path).map_err(|e| PageError::RenderFailed {
            page: page_num,
            detail: format!("could not write page image: {}", e),
        })?;
        drop(image);

        let recognised = self.engine.recognise(&image_path);
        let _ = std::fs::remove_file(&image_path);
        let text = recognised.map_err(|detail| PageError::OcrFailed {
            page: page_num,
            detail,
        })?;

        let chars = extract::count_text_chars(&text);
        debug!("Page {}: recognised {} chars", page_num, chars);

        let markdown = postprocess::clean_ocr_markdown(&format!("# Page {}\n\n{}", page_num, text));
        Ok((markdown, chars))
    }
}

impl Converter for OcrConverter {
    fn kind(&self) -> ConverterKind {
        ConverterKind::Ocr
    }

    fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Any readable PDF can be OCR'd.
    fn can_convert(&self, pdf_path: &Path) -> bool {
        input::validate_pdf(pdf_path).is_ok()
    }

    fn extract_markdown(&self, pdf_path: &Path) -> Result<Extraction, ConvertError> {
        let version = self.engine.check_available()?;
        let pdfium = engine::bind_pdfium()?;
        let document = extract::open_document(&pdfium, pdf_path)?;

        let total_pages = extract::page_count(&document);
        let limit = page_limit(total_pages, self.config.max_pages);
        info!(
            "Running OCR on {} pages of {} at {:.0} DPI ({})",
            limit,
            pdf_path.display(),
            render::effective_dpi(self.config.ocr_scale),
            version
        );
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_conversion_start(pdf_path, self.kind(), limit);
        }

        let scratch = tempfile::Builder::new()
            .prefix("mdconvert-ocr-")
            .tempdir()
            .map_err(|e| ConvertError::Internal(format!("cannot create scratch directory: {}", e)))?;

        let mut pages = Vec::with_capacity(limit);
        let mut text_chars = 0;

        for idx in 0..limit {
            let page = match self.ocr_page(&document, idx, scratch.path()) {
                Ok((markdown, chars)) => {
                    text_chars += chars;
                    PageResult::ok(idx + 1, markdown)
                }
                Err(e) => PageResult::failed(e),
            };
            report_page(&self.config, &page, limit);
            pages.push(page);
        }

        if limit > 0 && pages.iter().all(|p| p.error.is_some()) {
            let first_error = pages
                .iter()
                .find_map(|p| p.error.as_ref())
                .map(|e| e.to_string())
                .unwrap_or_default();
            return Err(ConvertError::AllPagesFailed {
                path: pdf_path.to_path_buf(),
                total: limit,
                first_error,
            });
        }

        if text_chars == 0 {
            return Err(ConvertError::NoTextExtracted {
                path: pdf_path.to_path_buf(),
            });
        }

        let metadata = self
            .config
            .include_metadata
            .then(|| extract::read_metadata(&document));
        let markdown = assemble_document(&pages, &self.config, metadata.as_ref());

        Ok(Extraction {
            markdown,
            pages,
            total_pages,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn kind_is_ocr() {
        let conv = OcrConverter::new(ConverterConfig::default());
        assert_eq!(conv.kind(), ConverterKind::Ocr);
    }

    #[test]
    fn can_convert_any_pdf_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.pdf");
        fs::write(&path, b"%PDF-1.5\n").unwrap();

        let conv = OcrConverter::new(ConverterConfig::default());
        assert!(conv.can_convert(&path));
        assert!(!conv.can_convert(&dir.path().join("missing.pdf")));
    }

    #[test]
    fn missing_engine_fails_before_pdfium() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.pdf");
        fs::write(&path, b"%PDF-1.5\n").unwrap();

        let config = ConverterConfig::builder()
            .tesseract_cmd("definitely-not-a-real-ocr-binary")
            .build()
            .unwrap();
        let conv = OcrConverter::new(config);

        let err = conv.convert(&path).unwrap_err();
        assert!(matches!(err, ConvertError::OcrUnavailable { .. }), "got {err:?}");
        assert!(!dir.path().join("markdown/scan.md").exists());
    }
}
