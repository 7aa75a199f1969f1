//! Direct text-layer conversion.

use super::{assemble_document, report_page, Converter};
use crate::config::{page_limit, ConverterConfig};
use crate::error::{ConvertError, PageError};
use crate::output::{ConverterKind, Extraction, PageResult};
use crate::pipeline::{engine, extract, input, postprocess, structure};
use std::path::Path;
use tracing::{debug, info};

/// Reads the PDF's embedded text layer and recovers headings, bullets and
/// paragraphs from font sizes and line layout.
///
/// Fails with [`ConvertError::NoTextExtracted`] when no page yields any text,
/// which the top-level conversion treats as a cue to retry with OCR.
pub struct DirectTextConverter {
    config: ConverterConfig,
}

impl DirectTextConverter {
    pub fn new(config: ConverterConfig) -> Self {
        Self { config }
    }
}

impl Converter for DirectTextConverter {
    fn kind(&self) -> ConverterKind {
        ConverterKind::DirectText
    }

    fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// True when the sampled pages carry at least `min_text_chars` characters.
    fn can_convert(&self, pdf_path: &Path) -> bool {
        if input::validate_pdf(pdf_path).is_err() {
            return false;
        }
        match super::factory::read_text_sample(pdf_path, &self.config) {
            Ok(sample) => super::factory::has_usable_text(&sample, self.config.min_text_chars),
            Err(e) => {
                debug!("Text layer sampling failed for {}: {}", pdf_path.display(), e);
                false
            }
        }
    }

    fn extract_markdown(&self, pdf_path: &Path) -> Result<Extraction, ConvertError> {
        let pdfium = engine::bind_pdfium()?;
        let document = extract::open_document(&pdfium, pdf_path)?;

        let total_pages = extract::page_count(&document);
        let limit = page_limit(total_pages, self.config.max_pages);
        info!(
            "Extracting text from {} pages of {} ({} total)",
            limit,
            pdf_path.display(),
            total_pages
        );
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_conversion_start(pdf_path, self.kind(), limit);
        }

        let mut pages = Vec::with_capacity(limit);
        let mut text_chars = 0;

        for idx in 0..limit {
            let page = match extract::page_text(&document, idx) {
                Ok(text) => {
                    text_chars += extract::count_text_chars(&text.text);
                    let markdown = postprocess::clean_markdown(&structure::page_to_markdown(&text));
                    debug!("Page {}: {} spans, {} bytes", idx + 1, text.spans.len(), markdown.len());
                    PageResult::ok(idx + 1, markdown)
                }
                Err(e) => PageResult::failed(PageError::TextFailed {
                    page: idx + 1,
                    detail: e.to_string(),
                }),
            };
            report_page(&self.config, &page, limit);
            pages.push(page);
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

    #[test]
    fn kind_is_direct_text() {
        let conv = DirectTextConverter::new(ConverterConfig::default());
        assert_eq!(conv.kind(), ConverterKind::DirectText);
    }

    #[test]
    fn cannot_convert_missing_file() {
        let conv = DirectTextConverter::new(ConverterConfig::default());
        assert!(!conv.can_convert(Path::new("/definitely/not/here.pdf")));
    }

    #[test]
    fn cannot_convert_non_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "plain text").unwrap();

        let conv = DirectTextConverter::new(ConverterConfig::default());
        assert!(!conv.can_convert(&path));
    }
}
