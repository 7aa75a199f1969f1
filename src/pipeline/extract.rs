//! Text-layer access through pdfium: open documents, read page text and font
//! spans, sample the text layer for the selection policy, read metadata.
//!
//! Everything here is blocking; async callers go through
//! `tokio::task::spawn_blocking` in [`crate::convert`].

use crate::error::ConvertError;
use crate::output::{DocumentMetadata, TextLayerSample};
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::debug;

/// A run of text drawn with a single font size.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    pub text: String,
    pub font_size: f32,
}

impl TextSpan {
    pub fn new(text: impl Into<String>, font_size: f32) -> Self {
        Self {
            text: text.into(),
            font_size,
        }
    }
}

/// Raw text of one page, as pdfium lays it out, plus its font spans.
#[derive(Debug, Clone)]
pub struct PageText {
    /// 1-indexed page number.
    pub page_num: usize,
    pub text: String,
    pub spans: Vec<TextSpan>,
}

/// Load a PDF, mapping pdfium's load errors onto [`ConvertError`].
pub fn open_document<'a>(pdfium: &'a Pdfium, path: &Path) -> Result<PdfDocument<'a>, ConvertError> {
    pdfium.load_pdf_from_file(path, None).map_err(|e| {
        let err_str = format!("{:?}", e);
        if err_str.contains("Password") || err_str.contains("password") {
            ConvertError::PasswordRequired {
                path: path.to_path_buf(),
            }
        } else {
            ConvertError::CorruptPdf {
                path: path.to_path_buf(),
                detail: err_str,
            }
        }
    })
}

/// Number of pages in an open document.
pub fn page_count(document: &PdfDocument<'_>) -> usize {
    document.pages().len() as usize
}

/// Read the text layer and font spans of page `idx` (0-indexed).
pub fn page_text(document: &PdfDocument<'_>, idx: usize) -> Result<PageText, PdfiumError> {
    let pages = document.pages();
    let page = pages.get(idx as u16)?;
    let text = page.text()?.all();

    let spans = page
        .objects()
        .iter()
        .filter_map(|object| {
            object.as_text_object().map(|t| TextSpan {
                text: t.text(),
                font_size: t.scaled_font_size().value,
            })
        })
        .filter(|span| !span.text.trim().is_empty())
        .collect();

    Ok(PageText {
        page_num: idx + 1,
        text,
        spans,
    })
}

/// Count non-whitespace characters on the first `sample_pages` pages.
///
/// A page whose text layer cannot be read counts as empty: an unreadable
/// text layer is exactly the case OCR exists for.
pub fn sample_text_layer(document: &PdfDocument<'_>, sample_pages: usize) -> TextLayerSample {
    let pages = document.pages();
    let to_sample = sample_pages.min(pages.len() as usize);

    let mut text_chars = 0;
    for idx in 0..to_sample {
        let chars = page_chars(pages, idx).unwrap_or(0);
        debug!("Text layer sample: page {} has {} chars", idx + 1, chars);
        text_chars += chars;
    }

    TextLayerSample {
        pages_sampled: to_sample,
        text_chars,
    }
}

fn page_chars(pages: &PdfPages<'_>, idx: usize) -> Result<usize, PdfiumError> {
    let page = pages.get(idx as u16)?;
    let text = page.text()?.all();
    Ok(count_text_chars(&text))
}

/// Non-whitespace, non-control characters in `text`.
pub fn count_text_chars(text: &str) -> usize {
    text.chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .count()
}

/// Extract document metadata from an open PDF.
pub fn read_metadata(document: &PdfDocument<'_>) -> DocumentMetadata {
    let metadata = document.metadata();

    let get_meta = |tag: PdfDocumentMetadataTagType| -> Option<String> {
        metadata.get(tag).and_then(|t| {
            let v = t.value().trim().to_string();
            if v.is_empty() {
                None
            } else {
                Some(v)
            }
        })
    };

    DocumentMetadata {
        title: get_meta(PdfDocumentMetadataTagType::Title),
        author: get_meta(PdfDocumentMetadataTagType::Author),
        subject: get_meta(PdfDocumentMetadataTagType::Subject),
        creator: get_meta(PdfDocumentMetadataTagType::Creator),
        producer: get_meta(PdfDocumentMetadataTagType::Producer),
        creation_date: get_meta(PdfDocumentMetadataTagType::CreationDate),
        modification_date: get_meta(PdfDocumentMetadataTagType::ModificationDate),
        page_count: page_count(document),
        pdf_version: format!("{:?}", document.version()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_ignore_whitespace_and_controls() {
        assert_eq!(count_text_chars("  a b\r\n\tc \u{c}"), 3);
        assert_eq!(count_text_chars(""), 0);
        assert_eq!(count_text_chars("\n\n \r\n"), 0);
    }

    #[test]
    fn unicode_counts_chars_not_bytes() {
        assert_eq!(count_text_chars("Größe"), 5);
    }
}
