//! The converter capability interface and its two variants.
//!
//! A [`Converter`] answers two questions ("can you handle this file?" and
//! "what Markdown does this file contain?") and inherits the shared
//! [`Converter::convert`] workflow that turns the answer into a file on disk:
//!
//! ```text
//! validate input ─► derive output path ─► exists && skip_existing? ─► Skipped
//!                                              │ no
//!                                              ▼
//!                                   extract_markdown() ─► atomic write ─► Converted
//! ```
//!
//! [`factory::select_converter`] decides which variant a file gets.

pub mod direct;
pub mod factory;
pub mod ocr;

pub use direct::DirectTextConverter;
pub use factory::{create, select_converter, select_kind};
pub use ocr::OcrConverter;

use crate::config::ConverterConfig;
use crate::error::ConvertError;
use crate::output::{
    ConversionOutcome, ConversionStats, ConverterKind, DocumentMetadata, Extraction, PageResult,
};
use crate::paths;
use crate::pipeline::input;
use crate::progress::should_report;
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

/// A PDF-to-Markdown extraction strategy.
pub trait Converter: Send + Sync {
    /// Which strategy this is.
    fn kind(&self) -> ConverterKind;

    /// Configuration the converter was built with.
    fn config(&self) -> &ConverterConfig;

    /// Whether this converter can produce Markdown for `pdf_path`.
    fn can_convert(&self, pdf_path: &Path) -> bool;

    /// Produce the Markdown document for `pdf_path` without touching the output location.
    fn extract_markdown(&self, pdf_path: &Path) -> Result<Extraction, ConvertError>;

    /// Convert `pdf_path` and write the result to its derived output path.
    ///
    /// Returns [`ConversionOutcome::Skipped`] without extracting anything when
    /// the output already exists and `skip_existing` is set.
    fn convert(&self, pdf_path: &Path) -> Result<ConversionOutcome, ConvertError> {
        let start = Instant::now();
        let config = self.config();

        input::validate_pdf(pdf_path)?;

        let output_path = paths::output_path_for(pdf_path, config.output_dir.as_deref());
        if paths::should_skip(&output_path, config.skip_existing) {
            info!(
                "Output file already exists, skipping: {} (enable overwrite to replace it)",
                output_path.display()
            );
            return Ok(ConversionOutcome::Skipped { output_path });
        }

        info!("Converting {} with the {} converter", pdf_path.display(), self.kind());
        let extraction = self.extract_markdown(pdf_path)?;

        paths::write_atomic(&output_path, &extraction.markdown)?;
        info!(
            "Saved markdown to {} ({} bytes)",
            output_path.display(),
            extraction.markdown.len()
        );

        let stats = extraction_stats(&extraction, config, start);
        Ok(ConversionOutcome::Converted {
            output_path,
            converter: self.kind(),
            stats,
        })
    }
}

fn extraction_stats(extraction: &Extraction, config: &ConverterConfig, start: Instant) -> ConversionStats {
    let processed = extraction.pages.iter().filter(|p| p.error.is_none()).count();
    let failed = extraction.pages.len() - processed;
    let converted = crate::config::page_limit(extraction.total_pages, config.max_pages);

    ConversionStats {
        total_pages: extraction.total_pages,
        processed_pages: processed,
        failed_pages: failed,
        skipped_pages: extraction.total_pages.saturating_sub(converted),
        output_bytes: extraction.markdown.len(),
        duration_ms: start.elapsed().as_millis() as u64,
    }
}

// ── Helpers shared by both variants ─────────────────────────────────────────

/// Log and forward a finished page to the progress callback.
pub(crate) fn report_page(config: &ConverterConfig, page: &PageResult, total: usize) {
    match &page.error {
        None => {
            if should_report(page.page_num, total, config.progress_interval) {
                info!("Processed page {}/{}", page.page_num, total);
            }
            if let Some(ref cb) = config.progress_callback {
                cb.on_page_complete(page.page_num, total, page.markdown.len());
            }
        }
        Some(e) => {
            warn!("{}", e);
            if let Some(ref cb) = config.progress_callback {
                cb.on_page_error(page.page_num, total, &e.to_string());
            }
        }
    }
}

/// Join successful, non-blank pages with the configured separator.
pub(crate) fn assemble_document(
    pages: &[PageResult],
    config: &ConverterConfig,
    metadata: Option<&DocumentMetadata>,
) -> String {
    let mut parts: Vec<String> = Vec::new();

    if let Some(meta) = metadata {
        parts.push(format_yaml_front_matter(meta));
    }

    let content_pages = pages
        .iter()
        .filter(|p| p.error.is_none() && !p.markdown.trim().is_empty());

    for (i, page) in content_pages.enumerate() {
        if i > 0 {
            parts.push(config.page_separator.render(page.page_num));
        }
        parts.push(page.markdown.trim_end().to_string());
    }

    let mut doc = parts.join("");
    doc.push('\n');
    doc
}

/// Format document metadata as YAML front matter.
pub(crate) fn format_yaml_front_matter(meta: &DocumentMetadata) -> String {
    let mut yaml = String::from("---\n");

    let fields = [
        ("title", &meta.title),
        ("author", &meta.author),
        ("subject", &meta.subject),
        ("creator", &meta.creator),
        ("producer", &meta.producer),
    ];
    for (key, value) in fields {
        if let Some(v) = value {
            yaml.push_str(&format!("{}: \"{}\"\n", key, yaml_escape(v)));
        }
    }
    yaml.push_str(&format!("pages: {}\n", meta.page_count));
    if !meta.pdf_version.is_empty() {
        yaml.push_str(&format!("pdf_version: \"{}\"\n", yaml_escape(&meta.pdf_version)));
    }

    yaml.push_str("---\n\n");
    yaml
}

fn yaml_escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
