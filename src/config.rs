//! Configuration types for PDF-to-Markdown conversion.
//!
//! All conversion behaviour is controlled through [`ConverterConfig`], built
//! via its [`ConverterConfigBuilder`]. A config is created once per
//! invocation (from CLI flags or an API call), validated in
//! [`ConverterConfigBuilder::build`], and never mutated afterwards; use
//! [`ConverterConfig::to_builder`] to derive a modified copy.

use crate::error::ConvertError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Smallest accepted render cap, in pixels per edge.
pub const MIN_RENDERED_PIXELS: u32 = 100;

/// Configuration for a PDF-to-Markdown conversion.
///
/// Built via [`ConverterConfig::builder()`] or using
/// [`ConverterConfig::default()`].
///
/// # Example
/// ```rust
/// use markdown_convert::ConverterConfig;
///
/// let config = ConverterConfig::builder()
///     .output_dir("out")
///     .max_pages(10)
///     .force_ocr(true)
///     .build()
///     .unwrap();
/// assert_eq!(config.max_pages, Some(10));
/// ```
#[derive(Clone)]
pub struct ConverterConfig {
    /// Directory receiving `<stem>.md` files. Default: None, which writes to
    /// a `markdown/` directory next to each input PDF.
    pub output_dir: Option<PathBuf>,

    /// Maximum number of pages to convert per document. None means all pages.
    pub max_pages: Option<usize>,

    /// Always use OCR, even when the PDF has an extractable text layer. Default: false.
    pub force_ocr: bool,

    /// Leave existing output files untouched. Default: true.
    ///
    /// The CLI's `--overwrite` flag sets this to false.
    pub skip_existing: bool,

    /// Zoom factor applied when rasterising pages for OCR. Default: 2.0.
    ///
    /// PDF user space is 72 units per inch, so 2.0 renders at 144 DPI.
    /// Tesseract accuracy drops sharply below ~150 DPI on small fonts;
    /// raise to 3.0–4.0 for dense scans.
    pub ocr_scale: f32,

    /// Longest rendered edge in pixels, applied after `ocr_scale`. Default: 4000.
    pub max_rendered_pixels: u32,

    /// Tesseract language code(s), e.g. `"eng"` or `"eng+deu"`. Default: `"eng"`.
    pub ocr_language: String,

    /// Tesseract executable name or path. Default: `"tesseract"`.
    pub tesseract_cmd: String,

    /// Log a progress line every N pages. Default: 5.
    pub progress_interval: usize,

    /// Non-whitespace characters the sampled text layer must contain for
    /// direct extraction to be chosen. Default: 16.
    pub min_text_chars: usize,

    /// Number of leading pages sampled by the selection policy. Default: 3.
    pub text_sample_pages: usize,

    /// Page separator in assembled output. Default: None.
    pub page_separator: PageSeparator,

    /// Include YAML front-matter with document metadata. Default: false.
    pub include_metadata: bool,

    /// Optional per-file / per-page event sink.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            max_pages: None,
            force_ocr: false,
            skip_existing: true,
            ocr_scale: 2.0,
            max_rendered_pixels: 4000,
            ocr_language: "eng".to_string(),
            tesseract_cmd: "tesseract".to_string(),
            progress_interval: 5,
            min_text_chars: 16,
            text_sample_pages: 3,
            page_separator: PageSeparator::default(),
            include_metadata: false,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConverterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConverterConfig")
            .field("output_dir", &self.output_dir)
            .field("max_pages", &self.max_pages)
            .field("force_ocr", &self.force_ocr)
            .field("skip_existing", &self.skip_existing)
            .field("ocr_scale", &self.ocr_scale)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("ocr_language", &self.ocr_language)
            .field("tesseract_cmd", &self.tesseract_cmd)
            .field("progress_interval", &self.progress_interval)
            .field("min_text_chars", &self.min_text_chars)
            .field("text_sample_pages", &self.text_sample_pages)
            .field("page_separator", &self.page_separator)
            .field("include_metadata", &self.include_metadata)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConverterConfig {
    /// Create a new builder for `ConverterConfig`.
    pub fn builder() -> ConverterConfigBuilder {
        ConverterConfigBuilder {
            config: Self::default(),
        }
    }

    /// Start a builder pre-populated with this config's values.
    pub fn to_builder(&self) -> ConverterConfigBuilder {
        ConverterConfigBuilder {
            config: self.clone(),
        }
    }
}

/// Builder for [`ConverterConfig`].
#[derive(Debug)]
pub struct ConverterConfigBuilder {
    config: ConverterConfig,
}

impl ConverterConfigBuilder {
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = Some(dir.into());
        self
    }

    pub fn max_pages(mut self, n: usize) -> Self {
        self.config.max_pages = Some(n);
        self
    }

    /// Clear a previously set page limit.
    pub fn all_pages(mut self) -> Self {
        self.config.max_pages = None;
        self
    }

    pub fn force_ocr(mut self, v: bool) -> Self {
        self.config.force_ocr = v;
        self
    }

    pub fn skip_existing(mut self, v: bool) -> Self {
        self.config.skip_existing = v;
        self
    }

    /// Inverse of [`skip_existing`](Self::skip_existing), matching the CLI flag.
    pub fn overwrite(mut self, v: bool) -> Self {
        self.config.skip_existing = !v;
        self
    }

    pub fn ocr_scale(mut self, scale: f32) -> Self {
        self.config.ocr_scale = scale;
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px;
        self
    }

    pub fn ocr_language(mut self, lang: impl Into<String>) -> Self {
        self.config.ocr_language = lang.into();
        self
    }

    pub fn tesseract_cmd(mut self, cmd: impl Into<String>) -> Self {
        self.config.tesseract_cmd = cmd.into();
        self
    }

    pub fn progress_interval(mut self, n: usize) -> Self {
        self.config.progress_interval = n;
        self
    }

    pub fn min_text_chars(mut self, n: usize) -> Self {
        self.config.min_text_chars = n;
        self
    }

    pub fn text_sample_pages(mut self, n: usize) -> Self {
        self.config.text_sample_pages = n;
        self
    }

    pub fn page_separator(mut self, sep: PageSeparator) -> Self {
        self.config.page_separator = sep;
        self
    }

    pub fn include_metadata(mut self, v: bool) -> Self {
        self.config.include_metadata = v;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConverterConfig, ConvertError> {
        let c = &self.config;
        if c.max_pages == Some(0) {
            return Err(ConvertError::InvalidConfig(
                "max_pages must be at least 1".into(),
            ));
        }
        if !c.ocr_scale.is_finite() || c.ocr_scale <= 0.0 {
            return Err(ConvertError::InvalidConfig(format!(
                "ocr_scale must be a positive number, got {}",
                c.ocr_scale
            )));
        }
        if c.max_rendered_pixels < MIN_RENDERED_PIXELS
            || i32::try_from(c.max_rendered_pixels).is_err()
        {
            return Err(ConvertError::InvalidConfig(format!(
                "max_rendered_pixels must be between {} and {}, got {}",
                MIN_RENDERED_PIXELS,
                i32::MAX,
                c.max_rendered_pixels
            )));
        }
        if c.progress_interval == 0 {
            return Err(ConvertError::InvalidConfig(
                "progress_interval must be at least 1".into(),
            ));
        }
        if c.text_sample_pages == 0 {
            return Err(ConvertError::InvalidConfig(
                "text_sample_pages must be at least 1".into(),
            ));
        }
        if c.ocr_language.trim().is_empty() {
            return Err(ConvertError::InvalidConfig(
                "ocr_language must not be empty".into(),
            ));
        }
        if c.tesseract_cmd.trim().is_empty() {
            return Err(ConvertError::InvalidConfig(
                "tesseract_cmd must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

/// Number of pages to convert given the document length and an optional cap.
pub fn page_limit(total_pages: usize, max_pages: Option<usize>) -> usize {
    match max_pages {
        Some(n) => n.min(total_pages),
        None => total_pages,
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// How to separate pages in the assembled Markdown output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSeparator {
    /// No separator; pages joined with "\n\n". (default)
    #[default]
    None,
    /// Horizontal rule: "\n\n---\n\n"
    HorizontalRule,
    /// HTML comment with page number: "<!-- page N -->"
    Comment,
    /// Custom string inserted between pages.
    Custom(String),
}

impl PageSeparator {
    /// Render the separator string for the given page number (1-indexed).
    pub fn render(&self, page_num: usize) -> String {
        match self {
            PageSeparator::None => "\n\n".to_string(),
            PageSeparator::HorizontalRule => "\n\n---\n\n".to_string(),
            PageSeparator::Comment => format!("\n\n<!-- page {} -->\n\n", page_num),
            PageSeparator::Custom(s) => format!("\n\n{}\n\n", s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_cli_defaults() {
        let c = ConverterConfig::default();
        assert!(c.output_dir.is_none());
        assert!(c.max_pages.is_none());
        assert!(!c.force_ocr);
        assert!(c.skip_existing);
        assert_eq!(c.ocr_scale, 2.0);
        assert_eq!(c.progress_interval, 5);
    }

    #[test]
    fn zero_max_pages_rejected() {
        let err = ConverterConfig::builder().max_pages(0).build().unwrap_err();
        assert!(matches!(err, ConvertError::InvalidConfig(_)));
    }

    #[test]
    fn non_positive_scale_rejected() {
        assert!(ConverterConfig::builder().ocr_scale(0.0).build().is_err());
        assert!(ConverterConfig::builder().ocr_scale(-1.5).build().is_err());
        assert!(ConverterConfig::builder()
            .ocr_scale(f32::NAN)
            .build()
            .is_err());
        assert!(ConverterConfig::builder().ocr_scale(0.5).build().is_ok());
    }

    #[test]
    fn zero_progress_interval_rejected() {
        assert!(ConverterConfig::builder()
            .progress_interval(0)
            .build()
            .is_err());
    }

    #[test]
    fn render_cap_bounds_checked_in_build() {
        let err = ConverterConfig::builder()
            .max_rendered_pixels(99)
            .build()
            .unwrap_err();
        assert!(matches!(err, ConvertError::InvalidConfig(_)));
        assert!(ConverterConfig::builder()
            .max_rendered_pixels(u32::MAX)
            .build()
            .is_err());

        let c = ConverterConfig::builder()
            .max_rendered_pixels(MIN_RENDERED_PIXELS)
            .build()
            .unwrap();
        assert_eq!(c.max_rendered_pixels, 100);
    }

    #[test]
    fn overwrite_inverts_skip_existing() {
        let c = ConverterConfig::builder().overwrite(true).build().unwrap();
        assert!(!c.skip_existing);
        let c = ConverterConfig::builder().overwrite(false).build().unwrap();
        assert!(c.skip_existing);
    }

    #[test]
    fn to_builder_keeps_other_fields() {
        let base = ConverterConfig::builder()
            .output_dir("out")
            .max_pages(3)
            .build()
            .unwrap();
        let derived = base.to_builder().force_ocr(true).build().unwrap();
        assert!(derived.force_ocr);
        assert_eq!(derived.max_pages, Some(3));
        assert_eq!(derived.output_dir, Some(PathBuf::from("out")));
        assert!(!base.force_ocr);
    }

    #[test]
    fn page_limit_caps_at_document_length() {
        assert_eq!(page_limit(10, None), 10);
        assert_eq!(page_limit(10, Some(3)), 3);
        assert_eq!(page_limit(2, Some(5)), 2);
        assert_eq!(page_limit(0, Some(5)), 0);
    }

    #[test]
    fn separator_render() {
        assert_eq!(PageSeparator::None.render(2), "\n\n");
        assert_eq!(PageSeparator::HorizontalRule.render(2), "\n\n---\n\n");
        assert_eq!(PageSeparator::Comment.render(4), "\n\n<!-- page 4 -->\n\n");
        assert_eq!(
            PageSeparator::Custom("***".into()).render(1),
            "\n\n***\n\n"
        );
    }
}
