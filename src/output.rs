//! Result types returned by the conversion API.

use crate::error::PageError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Which extraction strategy produced (or would produce) the Markdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConverterKind {
    /// Read the PDF's embedded text layer.
    DirectText,
    /// Rasterise pages and run OCR.
    Ocr,
}

impl fmt::Display for ConverterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConverterKind::DirectText => f.write_str("direct-text"),
            ConverterKind::Ocr => f.write_str("ocr"),
        }
    }
}

/// Markdown (or failure) for a single page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResult {
    /// 1-indexed page number.
    pub page_num: usize,
    /// Cleaned Markdown for the page; empty when `error` is set.
    pub markdown: String,
    /// Why the page failed, if it did.
    pub error: Option<PageError>,
}

impl PageResult {
    pub fn ok(page_num: usize, markdown: String) -> Self {
        Self {
            page_num,
            markdown,
            error: None,
        }
    }

    pub fn failed(error: PageError) -> Self {
        Self {
            page_num: error.page(),
            markdown: String::new(),
            error: Some(error),
        }
    }
}

/// Markdown for a whole document plus the per-page results it was built from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Extraction {
    /// Assembled Markdown document.
    pub markdown: String,
    /// Per-page results in page order.
    pub pages: Vec<PageResult>,
    /// Page count of the whole document.
    pub total_pages: usize,
}

/// Counters for one converted document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Pages in the PDF.
    pub total_pages: usize,
    /// Pages converted successfully.
    pub processed_pages: usize,
    /// Pages that failed and were left out.
    pub failed_pages: usize,
    /// Pages beyond `max_pages` that were not looked at.
    pub skipped_pages: usize,
    /// Length of the written Markdown in bytes.
    pub output_bytes: usize,
    /// Wall-clock time for the file.
    pub duration_ms: u64,
}

/// Outcome of converting one file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConversionOutcome {
    /// Markdown written to `output_path`.
    Converted {
        output_path: PathBuf,
        converter: ConverterKind,
        stats: ConversionStats,
    },
    /// Output already existed and `skip_existing` was set; nothing written.
    Skipped { output_path: PathBuf },
}

impl ConversionOutcome {
    pub fn output_path(&self) -> &std::path::Path {
        match self {
            ConversionOutcome::Converted { output_path, .. }
            | ConversionOutcome::Skipped { output_path } => output_path,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, ConversionOutcome::Skipped { .. })
    }
}

/// Document-level metadata read from the PDF info dictionary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub creation_date: Option<String>,
    pub modification_date: Option<String>,
    pub page_count: usize,
    pub pdf_version: String,
}

/// Characters found in the leading pages' text layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextLayerSample {
    /// Pages actually sampled.
    pub pages_sampled: usize,
    /// Non-whitespace characters across the sampled pages.
    pub text_chars: usize,
}

/// What `inspect` learned about a PDF without converting it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inspection {
    pub path: PathBuf,
    pub metadata: DocumentMetadata,
    pub sample: TextLayerSample,
    /// Converter the selection policy would pick with the given config.
    pub converter: ConverterKind,
    /// Where the Markdown would be written.
    pub output_path: PathBuf,
}

/// Final state of one input in a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Converted,
    Skipped,
    Failed,
}

/// Per-input entry of a [`BatchReport`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    pub input: PathBuf,
    pub status: FileStatus,
    pub output_path: Option<PathBuf>,
    pub converter: Option<ConverterKind>,
    pub stats: Option<ConversionStats>,
    /// Human-readable error when `status` is `Failed`.
    pub error: Option<String>,
}

impl FileReport {
    pub fn from_outcome(input: PathBuf, outcome: ConversionOutcome) -> Self {
        match outcome {
            ConversionOutcome::Converted {
                output_path,
                converter,
                stats,
            } => Self {
                input,
                status: FileStatus::Converted,
                output_path: Some(output_path),
                converter: Some(converter),
                stats: Some(stats),
                error: None,
            },
            ConversionOutcome::Skipped { output_path } => Self {
                input,
                status: FileStatus::Skipped,
                output_path: Some(output_path),
                converter: None,
                stats: None,
                error: None,
            },
        }
    }

    pub fn failed(input: PathBuf, error: &crate::error::ConvertError) -> Self {
        Self {
            input,
            status: FileStatus::Failed,
            output_path: None,
            converter: None,
            stats: None,
            error: Some(error.to_string()),
        }
    }
}

/// Results of a sequential batch run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    pub files: Vec<FileReport>,
    pub duration_ms: u64,
}

impl BatchReport {
    fn count(&self, status: FileStatus) -> usize {
        self.files.iter().filter(|f| f.status == status).count()
    }

    pub fn converted(&self) -> usize {
        self.count(FileStatus::Converted)
    }

    pub fn skipped(&self) -> usize {
        self.count(FileStatus::Skipped)
    }

    pub fn failed(&self) -> usize {
        self.count(FileStatus::Failed)
    }

    /// True when no file failed. Skipped files count as success.
    pub fn all_succeeded(&self) -> bool {
        self.failed() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConvertError;

    #[test]
    fn page_result_failed_takes_page_from_error() {
        let pr = PageResult::failed(PageError::RenderFailed {
            page: 3,
            detail: "bitmap allocation".into(),
        });
        assert_eq!(pr.page_num, 3);
        assert!(pr.markdown.is_empty());
    }

    #[test]
    fn batch_counts_and_success() {
        let mut report = BatchReport::default();
        report.files.push(FileReport::from_outcome(
            PathBuf::from("a.pdf"),
            ConversionOutcome::Skipped {
                output_path: PathBuf::from("markdown/a.md"),
            },
        ));
        assert!(report.all_succeeded());

        report.files.push(FileReport::failed(
            PathBuf::from("b.pdf"),
            &ConvertError::FileNotFound {
                path: PathBuf::from("b.pdf"),
            },
        ));
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.converted(), 0);
        assert!(!report.all_succeeded());
        assert!(report.files[1]
            .error
            .as_deref()
            .unwrap()
            .contains("not found"));
    }

    #[test]
    fn outcome_serialises_with_status_tag() {
        let outcome = ConversionOutcome::Converted {
            output_path: PathBuf::from("out/a.md"),
            converter: ConverterKind::DirectText,
            stats: ConversionStats::default(),
        };
        let json = serde_json::to_string(&outcome).unwrap();
        assert!(json.contains("\"status\":\"converted\""), "got: {json}");
        assert!(json.contains("\"converter\":\"direct_text\""), "got: {json}");
    }

    #[test]
    fn kind_display() {
        assert_eq!(ConverterKind::DirectText.to_string(), "direct-text");
        assert_eq!(ConverterKind::Ocr.to_string(), "ocr");
    }
}
