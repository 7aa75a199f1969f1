//! Progress-callback trait for per-file and per-page conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConverterConfigBuilder::progress_callback`] to receive
//! events as a batch moves through its files and each file through its pages.
//! The CLI forwards them to an `indicatif` progress bar; library users can
//! forward them anywhere.
//!
//! # Example
//!
//! ```rust
//! use markdown_convert::{ConversionProgressCallback, ConverterConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct PageCounter {
//!     pages: AtomicUsize,
//! }
//!
//! impl ConversionProgressCallback for PageCounter {
//!     fn on_page_complete(&self, _page_num: usize, _total_pages: usize, _markdown_len: usize) {
//!         self.pages.fetch_add(1, Ordering::SeqCst);
//!     }
//! }
//!
//! let counter = Arc::new(PageCounter { pages: AtomicUsize::new(0) });
//!
//! let config = ConverterConfig::builder()
//!     .progress_callback(counter as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::output::ConverterKind;
use std::path::Path;
use std::sync::Arc;

/// Called by the conversion pipeline as it processes files and pages.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Events arrive in order from whichever thread runs
/// the blocking pipeline, hence the `Send + Sync` bound.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once before the first file of a batch.
    fn on_batch_start(&self, total_files: usize) {
        let _ = total_files;
    }

    /// Called when a file's converter has been chosen and its page count is known.
    ///
    /// # Arguments
    /// * `path`: input PDF
    /// * `kind`: converter variant picked by the selection policy
    /// * `total_pages`: pages that will be converted (after `max_pages`)
    fn on_conversion_start(&self, path: &Path, kind: ConverterKind, total_pages: usize) {
        let _ = (path, kind, total_pages);
    }

    /// Called when a page is converted.
    ///
    /// # Arguments
    /// * `page_num`: 1-indexed page number
    /// * `total_pages`: pages being converted
    /// * `markdown_len`: byte length of the page's Markdown
    fn on_page_complete(&self, page_num: usize, total_pages: usize, markdown_len: usize) {
        let _ = (page_num, total_pages, markdown_len);
    }

    /// Called when a page fails; the conversion carries on with the next page.
    fn on_page_error(&self, page_num: usize, total_pages: usize, error: &str) {
        let _ = (page_num, total_pages, error);
    }

    /// Called once per input after it converted, was skipped, or failed.
    ///
    /// # Arguments
    /// * `path`: input path
    /// * `success`: false when the file failed with an error
    fn on_file_complete(&self, path: &Path, success: bool) {
        let _ = (path, success);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConverterConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;

/// Decide whether page `page_num` (1-indexed) of `total` gets a progress log line.
///
/// The first page, every `interval`-th page and the last page are reported.
pub fn should_report(page_num: usize, total: usize, interval: usize) -> bool {
    let interval = interval.max(1);
    page_num == 1 || page_num == total || page_num % interval == 0
}
