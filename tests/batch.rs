//! Batch behaviour that does not need pdfium or tesseract: input discovery,
//! per-file error reporting, and the shared skip/overwrite workflow of the
//! `Converter` trait.

use markdown_convert::{
    convert_batch, discover_inputs, ConversionOutcome, ConversionProgressCallback, ConvertError,
    Converter, ConverterConfig, ConverterKind, Extraction, FileStatus, PageResult,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

fn touch(path: &Path, contents: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

// ── Input discovery ──────────────────────────────────────────────────────────

#[test]
fn directory_inputs_expand_to_pdfs() {
    let dir = tempfile::tempdir().unwrap();
    touch(&dir.path().join("b.pdf"), b"%PDF");
    touch(&dir.path().join("A.PDF"), b"%PDF");
    touch(&dir.path().join("notes.txt"), b"text");
    touch(&dir.path().join("sub/deep.pdf"), b"%PDF");

    let flat = discover_inputs(&[dir.path()], false);
    assert_eq!(
        flat,
        vec![dir.path().join("A.PDF"), dir.path().join("b.pdf")]
    );

    let deep = discover_inputs(&[dir.path()], true);
    assert_eq!(deep.len(), 3);
    assert!(deep.contains(&dir.path().join("sub/deep.pdf")));
}

#[test]
fn explicit_files_are_kept_and_deduplicated() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("report.pdf");
    let txt = dir.path().join("readme.txt");
    touch(&pdf, b"%PDF");
    touch(&txt, b"hello");

    let inputs: Vec<PathBuf> = vec![pdf.clone(), txt.clone(), dir.path().to_path_buf()];
    let found = discover_inputs(&inputs, false);

    // readme.txt is kept so the batch can report it; report.pdf appears once.
    assert_eq!(found, vec![txt, pdf]);
}

#[test]
fn empty_directory_yields_nothing() {
    let dir = tempfile::tempdir().unwrap();
    assert!(discover_inputs(&[dir.path()], true).is_empty());
}

// ── Per-file error reporting ─────────────────────────────────────────────────

#[derive(Default)]
struct FileLog {
    started: AtomicUsize,
    done: Mutex<Vec<(PathBuf, bool)>>,
}

impl ConversionProgressCallback for FileLog {
    fn on_batch_start(&self, total_files: usize) {
        self.started.store(total_files, Ordering::SeqCst);
    }

    fn on_file_complete(&self, path: &Path, success: bool) {
        self.done.lock().unwrap().push((path.to_path_buf(), success));
    }
}

#[tokio::test]
async fn bad_inputs_are_reported_and_batch_continues() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.pdf");
    let fake = dir.path().join("fake.pdf");
    let image = dir.path().join("photo.png");
    touch(&fake, b"<html>not a pdf</html>");
    touch(&image, b"\x89PNG\r\n\x1a\n");

    let log = Arc::new(FileLog::default());
    let config = ConverterConfig::builder()
        .progress_callback(log.clone() as Arc<dyn ConversionProgressCallback>)
        .build()
        .unwrap();

    let report = convert_batch(&[&missing, &fake, &image], &config).await;

    assert_eq!(report.files.len(), 3);
    assert_eq!(report.failed(), 3);
    assert!(!report.all_succeeded());
    for file in &report.files {
        assert_eq!(file.status, FileStatus::Failed);
        assert!(file.error.is_some());
        assert!(file.output_path.is_none());
    }
    assert!(report.files[1].error.as_deref().unwrap().contains("not a valid PDF"));
    assert!(report.files[2].error.as_deref().unwrap().contains("Unsupported"));

    assert_eq!(log.started.load(Ordering::SeqCst), 3);
    let done = log.done.lock().unwrap();
    assert_eq!(done.len(), 3);
    assert!(done.iter().all(|(_, ok)| !ok));

    assert!(!dir.path().join("markdown").exists());
}

#[tokio::test]
async fn batch_report_serialises_failures() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("gone.pdf");

    let report = convert_batch(&[&missing], &ConverterConfig::default()).await;
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["files"][0]["status"], "failed");
    assert!(json["files"][0]["error"]
        .as_str()
        .unwrap()
        .contains("gone.pdf"));
}

#[tokio::test]
async fn existing_outputs_are_skipped_without_opening_the_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("report.pdf");
    touch(&pdf, b"%PDF-1.4\ngarbage");
    let existing = dir.path().join("markdown/report.md");
    touch(&existing, b"converted last week");

    let log = Arc::new(FileLog::default());
    let config = ConverterConfig::builder()
        .progress_callback(log.clone() as Arc<dyn ConversionProgressCallback>)
        .build()
        .unwrap();

    let report = convert_batch(&[&pdf], &config).await;

    assert_eq!(report.skipped(), 1);
    assert!(report.all_succeeded());
    assert_eq!(report.files[0].status, FileStatus::Skipped);
    assert_eq!(report.files[0].output_path.as_deref(), Some(existing.as_path()));
    assert_eq!(fs::read_to_string(&existing).unwrap(), "converted last week");
    assert_eq!(*log.done.lock().unwrap(), vec![(pdf.clone(), true)]);
}

// ── Converter trait workflow ─────────────────────────────────────────────────

/// A converter that echoes the file name as Markdown.
struct EchoConverter {
    config: ConverterConfig,
}

impl Converter for EchoConverter {
    fn kind(&self) -> ConverterKind {
        ConverterKind::Ocr
    }

    fn config(&self) -> &ConverterConfig {
        &self.config
    }

    fn can_convert(&self, pdf_path: &Path) -> bool {
        pdf_path.exists()
    }

    fn extract_markdown(&self, pdf_path: &Path) -> Result<Extraction, ConvertError> {
        let name = pdf_path.file_stem().unwrap().to_string_lossy();
        let markdown = format!("# {name}\n");
        Ok(Extraction {
            markdown: markdown.clone(),
            pages: vec![PageResult::ok(1, markdown)],
            total_pages: 1,
        })
    }
}

#[test]
fn trait_workflow_creates_output_and_honours_skip() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("memo.pdf");
    touch(&pdf, b"%PDF-1.7\n");
    let out_dir = dir.path().join("out");

    let config = ConverterConfig::builder()
        .output_dir(&out_dir)
        .build()
        .unwrap();
    let echo = EchoConverter {
        config: config.clone(),
    };

    let first = echo.convert(&pdf).unwrap();
    let output = out_dir.join("memo.md");
    assert!(matches!(first, ConversionOutcome::Converted { .. }));
    assert_eq!(fs::read_to_string(&output).unwrap(), "# memo\n");

    fs::write(&output, "edited by hand").unwrap();
    let second = echo.convert(&pdf).unwrap();
    assert!(second.is_skipped());
    assert_eq!(fs::read_to_string(&output).unwrap(), "edited by hand");

    let overwrite = EchoConverter {
        config: config.to_builder().overwrite(true).build().unwrap(),
    };
    let third = overwrite.convert(&pdf).unwrap();
    assert!(!third.is_skipped());
    assert_eq!(fs::read_to_string(&output).unwrap(), "# memo\n");
    assert!(!out_dir.join("memo.md.tmp").exists());
}
