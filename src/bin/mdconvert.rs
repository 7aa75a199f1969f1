//! CLI binary for markdown-convert.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ConverterConfig`, expands the input list, and prints a summary.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use markdown_convert::{
    convert_batch, discover_inputs, inspect, BatchReport, ConversionProgressCallback,
    ConverterConfig, ConverterKind, FileStatus, Inspection, PageSeparator, ProgressCallback,
};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// One bar over the batch's files; the message tracks the current file's pages.
struct CliProgressCallback {
    bar: ProgressBar,
    /// Display name and converter of the file being processed.
    current: Mutex<String>,
    page_errors: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  \
                 [{bar:32.green/238}] {pos:>3}/{len} files  \
                 ⏱ {elapsed_precise}  {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  ")
            .tick_strings(TICKS),
        );
        bar.set_prefix("Converting");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            current: Mutex::new(String::new()),
            page_errors: AtomicUsize::new(0),
        })
    }

    fn current(&self) -> String {
        self.current.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
        let page_errors = self.page_errors.load(Ordering::SeqCst);
        if page_errors > 0 {
            eprintln!(
                "{} {} page(s) could not be converted and were left out",
                yellow("⚠"),
                page_errors
            );
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_files: usize) {
        self.bar.set_length(total_files as u64);
        self.bar.reset_eta();
    }

    fn on_conversion_start(&self, path: &Path, kind: ConverterKind, total_pages: usize) {
        let label = format!("{} ({})", display_name(path), kind);
        self.bar.set_message(format!("{}  0/{} pages", label, total_pages));
        if let Ok(mut current) = self.current.lock() {
            *current = label;
        }
    }

    fn on_page_complete(&self, page_num: usize, total_pages: usize, _markdown_len: usize) {
        self.bar
            .set_message(format!("{}  {}/{} pages", self.current(), page_num, total_pages));
    }

    fn on_page_error(&self, page_num: usize, total_pages: usize, error: &str) {
        self.page_errors.fetch_add(1, Ordering::SeqCst);

        // Truncate very long error messages to keep output tidy.
        let msg = if error.chars().count() > 80 {
            format!("{}\u{2026}", error.chars().take(79).collect::<String>())
        } else {
            error.to_string()
        };
        self.bar.println(format!(
            "  {} {}  page {:>3}/{:<3}  {}",
            yellow("⚠"),
            self.current(),
            page_num,
            total_pages,
            yellow(&msg),
        ));
    }

    fn on_file_complete(&self, path: &Path, success: bool) {
        let mark = if success { green("✓") } else { red("✗") };
        self.bar.println(format!("  {} {}", mark, display_name(path)));
        self.bar.inc(1);
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert one file (writes ./markdown/report.md)
  mdconvert report.pdf

  # Convert every PDF in a directory tree into one output directory
  mdconvert -r -o notes/ papers/

  # First 10 pages only, replacing existing output
  mdconvert --max-pages 10 --overwrite book.pdf

  # Scanned documents: always OCR, German + English, higher resolution
  mdconvert --force-ocr --ocr-lang deu+eng --ocr-scale 3 scans/

  # Show what would happen without converting
  mdconvert --inspect-only *.pdf

  # Machine-readable batch report
  mdconvert --json reports/ > report.json

CONVERTERS:
  direct-text  Reads the PDF's embedded text layer. Chosen when the first
               pages contain at least 16 visible characters.
  ocr          Renders each page and runs tesseract. Chosen for scans, or
               when direct extraction finds no text at all.

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH         Path to libpdfium (file or directory)
  RUST_LOG                Override log filter (e.g. markdown_convert=debug)
  MDCONVERT_*             Every flag, e.g. MDCONVERT_OUTPUT_DIR, MDCONVERT_FORCE_OCR

SETUP:
  libpdfium must be installed on the library path, placed next to the
  mdconvert executable, or named by PDFIUM_LIB_PATH.
  OCR requires the tesseract executable (apt install tesseract-ocr).

EXIT STATUS:
  0  every file converted or was skipped
  1  at least one file failed, or no input files were found
  2  invalid command-line arguments
"#;

/// Convert PDF files to Markdown.
#[derive(Parser, Debug)]
#[command(
    name = "mdconvert",
    version,
    about = "Convert PDF files to Markdown using the text layer or OCR",
    long_about = "Convert PDF documents to Markdown. Files with an extractable text layer are \
converted directly; scanned documents are rendered and recognised with tesseract OCR.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF files or directories containing PDFs.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Write all Markdown files to this directory instead of `markdown/` beside each PDF.
    #[arg(short, long, env = "MDCONVERT_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Convert at most this many pages per document.
    #[arg(short, long, env = "MDCONVERT_MAX_PAGES",
          value_parser = clap::value_parser!(u64).range(1..))]
    max_pages: Option<u64>,

    /// Always use OCR, even when the PDF has a text layer.
    #[arg(long, env = "MDCONVERT_FORCE_OCR")]
    force_ocr: bool,

    /// Descend into subdirectories of directory inputs.
    #[arg(short, long, env = "MDCONVERT_RECURSIVE")]
    recursive: bool,

    /// Replace existing Markdown files instead of skipping them.
    #[arg(long, env = "MDCONVERT_OVERWRITE")]
    overwrite: bool,

    /// Page render scale for OCR (1.0 = 72 DPI).
    #[arg(long, env = "MDCONVERT_OCR_SCALE", default_value_t = 2.0)]
    ocr_scale: f32,

    /// Tesseract language code(s), e.g. eng or deu+eng.
    #[arg(long, env = "MDCONVERT_OCR_LANG", default_value = "eng")]
    ocr_lang: String,

    /// Tesseract executable.
    #[arg(long, env = "MDCONVERT_TESSERACT_CMD", default_value = "tesseract")]
    tesseract_cmd: String,

    /// Log progress every N pages.
    #[arg(long, env = "MDCONVERT_PROGRESS_INTERVAL", default_value_t = 5,
          value_parser = clap::value_parser!(u64).range(1..))]
    progress_interval: u64,

    /// Page separator: none, hr, comment, or custom string.
    #[arg(long, env = "MDCONVERT_SEPARATOR", default_value = "none")]
    separator: String,

    /// Prepend YAML front-matter with document metadata.
    #[arg(long, env = "MDCONVERT_METADATA")]
    metadata: bool,

    /// Print PDF metadata and the converter that would be used; convert nothing.
    #[arg(long)]
    inspect_only: bool,

    /// Print a JSON report on stdout.
    #[arg(long, env = "MDCONVERT_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "MDCONVERT_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "MDCONVERT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "MDCONVERT_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.inspect_only;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Collect inputs ───────────────────────────────────────────────────
    let inputs = discover_inputs(&cli.inputs, cli.recursive);
    if inputs.is_empty() {
        eprintln!("{} No PDF files found in the given inputs", red("✘"));
        return Ok(ExitCode::FAILURE);
    }

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let config = build_config(&cli, None)?;
        return run_inspect(&cli, &inputs, &config).await;
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress = show_progress.then(CliProgressCallback::new);
    let config = build_config(
        &cli,
        progress
            .clone()
            .map(|cb| cb as Arc<dyn ConversionProgressCallback>),
    )?;

    // ── Run conversion ───────────────────────────────────────────────────
    let report = convert_batch(&inputs, &config).await;
    if let Some(ref cb) = progress {
        cb.finish();
    }

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialise report")?
        );
    } else {
        print_summary(&report, cli.quiet);
    }

    Ok(ExitCode::from(exit_status(&report)))
}

/// Map CLI args to `ConverterConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConverterConfig> {
    let mut builder = ConverterConfig::builder()
        .force_ocr(cli.force_ocr)
        .overwrite(cli.overwrite)
        .ocr_scale(cli.ocr_scale)
        .ocr_language(&cli.ocr_lang)
        .tesseract_cmd(&cli.tesseract_cmd)
        .progress_interval(cli.progress_interval as usize)
        .page_separator(parse_separator(&cli.separator))
        .include_metadata(cli.metadata);

    if let Some(ref dir) = cli.output_dir {
        builder = builder.output_dir(dir);
    }
    if let Some(n) = cli.max_pages {
        builder = builder.max_pages(n as usize);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

async fn run_inspect(cli: &Cli, inputs: &[PathBuf], config: &ConverterConfig) -> Result<ExitCode> {
    let mut inspections: Vec<Inspection> = Vec::new();
    let mut failed = 0;

    for path in inputs {
        match inspect(path, config).await {
            Ok(info) => inspections.push(info),
            Err(e) => {
                failed += 1;
                eprintln!("{} {}: {}", red("✗"), path.display(), e);
            }
        }
    }

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&inspections).context("Failed to serialise metadata")?
        );
    } else {
        for info in &inspections {
            print_inspection(info);
        }
    }

    Ok(if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print_inspection(info: &Inspection) {
    let meta = &info.metadata;
    println!("File:         {}", info.path.display());
    if let Some(ref t) = meta.title {
        println!("Title:        {}", t);
    }
    if let Some(ref a) = meta.author {
        println!("Author:       {}", a);
    }
    if let Some(ref s) = meta.subject {
        println!("Subject:      {}", s);
    }
    println!("Pages:        {}", meta.page_count);
    println!("PDF Version:  {}", meta.pdf_version);
    if let Some(ref p) = meta.producer {
        println!("Producer:     {}", p);
    }
    if let Some(ref c) = meta.creator {
        println!("Creator:      {}", c);
    }
    println!(
        "Text layer:   {} chars on {} sampled page(s)",
        info.sample.text_chars, info.sample.pages_sampled
    );
    println!("Converter:    {}", info.converter);
    println!("Output:       {}", info.output_path.display());
    println!();
}

fn print_summary(report: &BatchReport, quiet: bool) {
    for file in &report.files {
        match file.status {
            FileStatus::Failed => eprintln!(
                "{} {}\n  {}",
                red("✗"),
                bold(&file.input.display().to_string()),
                red(file.error.as_deref().unwrap_or("unknown error")),
            ),
            FileStatus::Skipped if !quiet => eprintln!(
                "{} {}  {}",
                dim("–"),
                file.input.display(),
                dim("skipped (output exists)"),
            ),
            FileStatus::Converted if !quiet => {
                let (pages, failed) = file
                    .stats
                    .as_ref()
                    .map_or((0, 0), |s| (s.processed_pages, s.failed_pages));
                let out = file
                    .output_path
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                let converter = file.converter.map(|k| k.to_string()).unwrap_or_default();
                let page_note = if failed == 0 {
                    dim(&format!("{pages} pages, {converter}"))
                } else {
                    yellow(&format!("{pages} pages ({failed} failed), {converter}"))
                };
                eprintln!("{} {}  →  {}  {}", green("✓"), file.input.display(), bold(&out), page_note);
            }
            _ => {}
        }
    }

    if quiet {
        return;
    }

    let mark = if report.failed() == 0 {
        green("✔")
    } else if report.failed() == report.files.len() {
        red("✘")
    } else {
        cyan("⚠")
    };
    eprintln!(
        "{} {} converted, {} skipped, {} failed  {}",
        mark,
        bold(&report.converted().to_string()),
        report.skipped(),
        if report.failed() == 0 {
            "0".to_string()
        } else {
            red(&report.failed().to_string())
        },
        dim(&format!("{}ms", report.duration_ms)),
    );
}

/// 0 when nothing failed (skips are fine), 1 otherwise.
fn exit_status(report: &BatchReport) -> u8 {
    if report.all_succeeded() {
        0
    } else {
        1
    }
}

/// Parse `--separator` string into `PageSeparator`.
fn parse_separator(s: &str) -> PageSeparator {
    match s.to_lowercase().as_str() {
        "none" => PageSeparator::None,
        "hr" | "---" => PageSeparator::HorizontalRule,
        "comment" => PageSeparator::Comment,
        _ => PageSeparator::Custom(s.to_string()),
    }
}
