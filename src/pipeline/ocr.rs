//! OCR through the `tesseract` command-line tool.
//!
//! Any tesseract 4.x/5.x on `PATH` (or named by `--tesseract-cmd`) works.
//! Recognised text is read from stdout (`tesseract <image> stdout`).

use crate::error::ConvertError;
use std::path::Path;
use std::process::Command;
use tracing::{debug, warn};

/// A configured tesseract invocation.
#[derive(Debug, Clone)]
pub struct Tesseract {
    command: String,
    language: String,
}

impl Tesseract {
    pub fn new(command: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            language: language.into(),
        }
    }

    /// Run `tesseract --version`, returning the first line of its banner.
    pub fn check_available(&self) -> Result<String, ConvertError> {
        let unavailable = |detail: String| ConvertError::OcrUnavailable {
            command: self.command.clone(),
            detail,
        };

        let output = Command::new(&self.command)
            .arg("--version")
            .output()
            .map_err(|e| unavailable(e.to_string()))?;

        if !output.status.success() {
            return Err(unavailable(format!("`--version` exited with {}", output.status)));
        }

        // Older releases print the banner on stderr.
        let banner = if output.stdout.is_empty() {
            String::from_utf8_lossy(&output.stderr).into_owned()
        } else {
            String::from_utf8_lossy(&output.stdout).into_owned()
        };
        let version = banner.lines().next().unwrap_or("").trim().to_string();
        debug!("OCR engine: {}", version);
        Ok(version)
    }

    /// Recognise the text in `image_path`.
    ///
    /// Returns the human-readable failure reason on error so the caller can
    /// wrap it in a page-level error.
    pub fn recognise(&self, image_path: &Path) -> Result<String, String> {
        let output = Command::new(&self.command)
            .arg(image_path)
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .output()
            .map_err(|e| format!("failed to run {}: {}", self.command, e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!(
                "{} exited with {}: {}",
                self.command,
                output.status,
                stderr.trim()
            ));
        }

        if !output.stderr.is_empty() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim();
            if !stderr.is_empty() && !is_benign_notice(stderr) {
                warn!("{}: {}", self.command, stderr);
            }
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// tesseract prints DPI estimates and similar notices on every run.
fn is_benign_notice(stderr: &str) -> bool {
    stderr.lines().all(|line| {
        let line = line.trim();
        line.is_empty()
            || line.starts_with("Estimating resolution")
            || line.starts_with("Detected")
            || line.starts_with("Warning: Invalid resolution")
    })
}
