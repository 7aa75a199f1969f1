//! Conversion pipeline stages.
//!
//! Each sub-module handles one concern and exposes a small, testable surface:
//!
//! | Module | Responsibility |
//! |--------|---------------|
//! | [`input`] | Validate that a path is a readable PDF (magic bytes, permissions) |
//! | [`engine`] | Locate and bind the pdfium shared library |
//! | [`extract`] | Page text, font spans, text-layer sampling, metadata |
//! | [`structure`] | Raw page text → Markdown (headings, bullets, hyphenation) |
//! | [`render`] | Rasterise a page for OCR |
//! | [`ocr`] | Run tesseract on a page image |
//! | [`postprocess`] | Deterministic Markdown cleanup rules |
//!
//! The converters in [`crate::converter`] compose these stages; nothing in
//! here knows which strategy is being used.

pub mod engine;
pub mod extract;
pub mod input;
pub mod ocr;
pub mod postprocess;
pub mod render;
pub mod structure;
