//! Turn a page's raw text layer into Markdown.
//!
//! pdfium gives us the page text line by line plus the font size of every
//! text object. Structure is recovered with three heuristics:
//!
//! 1. **Headings**: text drawn noticeably larger than the dominant body size
//!    becomes `#`, `##` or `###`, largest size first.
//! 2. **Bullets**: lines starting with a bullet glyph become `- ` items.
//! 3. **Hyphenation**: a word split across two lines with a trailing hyphen
//!    is rejoined when the next line continues in lower case.
//!
//! Anything else is passed through line by line; Markdown renderers fold
//! consecutive lines into one paragraph.

use crate::pipeline::extract::{PageText, TextSpan};
use std::collections::HashMap;

/// Minimum size ratio over body text for a span to count as a heading.
const HEADING_RATIO: f32 = 1.2;

/// Deepest heading level emitted.
const MAX_HEADING_LEVEL: usize = 3;

/// Longer "headings" are almost always large-print body text.
const MAX_HEADING_CHARS: usize = 120;

const BULLET_GLYPHS: &[char] = &['•', '◦', '▪', '▫', '●', '○', '‣', '∙', '■', '□', '➢', '►'];

/// Convert one extracted page to Markdown.
pub fn page_to_markdown(page: &PageText) -> String {
    structure_text(&page.text, &page.spans)
}

/// Convert raw page text to Markdown using `spans` for heading detection.
pub fn structure_text(text: &str, spans: &[TextSpan]) -> String {
    let headings = HeadingIndex::from_spans(spans);
    let normalised = text.replace("\r\n", "\n").replace('\r', "\n");

    let mut out: Vec<String> = Vec::new();
    let mut carry: Option<String> = None;

    for raw in normalised.lines() {
        let mut line = collapse_whitespace(raw);

        if let Some(prev) = carry.take() {
            if starts_lowercase(&line) {
                line = format!("{}{}", &prev[..prev.len() - 1], line);
            } else {
                out.push(escape_line_start(&prev));
            }
        }

        if line.is_empty() {
            out.push(String::new());
            continue;
        }

        if let Some(level) = headings.level_of(&line) {
            out.push(String::new());
            out.push(format!("{} {}", "#".repeat(level), line));
            out.push(String::new());
            continue;
        }

        if let Some(item) = bullet_item(&line) {
            out.push(format!("- {}", item));
            continue;
        }

        if ends_with_hyphenation(&line) {
            carry = Some(line);
            continue;
        }

        out.push(escape_line_start(&line));
    }

    if let Some(prev) = carry {
        out.push(escape_line_start(&prev));
    }

    out.join("\n")
}

// ── Headings ─────────────────────────────────────────────────────────────────

/// Font sizes are bucketed to half points; PDF producers jitter sizes by
/// fractions of a point across runs of the same style.
fn size_bucket(size: f32) -> i32 {
    (size * 2.0).round() as i32
}

/// Most common font size, weighted by character count.
pub fn body_font_size(spans: &[TextSpan]) -> Option<f32> {
    let mut weights: HashMap<i32, usize> = HashMap::new();
    for span in spans {
        if span.font_size > 0.0 {
            *weights.entry(size_bucket(span.font_size)).or_default() +=
                span.text.chars().filter(|c| !c.is_whitespace()).count();
        }
    }
    weights
        .into_iter()
        .filter(|&(_, weight)| weight > 0)
        // Ties go to the smaller size so headings never become "body".
        .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
        .map(|(bucket, _)| bucket as f32 / 2.0)
}

#[derive(Debug, Default)]
struct HeadingIndex {
    levels: HashMap<String, usize>,
}

impl HeadingIndex {
    fn from_spans(spans: &[TextSpan]) -> Self {
        let Some(body) = body_font_size(spans) else {
            return Self::default();
        };
        let threshold = size_bucket(body * HEADING_RATIO);

        let mut heading_buckets: Vec<i32> = spans
            .iter()
            .map(|s| size_bucket(s.font_size))
            .filter(|&b| b >= threshold)
            .collect();
        heading_buckets.sort_unstable_by(|a, b| b.cmp(a));
        heading_buckets.dedup();

        let level_for = |bucket: i32| -> Option<usize> {
            heading_buckets
                .iter()
                .position(|&b| b == bucket)
                .map(|i| (i + 1).min(MAX_HEADING_LEVEL))
        };

        // Consecutive spans of one size form a run: a heading drawn as
        // several text objects ("Chapter 3", "Results") is one line of text.
        let mut runs: Vec<(i32, String)> = Vec::new();
        for span in spans {
            let bucket = size_bucket(span.font_size);
            match runs.last_mut() {
                Some((b, text)) if *b == bucket => {
                    text.push(' ');
                    text.push_str(&span.text);
                }
                _ => runs.push((bucket, span.text.clone())),
            }
        }

        let mut levels = HashMap::new();
        let candidates = spans
            .iter()
            .map(|s| (size_bucket(s.font_size), s.text.as_str()))
            .chain(runs.iter().map(|(b, t)| (*b, t.as_str())));
        for (bucket, text) in candidates {
            let Some(level) = level_for(bucket) else {
                continue;
            };
            let key = collapse_whitespace(text);
            if key.chars().count() <= MAX_HEADING_CHARS && key.chars().any(char::is_alphabetic) {
                levels
                    .entry(key)
                    .and_modify(|l: &mut usize| *l = (*l).min(level))
                    .or_insert(level);
            }
        }

        Self { levels }
    }

    fn level_of(&self, line: &str) -> Option<usize> {
        self.levels.get(line).copied()
    }
}

// ── Line helpers ─────────────────────────────────────────────────────────────

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn starts_lowercase(s: &str) -> bool {
    s.chars().next().is_some_and(char::is_lowercase)
}

/// `"exam-"` yes; `"-"`, `"well --"`, `"A-"` ... only when a letter precedes the hyphen.
fn ends_with_hyphenation(line: &str) -> bool {
    let mut rev = line.chars().rev();
    rev.next() == Some('-') && rev.next().is_some_and(char::is_alphabetic)
}

/// Strip a leading bullet glyph (`•`, `▪`, `*`, `-`, …) and return the item text.
fn bullet_item(line: &str) -> Option<&str> {
    let mut chars = line.chars();
    let first = chars.next()?;
    let rest = chars.as_str();

    if BULLET_GLYPHS.contains(&first) {
        let item = rest.trim_start();
        return (!item.is_empty()).then_some(item);
    }
    if matches!(first, '-' | '*' | '–') && rest.starts_with(' ') {
        let item = rest.trim_start();
        return (!item.is_empty()).then_some(item);
    }
    None
}

/// Escape characters that would accidentally start Markdown block syntax.
fn escape_line_start(line: &str) -> String {
    if line.starts_with('#') || line.starts_with('>') {
        format!("\\{}", line)
    } else {
        line.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans(items: &[(&str, f32)]) -> Vec<TextSpan> {
        items.iter().map(|(t, s)| TextSpan::new(*t, *s)).collect()
    }

    #[test]
    fn body_size_is_weighted_mode() {
        let s = spans(&[
            ("Annual Report", 24.0),
            ("This paragraph is long enough to dominate.", 10.0),
            ("Another body line here.", 10.2),
        ]);
        assert_eq!(body_font_size(&s), Some(10.0));
        assert_eq!(body_font_size(&[]), None);
    }

    #[test]
    fn large_text_becomes_headings_by_rank() {
        let s = spans(&[
            ("Annual Report", 24.0),
            ("Revenue", 16.0),
            ("Revenue grew in every region during the year.", 10.0),
            ("Costs stayed flat compared to last year.", 10.0),
        ]);
        let text = "Annual Report\r\nRevenue\r\nRevenue grew in every region during the year.\r\nCosts stayed flat compared to last year.";
        let md = structure_text(text, &s);

        assert!(md.contains("# Annual Report\n"), "got:\n{md}");
        assert!(md.contains("## Revenue\n"), "got:\n{md}");
        assert!(md.contains("\nRevenue grew in every region"), "got:\n{md}");
        assert!(!md.contains("# Revenue grew"), "got:\n{md}");
    }

    #[test]
    fn heading_split_across_text_objects() {
        let s = spans(&[
            ("Chapter 3", 18.0),
            ("Results", 18.0),
            ("The measurements are summarised below in detail.", 11.0),
        ]);
        let md = structure_text(
            "Chapter 3 Results\nThe measurements are summarised below in detail.",
            &s,
        );
        assert!(md.contains("# Chapter 3 Results"), "got:\n{md}");
    }

    #[test]
    fn uniform_font_has_no_headings() {
        let s = spans(&[("Intro", 11.0), ("Body text that goes on.", 11.0)]);
        let md = structure_text("Intro\nBody text that goes on.", &s);
        assert_eq!(md, "Intro\nBody text that goes on.");
    }

    #[test]
    fn bullets_are_normalised() {
        let md = structure_text("• first\n▪second\n* third\n- fourth\n-5 degrees", &[]);
        assert_eq!(md, "- first\n- second\n- third\n- fourth\n-5 degrees");
    }

    #[test]
    fn hyphenated_words_are_rejoined() {
        let md = structure_text("the exam-\nple shows\nWell-\nKnown stays", &[]);
        assert_eq!(md, "the example shows\nWell-\nKnown stays");
    }

    #[test]
    fn trailing_hyphen_at_end_of_page_is_kept() {
        assert_eq!(structure_text("continued on next-", &[]), "continued on next-");
    }

    #[test]
    fn markdown_syntax_at_line_start_is_escaped() {
        let md = structure_text("#hashtag\n> not a quote", &[]);
        assert_eq!(md, "\\#hashtag\n\\> not a quote");
    }

    #[test]
    fn blank_lines_are_preserved_as_paragraph_breaks() {
        let md = structure_text("one\n\n two  words \n", &[]);
        assert_eq!(md, "one\n\ntwo words");
    }
}
