//! Post-processing: deterministic cleanup of extracted Markdown.
//!
//! Both extraction paths produce text with artefacts that have nothing to do
//! with the document's content: CRLF line endings from pdfium, form feeds and
//! soft hyphens from the text layer, stray specks that tesseract reads as
//! `.` or `'`, and runs of blank lines where layout whitespace used to be.
//! Each rule below is a pure `&str → String` pass and is tested on its own.
//!
//! ## Rule Order
//!
//! Line endings are normalised first so every later rule can split on `\n`;
//! heading spacing runs before blank-line collapsing because it inserts blank
//! lines of its own.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply the post-processing rules to a page of text-layer Markdown.
///
/// Rules (applied in order):
/// 1. Normalise line endings (CRLF / CR → LF)
/// 2. Strip invisible Unicode and control characters (ZWSP, BOM, soft hyphen, form feed)
/// 3. Trim trailing whitespace per line
/// 5. Ensure headings are surrounded by blank lines
/// 6. Collapse 2+ consecutive blank lines down to 1
/// 7. Ensure the text ends with exactly one newline
///
/// Rule 4 is OCR-only: short symbol lines such as a `$` or `§` table cell
/// are real content in a text layer.
pub fn clean_markdown(input: &str) -> String {
    clean(input, false)
}

/// Apply all post-processing rules to a page of OCR output, including
/// rule 4 (drop noise lines of one or two characters with no letters or digits).
pub fn clean_ocr_markdown(input: &str) -> String {
    clean(input, true)
}

fn clean(input: &str, drop_noise: bool) -> String {
    let s = normalise_line_endings(input);
    let s = remove_invisible_chars(&s);
    let s = trim_trailing_whitespace(&s);
    let s = if drop_noise { drop_noise_lines(&s) } else { s };
    let s = normalise_heading_spacing(&s);
    let s = collapse_blank_lines(&s);
    ensure_final_newline(&s)
}

// ── Rule 1: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 2: Remove invisible characters ──────────────────────────────────────

fn remove_invisible_chars(input: &str) -> String {
    input
        .chars()
        .filter(|&c| {
            !matches!(
                c,
                '\u{200B}' | '\u{FEFF}' | '\u{00AD}' | '\u{200C}' | '\u{200D}' | '\u{2060}'
            ) && (!c.is_control() || c == '\n' || c == '\t')
        })
        .collect()
}

// ── Rule 3: Trim trailing whitespace per line ────────────────────────────────

fn trim_trailing_whitespace(input: &str) -> String {
    input
        .lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Rule 4: Drop OCR noise lines ─────────────────────────────────────────────

fn drop_noise_lines(input: &str) -> String {
    input
        .lines()
        .filter(|line| !is_noise_line(line))
        .collect::<Vec<_>>()
        .join("\n")
}

fn is_noise_line(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty()
        && trimmed.chars().count() <= 2
        && !trimmed.chars().any(char::is_alphanumeric)
}

// ── Rule 5: Heading spacing ──────────────────────────────────────────────────

static RE_HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#{1,6} \S").unwrap());

fn normalise_heading_spacing(input: &str) -> String {
    let lines: Vec<&str> = input.lines().collect();
    let mut result: Vec<&str> = Vec::with_capacity(lines.len() + 8);

    for (i, line) in lines.iter().enumerate() {
        let is_heading = RE_HEADING.is_match(line);
        if is_heading && result.last().is_some_and(|prev| !prev.is_empty()) {
            result.push("");
        }
        result.push(line);
        if is_heading && lines.get(i + 1).is_some_and(|next| !next.is_empty()) {
            result.push("");
        }
    }

    result.join("\n")
}

// ── Rule 6: Collapse excessive blank lines ───────────────────────────────────

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_LINES.replace_all(input, "\n\n").to_string()
}

// ── Rule 7: Ensure text ends with single newline ─────────────────────────────

fn ensure_final_newline(input: &str) -> String {
    let trimmed = input.trim_matches('\n').trim_end();
    if trimmed.is_empty() {
        String::from("\n")
    } else {
        format!("{}\n", trimmed)
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
