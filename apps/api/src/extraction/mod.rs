//! PDF text extraction — turns uploaded résumé bytes into clean plain text.
//!
//! Thin wrapper over the `pdf-extract` crate: the library walks the page tree
//! and decodes each text run; this module joins pages, normalizes whitespace,
//! and wraps structural failures with context instead of swallowing them.

use std::sync::OnceLock;

use regex::Regex;

use crate::errors::AppError;

/// Result of extracting a PDF: cleaned text plus the number of pages seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDocument {
    pub text: String,
    pub page_count: usize,
}

/// Extracts plain text from raw PDF bytes.
///
/// The caller has already verified media type and size. A structurally valid
/// PDF with no text runs yields an empty string, not an error — the handler
/// decides whether that is acceptable.
pub fn extract(bytes: &[u8]) -> Result<ParsedDocument, AppError> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
        .map_err(|e| AppError::Extraction(e.to_string()))?;

    let page_count = pages.len();
    // Double newline between pages, no trailing separator. The cleanup pass
    // below collapses the separator to a single space.
    let raw = pages.join("\n\n");

    Ok(ParsedDocument {
        text: clean_text(&raw),
        page_count,
    })
}

/// Normalizes extracted text: any whitespace run becomes one space, three or
/// more consecutive newlines become two, and the ends are trimmed.
fn clean_text(raw: &str) -> String {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    static NEWLINES: OnceLock<Regex> = OnceLock::new();

    let whitespace = WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("valid regex"));
    let newlines = NEWLINES.get_or_init(|| Regex::new(r"\n{3,}").expect("valid regex"));

    let collapsed = whitespace.replace_all(raw, " ");
    let collapsed = newlines.replace_all(&collapsed, "\n\n");
    collapsed.trim().to_string()
}
