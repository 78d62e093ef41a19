//! PDF text extraction
//!
//! Extracts text content from uploaded PDF bytes using lopdf.

use tracing::{debug, warn};

use crate::errors::{AppError, Result};

/// Extract text content from PDF bytes
pub fn extract_text_from_pdf(filename: &str, bytes: &[u8]) -> Result<String> {
    let doc = lopdf::Document::load_mem(bytes).map_err(|e| AppError::InvalidUpload {
        message: format!("failed to parse {filename}: {e}"),
    })?;

    let mut text = String::new();
    for (page_no, page_id) in doc.page_iter().enumerate() {
        match doc.get_page_content(page_id) {
            Ok(content) => {
                extract_content_text(&content, &mut text);
                text.push('\n');
            }
            Err(e) => {
                warn!(page = page_no + 1, error = %e, "Skipping unreadable PDF page");
            }
        }
    }

    if text.trim().is_empty() {
        return Err(AppError::InvalidUpload {
            message: format!("no text content extracted from {filename}"),
        });
    }

    let cleaned = collapse_whitespace(&text);
    debug!(
        raw_len = text.len(),
        cleaned_len = cleaned.len(),
        "PDF text extraction complete"
    );

    Ok(cleaned)
}

/// Scan a page content stream for text-showing operators (Tj, TJ, ', ")
/// between BT/ET markers and append the decoded strings.
fn extract_content_text(content: &[u8], out: &mut String) {
    let content = String::from_utf8_lossy(content);
    let mut in_text_block = false;

    for line in content.lines() {
        let line = line.trim();
        match line {
            "BT" => in_text_block = true,
            "ET" => in_text_block = false,
            _ if in_text_block && has_text_operator(line) => {
                let before = out.len();
                decode_parenthesized(line, out);
                if out.len() > before {
                    out.push(' ');
                }
            }
            _ => {}
        }
    }
}

fn has_text_operator(line: &str) -> bool {
    line.ends_with("Tj") || line.ends_with("TJ") || line.ends_with('\'') || line.ends_with('"')
}

/// Append every `(...)` literal on the line, resolving PDF string escapes.
fn decode_parenthesized(line: &str, out: &mut String) {
    let mut chars = line.chars();
    while let Some(ch) = chars.next() {
        if ch != '(' {
            continue;
        }
        // Inside a string literal until the matching unescaped ')'
        while let Some(ch) = chars.next() {
            match ch {
                ')' => break,
                '\\' => match chars.next() {
                    Some('n') => out.push('\n'),
                    Some('r') => out.push('\r'),
                    Some('t') => out.push('\t'),
                    Some(c) => out.push(c),
                    None => break,
                },
                _ => out.push(ch),
            }
        }
    }
}

/// Collapse runs of whitespace into single spaces
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
