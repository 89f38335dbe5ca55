//! Input text loading and normalization.
//!
//! PDFs go through `pdf-extract`; any other file is read as UTF-8 text.
//! Quotation marks are left untouched since the segmenter depends on them.

use anyhow::{Context, Result};
use std::path::Path;

/// Characters that break segmentation or synthesis and their replacements.
const INVISIBLE_CHARS: &[(char, &str)] = &[
    ('\u{00a0}', " "), // Non-breaking space
    ('\u{2009}', " "), // Thin space
    ('\u{200b}', ""),  // Zero-width space
    ('\u{200c}', ""),  // Zero-width non-joiner
    ('\u{200d}', ""),  // Zero-width joiner
    ('\u{00ad}', ""),  // Soft hyphen
    ('\u{feff}', ""),  // BOM
];

/// Load and normalize the text of a document.
pub fn load_text(path: &Path) -> Result<String> {
    let is_pdf = path
        .extension()
        .map(|e| e.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false);

    let raw = if is_pdf {
        pdf_extract::extract_text(path)
            .map_err(|e| anyhow::anyhow!("Failed to extract text from {}: {}", path.display(), e))?
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?
    };

    let text = normalize_text(&raw);
    log::info!(
        "Loaded {} chars from {} ({} raw)",
        text.chars().count(),
        path.display(),
        raw.chars().count()
    );
    Ok(text)
}

/// Normalize extracted text.
///
/// This function:
/// - Replaces or drops invisible Unicode characters
/// - Removes control characters (except newlines and tabs)
/// - Collapses runs of spaces and tabs into one space
/// - Collapses more than two consecutive newlines
pub fn normalize_text(text: &str) -> String {
    let mut result = String::with_capacity(text.len());

    for c in text.chars() {
        let replacement = INVISIBLE_CHARS
            .iter()
            .find(|(ch, _)| *ch == c)
            .map(|(_, r)| *r);

        if let Some(r) = replacement {
            result.push_str(r);
        } else if c == '\r' {
            continue;
        } else if c == '\n' || c == '\t' || !c.is_control() {
            result.push(c);
        }
    }

    normalize_whitespace(&result)
}

fn normalize_whitespace(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut prev_was_space = false;
    let mut newline_count = 0;

    for c in text.chars() {
        if c == '\n' {
            newline_count += 1;
            prev_was_space = false;

            if newline_count <= 2 {
                // no trailing spaces before a line break
                while result.ends_with(' ') {
                    result.pop();
                }
                result.push('\n');
            }
        } else if c == ' ' || c == '\t' {
            newline_count = 0;
            if !prev_was_space {
                result.push(' ');
                prev_was_space = true;
            }
        } else {
            newline_count = 0;
            prev_was_space = false;
            result.push(c);
        }
    }

    result.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_quotes() {
        let text = "\u{201c}Hello,\u{201d} said John. \"Hi.\"";
        assert_eq!(normalize_text(text), text);
    }

    #[test]
    fn test_whitespace() {
        let text = "Hello \t  world  \n\n\n\nNew paragraph";
        assert_eq!(normalize_text(text), "Hello world\n\nNew paragraph");
    }

    #[test]
    fn test_control_and_invisible_chars() {
        let text = "Hello\x00World\x07Test\u{200b}Done\u{feff}\x0cPage\u{a0}two\r\n";
        assert_eq!(normalize_text(text), "HelloWorldTestDonePage two");
    }

    #[test]
    fn test_empty() {
        assert_eq!(normalize_text(""), "");
        assert_eq!(normalize_text(" \n\t "), "");
    }

    #[test]
    fn test_load_plain_text_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("story.txt");
        std::fs::write(&path, "  \"Run!\"   Tom shouted.\r\n").unwrap();

        assert_eq!(load_text(&path).unwrap(), "\"Run!\" Tom shouted.");
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_text(&dir.path().join("missing.txt")).unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }
}
