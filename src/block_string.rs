//! Block-string collector (C3) -- captures a triple-quoted multi-line string.
//!
//! Scans forward from the line after a `"""` header, detects the common body
//! indent from the first non-blank line, and strips it from every subsequent
//! line until a `"""` terminator at or below the header indent. Built in the
//! same forward-line-scan style as this crate's core decoder uses for
//! indent-bounded blocks (see `decoder.rs`'s block-range helpers).

use crate::error::{DecodeError, Result};

/// Collect a block string body starting at `lines[start]` (the line after the
/// `"""` header). `header_indent` is the indent of the header line itself.
///
/// Returns the joined string content and the index of the line *after* the
/// closing `"""`.
pub fn collect_block_string(
    lines: &[&str],
    start: usize,
    header_indent: usize,
    header_line_no: usize,
    header_raw: &str,
) -> Result<(String, usize)> {
    let mut body_indent: Option<usize> = None;
    let mut collected: Vec<String> = Vec::new();
    let mut i = start;

    loop {
        if i >= lines.len() {
            return Err(DecodeError::UnclosedBlockString {
                line: header_line_no,
                raw: header_raw.to_string(),
            });
        }
        let line = lines[i];
        let indent = count_indent(line);
        let trimmed_all = line.trim();

        if trimmed_all.is_empty() {
            if body_indent.is_some() {
                collected.push(String::new());
            }
            i += 1;
            continue;
        }

        if indent <= header_indent && trimmed_all == "\"\"\"" {
            return Ok((collected.join("\n"), i + 1));
        }

        let b = *body_indent.get_or_insert(indent);
        if indent >= b {
            collected.push(line[b..].to_string());
        } else {
            collected.push(line[indent..].to_string());
        }
        i += 1;
    }
}

fn count_indent(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}
