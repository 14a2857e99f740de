//! Line decoder (C4) -- the core state machine.
//!
//! A single forward pass over the input, but implemented as recursive
//! descent over precomputed line ranges rather than a mutable indent stack
//! of live object references: each object or array body is handed the exact
//! `[start, end)` slice of lines that belongs to it, and "popping" a stack
//! frame on dedent becomes "the sub-range ends here", computed once per
//! nesting level via [`find_block_end`].

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::block_string::collect_block_string;
use crate::error::{DecodeError, Result};
use crate::import::{self, FileSource, OsFileSource};
use crate::inline_array::lex_inline_array;
use crate::scalar::{classify_scalar, is_import};
use crate::value::Value;

/// Options controlling a [`decode`] call.
#[derive(Debug, Clone)]
pub struct DecodeOptions {
    /// The directory relative imports in the top-level document resolve
    /// against. Defaults to `.`.
    pub base_dir: PathBuf,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        DecodeOptions {
            base_dir: PathBuf::from("."),
        }
    }
}

/// Decode `text` into a [`Value`] tree, resolving any imports against
/// `options.base_dir` on the real filesystem.
pub fn decode(text: &str, options: &DecodeOptions) -> Result<Value> {
    decode_with_source(text, options, &OsFileSource)
}

/// Decode `text` using a caller-supplied [`FileSource`] for import
/// resolution, e.g. an in-memory file map in tests.
pub fn decode_with_source(text: &str, options: &DecodeOptions, source: &dyn FileSource) -> Result<Value> {
    decode_with_visited(text, options, source, HashSet::new())
}

/// Read and decode the file at `path`, defaulting `base_dir` to the file's
/// parent directory.
pub fn decode_file(path: &Path) -> Result<Value> {
    let text = std::fs::read_to_string(path).map_err(|_| DecodeError::InputType)?;
    let base_dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    decode(&text, &DecodeOptions { base_dir })
}

/// Entry point shared by [`decode_with_source`] and the import resolver,
/// threading a visited-path set forward so recursive imports can detect
/// cycles.
pub(crate) fn decode_with_visited(
    text: &str,
    options: &DecodeOptions,
    source: &dyn FileSource,
    visited: HashSet<PathBuf>,
) -> Result<Value> {
    let lines = split_lines(text);
    let ctx = Ctx {
        base_dir: &options.base_dir,
        source,
        visited: &visited,
    };
    parse_root(&lines, &ctx)
}

/// Context threaded through the recursive decode -- everything needed to
/// resolve an import if one is encountered.
struct Ctx<'a> {
    base_dir: &'a Path,
    source: &'a dyn FileSource,
    visited: &'a HashSet<PathBuf>,
}

/// Split `text` into lines on `\n` without stripping a trailing `\r` (this
/// implementation treats `\r` as content). Deliberately does not use
/// `str::lines`, which strips `\r\n` line endings.
fn split_lines(text: &str) -> Vec<&str> {
    text.trim_end_matches('\n').split('\n').collect()
}

fn count_indent(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

/// A line is skipped if it has no non-space characters, or its first
/// non-space character is `#` followed by end-of-line or a space.
fn is_blank_or_comment(line: &str) -> bool {
    let trimmed = line.trim_start_matches(' ');
    if trimmed.is_empty() {
        return true;
    }
    let bytes = trimmed.as_bytes();
    bytes[0] == b'#' && (bytes.len() == 1 || bytes[1] == b' ')
}

fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Decode the whole document as the root object: its "expected indent" is
/// auto-detected from the first non-skipped line, exactly like any nested
/// object.
fn parse_root(lines: &[&str], ctx: &Ctx) -> Result<Value> {
    let mut j = 0;
    while j < lines.len() && is_blank_or_comment(lines[j]) {
        j += 1;
    }
    if j >= lines.len() {
        return Ok(Value::Object(Vec::new()));
    }
    let indent = count_indent(lines[j]);
    parse_object_from_lines(lines, indent, j, lines.len(), ctx)
}

/// Parse all keys at `expected_indent` within `[start, end)` into an object.
fn parse_object_from_lines(
    lines: &[&str],
    expected_indent: usize,
    start: usize,
    end: usize,
    ctx: &Ctx,
) -> Result<Value> {
    let mut obj: Vec<(String, Value)> = Vec::new();
    let mut i = start;

    while i < end {
        if is_blank_or_comment(lines[i]) {
            i += 1;
            continue;
        }
        let indent = count_indent(lines[i]);
        if indent < expected_indent {
            break;
        }
        if indent > expected_indent {
            // Content belonging to a previous key that wasn't fully
            // consumed -- shouldn't happen given correctly computed ranges.
            i += 1;
            continue;
        }

        let line_no = i + 1;
        let raw = lines[i];
        let (force_array, key, rest) = extract_key(raw, indent, line_no)?;
        let (value, next_i) = parse_value(lines, rest, indent, i, line_no, raw, ctx)?;
        attach(&mut obj, key, value, force_array);
        i = next_i;
    }

    Ok(Value::Object(obj))
}

/// Split a key line into `(force_array, key, rest_after_key_and_spaces)`.
fn extract_key<'a>(raw: &'a str, indent: usize, line_no: usize) -> Result<(bool, String, &'a str)> {
    let after_indent = &raw[indent..];
    let head_end = after_indent.find(' ').unwrap_or(after_indent.len());
    let head = &after_indent[..head_end];
    let rest = after_indent[head_end..].trim_start_matches(' ');

    let (force_array, key_candidate) = match head.strip_prefix("[]") {
        Some(k) => (true, k),
        None => (false, head),
    };

    if key_candidate.is_empty() || !key_candidate.chars().all(is_key_char) {
        return Err(DecodeError::InvalidKey {
            line: line_no,
            raw: raw.to_string(),
        });
    }

    Ok((force_array, key_candidate.to_string(), rest))
}

/// Dispatch a key's value based on the first character after the key.
/// Returns the value and the index of the next unconsumed line.
fn parse_value<'a>(
    lines: &[&'a str],
    value_str: &'a str,
    key_indent: usize,
    i: usize,
    line_no: usize,
    raw: &str,
    ctx: &Ctx,
) -> Result<(Value, usize)> {
    if value_str.is_empty() {
        return parse_nested_or_empty_object(lines, key_indent, i + 1, ctx);
    }

    if value_str.starts_with('[') {
        if let Some(close_idx) = find_matching_close(value_str) {
            let body = value_str[1..close_idx].trim();
            let items = if body.is_empty() {
                Vec::new()
            } else {
                classify_inline_items(body, line_no, raw, ctx)?
            };
            return Ok((Value::Array(items), i + 1));
        }
        let (arr, next) = parse_multiline_array(lines, key_indent, i + 1, line_no, raw, ctx)?;
        return Ok((arr, next));
    }

    if value_str.starts_with("\"\"\"") {
        let (s, next) = collect_block_string(lines, i + 1, key_indent, line_no, raw)?;
        return Ok((Value::String(s), next));
    }

    let token = value_str.trim();
    let value = classify_token(token, line_no, raw, ctx)?;
    Ok((value, i + 1))
}

/// Resolve the child object for a key whose value ended the line: either an
/// empty object, or (if the next content line is indented deeper than the
/// key) a nested object spanning however deep that block goes.
fn parse_nested_or_empty_object(
    lines: &[&str],
    key_indent: usize,
    start: usize,
    ctx: &Ctx,
) -> Result<(Value, usize)> {
    let mut j = start;
    while j < lines.len() && is_blank_or_comment(lines[j]) {
        j += 1;
    }
    if j < lines.len() {
        let child_indent = count_indent(lines[j]);
        if child_indent > key_indent {
            let end = find_block_end(lines, j, key_indent + 1);
            let obj = parse_object_from_lines(lines, child_indent, j, end, ctx)?;
            return Ok((obj, end));
        }
    }
    Ok((Value::Object(Vec::new()), start))
}

/// Scan forward from `start`, skipping blank/comment lines, until a
/// non-skipped line's indent drops below `min_indent`. Returns that line's
/// index (or `lines.len()` at EOF).
fn find_block_end(lines: &[&str], start: usize, min_indent: usize) -> usize {
    let mut i = start;
    while i < lines.len() {
        if is_blank_or_comment(lines[i]) {
            i += 1;
            continue;
        }
        if count_indent(lines[i]) < min_indent {
            break;
        }
        i += 1;
    }
    i
}

/// Find the byte index (within `s`) of the `]` matching the `[` at `s[0]`,
/// tracking nested brackets and quoted strings so commas/brackets inside a
/// quoted item don't confuse the scan.
fn find_matching_close(s: &str) -> Option<usize> {
    let mut depth = 0i32;
    let mut in_string: Option<char> = None;
    let mut chars = s.char_indices();
    while let Some((idx, c)) = chars.next() {
        if let Some(q) = in_string {
            if c == '\\' {
                chars.next();
            } else if c == q {
                in_string = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => in_string = Some(c),
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}

/// Classify a scalar token, resolving it as an import if it begins with `@`.
fn classify_token(token: &str, line_no: usize, raw: &str, ctx: &Ctx) -> Result<Value> {
    if is_import(token) {
        import::resolve_import(token, line_no, raw, ctx.base_dir, ctx.source, ctx.visited)
    } else {
        Ok(classify_scalar(token))
    }
}

/// Lex an inline array body and classify each item, resolving imports
/// through `ctx` the same way a top-level scalar would.
fn classify_inline_items(body: &str, line_no: usize, raw: &str, ctx: &Ctx) -> Result<Vec<Value>> {
    lex_inline_array(body, line_no, raw, &|token| classify_token(token, line_no, raw, ctx))
}

/// Parse a multi-line array body starting at `start` (the line after the
/// key line, which ended in `[` with no closing bracket). `array_indent` is
/// the key line's own indent.
fn parse_multiline_array(
    lines: &[&str],
    array_indent: usize,
    start: usize,
    header_line_no: usize,
    header_raw: &str,
    ctx: &Ctx,
) -> Result<(Value, usize)> {
    let mut items = Vec::new();
    let mut i = start;

    loop {
        if i >= lines.len() {
            return Err(DecodeError::UnclosedArray {
                line: header_line_no,
                raw: header_raw.to_string(),
            });
        }
        let line = lines[i];
        if is_blank_or_comment(line) {
            i += 1;
            continue;
        }
        let indent = count_indent(line);
        let content = &line[indent..];

        if indent <= array_indent {
            if content.starts_with(']') {
                return Ok((Value::Array(items), i + 1));
            }
            return Err(DecodeError::UnclosedArray {
                line: header_line_no,
                raw: header_raw.to_string(),
            });
        }

        let item_line_no = i + 1;
        let trimmed = content.trim();
        if trimmed == "\"\"\"" {
            let (s, next) = collect_block_string(lines, i + 1, indent, item_line_no, line)?;
            items.push(Value::String(s));
            i = next;
            continue;
        }

        let token = strip_trailing_comma(trimmed);
        items.push(classify_token(token, item_line_no, line, ctx)?);
        i += 1;
    }
}

fn strip_trailing_comma(s: &str) -> &str {
    s.strip_suffix(',').unwrap_or(s)
}

/// Attach `(key, value)` to `obj`, applying the repeated-key merge rule: the
/// first occurrence is stored as-is (or wrapped in a singleton array if
/// `force_array` is set); every later occurrence of the same key appends to
/// (or promotes into) an array, regardless of whether that later occurrence
/// itself carried `[]`.
fn attach(obj: &mut Vec<(String, Value)>, key: String, value: Value, force_array: bool) {
    if let Some(entry) = obj.iter_mut().find(|(k, _)| *k == key) {
        match &mut entry.1 {
            Value::Array(arr) => arr.push(value),
            other => {
                let existing = std::mem::replace(other, Value::Null);
                *other = Value::Array(vec![existing, value]);
            }
        }
        return;
    }
    let stored = if force_array { Value::Array(vec![value]) } else { value };
    obj.push((key, stored));
}
