//! Serializer (C6) -- walks a [`Value`] tree back into text.
//!
//! Mirrors the decoder's own choices in reverse: a field whose array value
//! is all plain objects is re-expanded into a repeated-key block instead of
//! any bracketed array syntax, a singleton non-object array collapses to
//! the `[]key` force-array form, and any scalar containing a newline is
//! emitted as a triple-quoted block rather than an escaped one-liner.

use chrono::SecondsFormat;

use crate::scalar::{is_date_shaped, is_number_shaped};
use crate::value::Value;

/// Encode `value` into its textual form. Returns empty text for `Null` or
/// `Undefined`, a single encoded scalar for any other non-object/non-array
/// value, and the full multi-line rendering otherwise.
pub fn encode(value: &Value) -> String {
    let mut out = String::new();
    match value {
        Value::Null | Value::Undefined => {}
        Value::Object(entries) => encode_object_fields(entries, 0, &mut out),
        Value::Array(items) => encode_root_array(items, &mut out),
        scalar => out.push_str(&encode_scalar(scalar)),
    }
    out
}

/// A root-level array has no key to attach to and is not itself
/// re-decodable through the normal key/value grammar (the decoder's root is
/// always an object) -- this exists only so [`encode`] is total. Plain
/// object elements flatten their fields directly, as if each were its own
/// top-level document; any other element renders using the same rules an
/// array field's body would use.
fn encode_root_array(items: &[Value], out: &mut String) {
    for item in items {
        match item {
            Value::Object(fields) => encode_object_fields(fields, 0, out),
            Value::Array(nested) if is_inline_eligible(nested) => {
                push_line(out, 0, &encode_inline_array(nested));
            }
            Value::Array(nested) => {
                push_line(out, 0, "[");
                encode_multiline_array_items(nested, 2, out);
                push_line(out, 0, "]");
            }
            Value::String(s) if s.contains('\n') => encode_block_string(s, 0, out),
            scalar => push_line(out, 0, &encode_scalar(scalar)),
        }
    }
}

fn encode_object_fields(entries: &[(String, Value)], indent: usize, out: &mut String) {
    for (key, value) in entries {
        encode_field(key, value, indent, out);
    }
}

fn encode_field(key: &str, value: &Value, indent: usize, out: &mut String) {
    if value.is_array_of_plain_objects() {
        let Value::Array(items) = value else { unreachable!() };
        for item in items {
            push_line(out, indent, key);
            if let Value::Object(fields) = item {
                encode_object_fields(fields, indent + 2, out);
            }
        }
        return;
    }

    match value {
        Value::Array(items) if items.len() == 1 && is_singleton_shorthand_eligible(&items[0]) => {
            push_line(out, indent, &format!("[]{key} {}", encode_scalar(&items[0])));
        }
        Value::Array(items) => encode_array_field(key, items, indent, out),
        Value::Object(fields) if fields.is_empty() => push_line(out, indent, key),
        Value::Object(fields) => {
            push_line(out, indent, key);
            encode_object_fields(fields, indent + 2, out);
        }
        Value::String(s) if s.contains('\n') => {
            push_line(out, indent, &format!("{key} \"\"\""));
            encode_block_body(s, indent + 2, out);
            push_line(out, indent, "\"\"\"");
        }
        scalar => push_line(out, indent, &format!("{key} {}", encode_scalar(scalar))),
    }
}

/// `true` for any value that can stand alone on the `[]key ` line -- i.e.
/// everything the singleton-array shorthand is defined for except a plain
/// object (which has no same-line rendering) and a multi-line string
/// (which needs the block-string form and so falls back to the general
/// array encoding instead).
fn is_singleton_shorthand_eligible(v: &Value) -> bool {
    !matches!(v, Value::Object(_)) && !matches!(v, Value::String(s) if s.contains('\n'))
}

fn encode_array_field(key: &str, items: &[Value], indent: usize, out: &mut String) {
    if items.is_empty() {
        push_line(out, indent, &format!("{key} []"));
        return;
    }
    if is_inline_eligible(items) {
        push_line(out, indent, &format!("{key} {}", encode_inline_array(items)));
        return;
    }
    push_line(out, indent, &format!("{key} ["));
    encode_multiline_array_items(items, indent + 2, out);
    push_line(out, indent, "]");
}

/// Inline layout is chosen when the array has at most three elements, none
/// of which is an object, and none of which is a string containing a
/// newline (those can't fit on one line at all).
fn is_inline_eligible(items: &[Value]) -> bool {
    items.len() <= 3
        && !items.iter().any(|v| matches!(v, Value::Object(_)))
        && !items.iter().any(|v| matches!(v, Value::String(s) if s.contains('\n')))
}

/// Render `items` as a single bracketed line. Nested arrays always recurse
/// inline here -- once inside single-line notation there is no way to break
/// out into indented sub-lines, so a nested array's own length/content is
/// irrelevant to this rendering.
fn encode_inline_array(items: &[Value]) -> String {
    let mut s = String::from("[");
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            s.push_str(", ");
        }
        s.push_str(&encode_scalar(item));
    }
    s.push(']');
    s
}

/// Render each element of a multi-line array body on its own indented
/// line. A nested array re-applies the inline/multi-line choice
/// independently; a multi-line string becomes its own block-string item.
fn encode_multiline_array_items(items: &[Value], indent: usize, out: &mut String) {
    for item in items {
        match item {
            Value::Array(nested) if is_inline_eligible(nested) => {
                push_line(out, indent, &encode_inline_array(nested));
            }
            Value::Array(nested) => {
                push_line(out, indent, "[");
                encode_multiline_array_items(nested, indent + 2, out);
                push_line(out, indent, "]");
            }
            Value::String(s) if s.contains('\n') => encode_block_string(s, indent, out),
            Value::Object(fields) => {
                // The decoder's own array-item grammar never parses a nested
                // object (uniform object arrays always arrive through the
                // repeated-key mechanism instead), so this only fires for a
                // tree an `encode` caller assembled by hand. Best-effort:
                // flatten the object's fields in place; the result does not
                // round-trip, since there is no bracket-array syntax for it.
                encode_object_fields(fields, indent, out);
            }
            scalar => push_line(out, indent, &encode_scalar(scalar)),
        }
    }
}

fn encode_block_string(s: &str, indent: usize, out: &mut String) {
    push_line(out, indent, "\"\"\"");
    encode_block_body(s, indent + 2, out);
    push_line(out, indent, "\"\"\"");
}

fn encode_block_body(s: &str, indent: usize, out: &mut String) {
    for content_line in s.split('\n') {
        push_line(out, indent, content_line);
    }
}

fn push_line(out: &mut String, indent: usize, content: &str) {
    if !out.is_empty() {
        out.push('\n');
    }
    for _ in 0..indent {
        out.push(' ');
    }
    out.push_str(content);
}

/// Encode a single scalar for a same-line slot: an object field's direct
/// value, an inline-array element, a multi-line-array element, or a
/// singleton-shorthand item. Nested arrays recurse through
/// [`encode_inline_array`], since every same-line slot is, by definition,
/// a single line.
fn encode_scalar(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Undefined => "undefined".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => format_number(*n),
        Value::Date(d) => d.to_rfc3339_opts(SecondsFormat::Millis, true),
        Value::String(s) => encode_string_scalar(s),
        Value::Array(items) => encode_inline_array(items),
        Value::Object(_) => String::new(),
    }
}

/// No exponents, no trailing fractional zeros, `-0` normalizes to `0`.
/// Whole-valued floats render without a decimal point.
fn format_number(n: f64) -> String {
    if n == 0.0 {
        return "0".to_string();
    }
    if n.fract() == 0.0 && n.abs() < 1e15 {
        return format!("{}", n as i64);
    }
    format!("{n}")
}

fn encode_string_scalar(s: &str) -> String {
    if needs_quoting(s) {
        encode_quoted_string(s)
    } else {
        s.to_string()
    }
}

fn encode_quoted_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

/// Quote when the token would otherwise be misclassified on decode: it has
/// the keyword/number/date shape, contains whitespace (internal -- §4.7
/// calls for quoting on space/tab specifically -- or leading/trailing, which
/// `value_str.trim()`/an array item's own trim would otherwise eat on
/// decode), is empty, contains a quote or backslash (which would be
/// swallowed or misread by `unwrap_quotes`/`unescape` on a later re-decode of
/// a copy-pasted value), or (beyond the literal scalar-encoding rule) would
/// collide with this format's structural syntax -- a leading `[`, a leading
/// `@` (import directive), a leading `"""` (block-string header), or an
/// internal comma (the inline/multi-line array item delimiter). Those last
/// four are not called out by name as quoting triggers anywhere a one-line
/// summary of this rule was written down, but skipping them would make
/// `encode` produce text that decodes to a different tree than it started
/// from.
fn needs_quoting(s: &str) -> bool {
    if s.is_empty() {
        return true;
    }
    if s.contains(' ') || s.contains('\t') || s != s.trim() {
        return true;
    }
    if s.contains('"') || s.contains('\\') {
        return true;
    }
    if is_number_shaped(s) {
        return true;
    }
    if matches!(s, "true" | "false" | "null" | "undefined") {
        return true;
    }
    if is_date_shaped(s) {
        return true;
    }
    if s.starts_with('[') || s.starts_with('@') || s.starts_with("\"\"\"") {
        return true;
    }
    if s.contains(',') {
        return true;
    }
    false
}
