//! Scalar classifier (C1) -- maps an already-trimmed token to a typed [`Value`].
//!
//! Classification order is strict: null/undefined/bool keywords, then import
//! directives, then number-shaped tokens, then date-shaped tokens, then
//! quoted strings, falling through to a plain unquoted string. Each shape
//! check is hand-rolled over bytes/chars rather than via a regex crate,
//! matching how this crate family's existing decoder classifies tokens.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

use crate::value::Value;

/// The result of classifying a token that is not an import directive.
/// Import directives need filesystem access and are handled by
/// [`crate::import`], one level up from this module.
pub fn classify_scalar(token: &str) -> Value {
    if token == "null" {
        return Value::Null;
    }
    if token == "undefined" {
        return Value::Undefined;
    }
    if token == "true" {
        return Value::Bool(true);
    }
    if token == "false" {
        return Value::Bool(false);
    }
    if is_number_shaped(token) {
        if let Ok(n) = token.parse::<f64>() {
            if n.is_finite() {
                return Value::Number(n);
            }
        }
    }
    if is_date_shaped(token) {
        if let Some(instant) = parse_date(token) {
            return Value::Date(instant);
        }
    }
    if let Some(unwrapped) = unwrap_quotes(token) {
        return Value::String(unescape(unwrapped));
    }
    Value::String(token.to_string())
}

/// `true` if `token` begins with `@`, i.e. it is an import directive rather
/// than a plain scalar. Callers that can resolve imports should check this
/// before calling [`classify_scalar`].
pub fn is_import(token: &str) -> bool {
    token.starts_with('@')
}

/// `[+-]?digits(.digits)?([eE][+-]?digits)?`, checked without attempting the
/// actual float parse (so "05" is number-shaped but parsed separately from
/// whether it is actually finite). Also reused by the encoder's quoting
/// decision: a plain string this shaped would otherwise round-trip back as a
/// `Number`.
pub(crate) fn is_number_shaped(s: &str) -> bool {
    let bytes = s.as_bytes();
    if bytes.is_empty() {
        return false;
    }
    let mut i = 0;
    if bytes[0] == b'+' || bytes[0] == b'-' {
        i += 1;
    }
    if i >= bytes.len() {
        return false;
    }
    let mut saw_digit = false;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
        saw_digit = true;
    }
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
            saw_digit = true;
        }
    }
    if !saw_digit {
        return false;
    }
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        i += 1;
        if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
            i += 1;
        }
        let mut saw_exp_digit = false;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
            saw_exp_digit = true;
        }
        if !saw_exp_digit {
            return false;
        }
    }
    i == bytes.len()
}

/// Length >= 10, first char a digit, positions 4 and 7 are `-`: the shape
/// check that gates attempting a real date parse. Also reused by the
/// encoder's quoting decision (a plain string this shaped would otherwise
/// round-trip back as a `Date`).
pub(crate) fn is_date_shaped(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() >= 10
        && bytes[0].is_ascii_digit()
        && bytes[1].is_ascii_digit()
        && bytes[2].is_ascii_digit()
        && bytes[3].is_ascii_digit()
        && bytes[4] == b'-'
        && bytes[5].is_ascii_digit()
        && bytes[6].is_ascii_digit()
        && bytes[7] == b'-'
        && bytes[8].is_ascii_digit()
        && bytes[9].is_ascii_digit()
}

/// Parse `YYYY-MM-DD` optionally followed by `[T ]HH:MM(:SS(.fff)?)?(Z|±HH:MM)?`.
///
/// A bare date with no time component is interpreted as midnight UTC. A
/// date+time with no offset and no `Z` is interpreted as UTC -- this
/// implementation's resolution of an ambiguity the distilled spec leaves open
/// (see SPEC_FULL.md §4.2).
fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(&s[..10], "%Y-%m-%d").ok()?;
    if s.len() == 10 {
        return Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?));
    }

    let rest = &s[10..];
    let mut chars = rest.chars();
    match chars.next() {
        Some('T') | Some(' ') => {}
        _ => return None,
    }
    let body = &rest[1..];
    let (time_part, offset_part) = split_offset(body);

    let naive_time = ["%H:%M:%S%.f", "%H:%M:%S", "%H:%M"]
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(time_part, fmt).ok())?;
    let naive_dt = NaiveDateTime::new(date, naive_time);
    apply_offset(naive_dt, offset_part)
}

/// Split a time-plus-offset suffix into `(time, offset)`. `offset` is `None`
/// when there is no trailing `Z`/`±HH:MM`.
fn split_offset(s: &str) -> (&str, Option<&str>) {
    if let Some(stripped) = s.strip_suffix('Z') {
        return (stripped, Some("Z"));
    }
    if s.len() >= 6 {
        let idx = s.len() - 6;
        let candidate = &s[idx..];
        let bytes = candidate.as_bytes();
        if (bytes[0] == b'+' || bytes[0] == b'-')
            && bytes[1].is_ascii_digit()
            && bytes[2].is_ascii_digit()
            && bytes[3] == b':'
            && bytes[4].is_ascii_digit()
            && bytes[5].is_ascii_digit()
        {
            return (&s[..idx], Some(candidate));
        }
    }
    (s, None)
}

fn apply_offset(naive: NaiveDateTime, offset: Option<&str>) -> Option<DateTime<Utc>> {
    match offset {
        None | Some("Z") => Some(Utc.from_utc_datetime(&naive)),
        Some(off) => {
            let sign = if off.starts_with('-') { -1i64 } else { 1i64 };
            let hh: i64 = off[1..3].parse().ok()?;
            let mm: i64 = off[4..6].parse().ok()?;
            let offset_minutes = sign * (hh * 60 + mm);
            let utc_naive = naive - Duration::minutes(offset_minutes);
            Some(Utc.from_utc_datetime(&utc_naive))
        }
    }
}

/// If `s` is wrapped in a matching pair of `"` or `'`, return the inner slice.
fn unwrap_quotes(s: &str) -> Option<&str> {
    let bytes = s.as_bytes();
    if bytes.len() < 2 {
        return None;
    }
    let first = bytes[0];
    let last = bytes[bytes.len() - 1];
    if (first == b'"' || first == b'\'') && first == last {
        Some(&s[1..s.len() - 1])
    } else {
        None
    }
}

/// Decode `\n \r \t \" \' \\`; any other `\x` decodes to `x` literally.
pub fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('"') => out.push('"'),
            Some('\'') => out.push('\''),
            Some('\\') => out.push('\\'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
