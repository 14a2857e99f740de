//! Inline array lexer (C2) -- splits a bracketed array body into items.
//!
//! Recursion into nested `[...]` is expressed as bracket-matching recursive
//! descent (each `[` hands off to a nested call that consumes through its
//! own matching `]`) rather than a depth counter threaded alongside an
//! `in_string` flag -- behaviorally identical, but avoids re-entrant mutable
//! state across the string/array branches.

use crate::error::{DecodeError, Result};
use crate::value::Value;

/// Classifies a single already-trimmed item token into a [`Value`].
/// Supplied by the caller so the decoder can route import directives
/// (`@"path"`) through filesystem resolution instead of always falling
/// through to a plain scalar classification.
type Classify<'a> = dyn Fn(&str) -> Result<Value> + 'a;

/// Lex a top-level inline array body (the text between the outer `[` and `]`,
/// already stripped by the caller) into its items.
///
/// `line`/`raw` are the 1-based line number and raw line content to attribute
/// errors to.
pub fn lex_inline_array(body: &str, line: usize, raw: &str, classify: &Classify) -> Result<Vec<Value>> {
    let chars: Vec<char> = body.chars().collect();
    let mut pos = 0;
    lex_body(&chars, &mut pos, false, line, raw, classify)
}

/// Lex array items starting at `*pos`. If `expect_close` is `true`, this call
/// is parsing a nested array and must consume through its own matching `]`
/// (already past the opening `[`, which the caller consumed). If `false`,
/// this is the top-level body and runs to the end of `chars`; a bare `]`
/// encountered there is an error, not a terminator.
fn lex_body(
    chars: &[char],
    pos: &mut usize,
    expect_close: bool,
    line: usize,
    raw: &str,
    classify: &Classify,
) -> Result<Vec<Value>> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut has_content = false;

    loop {
        if *pos >= chars.len() {
            if expect_close {
                return Err(DecodeError::UnclosedArray {
                    line,
                    raw: raw.to_string(),
                });
            }
            flush(&mut items, &current, has_content, classify)?;
            return Ok(items);
        }

        match chars[*pos] {
            q @ ('"' | '\'') => {
                current.push(q);
                *pos += 1;
                loop {
                    if *pos >= chars.len() {
                        return Err(DecodeError::UnclosedString {
                            line,
                            raw: raw.to_string(),
                        });
                    }
                    let c = chars[*pos];
                    current.push(c);
                    if c == '\\' && *pos + 1 < chars.len() {
                        current.push(chars[*pos + 1]);
                        *pos += 2;
                        continue;
                    }
                    *pos += 1;
                    if c == q {
                        break;
                    }
                }
                has_content = true;
            }
            '[' => {
                *pos += 1;
                let nested = lex_body(chars, pos, true, line, raw, classify)?;
                items.push(Value::Array(nested));
                current.clear();
                has_content = false;
            }
            ']' => {
                *pos += 1;
                if expect_close {
                    flush(&mut items, &current, has_content, classify)?;
                    return Ok(items);
                }
                return Err(DecodeError::UnexpectedCloseBracket {
                    line,
                    raw: raw.to_string(),
                });
            }
            ',' => {
                flush(&mut items, &current, has_content, classify)?;
                current.clear();
                has_content = false;
                *pos += 1;
            }
            c => {
                current.push(c);
                has_content = true;
                *pos += 1;
            }
        }
    }
}

fn flush(items: &mut Vec<Value>, current: &str, has_content: bool, classify: &Classify) -> Result<()> {
    let trimmed = current.trim();
    if has_content || !trimmed.is_empty() {
        items.push(classify(trimmed)?);
    }
    Ok(())
}
