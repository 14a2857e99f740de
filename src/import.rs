//! Import resolver (C5) -- `@"path"` / `@@"path"` directives.
//!
//! This is the engine's only I/O site. It is expressed as a [`FileSource`]
//! trait rather than a direct `std::fs` call (per this format's design note
//! that callers should be able to substitute an in-memory file source for
//! testing), with [`OsFileSource`] as the default, filesystem-backed
//! implementation.

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};

use crate::decoder::{decode_with_visited, DecodeOptions};
use crate::error::{DecodeError, Result};
use crate::value::Value;

/// The capability the import resolver needs: read a file's contents as UTF-8
/// text. Injectable so tests can resolve imports against an in-memory map
/// instead of touching the filesystem.
pub trait FileSource {
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

/// The default [`FileSource`], backed by `std::fs`.
pub struct OsFileSource;

impl FileSource for OsFileSource {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}

/// Parse an import token (`@"path"`, `@'path'`, `@path`, or the `@@` unwrap
/// form) into `(path, unwrap)`.
fn parse_import_token(token: &str) -> (&str, bool) {
    let (rest, unwrap) = if let Some(stripped) = token.strip_prefix("@@") {
        (stripped, true)
    } else {
        (&token[1..], false)
    };
    let path = if rest.len() >= 2 {
        let bytes = rest.as_bytes();
        let first = bytes[0];
        let last = bytes[bytes.len() - 1];
        if (first == b'"' || first == b'\'') && first == last {
            &rest[1..rest.len() - 1]
        } else {
            rest
        }
    } else {
        rest
    };
    (path, unwrap)
}

/// Resolve and decode an import directive found in `token` at `line` of the
/// file being decoded (whose raw content is `raw`, for error attribution).
///
/// `base_dir` is the directory the path resolves against when relative.
/// `visited` is the set of canonicalized paths currently being decoded up
/// the import chain, threaded forward to detect cycles.
pub fn resolve_import(
    token: &str,
    line: usize,
    raw: &str,
    base_dir: &Path,
    source: &dyn FileSource,
    visited: &HashSet<PathBuf>,
) -> Result<Value> {
    let (path_str, unwrap) = parse_import_token(token);
    let resolved = resolve_path(base_dir, path_str);

    let canonical = canonicalize_best_effort(&resolved);
    if visited.contains(&canonical) {
        return Err(DecodeError::ImportCycle {
            line,
            raw: raw.to_string(),
            path: path_str.to_string(),
        });
    }

    let text = source.read_to_string(&resolved).map_err(|e| DecodeError::Import {
        line,
        raw: raw.to_string(),
        reason: format!("{path_str}: {e}"),
    })?;

    let child_base_dir = resolved
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| base_dir.to_path_buf());

    let mut child_visited = visited.clone();
    child_visited.insert(canonical);

    let options = DecodeOptions {
        base_dir: child_base_dir,
    };
    let parsed = decode_with_visited(&text, &options, source, child_visited).map_err(|e| {
        DecodeError::Import {
            line,
            raw: raw.to_string(),
            reason: format!("{path_str}: {e}"),
        }
    })?;

    if !unwrap {
        return Ok(parsed);
    }

    match &parsed {
        Value::Object(entries) if entries.len() == 1 => match &entries[0].1 {
            Value::Array(_) => Ok(entries[0].1.clone()),
            _ => Err(DecodeError::ImportShape {
                line,
                raw: raw.to_string(),
                reason: format!("{path_str}: root key's value is not an array"),
            }),
        },
        Value::Object(_) => Err(DecodeError::ImportShape {
            line,
            raw: raw.to_string(),
            reason: format!("{path_str}: root object does not have exactly one key"),
        }),
        _ => Err(DecodeError::ImportShape {
            line,
            raw: raw.to_string(),
            reason: format!("{path_str}: root is not an object"),
        }),
    }
}

fn resolve_path(base_dir: &Path, path_str: &str) -> PathBuf {
    let p = Path::new(path_str);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}

/// Canonicalize for cycle detection, falling back to the (non-canonicalized)
/// path if the file doesn't exist yet on disk (e.g. an in-memory
/// [`FileSource`] in tests) -- cycle detection still works for repeated
/// identical paths even without real canonicalization.
fn canonicalize_best_effort(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}
