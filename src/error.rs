//! Error types for decoding and encoding operations.

use thiserror::Error;

/// Errors that can occur while decoding text into a [`crate::Value`] tree.
///
/// Each variant carries the 1-based line number and raw line content of the
/// offending line where position is known (everything except
/// [`DecodeError::InputType`], which happens before any line has been read).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    /// The input bytes were not valid UTF-8.
    #[error("input must be valid UTF-8 text")]
    InputType,

    /// A key's raw head token did not match `[A-Za-z0-9_-]+`.
    #[error("{}", at_line("invalid key", *line, raw))]
    InvalidKey { line: usize, raw: String },

    /// A multi-line array was never closed, or an inline array body had
    /// unbalanced brackets.
    #[error("{}", at_line("unclosed array", *line, raw))]
    UnclosedArray { line: usize, raw: String },

    /// A stray `]` appeared inside an inline array body with nothing open.
    #[error("{}", at_line("unexpected close bracket", *line, raw))]
    UnexpectedCloseBracket { line: usize, raw: String },

    /// A quoted string inside an inline array body was never closed.
    #[error("{}", at_line("unclosed string", *line, raw))]
    UnclosedString { line: usize, raw: String },

    /// End of input was reached before a block string's closing `"""`.
    #[error("{}", at_line("unclosed block string", *line, raw))]
    UnclosedBlockString { line: usize, raw: String },

    /// A file import failed, either because the file could not be read or
    /// because its contents failed to decode. `reason` names the underlying
    /// cause and the import path; position refers to the import site in the
    /// outer (importing) file.
    #[error("{}", at_line(&format!("import error: {reason}"), *line, raw))]
    Import {
        line: usize,
        raw: String,
        reason: String,
    },

    /// `@@"path"` was used on a file whose root object was not exactly one
    /// key whose value is an array.
    #[error("{}", at_line(&format!("import shape error: {reason}"), *line, raw))]
    ImportShape {
        line: usize,
        raw: String,
        reason: String,
    },

    /// An import chain revisited a file it was already in the middle of
    /// decoding.
    #[error("{}", at_line(&format!("import cycle: {path}"), *line, raw))]
    ImportCycle {
        line: usize,
        raw: String,
        path: String,
    },
}

/// Render `"<reason> at line <N>: \"<raw>\""`, matching the user-visible
/// message format specified for this format's decoder.
fn at_line(reason: &str, line: usize, raw: &str) -> String {
    format!("{reason} at line {line}: \"{raw}\"")
}

impl DecodeError {
    /// The 1-based line number this error occurred at, if any.
    pub fn line_number(&self) -> Option<usize> {
        match self {
            DecodeError::InputType => None,
            DecodeError::InvalidKey { line, .. }
            | DecodeError::UnclosedArray { line, .. }
            | DecodeError::UnexpectedCloseBracket { line, .. }
            | DecodeError::UnclosedString { line, .. }
            | DecodeError::UnclosedBlockString { line, .. }
            | DecodeError::Import { line, .. }
            | DecodeError::ImportShape { line, .. }
            | DecodeError::ImportCycle { line, .. } => Some(*line),
        }
    }

    /// The raw offending line, if any.
    pub fn line_content(&self) -> Option<&str> {
        match self {
            DecodeError::InputType => None,
            DecodeError::InvalidKey { raw, .. }
            | DecodeError::UnclosedArray { raw, .. }
            | DecodeError::UnexpectedCloseBracket { raw, .. }
            | DecodeError::UnclosedString { raw, .. }
            | DecodeError::UnclosedBlockString { raw, .. }
            | DecodeError::Import { raw, .. }
            | DecodeError::ImportShape { raw, .. }
            | DecodeError::ImportCycle { raw, .. } => Some(raw),
        }
    }
}

/// Convenience alias used throughout this crate.
pub type Result<T> = std::result::Result<T, DecodeError>;
