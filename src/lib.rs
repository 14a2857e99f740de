//! # indentcfg
//!
//! Decoder and encoder for an indentation-based configuration format: significant
//! leading-space indentation instead of braces, inline and multi-line arrays,
//! triple-quoted block strings, typed scalars (numbers, booleans, `null`/`undefined`,
//! dates, strings), repeated-key merging into arrays, explicit `[]key` array
//! forcing, and `@"path"`/`@@"path"` file imports.
//!
//! ## Quick start
//!
//! ```rust
//! use indentcfg::{decode, encode, DecodeOptions, Value};
//!
//! let text = "name \"Ada\"\nage 30\nactive true\n";
//! let tree = decode(text, &DecodeOptions::default()).unwrap();
//! assert_eq!(tree.get("name"), Some(&Value::String("Ada".to_string())));
//!
//! let back = encode(&tree);
//! assert_eq!(back, "name Ada\nage 30\nactive true");
//! ```
//!
//! ## Modules
//!
//! - [`value`] — the [`Value`] tree and the [`to_plain`] date-to-string adapter
//! - [`scalar`] — the scalar classifier (C1)
//! - [`inline_array`] — the inline array lexer (C2)
//! - [`block_string`] — the triple-quoted block-string collector (C3)
//! - [`decoder`] — the line decoder state machine (C4)
//! - [`import`] — the `@`/`@@` import resolver (C5)
//! - [`encoder`] — the serializer (C6)
//! - [`error`] — the decode error type

pub mod block_string;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod import;
pub mod inline_array;
pub mod scalar;
pub mod value;

pub use decoder::{decode, decode_file, decode_with_source, DecodeOptions};
pub use encoder::encode;
pub use error::DecodeError;
pub use import::{FileSource, OsFileSource};
pub use value::{to_plain, Value};
