//! Integration tests for the import resolver (C5): `@"path"` and `@@"path"`
//! directives, resolved through both an in-memory `FileSource` and real
//! temporary files on disk.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use indentcfg::{decode_file, decode_with_source, DecodeError, DecodeOptions, FileSource, Value};

/// An in-memory `FileSource` backed by a fixed path -> text map, so import
/// tests don't need to touch the real filesystem.
struct MemoryFileSource {
    files: HashMap<PathBuf, String>,
}

impl MemoryFileSource {
    fn new(files: &[(&str, &str)]) -> Self {
        MemoryFileSource {
            files: files.iter().map(|(p, t)| (PathBuf::from(p), t.to_string())).collect(),
        }
    }
}

impl FileSource for MemoryFileSource {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))
    }
}

fn obj(pairs: Vec<(&str, Value)>) -> Value {
    Value::Object(pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
}

fn s(t: &str) -> Value {
    Value::String(t.to_string())
}

#[test]
fn plain_import_resolves_relative_to_base_dir() {
    let source = MemoryFileSource::new(&[("/base/user.cfg", "name \"Ada\"\n")]);
    let options = DecodeOptions { base_dir: PathBuf::from("/base") };
    let v = decode_with_source("user @\"user.cfg\"\n", &options, &source).unwrap();
    assert_eq!(v, obj(vec![("user", obj(vec![("name", s("Ada"))]))]));
}

#[test]
fn import_accepts_single_quoted_and_unquoted_path_forms() {
    let source = MemoryFileSource::new(&[("/base/a.cfg", "x 1\n")]);
    let options = DecodeOptions { base_dir: PathBuf::from("/base") };
    assert_eq!(
        decode_with_source("v @'a.cfg'\n", &options, &source).unwrap(),
        obj(vec![("v", obj(vec![("x", Value::Number(1.0))]))])
    );
    assert_eq!(
        decode_with_source("v @a.cfg\n", &options, &source).unwrap(),
        obj(vec![("v", obj(vec![("x", Value::Number(1.0))]))])
    );
}

#[test]
fn import_accepts_absolute_paths_verbatim() {
    let source = MemoryFileSource::new(&[("/etc/shared.cfg", "shared true\n")]);
    let options = DecodeOptions { base_dir: PathBuf::from("/somewhere/else") };
    let v = decode_with_source("cfg @\"/etc/shared.cfg\"\n", &options, &source).unwrap();
    assert_eq!(v, obj(vec![("cfg", obj(vec![("shared", Value::Bool(true))]))]));
}

#[test]
fn nested_imports_resolve_relative_to_their_own_file() {
    let source = MemoryFileSource::new(&[
        ("/base/a.cfg", "b @\"sub/b.cfg\"\n"),
        ("/base/sub/b.cfg", "leaf 1\n"),
    ]);
    let options = DecodeOptions { base_dir: PathBuf::from("/base") };
    let v = decode_with_source("a @\"a.cfg\"\n", &options, &source).unwrap();
    assert_eq!(
        v,
        obj(vec![("a", obj(vec![("b", obj(vec![("leaf", Value::Number(1.0))]))]))])
    );
}

#[test]
fn double_at_unwraps_a_single_array_key_root() {
    let source = MemoryFileSource::new(&[("/base/list.cfg", "items [1, 2, 3]\n")]);
    let options = DecodeOptions { base_dir: PathBuf::from("/base") };
    let v = decode_with_source("nums @@\"list.cfg\"\n", &options, &source).unwrap();
    assert_eq!(
        v,
        obj(vec![(
            "nums",
            Value::Array(vec![Value::Number(1.0), Value::Number(2.0), Value::Number(3.0)])
        )])
    );
}

#[test]
fn double_at_fails_when_root_has_more_than_one_key() {
    let source = MemoryFileSource::new(&[("/base/bad.cfg", "items [1]\nother 2\n")]);
    let options = DecodeOptions { base_dir: PathBuf::from("/base") };
    let err = decode_with_source("nums @@\"bad.cfg\"\n", &options, &source).unwrap_err();
    assert!(matches!(err, DecodeError::ImportShape { .. }));
}

#[test]
fn double_at_fails_when_the_single_key_is_not_an_array() {
    let source = MemoryFileSource::new(&[("/base/bad.cfg", "items 1\n")]);
    let options = DecodeOptions { base_dir: PathBuf::from("/base") };
    let err = decode_with_source("nums @@\"bad.cfg\"\n", &options, &source).unwrap_err();
    assert!(matches!(err, DecodeError::ImportShape { .. }));
}

#[test]
fn missing_import_file_fails_with_the_import_site_position() {
    let source = MemoryFileSource::new(&[]);
    let options = DecodeOptions { base_dir: PathBuf::from("/base") };
    let err = decode_with_source("\ncfg @\"missing.cfg\"\n", &options, &source).unwrap_err();
    match err {
        DecodeError::Import { line, raw, reason } => {
            assert_eq!(line, 2);
            assert!(raw.contains("missing.cfg"));
            assert!(reason.contains("missing.cfg"));
        }
        other => panic!("expected Import error, got {other:?}"),
    }
}

#[test]
fn a_decode_failure_inside_an_imported_file_is_wrapped_with_the_import_site_position() {
    let source = MemoryFileSource::new(&[("/base/bad.cfg", "bad@key 1\n")]);
    let options = DecodeOptions { base_dir: PathBuf::from("/base") };
    let err = decode_with_source("cfg @\"bad.cfg\"\n", &options, &source).unwrap_err();
    match err {
        DecodeError::Import { line, raw, reason } => {
            assert_eq!(line, 1);
            assert!(raw.contains("bad.cfg"));
            assert!(reason.contains("invalid key"));
        }
        other => panic!("expected Import error, got {other:?}"),
    }
}

#[test]
fn a_direct_self_import_cycle_is_rejected() {
    // A file that imports itself fails to decode: the cycle is detected one
    // import-site deeper than the caller's own `decode_with_source` call, so
    // it surfaces wrapped in the outer `Import` variant, whose message chain
    // names the cycle explicitly.
    let source = MemoryFileSource::new(&[("/base/self.cfg", "me @\"self.cfg\"\n")]);
    let options = DecodeOptions { base_dir: PathBuf::from("/base") };
    let err = decode_with_source("x @\"self.cfg\"\n", &options, &source).unwrap_err();
    assert!(matches!(err, DecodeError::Import { .. }));
    assert!(err.to_string().contains("import cycle"));
}

#[test]
fn a_mutual_import_cycle_is_rejected() {
    let source = MemoryFileSource::new(&[
        ("/base/a.cfg", "b @\"b.cfg\"\n"),
        ("/base/b.cfg", "a @\"a.cfg\"\n"),
    ]);
    let options = DecodeOptions { base_dir: PathBuf::from("/base") };
    let err = decode_with_source("x @\"a.cfg\"\n", &options, &source).unwrap_err();
    assert!(matches!(err, DecodeError::Import { .. }));
    assert!(err.to_string().contains("import cycle"));
}

#[test]
fn decode_file_reads_from_the_real_filesystem_and_defaults_base_dir_to_its_parent() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("child.cfg"), "leaf 1\n").unwrap();
    std::fs::write(
        dir.path().join("main.cfg"),
        "child @\"child.cfg\"\n",
    )
    .unwrap();

    let v = decode_file(&dir.path().join("main.cfg")).unwrap();
    assert_eq!(v, obj(vec![("child", obj(vec![("leaf", Value::Number(1.0))]))]));
}

#[test]
fn decode_file_on_a_missing_file_reports_input_type_error() {
    let err = decode_file(Path::new("/does/not/exist/anywhere.cfg")).unwrap_err();
    assert!(matches!(err, DecodeError::InputType));
}
