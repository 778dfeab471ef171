// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Fixture discovery and loading.

use crate::error::{Result, SeedError};
use crate::models::{Fixture, KeyPolicy, NAME_FIELD};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

const FIXTURE_EXTENSION: &str = "json";

/// Firestore's document ID limit.
const MAX_KEY_BYTES: usize = 1500;

/// List `*.json` files directly inside `dir`, sorted by file name.
pub fn list_fixture_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let io_err = |source: std::io::Error| SeedError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(FIXTURE_EXTENSION));
        if is_json && path.is_file() {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// Load every fixture in `dir`, deriving keys with `policy`.
///
/// Fails on the first unreadable or malformed file, and when two fixtures
/// derive the same key.
pub fn load_fixtures<P: AsRef<Path>>(dir: P, policy: KeyPolicy) -> Result<Vec<Fixture>> {
    let dir = dir.as_ref();
    let files = list_fixture_files(dir)?;

    let mut seen = HashSet::with_capacity(files.len());
    let mut fixtures = Vec::with_capacity(files.len());
    for path in files {
        let fixture = load_fixture(&path, policy)?;
        if !seen.insert(fixture.key.clone()) {
            return Err(SeedError::Fixture(format!(
                "duplicate key `{}` in {}",
                fixture.key,
                dir.display()
            )));
        }
        fixtures.push(fixture);
    }

    tracing::debug!(dir = %dir.display(), count = fixtures.len(), %policy, "Loaded fixtures");
    Ok(fixtures)
}

/// Load a single fixture file.
pub fn load_fixture(path: &Path, policy: KeyPolicy) -> Result<Fixture> {
    let raw = fs::read_to_string(path).map_err(|source| SeedError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value = serde_json::from_str(&raw).map_err(|source| SeedError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let Value::Object(body) = value else {
        return Err(SeedError::Fixture(format!(
            "{} does not contain a JSON object",
            path.display()
        )));
    };

    let (key, body) = derive_key(path, body, policy)?;
    Ok(Fixture {
        key,
        source: path.to_path_buf(),
        body,
    })
}

/// Derive the document key and the body to store.
pub fn derive_key(
    path: &Path,
    mut body: Map<String, Value>,
    policy: KeyPolicy,
) -> Result<(String, Map<String, Value>)> {
    if body.contains_key("_id") {
        return Err(SeedError::Fixture(format!(
            "{} carries a reserved `_id` field",
            path.display()
        )));
    }

    let key = match policy {
        KeyPolicy::FileName => path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .map(str::to_string)
            .ok_or_else(|| {
                SeedError::Fixture(format!("{} has no usable file name", path.display()))
            })?,
        KeyPolicy::NameField => match body.remove(NAME_FIELD) {
            Some(Value::String(name)) => name,
            Some(_) => {
                return Err(SeedError::Fixture(format!(
                    "{}: `{}` must be a string",
                    path.display(),
                    NAME_FIELD
                )))
            }
            None => {
                return Err(SeedError::Fixture(format!(
                    "{}: missing `{}` field",
                    path.display(),
                    NAME_FIELD
                )))
            }
        },
    };

    validate_key(&key).map_err(|reason| {
        SeedError::Fixture(format!("{}: invalid key `{}`: {}", path.display(), key, reason))
    })?;
    Ok((key, body))
}

/// Keys must be usable as both a MongoDB `_id` and a Firestore document ID.
fn validate_key(key: &str) -> std::result::Result<(), &'static str> {
    if key.trim().is_empty() {
        return Err("empty");
    }
    if key.contains('/') {
        return Err("contains `/`");
    }
    if key == "." || key == ".." {
        return Err("reserved path segment");
    }
    if key.len() >= 4 && key.starts_with("__") && key.ends_with("__") {
        return Err("`__...__` IDs are reserved by Firestore");
    }
    if key.len() > MAX_KEY_BYTES {
        return Err("longer than 1500 bytes");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn write(dir: &Path, name: &str, contents: &str) {
        fs::write(dir.join(name), contents).unwrap();
    }

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_filename_policy_keeps_body() {
        let (key, body) = derive_key(
            Path::new("config/companies/widgetco.json"),
            object(json!({"name": "Widget Co", "size": "large"})),
            KeyPolicy::FileName,
        )
        .unwrap();

        assert_eq!(key, "widgetco");
        assert_eq!(Value::Object(body), json!({"name": "Widget Co", "size": "large"}));
    }

    #[test]
    fn test_name_field_policy_removes_name() {
        let (key, body) = derive_key(
            Path::new("config/companies/widgetco.json"),
            object(json!({"name": "Widget Co", "size": "large"})),
            KeyPolicy::NameField,
        )
        .unwrap();

        assert_eq!(key, "Widget Co");
        assert_eq!(Value::Object(body), json!({"size": "large"}));
    }

    #[test]
    fn test_name_field_policy_errors() {
        let path = Path::new("a.json");
        let missing = derive_key(path, object(json!({"size": 1})), KeyPolicy::NameField);
        assert!(matches!(missing, Err(SeedError::Fixture(msg)) if msg.contains("missing")));

        let numeric = derive_key(path, object(json!({"name": 7})), KeyPolicy::NameField);
        assert!(matches!(numeric, Err(SeedError::Fixture(_))));

        let slash = derive_key(path, object(json!({"name": "a/b"})), KeyPolicy::NameField);
        assert!(matches!(slash, Err(SeedError::Fixture(msg)) if msg.contains("`/`")));
    }

    #[test]
    fn test_firestore_reserved_keys_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "__meta__.json", r#"{"name": "Meta"}"#);
        let err = load_fixtures(dir.path(), KeyPolicy::FileName).unwrap_err();
        assert!(matches!(err, SeedError::Fixture(msg) if msg.contains("__meta__")));

        let long = "x".repeat(MAX_KEY_BYTES + 1);
        let result = derive_key(
            Path::new("a.json"),
            object(json!({ "name": long })),
            KeyPolicy::NameField,
        );
        assert!(matches!(result, Err(SeedError::Fixture(msg)) if msg.contains("1500 bytes")));

        let (key, _) = derive_key(
            Path::new("a.json"),
            object(json!({"name": "__"})),
            KeyPolicy::NameField,
        )
        .unwrap();
        assert_eq!(key, "__");
    }

    #[test]
    fn test_reserved_id_rejected() {
        let result = derive_key(
            Path::new("a.json"),
            object(json!({"_id": "x"})),
            KeyPolicy::FileName,
        );
        assert!(matches!(result, Err(SeedError::Fixture(msg)) if msg.contains("_id")));
    }

    #[test]
    fn test_load_fixtures_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "zeta.json", r#"{"name": "Zeta"}"#);
        write(dir.path(), "alpha.JSON", r#"{"name": "Alpha"}"#);
        write(dir.path(), "notes.txt", "not a fixture");
        fs::create_dir(dir.path().join("nested.json")).unwrap();

        let fixtures = load_fixtures(dir.path(), KeyPolicy::FileName).unwrap();
        let keys: Vec<&str> = fixtures.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, vec!["alpha", "zeta"]);
    }

    #[test]
    fn test_load_fixtures_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "b.json", r#"{"name": "Bee"}"#);
        write(dir.path(), "a.json", r#"{"name": "Ay"}"#);

        let first = load_fixtures(dir.path(), KeyPolicy::NameField).unwrap();
        let second = load_fixtures(dir.path(), KeyPolicy::NameField).unwrap();
        assert_eq!(first, second);
        assert_eq!(first[0].key, "Ay");
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "one.json", r#"{"name": "Same"}"#);
        write(dir.path(), "two.json", r#"{"name": "Same"}"#);

        let err = load_fixtures(dir.path(), KeyPolicy::NameField).unwrap_err();
        assert!(matches!(err, SeedError::Fixture(msg) if msg.contains("duplicate key `Same`")));
    }

    #[test]
    fn test_malformed_and_non_object_files() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "bad.json", "{ nope");
        assert!(matches!(
            load_fixtures(dir.path(), KeyPolicy::FileName),
            Err(SeedError::Parse { .. })
        ));

        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "list.json", "[1, 2, 3]");
        assert!(matches!(
            load_fixtures(dir.path(), KeyPolicy::FileName),
            Err(SeedError::Fixture(_))
        ));
    }

    #[test]
    fn test_missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_fixtures(dir.path().join("absent"), KeyPolicy::FileName).unwrap_err();
        assert!(matches!(err, SeedError::Io { .. }));
    }
}
