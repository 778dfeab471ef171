// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use fixture_seeder::config::Config;
use fixture_seeder::db::DocumentStore;
use fixture_seeder::error::{Result, SeedError};
use fixture_seeder::models::{Backend, Fixture, KeyPolicy, SeedPlan};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tempfile::TempDir;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Connection string for a disposable MongoDB, if one is configured.
#[allow(dead_code)]
pub fn mongo_test_uri() -> Option<String> {
    std::env::var("MONGODB_TEST_URI").ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Skip test with message if no test MongoDB is configured.
#[macro_export]
macro_rules! require_mongo {
    () => {
        match crate::common::mongo_test_uri() {
            Some(uri) => uri,
            None => {
                eprintln!("⚠️  Skipping: MONGODB_TEST_URI not set");
                return;
            }
        }
    };
}

/// Unique suffix for test isolation.
#[allow(dead_code)]
pub fn unique_suffix() -> u128 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos()
}

/// Config built only from the given variables, never the process environment.
#[allow(dead_code)]
pub fn config_from(vars: &[(&str, &str)]) -> Config {
    let vars: BTreeMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Config::from_lookup(|key| vars.get(key).cloned()).expect("Config should load")
}

/// Write `<root>/<collection>/<file>` fixtures.
#[allow(dead_code)]
pub fn write_fixtures(root: &Path, collection: &str, files: &[(&str, Value)]) {
    let dir = root.join(collection);
    std::fs::create_dir_all(&dir).unwrap();
    for (name, body) in files {
        std::fs::write(dir.join(name), serde_json::to_string_pretty(body).unwrap()).unwrap();
    }
}

/// A fixture tree and a plan pointing at it.
#[allow(dead_code)]
pub fn plan_for(root: &TempDir, collections: &[&str], key_policy: KeyPolicy) -> SeedPlan {
    let collections = collections.join(",");
    let fixtures_dir = root.path().to_str().unwrap();
    let mut config = config_from(&[
        ("SEED_FIXTURES_DIR", fixtures_dir),
        ("SEED_COLLECTIONS", collections.as_str()),
    ]);
    config.key_policy = key_policy;
    config.seed_plan()
}

/// In-memory store with MongoDB-like duplicate key semantics.
#[allow(dead_code)]
pub struct MemoryStore {
    backend: Backend,
    collections: Mutex<BTreeMap<String, BTreeMap<String, Map<String, Value>>>>,
    indexes: Mutex<Vec<(String, String)>>,
    offline: bool,
    closed: AtomicBool,
}

#[allow(dead_code)]
impl MemoryStore {
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            collections: Mutex::new(BTreeMap::new()),
            indexes: Mutex::new(Vec::new()),
            offline: false,
            closed: AtomicBool::new(false),
        }
    }

    /// A store whose every call fails as if the server went away.
    pub fn offline(backend: Backend) -> Self {
        Self {
            offline: true,
            ..Self::new(backend)
        }
    }

    pub fn count(&self, collection: &str) -> usize {
        self.collections
            .lock()
            .unwrap()
            .get(collection)
            .map_or(0, BTreeMap::len)
    }

    pub fn document(&self, collection: &str, key: &str) -> Option<Map<String, Value>> {
        self.collections
            .lock()
            .unwrap()
            .get(collection)
            .and_then(|docs| docs.get(key).cloned())
    }

    pub fn indexes(&self) -> Vec<(String, String)> {
        self.indexes.lock().unwrap().clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn check_online(&self) -> Result<()> {
        if self.offline {
            return Err(SeedError::Database("server unreachable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn backend(&self) -> Backend {
        self.backend
    }

    async fn ping(&self) -> Result<()> {
        self.check_online()
    }

    async fn insert_many(&self, collection: &str, fixtures: &[Fixture]) -> Result<usize> {
        self.check_online()?;
        let mut collections = self.collections.lock().unwrap();
        let docs = collections.entry(collection.to_string()).or_default();

        // All-or-nothing, like an ordered insert that fails on the first duplicate
        if let Some(dup) = fixtures.iter().find(|f| docs.contains_key(&f.key)) {
            return Err(SeedError::Database(format!(
                "E11000 duplicate key error collection: {} dup key: {{ _id: \"{}\" }}",
                collection, dup.key
            )));
        }
        for fixture in fixtures {
            docs.insert(fixture.key.clone(), fixture.body.clone());
        }
        Ok(fixtures.len())
    }

    async fn create_index(&self, collection: &str, field: &str) -> Result<bool> {
        self.check_online()?;
        self.indexes
            .lock()
            .unwrap()
            .push((collection.to_string(), field.to_string()));
        Ok(true)
    }

    async fn delete_all(&self, collection: &str) -> Result<usize> {
        self.check_online()?;
        Ok(self
            .collections
            .lock()
            .unwrap()
            .remove(collection)
            .map_or(0, |docs| docs.len()))
    }

    async fn list_ids(&self, collection: &str) -> Result<Vec<String>> {
        self.check_online()?;
        Ok(self
            .collections
            .lock()
            .unwrap()
            .get(collection)
            .map(|docs| docs.keys().cloned().collect())
            .unwrap_or_default())
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}
