// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Fixture documents and the plan that maps fixture directories to collections.

use serde_json::{Map, Value};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Field that carries a fixture's logical name.
pub const NAME_FIELD: &str = "name";

/// One seed record read from a JSON file.
#[derive(Debug, Clone, PartialEq)]
pub struct Fixture {
    /// Document key (MongoDB `_id`, Firestore document ID)
    pub key: String,
    /// File the fixture was read from
    pub source: PathBuf,
    /// Stored fields, after key extraction
    pub body: Map<String, Value>,
}

/// How a fixture's document key is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyPolicy {
    /// File name with the `.json` extension stripped. The body is stored as-is.
    #[default]
    FileName,
    /// The `name` field of the body, which is removed before storing.
    NameField,
}

impl KeyPolicy {
    /// Whether `field` is still present in stored documents under this policy.
    pub fn keeps_field(self, field: &str) -> bool {
        match self {
            KeyPolicy::FileName => true,
            KeyPolicy::NameField => field != NAME_FIELD,
        }
    }
}

impl fmt::Display for KeyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyPolicy::FileName => f.write_str("filename"),
            KeyPolicy::NameField => f.write_str("name-field"),
        }
    }
}

impl FromStr for KeyPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "filename" | "file-name" | "file" => Ok(KeyPolicy::FileName),
            "name-field" | "namefield" | "name" => Ok(KeyPolicy::NameField),
            other => Err(format!("expected `filename` or `name-field`, got `{}`", other)),
        }
    }
}

/// A fixture directory and the collection its files are written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionMapping {
    pub source_dir: PathBuf,
    pub collection: String,
}

/// Everything the seeder needs to know besides the store itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedPlan {
    pub mappings: Vec<CollectionMapping>,
    pub key_policy: KeyPolicy,
    /// Secondary index created after inserting (MongoDB only)
    pub index_field: Option<String>,
}

impl SeedPlan {
    /// The index field, if it survives insertion under the key policy.
    ///
    /// Under [`KeyPolicy::NameField`] the `name` field becomes `_id`, which is
    /// already indexed, so there is nothing left to index.
    pub fn effective_index_field(&self) -> Option<&str> {
        self.index_field
            .as_deref()
            .filter(|field| self.key_policy.keeps_field(field))
    }
}
