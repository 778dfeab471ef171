// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer: one [`DocumentStore`] implementation per backend.

pub mod firestore;
pub mod mongo;

pub use self::firestore::FirestoreStore;
pub use self::mongo::MongoStore;

use crate::config::{Config, ConfigError};
use crate::error::Result;
use crate::models::{Backend, Environment, Fixture};
use async_trait::async_trait;

/// Operations the seeder needs from a backend.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    fn backend(&self) -> Backend;

    /// Cheap read-only round trip to verify the connection.
    async fn ping(&self) -> Result<()>;

    /// Insert all fixtures into `collection`, keyed by their derived key.
    async fn insert_many(&self, collection: &str, fixtures: &[Fixture]) -> Result<usize>;

    /// Create a secondary index on `field`. Returns `false` when the backend
    /// manages single-field indexes itself.
    async fn create_index(&self, collection: &str, field: &str) -> Result<bool>;

    /// Delete every document in `collection`, returning how many were removed.
    async fn delete_all(&self, collection: &str) -> Result<usize>;

    /// IDs of every document in `collection`.
    async fn list_ids(&self, collection: &str) -> Result<Vec<String>>;

    /// Release the connection.
    async fn close(&self);
}

/// Connect to the selected backend.
///
/// Firebase needs an `environment` to pick its certificate; MongoDB ignores it.
pub async fn connect(
    backend: Backend,
    environment: Option<Environment>,
    config: &Config,
) -> Result<Box<dyn DocumentStore>> {
    match backend {
        Backend::MongoDb => Ok(Box::new(MongoStore::connect(&config.mongodb).await?)),
        Backend::Firebase => {
            let environment = environment.ok_or(ConfigError::EnvironmentRequired)?;
            Ok(Box::new(FirestoreStore::connect(environment, config).await?))
        }
    }
}
