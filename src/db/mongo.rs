// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! MongoDB document store.
//!
//! Fixtures become `{ _id: <key>, ...body }` documents inserted with a
//! single `insert_many` per collection.

use crate::config::MongoSettings;
use crate::db::DocumentStore;
use crate::error::{Result, SeedError};
use crate::models::{Backend, Fixture};
use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::{doc, Bson, Document};
use mongodb::{Client, Collection, Database, IndexModel};

/// MongoDB client bound to the seed database.
#[derive(Clone)]
pub struct MongoStore {
    client: Client,
    db: Database,
}

impl MongoStore {
    /// Connect and verify the server answers a `ping`.
    ///
    /// The driver connects lazily, so without the ping an unreachable host
    /// would only surface on the first write.
    pub async fn connect(settings: &MongoSettings) -> Result<Self> {
        let uri = settings.connection_uri()?;

        let client = Client::with_uri_str(&uri)
            .await
            .map_err(|e| SeedError::connection(Backend::MongoDb, e))?;
        let store = Self {
            db: client.database(&settings.database),
            client,
        };

        if let Err(e) = store.run_ping().await {
            store.close().await;
            return Err(SeedError::connection(Backend::MongoDb, e));
        }

        tracing::info!(database = %settings.database, "Connected to MongoDB");
        Ok(store)
    }

    async fn run_ping(&self) -> mongodb::error::Result<()> {
        self.db.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    fn collection(&self, name: &str) -> Collection<Document> {
        self.db.collection::<Document>(name)
    }
}

/// Build the stored document for a fixture.
pub fn fixture_document(fixture: &Fixture) -> Result<Document> {
    let body = mongodb::bson::to_document(&fixture.body).map_err(|e| {
        SeedError::Fixture(format!(
            "{}: cannot convert to BSON: {}",
            fixture.source.display(),
            e
        ))
    })?;

    let mut document = doc! { "_id": fixture.key.as_str() };
    for (field, value) in body {
        document.insert(field, value);
    }
    Ok(document)
}

#[async_trait]
impl DocumentStore for MongoStore {
    fn backend(&self) -> Backend {
        Backend::MongoDb
    }

    async fn ping(&self) -> Result<()> {
        self.run_ping()
            .await
            .map_err(|e| SeedError::Database(e.to_string()))
    }

    async fn insert_many(&self, collection: &str, fixtures: &[Fixture]) -> Result<usize> {
        if fixtures.is_empty() {
            return Ok(0);
        }

        let documents = fixtures
            .iter()
            .map(fixture_document)
            .collect::<Result<Vec<_>>>()?;

        let inserted = self
            .collection(collection)
            .insert_many(documents)
            .await
            .map_err(|e| SeedError::Database(e.to_string()))?
            .inserted_ids
            .len();

        tracing::debug!(collection, inserted, "Inserted documents");
        Ok(inserted)
    }

    async fn create_index(&self, collection: &str, field: &str) -> Result<bool> {
        let index = IndexModel::builder().keys(doc! { field: 1 }).build();
        let created = self
            .collection(collection)
            .create_index(index)
            .await
            .map_err(|e| SeedError::Database(e.to_string()))?;

        tracing::debug!(collection, index = %created.index_name, "Created index");
        Ok(true)
    }

    async fn delete_all(&self, collection: &str) -> Result<usize> {
        let result = self
            .collection(collection)
            .delete_many(doc! {})
            .await
            .map_err(|e| SeedError::Database(e.to_string()))?;

        Ok(result.deleted_count as usize)
    }

    async fn list_ids(&self, collection: &str) -> Result<Vec<String>> {
        let documents: Vec<Document> = self
            .collection(collection)
            .find(doc! {})
            .projection(doc! { "_id": 1 })
            .await
            .map_err(|e| SeedError::Database(e.to_string()))?
            .try_collect()
            .await
            .map_err(|e| SeedError::Database(e.to_string()))?;

        Ok(documents
            .into_iter()
            .filter_map(|mut document| document.remove("_id"))
            .map(|id| match id {
                Bson::String(s) => s,
                other => other.to_string(),
            })
            .collect())
    }

    async fn close(&self) {
        self.client.clone().shutdown().await;
        tracing::debug!("MongoDB client shut down");
    }
}
