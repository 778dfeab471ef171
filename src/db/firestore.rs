// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore document store.
//!
//! Writes are staged in transactions so each commit is atomic. Firestore
//! limits a commit to 500 writes, so larger collections are committed in
//! chunks of [`BATCH_SIZE`].

use crate::config::{Config, ConfigError};
use crate::db::DocumentStore;
use crate::error::{Result, SeedError};
use crate::models::{Backend, Environment, Fixture};
use async_trait::async_trait;
use futures_util::TryStreamExt;
use serde::Deserialize;
use std::path::Path;

// Firestore limits batch/transaction writes to 500 operations.
// We use a safe limit of 400 to allow headroom.
pub const BATCH_SIZE: usize = 400;

/// Project ID used against the emulator when none is configured.
const EMULATOR_PROJECT_ID: &str = "demo-seed";

/// Collection read by `ping`. Never written.
const PROBE_COLLECTION: &str = "seed_connectivity_probe";

/// The parts of a service-account certificate we need before handing the
/// whole file to the token source.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountCertificate {
    pub project_id: String,
    pub client_email: String,
    #[serde(skip)]
    raw: String,
}

impl ServiceAccountCertificate {
    /// Read and validate a certificate file.
    ///
    /// A missing file is a configuration error; an unreadable or malformed
    /// one is a connection error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(ConfigError::CertificateNotFound(path.to_path_buf()).into());
        }

        let raw = std::fs::read_to_string(path).map_err(|e| {
            SeedError::connection(
                Backend::Firebase,
                format!("cannot read certificate {}: {}", path.display(), e),
            )
        })?;
        Self::parse(raw).map_err(|e| {
            SeedError::connection(
                Backend::Firebase,
                format!("invalid certificate {}: {}", path.display(), e),
            )
        })
    }

    pub fn parse(raw: String) -> std::result::Result<Self, serde_json::Error> {
        let mut certificate: Self = serde_json::from_str(&raw)?;
        certificate.raw = raw;
        Ok(certificate)
    }
}

/// Firestore client for one project.
#[derive(Clone)]
pub struct FirestoreStore {
    client: firestore::FirestoreDb,
    project_id: String,
}

impl FirestoreStore {
    /// Connect using the certificate configured for `environment`.
    ///
    /// When `FIRESTORE_EMULATOR_HOST` is set the emulator is used instead and
    /// no certificate is needed.
    pub async fn connect(environment: Environment, config: &Config) -> Result<Self> {
        if config.firestore_emulator_host.is_some() {
            let project_id = config
                .firestore_project_id
                .clone()
                .unwrap_or_else(|| EMULATOR_PROJECT_ID.to_string());
            return Self::create_emulator_client(&project_id).await;
        }

        let path = config.certificate_path(environment)?;
        let certificate = ServiceAccountCertificate::load(path)?;
        let project_id = config
            .firestore_project_id
            .clone()
            .unwrap_or_else(|| certificate.project_id.clone());

        let options = firestore::FirestoreDbOptions::new(project_id.clone());
        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::Json(certificate.raw),
        )
        .await
        .map_err(|e| SeedError::connection(Backend::Firebase, e))?;

        let store = Self { client, project_id };
        store
            .read_probe()
            .await
            .map_err(|e| SeedError::connection(Backend::Firebase, e))?;

        tracing::info!(
            project = %store.project_id,
            %environment,
            account = %certificate.client_email,
            "Connected to Firestore"
        );
        Ok(store)
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJzZWVkZXIifQ."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| SeedError::connection(Backend::Firebase, e))?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client,
            project_id: project_id.to_string(),
        })
    }

    /// Read a document that never exists, to check the project answers.
    async fn read_probe(&self) -> firestore::FirestoreResult<()> {
        let _: Option<_> = self
            .client
            .fluent()
            .select()
            .by_id_in(PROBE_COLLECTION)
            .one("probe")
            .await?;
        Ok(())
    }

    /// Delete documents by ID in transactional chunks.
    async fn batch_delete(&self, collection: &str, ids: &[String]) -> Result<()> {
        for chunk in ids.chunks(BATCH_SIZE) {
            let mut transaction =
                self.client.begin_transaction().await.map_err(|e| {
                    SeedError::Database(format!("Failed to begin transaction: {}", e))
                })?;

            for id in chunk {
                println!("Deleting {}", id);
                self.client
                    .fluent()
                    .delete()
                    .from(collection)
                    .document_id(id)
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| {
                        SeedError::Database(format!(
                            "Failed to add deletion to transaction for {}: {}",
                            collection, e
                        ))
                    })?;
            }

            transaction.commit().await.map_err(|e| {
                SeedError::Database(format!("Failed to commit batch deletion: {}", e))
            })?;
        }

        Ok(())
    }
}

/// Last path segment of a full Firestore document name.
pub fn document_id(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    fn backend(&self) -> Backend {
        Backend::Firebase
    }

    async fn ping(&self) -> Result<()> {
        self.read_probe()
            .await
            .map_err(|e| SeedError::Database(e.to_string()))
    }

    async fn insert_many(&self, collection: &str, fixtures: &[Fixture]) -> Result<usize> {
        for chunk in fixtures.chunks(BATCH_SIZE) {
            let mut transaction = self.client.begin_transaction().await.map_err(|e| {
                SeedError::Database(format!("Failed to begin transaction: {}", e))
            })?;

            for fixture in chunk {
                self.client
                    .fluent()
                    .update()
                    .in_col(collection)
                    .document_id(&fixture.key)
                    .object(&fixture.body)
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| {
                        SeedError::Database(format!(
                            "Failed to stage {} in transaction: {}",
                            fixture.source.display(),
                            e
                        ))
                    })?;
            }

            transaction
                .commit()
                .await
                .map_err(|e| SeedError::Database(format!("Transaction commit failed: {}", e)))?;

            tracing::debug!(collection, count = chunk.len(), "Committed batch");
        }

        Ok(fixtures.len())
    }

    async fn create_index(&self, collection: &str, field: &str) -> Result<bool> {
        // Single-field indexes are automatic in Firestore
        tracing::debug!(collection, field, "Skipping explicit index on Firestore");
        Ok(false)
    }

    async fn delete_all(&self, collection: &str) -> Result<usize> {
        let ids = self.list_ids(collection).await?;
        self.batch_delete(collection, &ids).await?;
        Ok(ids.len())
    }

    async fn list_ids(&self, collection: &str) -> Result<Vec<String>> {
        let documents: Vec<gcloud_sdk::google::firestore::v1::Document> = self
            .client
            .fluent()
            .list()
            .from(collection)
            .stream_all_with_errors()
            .await
            .map_err(|e| SeedError::Database(e.to_string()))?
            .try_collect()
            .await
            .map_err(|e| SeedError::Database(e.to_string()))?;

        Ok(documents
            .iter()
            .map(|doc| document_id(&doc.name).to_string())
            .collect())
    }

    async fn close(&self) {
        // The gRPC channel closes when the client is dropped
        tracing::debug!(project = %self.project_id, "Releasing Firestore client");
    }
}
