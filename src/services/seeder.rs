// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Seed, clear, re-seed and connectivity operations over a [`DocumentStore`].
//!
//! Every multi-collection operation walks the plan's mappings in order and
//! stops at the first error. Nothing already written is rolled back.

use crate::config::Config;
use crate::db::{self, DocumentStore};
use crate::error::Result;
use crate::models::{Action, Backend, CollectionMapping, Environment, SeedPlan};
use crate::services::fixtures;

/// What happened to one collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionReport {
    pub collection: String,
    /// Documents deleted, if the collection was cleared
    pub cleared: Option<usize>,
    /// Documents inserted, if the collection was seeded
    pub inserted: Option<usize>,
    /// Whether a secondary index was created
    pub indexed: bool,
}

/// Per-collection results of a completed operation, in plan order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub collections: Vec<CollectionReport>,
}

impl Summary {
    pub fn total_inserted(&self) -> usize {
        self.collections.iter().filter_map(|c| c.inserted).sum()
    }

    pub fn total_cleared(&self) -> usize {
        self.collections.iter().filter_map(|c| c.cleared).sum()
    }
}

/// Outcome of a connectivity test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectivityReport {
    pub backend: Backend,
    pub success: bool,
    pub error: Option<String>,
}

impl ConnectivityReport {
    fn ok(backend: Backend) -> Self {
        Self {
            backend,
            success: true,
            error: None,
        }
    }

    fn failed(backend: Backend, error: impl ToString) -> Self {
        Self {
            backend,
            success: false,
            error: Some(error.to_string()),
        }
    }
}

/// Load one mapping's fixtures and insert them, then index if the field survives.
pub async fn seed_collection(
    store: &dyn DocumentStore,
    mapping: &CollectionMapping,
    plan: &SeedPlan,
) -> Result<CollectionReport> {
    let fixtures = fixtures::load_fixtures(&mapping.source_dir, plan.key_policy)?;
    if fixtures.is_empty() {
        tracing::warn!(
            dir = %mapping.source_dir.display(),
            collection = %mapping.collection,
            "No fixtures found"
        );
    }

    let inserted = store.insert_many(&mapping.collection, &fixtures).await?;

    let indexed = match plan.effective_index_field() {
        Some(field) if inserted > 0 => store.create_index(&mapping.collection, field).await?,
        _ => false,
    };

    tracing::info!(
        backend = %store.backend(),
        collection = %mapping.collection,
        inserted,
        indexed,
        "Seeded collection"
    );

    Ok(CollectionReport {
        collection: mapping.collection.clone(),
        inserted: Some(inserted),
        indexed,
        ..Default::default()
    })
}

/// Delete every document in one collection.
pub async fn clear_collection(
    store: &dyn DocumentStore,
    mapping: &CollectionMapping,
) -> Result<CollectionReport> {
    let cleared = store.delete_all(&mapping.collection).await?;

    tracing::info!(
        backend = %store.backend(),
        collection = %mapping.collection,
        cleared,
        "Cleared collection"
    );

    Ok(CollectionReport {
        collection: mapping.collection.clone(),
        cleared: Some(cleared),
        ..Default::default()
    })
}

/// Seed every mapped collection.
pub async fn seed_all(store: &dyn DocumentStore, plan: &SeedPlan) -> Result<Summary> {
    let mut summary = Summary::default();
    for mapping in &plan.mappings {
        summary
            .collections
            .push(seed_collection(store, mapping, plan).await?);
    }
    Ok(summary)
}

/// Clear every mapped collection.
pub async fn clear_all(store: &dyn DocumentStore, plan: &SeedPlan) -> Result<Summary> {
    let mut summary = Summary::default();
    for mapping in &plan.mappings {
        summary
            .collections
            .push(clear_collection(store, mapping).await?);
    }
    Ok(summary)
}

/// Clear then seed each mapped collection in turn.
pub async fn reseed_all(store: &dyn DocumentStore, plan: &SeedPlan) -> Result<Summary> {
    let mut summary = Summary::default();
    for mapping in &plan.mappings {
        let cleared = clear_collection(store, mapping).await?;
        let seeded = seed_collection(store, mapping, plan).await?;
        summary.collections.push(CollectionReport {
            cleared: cleared.cleared,
            ..seeded
        });
    }
    Ok(summary)
}

/// Ping an open store.
pub async fn check_store(store: &dyn DocumentStore) -> ConnectivityReport {
    match store.ping().await {
        Ok(()) => ConnectivityReport::ok(store.backend()),
        Err(e) => ConnectivityReport::failed(store.backend(), e),
    }
}

/// Connect, ping, and close without touching any data.
pub async fn test_connection(
    backend: Backend,
    environment: Option<Environment>,
    config: &Config,
) -> ConnectivityReport {
    let store = match db::connect(backend, environment, config).await {
        Ok(store) => store,
        Err(e) => {
            tracing::warn!(%backend, error = %e, "Connectivity test failed");
            return ConnectivityReport::failed(backend, e);
        }
    };

    let report = check_store(store.as_ref()).await;
    store.close().await;
    report
}

/// Run a mutating action against an open store.
///
/// `Action::Test` only pings; it is included so a caller holding a store can
/// dispatch every action the same way.
pub async fn execute(store: &dyn DocumentStore, action: Action, plan: &SeedPlan) -> Result<Summary> {
    match action {
        Action::Seed => seed_all(store, plan).await,
        Action::Clear => clear_all(store, plan).await,
        Action::Reseed => reseed_all(store, plan).await,
        Action::Test => {
            store.ping().await?;
            Ok(Summary::default())
        }
    }
}
