// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! fixture-seeder: load JSON fixtures into MongoDB or Firestore.
//!
//! Reads one JSON document per file from a fixture directory per collection
//! and seeds, clears, or re-seeds the matching collections. The backend is
//! chosen at runtime through the [`db::DocumentStore`] trait.

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

pub use config::Config;
pub use db::DocumentStore;
pub use error::{Result, SeedError};
