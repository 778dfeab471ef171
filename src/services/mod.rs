// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - fixture loading and seeding operations.

pub mod fixtures;
pub mod seeder;

pub use fixtures::{list_fixture_files, load_fixtures};
pub use seeder::{
    clear_all, execute, reseed_all, seed_all, test_connection, CollectionReport,
    ConnectivityReport, Summary,
};
