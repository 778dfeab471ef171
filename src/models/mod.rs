// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod fixture;
pub mod selection;

pub use fixture::{CollectionMapping, Fixture, KeyPolicy, SeedPlan, NAME_FIELD};
pub use selection::{Action, Backend, Environment, Selection};
