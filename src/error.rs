// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Error types shared by the connector and the seeding operations.

use crate::config::ConfigError;
use crate::models::Backend;
use std::path::PathBuf;

/// Process exit code for a completed action.
pub const EXIT_OK: u8 = 0;
/// Process exit code when the requested action failed.
pub const EXIT_ACTION_FAILED: u8 = 1;
/// Process exit code when configuration or connection failed before the action ran.
pub const EXIT_SETUP_FAILED: u8 = 2;
/// Process exit code when the operator aborted a prompt.
pub const EXIT_ABORTED: u8 = 130;

/// Seeder error type.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{backend} connection error: {message}")]
    Connection { backend: Backend, message: String },

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid fixture: {0}")]
    Fixture(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl SeedError {
    pub fn connection(backend: Backend, err: impl std::fmt::Display) -> Self {
        SeedError::Connection {
            backend,
            message: err.to_string(),
        }
    }

    /// Errors that happen before any action could start.
    pub fn is_setup_error(&self) -> bool {
        matches!(self, SeedError::Config(_) | SeedError::Connection { .. })
    }

    pub fn exit_code(&self) -> u8 {
        if self.is_setup_error() {
            EXIT_SETUP_FAILED
        } else {
            EXIT_ACTION_FAILED
        }
    }
}

/// Result type alias for seeder operations
pub type Result<T> = std::result::Result<T, SeedError>;
