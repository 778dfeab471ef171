// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! fixture-seeder
//!
//! Prompts for a database, an action and (for Firebase) an environment,
//! then seeds, clears, re-seeds, or tests the connection.

use anyhow::Context;
use fixture_seeder::cli::{self, PromptError};
use fixture_seeder::config::Config;
use fixture_seeder::error::{EXIT_ABORTED, EXIT_SETUP_FAILED};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    init_logging();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            println!("Failed to load configuration: {}", e);
            return Ok(ExitCode::from(EXIT_SETUP_FAILED));
        }
    };
    tracing::debug!(
        fixtures = %config.fixtures_dir.display(),
        collections = ?config.collections,
        key_policy = %config.key_policy,
        "Configuration loaded"
    );

    let mut editor = rustyline::DefaultEditor::new().context("Failed to open terminal")?;
    let selection = match cli::select(&mut editor) {
        Ok(selection) => selection,
        Err(PromptError::Aborted) => {
            println!("Aborted");
            return Ok(ExitCode::from(EXIT_ABORTED));
        }
        Err(e) => return Err(e).context("Failed to read selection"),
    };

    let code = cli::run(selection, &config).await;
    Ok(ExitCode::from(code))
}

/// Initialize logging to stderr: compact by default, flattened JSON with
/// `LOG_FORMAT=json`.
fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("fixture_seeder=warn"));

    let json = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(false)
                    .with_current_span(true)
                    .flatten_event(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}
