// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Interactive menus and one-shot dispatch.
//!
//! Menus are lettered (`a.`, `b.`, ...). An answer may be the letter or the
//! option text, in any case. Anything else re-prompts.

use crate::config::Config;
use crate::db::{self, DocumentStore};
use crate::error::{EXIT_ACTION_FAILED, EXIT_OK};
use crate::models::{Action, Backend, Environment, SeedPlan, Selection};
use crate::services::{self, Summary};
use rustyline::error::ReadlineError;
use std::fmt::Display;

/// Source of operator input, one line per call.
pub trait Prompt {
    fn read_line(&mut self, prompt: &str) -> Result<String, PromptError>;
}

impl<H: rustyline::history::History> Prompt for rustyline::Editor<(), H> {
    fn read_line(&mut self, prompt: &str) -> Result<String, PromptError> {
        self.readline(prompt).map_err(|e| match e {
            ReadlineError::Interrupted | ReadlineError::Eof => PromptError::Aborted,
            other => PromptError::Readline(other),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    #[error("Aborted by operator")]
    Aborted,

    #[error("Failed to read input: {0}")]
    Readline(#[from] ReadlineError),
}

fn letter(index: usize) -> char {
    (b'a' + index as u8) as char
}

/// Menu text: a title followed by one lettered line per option.
pub fn render_menu<T: Display>(title: &str, options: &[T]) -> String {
    let mut menu = format!("{}\n", title);
    for (i, option) in options.iter().enumerate() {
        menu.push_str(&format!("  {}. {}\n", letter(i), option));
    }
    menu
}

/// Match an answer against a menu by letter or by option text.
pub fn parse_choice<T: Display + Copy>(input: &str, options: &[T]) -> Option<T> {
    let answer = input.trim();
    if answer.is_empty() {
        return None;
    }

    let by_letter = options
        .iter()
        .enumerate()
        .find(|(i, _)| answer.eq_ignore_ascii_case(&letter(*i).to_string()));
    if let Some((_, option)) = by_letter {
        return Some(*option);
    }

    options
        .iter()
        .find(|option| option.to_string().eq_ignore_ascii_case(answer))
        .copied()
}

/// Show a menu and keep asking until the answer matches an option.
pub fn choose<T, P>(prompt: &mut P, title: &str, options: &[T]) -> Result<T, PromptError>
where
    T: Display + Copy,
    P: Prompt + ?Sized,
{
    print!("{}", render_menu(title, options));
    loop {
        let answer = prompt.read_line("> ")?;
        if let Some(choice) = parse_choice(&answer, options) {
            return Ok(choice);
        }
        let letters: Vec<String> = (0..options.len()).map(|i| letter(i).to_string()).collect();
        println!(
            "'{}' is not a valid choice. Enter one of: {}",
            answer.trim(),
            letters.join(", ")
        );
    }
}

/// Ask for backend, action and, for Firebase, the environment.
pub fn select<P: Prompt + ?Sized>(prompt: &mut P) -> Result<Selection, PromptError> {
    let backend = choose(prompt, "Select a database:", &Backend::ALL)?;
    let action = choose(prompt, "Select an action:", &Action::ALL)?;
    let environment = if backend.requires_environment() {
        Some(choose(prompt, "Select an environment:", &Environment::ALL)?)
    } else {
        None
    };

    Ok(Selection {
        backend,
        action,
        environment,
    })
}

fn verb(action: Action) -> &'static str {
    match action {
        Action::Seed => "seed",
        Action::Clear => "clear",
        Action::Reseed => "re-seed",
        Action::Test => "test",
    }
}

/// Status lines for a completed action.
pub fn summary_lines(backend: Backend, action: Action, summary: &Summary) -> Vec<String> {
    let mut lines = Vec::new();
    for report in &summary.collections {
        if report.cleared.is_some() {
            lines.push(format!("Cleared {} for {}", backend, report.collection));
        }
        if let Some(inserted) = report.inserted {
            lines.push(format!("  {}: {} documents", report.collection, inserted));
        }
    }
    match action {
        Action::Seed | Action::Reseed => lines.push(format!("Seeded {}", backend)),
        Action::Test => lines.push(format!("Connection to {} succeeded", backend)),
        Action::Clear => {}
    }
    lines
}

/// Connect, run the selected action, close the connection, and report.
///
/// Returns the process exit code.
pub async fn run(selection: Selection, config: &Config) -> u8 {
    let Selection {
        backend,
        action,
        environment,
    } = selection;

    if action == Action::Test {
        let report = services::test_connection(backend, environment, config).await;
        return match report.error {
            None => {
                println!("Connection to {} succeeded", backend);
                EXIT_OK
            }
            Some(error) => {
                println!("Connection to {} failed: {}", backend, error);
                EXIT_ACTION_FAILED
            }
        };
    }

    let store = match db::connect(backend, environment, config).await {
        Ok(store) => {
            println!("Initialized connection to {}", backend);
            store
        }
        Err(e) => {
            println!(
                "Failed to initialize source {} with exception {}",
                backend, e
            );
            return e.exit_code();
        }
    };

    run_with_store(store.as_ref(), action, &config.seed_plan()).await
}

/// Run `action` against an open store, close it, and report.
///
/// The store is closed whether or not the action succeeds.
pub async fn run_with_store(store: &dyn DocumentStore, action: Action, plan: &SeedPlan) -> u8 {
    let backend = store.backend();
    let result = services::execute(store, action, plan).await;
    store.close().await;

    match result {
        Ok(summary) => {
            for line in summary_lines(backend, action, &summary) {
                println!("{}", line);
            }
            EXIT_OK
        }
        Err(e) => {
            tracing::error!(%backend, %action, error = %e, "Action failed");
            println!("Failed to {} {} with error {}", verb(action), backend, e);
            EXIT_ACTION_FAILED
        }
    }
}
