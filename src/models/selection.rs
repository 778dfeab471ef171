// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Operator selections: which backend, which action, which environment.

use std::fmt;
use std::str::FromStr;

/// Target database system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    MongoDb,
    Firebase,
}

/// Composite operation to run against the selected backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Seed,
    Clear,
    Reseed,
    Test,
}

/// Firebase deployment environment (selects the service-account certificate).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Environment {
    Production,
    Staging,
}

impl Backend {
    pub const ALL: [Backend; 2] = [Backend::MongoDb, Backend::Firebase];

    pub fn label(self) -> &'static str {
        match self {
            Backend::MongoDb => "MongoDB",
            Backend::Firebase => "Firebase",
        }
    }

    /// Only Firebase needs an environment to pick a certificate.
    pub fn requires_environment(self) -> bool {
        matches!(self, Backend::Firebase)
    }
}

impl Action {
    pub const ALL: [Action; 4] = [Action::Seed, Action::Clear, Action::Reseed, Action::Test];

    pub fn label(self) -> &'static str {
        match self {
            Action::Seed => "Seed",
            Action::Clear => "Clear",
            Action::Reseed => "Re-seed",
            Action::Test => "Test",
        }
    }
}

impl Environment {
    pub const ALL: [Environment; 2] = [Environment::Production, Environment::Staging];

    pub fn label(self) -> &'static str {
        match self {
            Environment::Production => "Production",
            Environment::Staging => "Staging",
        }
    }
}

macro_rules! label_impls {
    ($ty:ty) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $ty {
            type Err = String;

            /// Case-insensitive match on the label.
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim();
                <$ty>::ALL
                    .into_iter()
                    .find(|v| v.label().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| format!("unknown {}: {}", stringify!($ty), wanted))
            }
        }
    };
}

label_impls!(Backend);
label_impls!(Action);
label_impls!(Environment);

/// A complete operator choice, ready for dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub backend: Backend,
    pub action: Action,
    /// Present only when `backend.requires_environment()`.
    pub environment: Option<Environment>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_round_trip_through_from_str() {
        assert_eq!("mongodb".parse::<Backend>().unwrap(), Backend::MongoDb);
        assert_eq!(" Firebase ".parse::<Backend>().unwrap(), Backend::Firebase);
        assert_eq!("re-seed".parse::<Action>().unwrap(), Action::Reseed);
        assert_eq!("STAGING".parse::<Environment>().unwrap(), Environment::Staging);
        assert!("postgres".parse::<Backend>().is_err());
    }

    #[test]
    fn test_only_firebase_requires_environment() {
        assert!(Backend::Firebase.requires_environment());
        assert!(!Backend::MongoDb.requires_environment());
    }
}
