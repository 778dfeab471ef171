// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Seeder configuration loaded from the environment file and process environment.
//!
//! Loaded once at startup into a [`Config`] value that is passed to the
//! connector explicitly. Nothing here is global.

use crate::models::{CollectionMapping, Environment, KeyPolicy, SeedPlan, NAME_FIELD};
use secrecy::{ExposeSecret, SecretString};
use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};

/// Environment file read before the process environment.
pub const DEFAULT_ENV_FILE: &str = "db.env";
pub const DEFAULT_DATABASE: &str = "rentalreviews";
pub const DEFAULT_FIXTURES_DIR: &str = "config";
pub const DEFAULT_COLLECTIONS: [&str; 2] = ["companies", "properties"];

/// Seeder configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- MongoDB ---
    pub mongodb: MongoSettings,

    // --- Firebase ---
    /// Service-account certificate per deployment environment
    pub certificates: BTreeMap<Environment, PathBuf>,
    /// Overrides the project ID read from the certificate
    pub firestore_project_id: Option<String>,
    /// Emulator address (unauthenticated, certificate optional)
    pub firestore_emulator_host: Option<String>,

    // --- Fixtures ---
    /// Root directory; each collection reads `<fixtures_dir>/<collection>/*.json`
    pub fixtures_dir: PathBuf,
    /// Collections to seed, in order
    pub collections: Vec<String>,
    pub key_policy: KeyPolicy,
    /// Secondary index created after seeding (empty string disables)
    pub index_field: Option<String>,
}

/// MongoDB connection settings. Credentials stay optional until a
/// MongoDB connection is actually requested.
#[derive(Debug, Clone)]
pub struct MongoSettings {
    pub user: Option<String>,
    pub password: Option<SecretString>,
    pub host: Option<String>,
    /// Full connection string, used instead of user/password/host when set
    pub uri: Option<SecretString>,
    pub database: String,
}

/// Credentials required to build a MongoDB connection string.
#[derive(Debug, Clone)]
pub struct MongoCredentials {
    pub user: String,
    pub password: SecretString,
    pub host: String,
}

impl MongoCredentials {
    /// `mongodb://<user>:<password>@<host>` with user and password percent-encoded.
    pub fn connection_uri(&self) -> String {
        format!(
            "mongodb://{}:{}@{}",
            urlencoding::encode(&self.user),
            urlencoding::encode(self.password.expose_secret()),
            self.host
        )
    }
}

impl MongoSettings {
    /// Resolve the connection string, failing on the first missing variable.
    pub fn connection_uri(&self) -> Result<String, ConfigError> {
        if let Some(uri) = &self.uri {
            return Ok(uri.expose_secret().clone());
        }
        Ok(self.credentials()?.connection_uri())
    }

    pub fn credentials(&self) -> Result<MongoCredentials, ConfigError> {
        Ok(MongoCredentials {
            user: self
                .user
                .clone()
                .ok_or(ConfigError::Missing("MONGODB_USER"))?,
            password: self
                .password
                .clone()
                .ok_or(ConfigError::Missing("MONGODB_PASSWORD"))?,
            host: self
                .host
                .clone()
                .ok_or(ConfigError::Missing("MONGODB_URL"))?,
        })
    }
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            mongodb: MongoSettings {
                user: Some("test_user".to_string()),
                password: Some(SecretString::new("test_password".to_string())),
                host: Some("localhost:27017".to_string()),
                uri: None,
                database: DEFAULT_DATABASE.to_string(),
            },
            certificates: default_certificates(),
            firestore_project_id: None,
            firestore_emulator_host: None,
            fixtures_dir: PathBuf::from(DEFAULT_FIXTURES_DIR),
            collections: DEFAULT_COLLECTIONS.iter().map(|c| c.to_string()).collect(),
            key_policy: KeyPolicy::default(),
            index_field: Some(NAME_FIELD.to_string()),
        }
    }
}

fn default_certificates() -> BTreeMap<Environment, PathBuf> {
    BTreeMap::from([
        (
            Environment::Production,
            PathBuf::from("./production_certificate.json"),
        ),
        (
            Environment::Staging,
            PathBuf::from("./staging_certificate.json"),
        ),
    ])
}

impl Config {
    /// Load configuration from the environment file and process environment.
    ///
    /// The file named by `SEED_ENV_FILE` (default `db.env`) is loaded first if
    /// present; variables already set in the process take precedence.
    pub fn from_env() -> Result<Self, ConfigError> {
        let env_file = env::var("SEED_ENV_FILE").unwrap_or_else(|_| DEFAULT_ENV_FILE.to_string());
        match dotenvy::from_filename(&env_file) {
            Ok(path) => tracing::debug!(path = %path.display(), "Loaded environment file"),
            Err(e) if e.not_found() => {
                tracing::debug!(file = %env_file, "No environment file, using process environment")
            }
            Err(e) => {
                return Err(ConfigError::Invalid {
                    var: "SEED_ENV_FILE",
                    reason: e.to_string(),
                })
            }
        }

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Treat blank values as unset
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut certificates = default_certificates();
        if let Some(path) = var("FIREBASE_PRODUCTION_CERTIFICATE") {
            certificates.insert(Environment::Production, PathBuf::from(path));
        }
        if let Some(path) = var("FIREBASE_STAGING_CERTIFICATE") {
            certificates.insert(Environment::Staging, PathBuf::from(path));
        }

        let collections = match var("SEED_COLLECTIONS") {
            Some(list) => {
                let names: Vec<String> = list
                    .split(',')
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .map(str::to_string)
                    .collect();
                if names.is_empty() {
                    return Err(ConfigError::Invalid {
                        var: "SEED_COLLECTIONS",
                        reason: "no collection names given".to_string(),
                    });
                }
                names
            }
            None => DEFAULT_COLLECTIONS.iter().map(|c| c.to_string()).collect(),
        };

        let key_policy = match var("SEED_KEY_POLICY") {
            Some(raw) => raw.parse::<KeyPolicy>().map_err(|reason| ConfigError::Invalid {
                var: "SEED_KEY_POLICY",
                reason,
            })?,
            None => KeyPolicy::default(),
        };

        // An explicitly empty SEED_INDEX_FIELD disables the index
        let index_field = match lookup("SEED_INDEX_FIELD") {
            Some(field) => Some(field.trim().to_string()).filter(|f| !f.is_empty()),
            None => Some(NAME_FIELD.to_string()),
        };

        Ok(Self {
            mongodb: MongoSettings {
                user: var("MONGODB_USER"),
                password: var("MONGODB_PASSWORD").map(SecretString::new),
                host: var("MONGODB_URL"),
                uri: var("MONGODB_URI").map(SecretString::new),
                database: var("MONGODB_DATABASE").unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
            },
            certificates,
            firestore_project_id: var("FIRESTORE_PROJECT_ID"),
            firestore_emulator_host: var("FIRESTORE_EMULATOR_HOST"),
            fixtures_dir: var("SEED_FIXTURES_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_FIXTURES_DIR)),
            collections,
            key_policy,
            index_field,
        })
    }

    /// Certificate path for an environment.
    pub fn certificate_path(&self, environment: Environment) -> Result<&Path, ConfigError> {
        self.certificates
            .get(&environment)
            .map(PathBuf::as_path)
            .ok_or(ConfigError::CertificateNotConfigured(environment))
    }

    /// Build the seed plan: one mapping per configured collection.
    pub fn seed_plan(&self) -> SeedPlan {
        SeedPlan {
            mappings: self
                .collections
                .iter()
                .map(|collection| CollectionMapping {
                    source_dir: self.fixtures_dir.join(collection),
                    collection: collection.clone(),
                })
                .collect(),
            key_policy: self.key_policy,
            index_field: self.index_field.clone(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },

    #[error("No certificate configured for {0}")]
    CertificateNotConfigured(Environment),

    #[error("Certificate file not found: {}", .0.display())]
    CertificateNotFound(PathBuf),

    #[error("Firebase requires a deployment environment")]
    EnvironmentRequired,
}
