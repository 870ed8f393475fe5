//! Service configuration
//!
//! Everything is read from the environment once at startup. `main` loads a
//! `.env` file first when one exists.
//!
//! | Variable                | Default   |
//! |-------------------------|-----------|
//! | `PORT`                  | `4002`    |
//! | `PROFILE_HOST`          | `0.0.0.0` |
//! | `PROFILE_LOG_LEVEL`     | `info`    |
//! | `PROFILE_AUTH_MODE`     | `firebase`|
//! | `FIREBASE_PROJECT_ID`   | required in firebase mode |
//! | `FIREBASE_JWKS_URL`     | Google securetoken keys |
//! | `PROFILE_STATIC_TOKENS` | required in static mode |
//! | `DATABASE_URL`          | unset (in-memory store) |

use profile_auth::{FirebaseConfig, FirebaseVerifier, StaticTokenVerifier, TokenVerifier};
use std::env;
use std::sync::Arc;
use thiserror::Error;
use tracing::Level;

/// Port the service listens on when `PORT` is unset
pub const DEFAULT_PORT: u16 = 4002;

const DEFAULT_HOST: &str = "0.0.0.0";

/// Errors raised while reading the configuration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("Invalid {var} value '{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// How bearer tokens are verified
#[derive(Debug, Clone)]
pub enum AuthConfig {
    /// Firebase ID tokens for one project
    Firebase {
        project_id: String,
        jwks_url: Option<String>,
    },
    /// Fixed token table for local development
    Static(StaticTokenVerifier),
}

impl AuthConfig {
    /// Build the verifier shared by every request
    pub fn build_verifier(&self) -> Arc<dyn TokenVerifier> {
        match self {
            AuthConfig::Firebase {
                project_id,
                jwks_url,
            } => {
                let mut config = FirebaseConfig::new(project_id.clone());
                if let Some(url) = jwks_url {
                    config = config.with_jwks_url(url.clone());
                }
                Arc::new(FirebaseVerifier::new(config))
            }
            AuthConfig::Static(verifier) => Arc::new(verifier.clone()),
        }
    }

    /// Mode name for startup logs
    pub fn mode(&self) -> &'static str {
        match self {
            AuthConfig::Firebase { .. } => "firebase",
            AuthConfig::Static(_) => "static",
        }
    }
}

/// Profile service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub log_level: Level,
    pub auth: AuthConfig,
    pub database_url: Option<String>,
}

impl ServiceConfig {
    /// Read the configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read the configuration through `lookup`, treating blank values as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port = match var("PORT") {
            Some(value) => value.parse().map_err(|e: std::num::ParseIntError| ConfigError::Invalid {
                var: "PORT",
                reason: e.to_string(),
                value,
            })?,
            None => DEFAULT_PORT,
        };

        let log_level = match var("PROFILE_LOG_LEVEL") {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                var: "PROFILE_LOG_LEVEL",
                value,
                reason: "expected one of trace, debug, info, warn, error".into(),
            })?,
            None => Level::INFO,
        };

        let auth = match var("PROFILE_AUTH_MODE").as_deref() {
            None | Some("firebase") => AuthConfig::Firebase {
                project_id: var("FIREBASE_PROJECT_ID")
                    .ok_or(ConfigError::Missing("FIREBASE_PROJECT_ID"))?,
                jwks_url: var("FIREBASE_JWKS_URL"),
            },
            Some("static") => {
                let table = var("PROFILE_STATIC_TOKENS")
                    .ok_or(ConfigError::Missing("PROFILE_STATIC_TOKENS"))?;
                let verifier =
                    StaticTokenVerifier::parse(&table).map_err(|e| ConfigError::Invalid {
                        var: "PROFILE_STATIC_TOKENS",
                        value: "<redacted>".into(),
                        reason: e.to_string(),
                    })?;
                AuthConfig::Static(verifier)
            }
            Some(other) => {
                return Err(ConfigError::Invalid {
                    var: "PROFILE_AUTH_MODE",
                    value: other.to_string(),
                    reason: "expected 'firebase' or 'static'".into(),
                })
            }
        };

        Ok(Self {
            host: var("PROFILE_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            log_level,
            auth,
            database_url: var("DATABASE_URL"),
        })
    }

    /// `host:port` to bind
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
