//! Authenticated principal

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The identity behind a verified bearer token
///
/// `uid` is the identity provider's subject identifier and doubles as the
/// key of the user's profile document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Principal {
    /// Subject identifier (Firebase `uid` / JWT `sub`)
    pub uid: String,

    /// Email address, when the provider shares it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// The issuer of the token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,

    /// When the token expires (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,

    /// Remaining claims from the token
    #[serde(default)]
    pub claims: HashMap<String, serde_json::Value>,
}

impl Principal {
    /// Create a principal for a subject identifier
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: None,
            issuer: None,
            expires_at: None,
            claims: HashMap::new(),
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    pub fn with_expires_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Add a claim
    pub fn with_claim(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.claims.insert(key.into(), value);
        self
    }

    /// The subject identifier, or `None` when the provider returned an empty one
    pub fn subject(&self) -> Option<&str> {
        let uid = self.uid.trim();
        (!uid.is_empty()).then_some(self.uid.as_str())
    }

    /// Check if the token behind this principal has expired
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|exp| exp < Utc::now())
    }
}
