//! Static Token Verifier
//!
//! Maps fixed token strings to principals. Meant for local development and
//! tests, never for production traffic.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::{AuthError, Result};
use crate::types::Principal;
use crate::verifier::TokenVerifier;

/// Verifier backed by an in-memory token table
#[derive(Debug, Clone, Default)]
pub struct StaticTokenVerifier {
    tokens: HashMap<String, Principal>,
}

impl StaticTokenVerifier {
    /// Create an empty verifier (rejects every token)
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `token` as `principal`
    pub fn with_token(mut self, token: impl Into<String>, principal: Principal) -> Self {
        self.tokens.insert(token.into(), principal);
        self
    }

    /// Parse a token table of the form `token=uid[:email],token2=uid2`
    pub fn parse(table: &str) -> Result<Self> {
        let mut verifier = Self::new();

        for entry in table.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (token, identity) = entry.split_once('=').ok_or_else(|| {
                AuthError::Configuration(format!("expected token=uid, got '{}'", entry))
            })?;
            let token = token.trim();
            if token.is_empty() {
                return Err(AuthError::Configuration(format!("empty token in '{}'", entry)));
            }

            let principal = match identity.trim().split_once(':') {
                Some((uid, email)) => Principal::new(uid).with_email(email),
                None => Principal::new(identity.trim()),
            };
            verifier.tokens.insert(token.to_string(), principal.with_issuer("static"));
        }

        Ok(verifier)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[async_trait]
impl TokenVerifier for StaticTokenVerifier {
    fn description(&self) -> &str {
        "static token verifier"
    }

    async fn verify(&self, token: &str) -> Result<Principal> {
        self.tokens.get(token).cloned().ok_or(AuthError::UnknownToken)
    }
}
