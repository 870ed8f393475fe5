//! Firebase ID Token Verifier
//!
//! Verifies Firebase ID tokens the same way the Admin SDK does: RS256
//! signature against Google's `securetoken` keys, issuer and audience bound
//! to the Firebase project, and a non-empty subject.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use moka::future::Cache;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{AuthError, Result};
use crate::types::Principal;
use crate::verifier::TokenVerifier;

/// Google's JWKS for Firebase Auth signing keys
pub const GOOGLE_SECURETOKEN_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

/// Issuer prefix; the project id is appended
pub const FIREBASE_ISSUER_PREFIX: &str = "https://securetoken.google.com/";

/// Longest uid Firebase will issue
const MAX_UID_LEN: usize = 128;

/// Configuration for verifying one Firebase project's tokens
#[derive(Debug, Clone)]
pub struct FirebaseConfig {
    /// Firebase project id (expected `aud`)
    pub project_id: String,

    /// URL to fetch JWKS from
    pub jwks_url: String,

    /// How long fetched keys are reused
    pub jwks_ttl: Duration,

    /// Allowed clock skew in seconds
    pub leeway_secs: u64,
}

impl FirebaseConfig {
    /// Create a configuration for a project using Google's key endpoint
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            jwks_url: GOOGLE_SECURETOKEN_JWKS_URL.to_string(),
            jwks_ttl: Duration::from_secs(3600),
            leeway_secs: 60,
        }
    }

    /// Override the key endpoint
    pub fn with_jwks_url(mut self, url: impl Into<String>) -> Self {
        self.jwks_url = url.into();
        self
    }

    pub fn with_jwks_ttl(mut self, ttl: Duration) -> Self {
        self.jwks_ttl = ttl;
        self
    }

    pub fn with_leeway(mut self, secs: u64) -> Self {
        self.leeway_secs = secs;
        self
    }

    /// Expected `iss` claim
    pub fn issuer(&self) -> String {
        format!("{}{}", FIREBASE_ISSUER_PREFIX, self.project_id)
    }
}

/// JWKS (JSON Web Key Set) response
#[derive(Debug, Deserialize)]
struct JwksResponse {
    keys: Vec<Jwk>,
}

/// Individual JWK (JSON Web Key)
#[derive(Debug, Clone, Deserialize)]
#[allow(dead_code)] // RFC 7517 fields, not all read
struct Jwk {
    /// Key ID
    kid: Option<String>,
    /// Key type
    kty: String,
    /// Algorithm
    alg: Option<String>,
    /// Use (sig for signing)
    #[serde(rename = "use")]
    key_use: Option<String>,
    /// RSA modulus
    n: Option<String>,
    /// RSA exponent
    e: Option<String>,
}

/// Claims carried by a Firebase ID token
#[derive(Debug, Deserialize)]
struct FirebaseClaims {
    /// Issuer
    iss: String,
    /// Subject (the Firebase uid)
    sub: String,
    /// Expiration
    exp: i64,
    /// Issued at
    iat: i64,
    /// Time the user authenticated
    auth_time: Option<i64>,
    /// Email address
    email: Option<String>,
    /// All other claims
    #[serde(flatten)]
    extra: HashMap<String, serde_json::Value>,
}

/// Firebase ID token verifier
pub struct FirebaseVerifier {
    config: FirebaseConfig,
    /// JWKS cache (url -> JWKS)
    jwks_cache: Cache<String, Arc<JwksResponse>>,
    /// HTTP client for fetching JWKS
    http_client: reqwest::Client,
}

impl FirebaseVerifier {
    /// Create a new verifier
    pub fn new(config: FirebaseConfig) -> Self {
        info!(
            project_id = %config.project_id,
            jwks_url = %config.jwks_url,
            "Firebase token verification enabled"
        );
        Self {
            jwks_cache: Cache::builder()
                .time_to_live(config.jwks_ttl)
                .max_capacity(4)
                .build(),
            http_client: reqwest::Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &FirebaseConfig {
        &self.config
    }

    /// Fetch the JWKS (with caching)
    async fn fetch_jwks(&self, refresh: bool) -> Result<Arc<JwksResponse>> {
        let url = &self.config.jwks_url;

        if refresh {
            self.jwks_cache.invalidate(url).await;
        } else if let Some(cached) = self.jwks_cache.get(url).await {
            debug!(url = %url, "Using cached JWKS");
            return Ok(cached);
        }

        debug!(url = %url, "Fetching JWKS");
        let response = self
            .http_client
            .get(url)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| AuthError::JwksFetchError(e.to_string()))?;

        let jwks: JwksResponse = response
            .json()
            .await
            .map_err(|e| AuthError::JwksFetchError(e.to_string()))?;

        let jwks = Arc::new(jwks);
        self.jwks_cache.insert(url.clone(), jwks.clone()).await;

        Ok(jwks)
    }

    /// Decoding key for `kid`, refetching the key set once on a miss so
    /// rotated keys are picked up before the cache expires
    async fn decoding_key(&self, kid: &str) -> Result<DecodingKey> {
        let jwks = self.fetch_jwks(false).await?;
        if let Some(jwk) = find_key(&jwks, kid) {
            return decoding_key_from_jwk(jwk);
        }

        debug!(kid = %kid, "Key not in cached JWKS, refreshing");
        let jwks = self.fetch_jwks(true).await?;
        let jwk = find_key(&jwks, kid).ok_or_else(|| AuthError::KeyNotFound(kid.to_string()))?;
        decoding_key_from_jwk(jwk)
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[self.config.issuer()]);
        validation.set_audience(&[&self.config.project_id]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation.leeway = self.config.leeway_secs;
        validation
    }

    /// Checks jsonwebtoken does not cover
    fn check_claims(&self, claims: &FirebaseClaims) -> Result<()> {
        if claims.sub.is_empty() {
            return Err(AuthError::InvalidClaim {
                claim: "sub".into(),
                reason: "must be a non-empty string".into(),
            });
        }
        if claims.sub.len() > MAX_UID_LEN {
            return Err(AuthError::InvalidClaim {
                claim: "sub".into(),
                reason: format!("longer than {} characters", MAX_UID_LEN),
            });
        }

        let latest = Utc::now().timestamp() + self.config.leeway_secs as i64;
        if claims.iat > latest {
            return Err(AuthError::NotYetValid(format!("iat {} is in the future", claims.iat)));
        }
        if let Some(auth_time) = claims.auth_time {
            if auth_time > latest {
                return Err(AuthError::NotYetValid(format!(
                    "auth_time {} is in the future",
                    auth_time
                )));
            }
        }
        Ok(())
    }
}

fn find_key<'a>(jwks: &'a JwksResponse, kid: &str) -> Option<&'a Jwk> {
    jwks.keys.iter().find(|k| k.kid.as_deref() == Some(kid))
}

fn decoding_key_from_jwk(jwk: &Jwk) -> Result<DecodingKey> {
    if jwk.kty != "RSA" {
        return Err(AuthError::UnsupportedAlgorithm(format!("Key type: {}", jwk.kty)));
    }
    let n = jwk
        .n
        .as_ref()
        .ok_or_else(|| AuthError::InvalidFormat("Missing RSA modulus".into()))?;
    let e = jwk
        .e
        .as_ref()
        .ok_or_else(|| AuthError::InvalidFormat("Missing RSA exponent".into()))?;

    DecodingKey::from_rsa_components(n, e).map_err(|e| AuthError::InvalidFormat(e.to_string()))
}

#[async_trait]
impl TokenVerifier for FirebaseVerifier {
    fn description(&self) -> &str {
        "Firebase ID token verifier"
    }

    async fn verify(&self, token: &str) -> Result<Principal> {
        // Step 1: Header must name an RS256 key
        let header = decode_header(token).map_err(|e| AuthError::InvalidFormat(e.to_string()))?;
        if header.alg != Algorithm::RS256 {
            return Err(AuthError::UnsupportedAlgorithm(format!("{:?}", header.alg)));
        }
        let kid = header
            .kid
            .ok_or_else(|| AuthError::InvalidFormat("Token header has no kid".into()))?;

        // Step 2: Signing key
        let decoding_key = self.decoding_key(&kid).await?;

        // Step 3: Signature, exp, iss, aud
        let token_data = decode::<FirebaseClaims>(token, &decoding_key, &self.validation())?;
        let claims = token_data.claims;

        // Step 4: sub, iat, auth_time
        self.check_claims(&claims)?;

        let mut principal = Principal::new(claims.sub).with_issuer(claims.iss);
        if let Some(exp) = Utc.timestamp_opt(claims.exp, 0).single() {
            principal = principal.with_expires_at(exp);
        }
        if let Some(email) = claims.email {
            principal = principal.with_email(email);
        }
        for (key, value) in claims.extra {
            principal = principal.with_claim(key, value);
        }

        Ok(principal)
    }
}
