//! Error types for token verification

use thiserror::Error;

/// Result type for token verification
pub type Result<T> = std::result::Result<T, AuthError>;

/// Errors that can occur while verifying a bearer token
#[derive(Error, Debug)]
pub enum AuthError {
    /// No `Authorization: Bearer <token>` header
    #[error("Missing bearer token")]
    MissingToken,

    /// Token validation failed
    #[error("Token validation failed: {0}")]
    ValidationFailed(String),

    /// Token has expired
    #[error("Token expired")]
    Expired,

    /// Token issued in the future
    #[error("Token not valid yet: {0}")]
    NotYetValid(String),

    /// Malformed token
    #[error("Invalid token format: {0}")]
    InvalidFormat(String),

    /// Invalid signature
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    /// JWKS fetch error
    #[error("Failed to fetch JWKS: {0}")]
    JwksFetchError(String),

    /// Key not found in JWKS
    #[error("Key not found: {0}")]
    KeyNotFound(String),

    /// Unsupported algorithm
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Missing required claim
    #[error("Missing required claim: {0}")]
    MissingClaim(String),

    /// Claim present but unacceptable
    #[error("Invalid claim '{claim}': {reason}")]
    InvalidClaim { claim: String, reason: String },

    /// Token not in the static table
    #[error("Unknown token")]
    UnknownToken,

    /// Malformed verifier configuration
    #[error("Invalid verifier configuration: {0}")]
    Configuration(String),

    /// HTTP error
    #[error("HTTP error: {0}")]
    HttpError(String),
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        match err.kind() {
            ErrorKind::ExpiredSignature => AuthError::Expired,
            ErrorKind::ImmatureSignature => AuthError::NotYetValid("nbf is in the future".into()),
            ErrorKind::InvalidSignature => AuthError::InvalidSignature(err.to_string()),
            ErrorKind::InvalidToken | ErrorKind::Base64(_) | ErrorKind::Json(_) | ErrorKind::Utf8(_) => {
                AuthError::InvalidFormat(err.to_string())
            }
            ErrorKind::InvalidIssuer => AuthError::InvalidClaim {
                claim: "iss".into(),
                reason: err.to_string(),
            },
            ErrorKind::InvalidAudience => AuthError::InvalidClaim {
                claim: "aud".into(),
                reason: err.to_string(),
            },
            ErrorKind::MissingRequiredClaim(claim) => AuthError::MissingClaim(claim.clone()),
            _ => AuthError::ValidationFailed(err.to_string()),
        }
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        AuthError::HttpError(err.to_string())
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(err: serde_json::Error) -> Self {
        AuthError::InvalidFormat(err.to_string())
    }
}
