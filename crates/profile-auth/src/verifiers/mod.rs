//! Token verifiers for the supported identity providers

pub mod firebase;
pub mod static_tokens;

pub use firebase::{FirebaseConfig, FirebaseVerifier, FIREBASE_ISSUER_PREFIX, GOOGLE_SECURETOKEN_JWKS_URL};
pub use static_tokens::StaticTokenVerifier;
