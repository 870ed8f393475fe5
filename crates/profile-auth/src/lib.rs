//! Token Verification
//!
//! Turns the `Authorization` header of an incoming request into an
//! authenticated [`Principal`].
//!
//! ## Architecture
//!
//! Every backend implements [`TokenVerifier`]. The service holds exactly one
//! verifier for the lifetime of the process:
//!
//! - **Firebase**: checks Firebase ID tokens against Google's published keys
//! - **Static**: a fixed token table for local development and tests
//!
//! ## Usage
//!
//! ```ignore
//! use profile_auth::{authenticate, verifiers::FirebaseVerifier, FirebaseConfig};
//!
//! let verifier = FirebaseVerifier::new(FirebaseConfig::new("my-project"));
//! let principal = authenticate(&verifier, Some("Bearer eyJ...")).await?;
//! println!("uid: {}", principal.uid);
//! ```
//!
//! Failures never say why to the caller; the reason is logged and the HTTP
//! layer answers a flat 401.

pub mod error;
pub mod types;
pub mod verifier;
pub mod verifiers;

pub use error::{AuthError, Result};
pub use types::Principal;
pub use verifier::{authenticate, extract_bearer, TokenVerifier};
pub use verifiers::{FirebaseConfig, FirebaseVerifier, StaticTokenVerifier};
