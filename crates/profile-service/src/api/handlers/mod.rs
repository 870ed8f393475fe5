//! API request handlers

pub mod profile;

pub use profile::{get_profile, update_onboarding, upsert_profile};
