//! # Profile Core
//!
//! Document model for user onboarding profiles.
//!
//! A profile is a JSON object keyed by the owner's subject identifier. The
//! service only ever touches a handful of fields itself (`uid`, `createdAt`,
//! `lastUpdated`, `onboardingCompleted`, `onboarding.currentStep`); everything
//! else the client sends is stored verbatim.
//!
//! ## Write Rules
//!
//! - **Merge**: nested objects merge key by key, every other value replaces
//!   what was there before
//! - **Field update**: a dotted [`FieldPath`] sets one nested field
//! - **Timestamps**: `createdAt` is written once, `lastUpdated` on every write,
//!   both taken from a [`Clock`] that never runs backwards

pub mod clock;
pub mod document;
pub mod error;
pub mod onboarding;

pub use clock::{Clock, ManualClock, SystemClock, Timestamp};
pub use document::{fields, upsert_patch, FieldPath, FieldUpdates, ProfileDocument};
pub use error::{CoreError, Result};
pub use onboarding::{OnboardingStatus, OnboardingUpdate};
