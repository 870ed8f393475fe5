//! Onboarding status request and response bodies

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::clock::Timestamp;
use crate::document::{fields, FieldPath, FieldUpdates};

/// Body of `PUT /api/users/profile/onboarding`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OnboardingUpdate {
    /// Current onboarding step; numbers and step names are both accepted
    pub step: Value,

    /// Whether onboarding is finished
    pub completed: bool,
}

impl OnboardingUpdate {
    /// Field updates for this request stamped at `now`
    pub fn field_updates(&self, now: Timestamp) -> FieldUpdates {
        FieldUpdates::new()
            .set(FieldPath::field(fields::ONBOARDING_COMPLETED), self.completed)
            .set(FieldPath::field(fields::LAST_UPDATED), now.to_json())
            .set(
                FieldPath::field(fields::ONBOARDING).child(fields::CURRENT_STEP),
                self.step.clone(),
            )
    }

    pub fn status(&self) -> OnboardingStatus {
        OnboardingStatus {
            current_step: self.step.clone(),
            onboarding_completed: self.completed,
        }
    }
}

/// Response of a successful onboarding status update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingStatus {
    pub current_step: Value,
    pub onboarding_completed: bool,
}
