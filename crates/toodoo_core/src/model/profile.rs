//! Onboarding profile model.

use serde::{Deserialize, Serialize};

/// First-run profile persisted independently from tasks.
///
/// Missing fields in persisted data fall back to the defaults, so a profile
/// written before onboarding finished still loads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    /// Display name, empty until onboarding collects one.
    pub user_name: String,
    pub has_completed_onboarding: bool,
}

impl UserProfile {
    /// Returns whether the onboarding flow should be shown.
    pub fn is_first_visit(&self) -> bool {
        !self.has_completed_onboarding
    }
}
