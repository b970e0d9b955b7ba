//! Onboarding profile store.
//!
//! # Responsibility
//! - Load and persist the `UserProfile` under its own key.
//! - Enforce the onboarding name rule before a name is accepted.

use crate::config::{ConfigError, CoreConfig};
use crate::kv::KeyValueStore;
use crate::model::profile::UserProfile;
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Rejected onboarding input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileError {
    NameTooShort { min_chars: usize },
}

impl Display for ProfileError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NameTooShort { min_chars } => {
                write!(f, "name must have at least {min_chars} characters")
            }
        }
    }
}

impl Error for ProfileError {}

/// Owner of the persisted user profile.
pub struct ProfileStore<S: KeyValueStore> {
    backend: S,
    config: CoreConfig,
    profile: UserProfile,
}

impl<S: KeyValueStore> ProfileStore<S> {
    /// Creates a store and loads the persisted profile.
    pub fn open(backend: S, config: CoreConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut store = Self {
            backend,
            config,
            profile: UserProfile::default(),
        };
        store.load();
        Ok(store)
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub fn is_first_visit(&self) -> bool {
        self.profile.is_first_visit()
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Re-reads the profile. Missing or unreadable data yields defaults.
    pub fn load(&mut self) -> &UserProfile {
        self.profile = match self.backend.get(&self.config.profile_key) {
            Ok(Some(raw)) => match serde_json::from_str::<UserProfile>(&raw) {
                Ok(profile) => profile,
                Err(err) => {
                    error!(
                        "event=profile_load module=store status=error error_code=parse_failed error={}",
                        err
                    );
                    UserProfile::default()
                }
            },
            Ok(None) => UserProfile::default(),
            Err(err) => {
                error!(
                    "event=profile_load module=store status=error error_code=kv_read_failed error={}",
                    err
                );
                UserProfile::default()
            }
        };

        info!(
            "event=profile_load module=store status=ok onboarding_completed={}",
            self.profile.has_completed_onboarding
        );
        &self.profile
    }

    /// Stores a trimmed display name.
    ///
    /// # Errors
    /// Returns `ProfileError::NameTooShort` when the trimmed name has fewer
    /// chars than `min_user_name_chars`. The profile is left unchanged.
    pub fn set_user_name(&mut self, name: &str) -> Result<(), ProfileError> {
        let trimmed = name.trim();
        let min_chars = self.config.min_user_name_chars;
        if trimmed.chars().count() < min_chars {
            return Err(ProfileError::NameTooShort { min_chars });
        }

        if self.profile.user_name != trimmed {
            self.profile.user_name = trimmed.to_string();
            self.persist();
        }
        Ok(())
    }

    /// Marks onboarding as done. Repeated calls are no-ops.
    pub fn complete_onboarding(&mut self) {
        if self.profile.has_completed_onboarding {
            return;
        }
        self.profile.has_completed_onboarding = true;
        self.persist();
        info!("event=onboarding_complete module=store status=ok");
    }

    fn persist(&mut self) {
        let payload = match serde_json::to_string(&self.profile) {
            Ok(payload) => payload,
            Err(err) => {
                error!(
                    "event=profile_persist module=store status=error error_code=encode_failed error={}",
                    err
                );
                return;
            }
        };
        if let Err(err) = self.backend.set(&self.config.profile_key, &payload) {
            warn!(
                "event=profile_persist module=store status=error error_code=kv_write_failed error={}",
                err
            );
        }
    }
}
