// SPDX-License-Identifier: MPL-2.0

use crate::store::{LocalStore, StoreError};
use crate::validation::{self, ValidationErrors};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("{0}")]
    Invalid(#[from] ValidationErrors),
}

/// Account details shown in the header and edited on the settings screen
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    pub name: String,
    pub email: String,
    pub bio: String,
}

crate::json_record!(UserProfile, "userProfileSettings");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationPrefs {
    pub email: bool,
    pub ai_suggestions: bool,
}

impl Default for NotificationPrefs {
    fn default() -> Self {
        Self {
            email: true,
            ai_suggestions: false,
        }
    }
}

crate::json_record!(NotificationPrefs, "notificationsSettings");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Email,
    AiSuggestions,
}

impl NotificationKind {
    pub fn label(self) -> &'static str {
        match self {
            NotificationKind::Email => "Email",
            NotificationKind::AiSuggestions => "AI suggestions",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for NotificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "email" => Ok(NotificationKind::Email),
            "ai-suggestions" | "aiSuggestions" => Ok(NotificationKind::AiSuggestions),
            other => Err(format!("unknown notification kind: {other}")),
        }
    }
}

impl NotificationPrefs {
    pub fn get(&self, kind: NotificationKind) -> bool {
        match kind {
            NotificationKind::Email => self.email,
            NotificationKind::AiSuggestions => self.ai_suggestions,
        }
    }

    fn flip(&mut self, kind: NotificationKind) {
        match kind {
            NotificationKind::Email => self.email = !self.email,
            NotificationKind::AiSuggestions => self.ai_suggestions = !self.ai_suggestions,
        }
    }
}

/// Settings screen operations: profile form and notification switches
#[derive(Clone)]
pub struct Settings {
    store: LocalStore,
}

impl Settings {
    pub fn new(store: LocalStore) -> Self {
        Self { store }
    }

    pub fn profile(&self) -> Result<UserProfile, StoreError> {
        self.store.get::<UserProfile>()
    }

    /// Validate and overwrite the stored profile
    pub fn save_profile(&self, profile: &UserProfile) -> Result<(), SettingsError> {
        validation::validate_profile(&profile.name, &profile.email)?;
        self.store.set(profile)?;
        tracing::info!("profile saved");
        Ok(())
    }

    pub fn notifications(&self) -> Result<NotificationPrefs, StoreError> {
        self.store.get::<NotificationPrefs>()
    }

    /// Flip one preference and persist the whole record. Returns the new value.
    pub fn toggle(&self, kind: NotificationKind) -> Result<bool, StoreError> {
        let mut prefs = self.notifications()?;
        prefs.flip(kind);
        self.store.set(&prefs)?;

        let enabled = prefs.get(kind);
        tracing::info!(%kind, enabled, "notification preference changed");
        Ok(enabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::validation::Field;

    fn settings() -> (Settings, LocalStore) {
        let store = LocalStore::new(MemoryStore::new());
        (Settings::new(store.clone()), store)
    }

    #[test]
    fn test_notification_defaults() {
        let (settings, _) = settings();
        let prefs = settings.notifications().unwrap();
        assert!(prefs.email);
        assert!(!prefs.ai_suggestions);
    }

    #[test]
    fn test_toggle_persists_whole_record() {
        let (settings, store) = settings();
        assert!(settings.toggle(NotificationKind::AiSuggestions).unwrap());
        assert_eq!(
            store.backend().get_raw("notificationsSettings").unwrap().as_deref(),
            Some(r#"{"email":true,"aiSuggestions":true}"#)
        );
        assert!(!settings.toggle(NotificationKind::Email).unwrap());
        assert!(!settings.notifications().unwrap().email);
    }

    #[test]
    fn test_save_profile_validates() {
        let (settings, store) = settings();
        let bad = UserProfile {
            name: "Ada".to_string(),
            email: "nope".to_string(),
            bio: String::new(),
        };
        let err = settings.save_profile(&bad).unwrap_err();
        let SettingsError::Invalid(errors) = err else {
            panic!("expected validation failure");
        };
        assert!(errors.get(Field::Email).is_some());
        assert!(store.backend().get_raw("userProfileSettings").unwrap().is_none());

        let good = UserProfile {
            email: "ada@example.com".to_string(),
            ..bad
        };
        settings.save_profile(&good).unwrap();
        assert_eq!(settings.profile().unwrap(), good);
    }

    #[test]
    fn test_profile_from_partial_record() {
        let (settings, store) = settings();
        store.backend().set_raw("userProfileSettings", r#"{"name":"Ada"}"#).unwrap();
        let profile = settings.profile().unwrap();
        assert_eq!(profile.name, "Ada");
        assert!(profile.email.is_empty());
    }

    #[test]
    fn test_parse_notification_kind() {
        assert_eq!("email".parse::<NotificationKind>(), Ok(NotificationKind::Email));
        assert_eq!(
            "ai-suggestions".parse::<NotificationKind>(),
            Ok(NotificationKind::AiSuggestions)
        );
        assert!("sms".parse::<NotificationKind>().is_err());
    }
}
