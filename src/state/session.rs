// SPDX-License-Identifier: MPL-2.0

use crate::config::SIMULATED_TOKEN;
use crate::events::{AppEvent, EventBus};
use crate::state::settings::UserProfile;
use crate::store::{LocalStore, Record, StoreError};
use crate::validation::{self, ValidationErrors};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("{0}")]
    Invalid(#[from] ValidationErrors),
}

/// Opaque session credential. Stored as the bare string, not JSON-quoted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthToken(pub String);

impl AuthToken {
    pub fn is_present(&self) -> bool {
        !self.0.is_empty()
    }
}

impl Record for AuthToken {
    const KEY: &'static str = "authToken";

    fn encode(&self) -> Result<String, StoreError> {
        Ok(self.0.clone())
    }

    fn decode(raw: &str) -> Result<Self, StoreError> {
        Ok(Self(raw.to_string()))
    }
}

/// Derives "signed in" from the stored token.
///
/// Authentication is simulated: the token is never inspected, any non-empty
/// value is a valid session and nothing expires.
#[derive(Clone)]
pub struct SessionGate {
    store: LocalStore,
    bus: EventBus,
}

impl SessionGate {
    pub fn new(store: LocalStore, bus: EventBus) -> Self {
        Self { store, bus }
    }

    pub fn is_authenticated(&self) -> Result<bool, StoreError> {
        Ok(self
            .store
            .get_optional::<AuthToken>()?
            .is_some_and(|t| t.is_present()))
    }

    /// Store the session and announce it
    pub fn login(&self, token: AuthToken, profile: &UserProfile) -> Result<(), StoreError> {
        self.store.set(&token)?;
        self.store.set(profile)?;

        tracing::info!(email = %profile.email, "signed in");
        self.bus.publish(AppEvent::AuthChange);
        Ok(())
    }

    /// Forget the session and the profile that came with it
    pub fn logout(&self) -> Result<(), StoreError> {
        self.store.remove::<AuthToken>()?;
        self.store.remove::<UserProfile>()?;

        tracing::info!("signed out");
        self.bus.publish(AppEvent::AuthChange);
        Ok(())
    }

    /// Simulated sign-in for an existing account
    pub fn sign_in(&self, email: &str, password: &str) -> Result<UserProfile, SessionError> {
        validation::validate_sign_in(email, password)?;

        let profile = UserProfile {
            name: "Demo User".to_string(),
            email: email.to_string(),
            bio: "Logged in user".to_string(),
        };
        self.login(AuthToken(SIMULATED_TOKEN.to_string()), &profile)?;
        Ok(profile)
    }

    /// Simulated account creation; signs the new account in
    pub fn sign_up(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<UserProfile, SessionError> {
        validation::validate_sign_up(name, email, password)?;

        let profile = UserProfile {
            name: name.to_string(),
            email: email.to_string(),
            bio: String::new(),
        };
        self.login(AuthToken(SIMULATED_TOKEN.to_string()), &profile)?;
        Ok(profile)
    }

    /// Profile shown in the header; empty when signed out
    pub fn profile(&self) -> Result<UserProfile, StoreError> {
        self.store.get::<UserProfile>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Topic;
    use crate::store::MemoryStore;
    use crate::validation::Field;
    use std::cell::Cell;
    use std::rc::Rc;

    fn gate() -> (SessionGate, EventBus, LocalStore) {
        let store = LocalStore::new(MemoryStore::new());
        let bus = EventBus::new();
        (SessionGate::new(store.clone(), bus.clone()), bus, store)
    }

    fn profile() -> UserProfile {
        UserProfile {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            bio: String::new(),
        }
    }

    #[test]
    fn test_login_logout_toggle_authentication() {
        let (gate, bus, _) = gate();
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        let _sub = bus.subscribe(Topic::AuthChange, move |_| c.set(c.get() + 1));

        assert!(!gate.is_authenticated().unwrap());

        gate.login(AuthToken("abc".to_string()), &profile()).unwrap();
        assert!(gate.is_authenticated().unwrap());
        assert_eq!(count.get(), 1);

        gate.logout().unwrap();
        assert!(!gate.is_authenticated().unwrap());
        assert_eq!(count.get(), 2);
        assert_eq!(gate.profile().unwrap(), UserProfile::default());
    }

    #[test]
    fn test_token_stored_as_bare_string() {
        let (gate, _, store) = gate();
        gate.login(AuthToken("fake-jwt-token".to_string()), &profile())
            .unwrap();
        assert_eq!(
            store.backend().get_raw("authToken").unwrap().as_deref(),
            Some("fake-jwt-token")
        );
    }

    #[test]
    fn test_empty_token_is_not_a_session() {
        let (gate, _, store) = gate();
        store.backend().set_raw("authToken", "").unwrap();
        assert!(!gate.is_authenticated().unwrap());
    }

    #[test]
    fn test_sign_in_writes_demo_profile() {
        let (gate, _, _) = gate();
        let profile = gate.sign_in("me@example.com", "pw").unwrap();
        assert_eq!(profile.name, "Demo User");
        assert_eq!(profile.bio, "Logged in user");
        assert_eq!(gate.profile().unwrap(), profile);
        assert!(gate.is_authenticated().unwrap());
    }

    #[test]
    fn test_invalid_sign_up_leaves_session_untouched() {
        let (gate, bus, _) = gate();
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        let _sub = bus.subscribe(Topic::AuthChange, move |_| c.set(c.get() + 1));

        let err = gate.sign_up("Ada", "ada@example.com", "123").unwrap_err();
        let SessionError::Invalid(errors) = err else {
            panic!("expected validation failure");
        };
        assert!(errors.get(Field::Password).is_some());
        assert!(!gate.is_authenticated().unwrap());
        assert_eq!(count.get(), 0);
    }
}
