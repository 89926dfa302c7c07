// SPDX-License-Identifier: MPL-2.0

//! Which screen a path leads to, given the session state.
//!
//! Signed out, only the auth screen is reachable. Signed in, the auth screen,
//! the root and any unknown path land on the dashboard.

use crate::events::{AppEvent, EventBus, Subscription, Topic};
use crate::state::session::{AuthToken, SessionGate};
use crate::store::{Record, StoreError};
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Auth,
    Dashboard,
    Calendar,
    CreatePost,
    Analytics,
    Settings,
    About,
}

impl Route {
    /// Where signed-in users land by default
    pub const LANDING: Route = Route::Dashboard;

    pub fn path(self) -> &'static str {
        match self {
            Route::Auth => "/auth",
            Route::Dashboard => "/dashboard",
            Route::Calendar => "/calendar",
            Route::CreatePost => "/create-post",
            Route::Analytics => "/analytics",
            Route::Settings => "/settings",
            Route::About => "/about",
        }
    }

    pub fn from_path(path: &str) -> Option<Route> {
        // Query strings (e.g. `/create-post?edit=42`) don't change the screen
        let path = path.split('?').next().unwrap_or(path);
        match path.trim_end_matches('/') {
            "/auth" => Some(Route::Auth),
            "/dashboard" => Some(Route::Dashboard),
            "/calendar" => Some(Route::Calendar),
            "/create-post" => Some(Route::CreatePost),
            "/analytics" => Some(Route::Analytics),
            "/settings" => Some(Route::Settings),
            "/about" => Some(Route::About),
            _ => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Outcome of resolving a path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Render(Route),
    Redirect(Route),
}

impl Navigation {
    /// The screen that ends up on display
    pub fn target(self) -> Route {
        match self {
            Navigation::Render(route) | Navigation::Redirect(route) => route,
        }
    }
}

pub fn resolve(path: &str, authenticated: bool) -> Navigation {
    let route = Route::from_path(path);
    match (authenticated, route) {
        (false, Some(Route::Auth)) => Navigation::Render(Route::Auth),
        (false, _) => Navigation::Redirect(Route::Auth),
        (true, Some(Route::Auth)) | (true, None) => Navigation::Redirect(Route::LANDING),
        (true, Some(route)) => Navigation::Render(route),
    }
}

/// Keeps the authenticated flag current for routing.
///
/// The flag is re-derived from the store whenever `authChange` fires, and
/// whenever the token is changed through another store handle.
pub struct RouteGuard {
    authenticated: Rc<Cell<bool>>,
    _subscriptions: Vec<Subscription>,
}

impl RouteGuard {
    pub fn new(gate: SessionGate, bus: &EventBus) -> Result<Self, StoreError> {
        let authenticated = Rc::new(Cell::new(gate.is_authenticated()?));

        let refresh = {
            let authenticated = Rc::clone(&authenticated);
            move || match gate.is_authenticated() {
                Ok(value) => authenticated.set(value),
                Err(e) => tracing::warn!(error = %e, "could not re-derive session state"),
            }
        };

        let on_auth = refresh.clone();
        let auth_sub = bus.subscribe(Topic::AuthChange, move |_| on_auth());
        let storage_sub = bus.subscribe(Topic::Storage, move |event| {
            if matches!(event, AppEvent::Storage { key } if key == AuthToken::KEY) {
                refresh();
            }
        });

        Ok(Self {
            authenticated,
            _subscriptions: vec![auth_sub, storage_sub],
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated.get()
    }

    pub fn resolve(&self, path: &str) -> Navigation {
        resolve(path, self.is_authenticated())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::settings::UserProfile;
    use crate::store::{LocalStore, MemoryStore, Store};

    #[test]
    fn test_signed_out_routes() {
        assert_eq!(resolve("/auth", false), Navigation::Render(Route::Auth));
        for path in ["/", "/dashboard", "/settings", "/nowhere"] {
            assert_eq!(resolve(path, false), Navigation::Redirect(Route::Auth));
        }
    }

    #[test]
    fn test_signed_in_routes() {
        assert_eq!(resolve("/auth", true), Navigation::Redirect(Route::Dashboard));
        assert_eq!(resolve("/", true), Navigation::Redirect(Route::Dashboard));
        assert_eq!(resolve("/nowhere", true), Navigation::Redirect(Route::Dashboard));
        assert_eq!(resolve("/calendar", true), Navigation::Render(Route::Calendar));
        assert_eq!(
            resolve("/create-post?edit=42", true),
            Navigation::Render(Route::CreatePost)
        );
        assert_eq!(resolve("/about/", true).target(), Route::About);
    }

    #[test]
    fn test_guard_follows_auth_events() {
        let store = LocalStore::new(MemoryStore::new());
        let bus = EventBus::new();
        let gate = SessionGate::new(store, bus.clone());
        let guard = RouteGuard::new(gate.clone(), &bus).unwrap();

        assert_eq!(guard.resolve("/dashboard"), Navigation::Redirect(Route::Auth));
        gate.login(AuthToken("t".to_string()), &UserProfile::default())
            .unwrap();
        assert_eq!(guard.resolve("/dashboard"), Navigation::Render(Route::Dashboard));
        gate.logout().unwrap();
        assert!(!guard.is_authenticated());
    }

    #[test]
    fn test_guard_follows_out_of_band_token_changes() {
        let backend = MemoryStore::new();
        let other_tab = backend.open_tab();
        let store = LocalStore::new(backend);
        let bus = EventBus::new();
        let gate = SessionGate::new(store.clone(), bus.clone());
        gate.login(AuthToken("t".to_string()), &UserProfile::default())
            .unwrap();
        let guard = RouteGuard::new(gate, &bus).unwrap();
        assert!(guard.is_authenticated());

        // Token cleared elsewhere; no authChange in this process
        other_tab.remove("authToken").unwrap();
        assert!(guard.is_authenticated());

        for change in store.poll_external().unwrap() {
            bus.publish(AppEvent::Storage { key: change.key });
        }
        assert!(!guard.is_authenticated());
        assert_eq!(guard.resolve("/settings"), Navigation::Redirect(Route::Auth));
    }
}
