// SPDX-License-Identifier: MPL-2.0

//! Composition root: one store handle, one bus, and the services that share them.

use crate::clock::{Clock, SystemClock};
use crate::config::{AppConfig, ConfigError};
use crate::events::{AppEvent, EventBus};
use crate::posts::{ComposeError, Composer, MediaError, PostRepository, RepositoryError};
use crate::state::{Navigation, RouteGuard, SessionError, SessionGate, Settings, SettingsError};
use crate::store::{LocalStore, SqliteStore, StorageChange, Store, StoreError};
use crate::views::{AnalyticsSnapshot, DashboardSummary};
use rand::Rng;
use std::rc::Rc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Compose(#[from] ComposeError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Media(#[from] MediaError),
}

pub struct App {
    config: AppConfig,
    store: LocalStore,
    bus: EventBus,
    session: SessionGate,
    guard: RouteGuard,
    posts: PostRepository,
    settings: Settings,
}

impl App {
    /// Open the on-disk store named by `config`
    pub fn open(config: AppConfig) -> Result<Self, AppError> {
        let path = config.store_path()?;
        let store = SqliteStore::open(&path)?;
        Self::with_store(config, store, Rc::new(SystemClock))
    }

    pub fn with_store(
        config: AppConfig,
        backend: impl Store + 'static,
        clock: Rc<dyn Clock>,
    ) -> Result<Self, AppError> {
        let store = LocalStore::new(backend);
        let bus = EventBus::new();

        let session = SessionGate::new(store.clone(), bus.clone());
        let guard = RouteGuard::new(session.clone(), &bus)?;
        let posts = PostRepository::new(store.clone(), bus.clone(), clock);
        let settings = Settings::new(store.clone());

        Ok(Self {
            config,
            store,
            bus,
            session,
            guard,
            posts,
            settings,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn session(&self) -> &SessionGate {
        &self.session
    }

    pub fn posts(&self) -> &PostRepository {
        &self.posts
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn navigate(&self, path: &str) -> Navigation {
        self.guard.resolve(path)
    }

    pub fn is_authenticated(&self) -> bool {
        self.guard.is_authenticated()
    }

    pub fn composer(&self) -> Composer {
        Composer::new(self.posts.clone())
    }

    pub fn dashboard(&self) -> Result<DashboardSummary, RepositoryError> {
        DashboardSummary::load(&self.posts, self.posts.now(), self.config.upcoming_limit)
    }

    pub fn analytics<R: Rng>(&self, rng: &mut R) -> Result<AnalyticsSnapshot, RepositoryError> {
        let published = self.posts.list_scheduled()?.len();
        Ok(AnalyticsSnapshot::simulate(published, rng))
    }

    /// Pick up writes made through other store handles and announce each
    /// changed key as a `storage` event.
    pub fn sync_external(&self) -> Result<Vec<StorageChange>, StoreError> {
        let changes = self.store.poll_external()?;
        for change in &changes {
            tracing::debug!(key = %change.key, "external change");
            self.bus.publish(AppEvent::Storage {
                key: change.key.clone(),
            });
        }
        Ok(changes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SteppingClock;
    use crate::events::Topic;
    use crate::posts::{Platform, Tone};
    use crate::state::Route;
    use crate::store::MemoryStore;
    use chrono::{Duration, TimeZone, Utc};
    use std::cell::RefCell;

    fn clock() -> Rc<dyn Clock> {
        Rc::new(SteppingClock::new(
            Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap(),
            Duration::seconds(1),
        ))
    }

    #[test]
    fn test_sign_in_unlocks_screens() {
        let app = App::with_store(AppConfig::default(), MemoryStore::new(), clock()).unwrap();
        assert_eq!(app.navigate("/calendar"), Navigation::Redirect(Route::Auth));

        app.session().sign_in("me@example.com", "secret").unwrap();
        assert_eq!(app.navigate("/calendar"), Navigation::Render(Route::Calendar));
        assert_eq!(app.navigate("/auth"), Navigation::Redirect(Route::Dashboard));
    }

    #[test]
    fn test_logout_in_other_tab_redirects_after_sync() {
        let backend = MemoryStore::new();
        let other_tab = LocalStore::new(backend.open_tab());
        let app = App::with_store(AppConfig::default(), backend, clock()).unwrap();
        app.session().sign_in("me@example.com", "secret").unwrap();

        let other_gate = SessionGate::new(other_tab, EventBus::new());
        other_gate.logout().unwrap();

        assert!(app.is_authenticated());
        let changes = app.sync_external().unwrap();
        assert!(changes.iter().any(|c| c.key == "authToken"));
        assert!(!app.is_authenticated());
        assert_eq!(app.navigate("/dashboard"), Navigation::Redirect(Route::Auth));
    }

    #[test]
    fn test_posts_from_other_tab_reach_subscribers() {
        let backend = MemoryStore::new();
        let other_tab = LocalStore::new(backend.open_tab());
        let app = App::with_store(AppConfig::default(), backend, clock()).unwrap();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        let _sub = app.bus().subscribe(Topic::Storage, move |e| {
            if let AppEvent::Storage { key } = e {
                s.borrow_mut().push(key.clone());
            }
        });

        let other_posts = PostRepository::new(other_tab, EventBus::new(), clock());
        other_posts
            .create("from elsewhere", Platform::Twitter, Tone::Casual, None)
            .unwrap();

        app.sync_external().unwrap();
        assert_eq!(*seen.borrow(), vec!["scheduledPostsV2".to_string()]);
        assert_eq!(app.dashboard().unwrap().scheduled_count, 1);

        // Nothing new on the next poll
        assert!(app.sync_external().unwrap().is_empty());
    }
}
