// SPDX-License-Identifier: MPL-2.0

use crate::clock::Clock;
use crate::events::{AppEvent, EventBus};
use crate::posts::{Platform, PostDraft, PostId, PostPatch, ScheduledPost, ScheduledPosts, Tone};
use crate::store::{LocalStore, Record, StoreError};
use chrono::{DateTime, Utc};
use std::rc::Rc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("no scheduled post with id {0}")]
    NotFound(PostId),
}

/// Scheduled posts and the draft slot.
///
/// The repository does not validate content; callers check length and
/// emptiness and own the resulting messages. Every change to the post list
/// is announced on the bus as `postsUpdated`.
#[derive(Clone)]
pub struct PostRepository {
    store: LocalStore,
    bus: EventBus,
    clock: Rc<dyn Clock>,
}

impl PostRepository {
    pub fn new(store: LocalStore, bus: EventBus, clock: Rc<dyn Clock>) -> Self {
        Self { store, bus, clock }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// All scheduled posts in insertion order
    pub fn list_scheduled(&self) -> Result<Vec<ScheduledPost>, RepositoryError> {
        Ok(self.store.get::<ScheduledPosts>()?.0)
    }

    pub fn get(&self, id: PostId) -> Result<Option<ScheduledPost>, RepositoryError> {
        Ok(self.list_scheduled()?.into_iter().find(|p| p.id == id))
    }

    /// All posts, earliest schedule time first
    pub fn calendar(&self) -> Result<Vec<ScheduledPost>, RepositoryError> {
        let mut posts = self.list_scheduled()?;
        posts.sort_by_key(|p| p.scheduled_at);
        Ok(posts)
    }

    /// Posts due at or after `now`, earliest first, at most `limit` of them
    pub fn upcoming(
        &self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<ScheduledPost>, RepositoryError> {
        let mut posts: Vec<_> = self
            .list_scheduled()?
            .into_iter()
            .filter(|p| p.scheduled_at >= now)
            .collect();
        posts.sort_by_key(|p| p.scheduled_at);
        posts.truncate(limit);
        Ok(posts)
    }

    /// Append a post scheduled for the current time.
    ///
    /// The id is the current timestamp in milliseconds; two creations within
    /// the same millisecond get the same id.
    pub fn create(
        &self,
        content: impl Into<String>,
        platform: Platform,
        tone: Tone,
        image_preview: Option<String>,
    ) -> Result<ScheduledPost, RepositoryError> {
        let now = self.clock.now();
        let post = ScheduledPost {
            content: content.into(),
            scheduled_at: now,
            image_preview,
            platform,
            tone,
            id: now.timestamp_millis(),
        };

        let mut posts = self.store.get::<ScheduledPosts>()?;
        posts.0.push(post.clone());
        self.store.set(&posts)?;

        tracing::info!(id = post.id, platform = %post.platform, "post scheduled");
        self.bus.publish(AppEvent::PostsUpdated);
        Ok(post)
    }

    /// Merge `patch` into every post with `id`, keeping their schedule times.
    /// Returns the first updated post.
    ///
    /// A missing id reports [`RepositoryError::NotFound`] and leaves the
    /// store untouched.
    pub fn update(&self, id: PostId, patch: PostPatch) -> Result<ScheduledPost, RepositoryError> {
        let mut posts = self.store.get::<ScheduledPosts>()?;
        let mut updated = None;
        for post in posts.0.iter_mut().filter(|p| p.id == id) {
            patch.clone().apply(post);
            if updated.is_none() {
                updated = Some(post.clone());
            }
        }
        let updated = updated.ok_or(RepositoryError::NotFound(id))?;

        self.store.set(&posts)?;

        tracing::info!(id, "post updated");
        self.bus.publish(AppEvent::PostsUpdated);
        Ok(updated)
    }

    /// Remove every post with `id`. Returns whether anything was removed.
    pub fn delete(&self, id: PostId) -> Result<bool, RepositoryError> {
        let mut posts = self.store.get::<ScheduledPosts>()?;
        let before = posts.0.len();
        posts.0.retain(|p| p.id != id);
        let removed = posts.0.len() != before;
        self.store.set(&posts)?;

        tracing::info!(id, removed, "post deleted");
        self.bus.publish(AppEvent::PostsUpdated);
        Ok(removed)
    }

    pub fn save_draft(
        &self,
        content: impl Into<String>,
        image_name: Option<String>,
        image_data_url: Option<String>,
    ) -> Result<(), RepositoryError> {
        let draft = PostDraft {
            content: content.into(),
            image_name,
            image_data_url,
        };
        self.store.set(&draft)?;
        tracing::debug!("draft saved");
        Ok(())
    }

    pub fn load_draft(&self) -> Result<PostDraft, RepositoryError> {
        Ok(self.store.get::<PostDraft>()?)
    }

    pub fn clear_draft(&self) -> Result<(), RepositoryError> {
        self.store.remove::<PostDraft>()?;
        Ok(())
    }

    /// Drop every scheduled post and the draft
    pub fn clear_all(&self) -> Result<(), RepositoryError> {
        self.store
            .remove_keys(&[PostDraft::KEY, ScheduledPosts::KEY])?;

        tracing::info!("local posts and draft cleared");
        self.bus.publish(AppEvent::PostsUpdated);
        Ok(())
    }
}
