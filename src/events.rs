// SPDX-License-Identifier: MPL-2.0

//! In-process publish/subscribe for state change announcements.
//!
//! Components that render the same stored records never share a parent state
//! container; instead they subscribe here and reload from the store when a
//! topic fires. Delivery is synchronous: every subscriber of a topic has run,
//! in subscription order, before [`EventBus::publish`] returns.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Session state changed (login or logout)
    AuthChange,
    /// Scheduled post list changed
    PostsUpdated,
    /// A stored key was changed through another store handle
    Storage,
}

impl Topic {
    pub fn name(self) -> &'static str {
        match self {
            Topic::AuthChange => "authChange",
            Topic::PostsUpdated => "postsUpdated",
            Topic::Storage => "storage",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    AuthChange,
    PostsUpdated,
    /// Key of the record changed out of band
    Storage { key: String },
}

impl AppEvent {
    pub fn topic(&self) -> Topic {
        match self {
            AppEvent::AuthChange => Topic::AuthChange,
            AppEvent::PostsUpdated => Topic::PostsUpdated,
            AppEvent::Storage { .. } => Topic::Storage,
        }
    }
}

type Handler = Rc<dyn Fn(&AppEvent)>;

struct Subscriber {
    id: u64,
    topic: Topic,
    handler: Handler,
}

#[derive(Default)]
struct Registry {
    subscribers: RefCell<Vec<Subscriber>>,
    next_id: Cell<u64>,
}

impl Registry {
    fn remove(&self, id: u64) {
        self.subscribers.borrow_mut().retain(|s| s.id != id);
    }
}

/// Cheaply cloneable handle to one bus; clones share subscribers.
#[derive(Clone, Default)]
pub struct EventBus {
    registry: Rc<Registry>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `topic`. The handler stays registered until the
    /// returned [`Subscription`] is dropped or unsubscribed.
    #[must_use = "dropping the subscription unsubscribes the handler"]
    pub fn subscribe<F>(&self, topic: Topic, handler: F) -> Subscription
    where
        F: Fn(&AppEvent) + 'static,
    {
        let id = self.registry.next_id.get();
        self.registry.next_id.set(id + 1);

        self.registry.subscribers.borrow_mut().push(Subscriber {
            id,
            topic,
            handler: Rc::new(handler),
        });

        Subscription {
            id,
            registry: Rc::downgrade(&self.registry),
        }
    }

    /// Run every current subscriber of the event's topic.
    ///
    /// Handlers see a snapshot of the subscriber list, so they may publish or
    /// (un)subscribe themselves without affecting this delivery.
    pub fn publish(&self, event: AppEvent) {
        let topic = event.topic();
        let handlers: Vec<Handler> = self
            .registry
            .subscribers
            .borrow()
            .iter()
            .filter(|s| s.topic == topic)
            .map(|s| Rc::clone(&s.handler))
            .collect();

        tracing::trace!(%topic, subscribers = handlers.len(), "publish");
        for handler in handlers {
            handler(&event);
        }
    }
}

/// Keeps a handler registered; dropping it unsubscribes.
pub struct Subscription {
    id: u64,
    registry: Weak<Registry>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        // Drop does the work
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(self.id);
        }
    }
}
