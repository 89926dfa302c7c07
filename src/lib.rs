// SPDX-License-Identifier: MPL-2.0

//! Local-first content planner.
//!
//! All state lives in a key-value store as whole JSON records under fixed
//! keys. Components never share in-memory state; they announce changes on an
//! [`events::EventBus`] and re-read the store when notified, including when
//! another handle on the same store changed something.

pub mod app;
pub mod clock;
pub mod config;
pub mod events;
pub mod posts;
pub mod state;
pub mod store;
pub mod validation;
pub mod views;

pub use app::{App, AppError};
