// SPDX-License-Identifier: MPL-2.0

pub mod compose;
pub mod media;
mod repository;
mod types;

pub use compose::{ComposeError, Composer};
pub use media::{ImageAttachment, MediaError};
pub use repository::{PostRepository, RepositoryError};
pub use types::{
    ParseEnumError, Platform, PostDraft, PostId, PostPatch, ScheduledPost, ScheduledPosts, Tone,
};
