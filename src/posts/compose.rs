// SPDX-License-Identifier: MPL-2.0

use crate::config::MAX_POST_CHARS;
use crate::posts::media::{ImageAttachment, is_self_contained};
use crate::posts::repository::{PostRepository, RepositoryError};
use crate::posts::{Platform, PostId, PostPatch, ScheduledPost, Tone};
use crate::validation::{self, ValidationErrors};
use thiserror::Error;
use unicode_segmentation::UnicodeSegmentation;

#[derive(Error, Debug)]
pub enum ComposeError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("{0}")]
    Invalid(#[from] ValidationErrors),
    #[error("Could not find post to edit.")]
    NotFound(PostId),
    #[error("Images must be uploaded, not linked.")]
    LinkedImage,
}

/// Placeholder for the "generate with AI" button; no model is involved.
pub fn generate_placeholder(platform: Platform, tone: Tone) -> String {
    let text = format!(
        "Generated AI Content: For {platform}, with a {tone} tone: \"This is a sample AI generated post about a trending topic that will surely engage your audience! #AIContent #{}\"",
        platform.as_str().to_uppercase()
    );
    truncate_graphemes(&text, MAX_POST_CHARS)
}

fn truncate_graphemes(text: &str, max: usize) -> String {
    text.graphemes(true).take(max).collect()
}

/// Editing state of the create-post screen.
///
/// Content checks happen here, before the repository is involved, so the
/// messages the user sees stay with the form.
pub struct Composer {
    repo: PostRepository,
    editing: Option<PostId>,
    content: String,
    platform: Platform,
    tone: Tone,
    image_name: Option<String>,
    image_data_url: Option<String>,
}

impl Composer {
    pub fn new(repo: PostRepository) -> Self {
        Self {
            repo,
            editing: None,
            content: String::new(),
            platform: Platform::default(),
            tone: Tone::default(),
            image_name: None,
            image_data_url: None,
        }
    }

    /// Open the editor on an existing post, or on the saved draft
    pub fn load(&mut self, edit: Option<PostId>) -> Result<(), ComposeError> {
        self.reset();

        match edit {
            Some(id) => {
                let post = self.repo.get(id)?.ok_or(ComposeError::NotFound(id))?;
                self.editing = Some(post.id);
                self.content = post.content;
                self.platform = post.platform;
                self.tone = post.tone;
                self.image_data_url = post.image_preview;
            }
            None => {
                let draft = self.repo.load_draft()?;
                self.content = draft.content;
                // A preview without a file name came from an edit, not an upload
                if draft.image_name.is_some() && draft.image_data_url.is_some() {
                    self.image_name = draft.image_name;
                    self.image_data_url = draft.image_data_url;
                }
            }
        }
        Ok(())
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn tone(&self) -> Tone {
        self.tone
    }

    pub fn image_preview(&self) -> Option<&str> {
        self.image_data_url.as_deref()
    }

    /// Replace the content unless it would exceed the length limit
    pub fn set_content(&mut self, content: impl Into<String>) -> bool {
        let content = content.into();
        if validation::char_count(&content) > MAX_POST_CHARS {
            return false;
        }
        self.content = content;
        true
    }

    pub fn set_platform(&mut self, platform: Platform) {
        self.platform = platform;
    }

    pub fn set_tone(&mut self, tone: Tone) {
        self.tone = tone;
    }

    pub fn attach(&mut self, image: ImageAttachment) {
        self.image_name = Some(image.name);
        self.image_data_url = Some(image.data_url);
    }

    pub fn remove_image(&mut self) {
        self.image_name = None;
        self.image_data_url = None;
    }

    /// Fill the editor with placeholder text for the current platform and tone
    pub fn generate(&mut self) {
        self.content = generate_placeholder(self.platform, self.tone);
    }

    pub fn save_draft(&self) -> Result<(), ComposeError> {
        self.check_image()?;
        self.repo.save_draft(
            self.content.clone(),
            self.image_name.clone(),
            self.image_data_url.clone(),
        )?;
        Ok(())
    }

    /// Schedule a new post or update the one being edited, then clear the
    /// draft and the editor.
    pub fn schedule(&mut self) -> Result<ScheduledPost, ComposeError> {
        validation::validate_post_content(&self.content)?;
        self.check_image()?;

        let post = match self.editing {
            Some(id) => {
                let patch = PostPatch {
                    content: Some(self.content.clone()),
                    platform: Some(self.platform),
                    tone: Some(self.tone),
                    image_preview: Some(self.image_data_url.clone()),
                };
                self.repo.update(id, patch).map_err(|e| match e {
                    RepositoryError::NotFound(id) => ComposeError::NotFound(id),
                    other => ComposeError::Repository(other),
                })?
            }
            None => self.repo.create(
                self.content.clone(),
                self.platform,
                self.tone,
                self.image_data_url.clone(),
            )?,
        };

        self.repo.clear_draft()?;
        self.reset();
        Ok(post)
    }

    /// Stored previews must embed the image itself
    fn check_image(&self) -> Result<(), ComposeError> {
        match &self.image_data_url {
            Some(url) if !is_self_contained(url) => Err(ComposeError::LinkedImage),
            _ => Ok(()),
        }
    }

    fn reset(&mut self) {
        self.editing = None;
        self.content.clear();
        self.remove_image();
    }
}
