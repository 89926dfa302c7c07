// SPDX-License-Identifier: MPL-2.0

//! Form validation with user-facing messages.
//!
//! Each field is checked independently and every failure is collected, so a
//! form can show all of its inline errors at once. Nothing here touches the
//! store.

use crate::config::MAX_POST_CHARS;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use unicode_segmentation::UnicodeSegmentation;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\S+@\S+\.\S+").unwrap());

const MIN_PASSWORD_CHARS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Email,
    Password,
    Content,
}

impl Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Password => "password",
            Field::Content => "content",
        }
    }
}

/// Inline errors keyed by field, in the order they were found
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<(Field, String)>,
}

impl ValidationErrors {
    fn add(&mut self, field: Field, message: impl Into<String>) {
        self.errors.push((field, message.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.errors
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, m)| m.as_str())
    }

    fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, message)) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", field.as_str(), message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Length as the user perceives it
pub fn char_count(text: &str) -> usize {
    text.graphemes(true).count()
}

fn check_email(errors: &mut ValidationErrors, email: &str) {
    if email.is_empty() {
        errors.add(Field::Email, "Email is required.");
    } else if !is_valid_email(email) {
        errors.add(Field::Email, "Invalid email format.");
    }
}

pub fn validate_sign_in(email: &str, password: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    check_email(&mut errors, email);
    if password.is_empty() {
        errors.add(Field::Password, "Password is required.");
    }
    errors.into_result()
}

pub fn validate_sign_up(name: &str, email: &str, password: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    if name.is_empty() {
        errors.add(Field::Name, "Full name is required.");
    }
    check_email(&mut errors, email);
    if password.is_empty() {
        errors.add(Field::Password, "Password is required.");
    } else if password.chars().count() < MIN_PASSWORD_CHARS {
        errors.add(
            Field::Password,
            format!("Password must be at least {MIN_PASSWORD_CHARS} characters."),
        );
    }
    errors.into_result()
}

pub fn validate_profile(name: &str, email: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    if name.trim().is_empty() {
        errors.add(Field::Name, "Full Name cannot be empty.");
    }
    if email.trim().is_empty() {
        errors.add(Field::Email, "Email Address cannot be empty.");
    } else if !is_valid_email(email) {
        errors.add(Field::Email, "Please enter a valid email address.");
    }
    errors.into_result()
}

pub fn validate_post_content(content: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    if content.trim().is_empty() {
        errors.add(Field::Content, "Post content is empty.");
    } else if char_count(content) > MAX_POST_CHARS {
        errors.add(
            Field::Content,
            format!("Post content exceeds {MAX_POST_CHARS} characters."),
        );
    }
    errors.into_result()
}
