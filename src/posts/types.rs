// SPDX-License-Identifier: MPL-2.0

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    Linkedin,
    Twitter,
    Instagram,
}

impl Platform {
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Linkedin => "linkedin",
            Platform::Twitter => "twitter",
            Platform::Instagram => "instagram",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Professional,
    Casual,
    Witty,
    Empathetic,
}

impl Tone {
    pub fn as_str(self) -> &'static str {
        match self {
            Tone::Professional => "professional",
            Tone::Casual => "casual",
            Tone::Witty => "witty",
            Tone::Empathetic => "empathetic",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

impl FromStr for Platform {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "linkedin" => Ok(Platform::Linkedin),
            "twitter" => Ok(Platform::Twitter),
            "instagram" => Ok(Platform::Instagram),
            _ => Err(ParseEnumError {
                kind: "platform",
                value: s.to_string(),
            }),
        }
    }
}

impl FromStr for Tone {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "professional" => Ok(Tone::Professional),
            "casual" => Ok(Tone::Casual),
            "witty" => Ok(Tone::Witty),
            "empathetic" => Ok(Tone::Empathetic),
            _ => Err(ParseEnumError {
                kind: "tone",
                value: s.to_string(),
            }),
        }
    }
}

/// Post identifier: the creation time in milliseconds since the epoch
pub type PostId = i64;

/// A post waiting for its (simulated) publish time.
///
/// Field order and names match what the browser dashboard persisted, so an
/// existing `scheduledPostsV2` blob reads back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledPost {
    pub content: String,
    #[serde(with = "js_date")]
    pub scheduled_at: DateTime<Utc>,
    /// Self-contained `data:` URL, never an external reference
    #[serde(default, deserialize_with = "lenient_string")]
    pub image_preview: Option<String>,
    #[serde(default, deserialize_with = "lenient_enum")]
    pub platform: Platform,
    #[serde(default, deserialize_with = "lenient_enum")]
    pub tone: Tone,
    pub id: PostId,
}

/// The `scheduledPostsV2` record, in insertion order.
///
/// An element that cannot be read is dropped on its own; the rest of the
/// list survives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ScheduledPosts(pub Vec<ScheduledPost>);

impl<'de> Deserialize<'de> for ScheduledPosts {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let items = Vec::<serde_json::Value>::deserialize(deserializer)?;
        let posts = items
            .into_iter()
            .filter_map(|item| match serde_json::from_value(item) {
                Ok(post) => Some(post),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping unreadable scheduled post");
                    None
                }
            })
            .collect();
        Ok(Self(posts))
    }
}

/// Null, a non-string or an unknown name reads as the default variant
fn lenient_enum<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Default,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .and_then(|s| s.parse().ok())
        .unwrap_or_default())
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        _ => None,
    })
}

crate::json_record!(ScheduledPosts, "scheduledPostsV2");

/// Work-in-progress composer content. There is only ever one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PostDraft {
    pub content: String,
    pub image_name: Option<String>,
    pub image_data_url: Option<String>,
}

impl PostDraft {
    pub fn has_content(&self) -> bool {
        !self.content.is_empty()
    }
}

crate::json_record!(PostDraft, "postDraftV2");

/// Fields an edit may change. The schedule time is deliberately absent:
/// an edit never moves a post.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PostPatch {
    pub content: Option<String>,
    pub platform: Option<Platform>,
    pub tone: Option<Tone>,
    /// `Some(None)` clears the image, `None` leaves it alone
    #[serde(deserialize_with = "double_option")]
    pub image_preview: Option<Option<String>>,
}

impl PostPatch {
    pub(crate) fn apply(self, post: &mut ScheduledPost) {
        if let Some(content) = self.content {
            post.content = content;
        }
        if let Some(platform) = self.platform {
            post.platform = platform;
        }
        if let Some(tone) = self.tone {
            post.tone = tone;
        }
        if let Some(image) = self.image_preview {
            post.image_preview = image;
        }
    }
}

fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// Timestamps as `Date.prototype.toJSON` writes them: UTC, millisecond precision.
mod js_date {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
